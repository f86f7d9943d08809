//! Error types shared across the crate.
//!
//! Type-mismatch diagnostics are the analyzer's own taxonomy: plain,
//! operand-tagged, or argument-tagged. Their message text is derived from
//! the structured fields; callers should branch on the fields.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::ast::kinds::Arity;
use crate::core::types::ResultType;

/// Operand of a binary node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Left,
    Right,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left operand"),
            Self::Right => write!(f, "right operand"),
        }
    }
}

/// Where inside a node the rule failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Operand of a binary node.
    Operand(Operand),
    /// Zero-based argument index of a variadic node.
    Argument(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand(side) => write!(f, "{}", side),
            Self::Argument(index) => write!(f, "argument {}", index),
        }
    }
}

/// A result category that does not fit the set a rule expects.
///
/// For operand-tagged mismatches, `position` names the operand at which the
/// rule stopped. When both operands are individually invalid the left one is
/// always named. When each operand is valid on its own but the pair is not,
/// the right operand is named, `expected` is the set of left categories the
/// right operand admits and `actual` is the left category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct TypeMismatch {
    pub expected: ResultType,
    pub actual: ResultType,
    pub position: Option<Position>,
}

impl TypeMismatch {
    pub fn new(expected: ResultType, actual: ResultType) -> Self {
        Self {
            expected,
            actual,
            position: None,
        }
    }

    pub fn operand(side: Operand, expected: ResultType, actual: ResultType) -> Self {
        Self {
            expected,
            actual,
            position: Some(Position::Operand(side)),
        }
    }

    pub fn argument(index: usize, expected: ResultType, actual: ResultType) -> Self {
        Self {
            expected,
            actual,
            position: Some(Position::Argument(index)),
        }
    }

    pub fn side(&self) -> Option<Operand> {
        match self.position {
            Some(Position::Operand(side)) => Some(side),
            _ => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self.position {
            Some(Position::Argument(index)) => Some(index),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self.position {
            Some(position) => format!(
                "Type mismatch at {}: expected {}, found {}",
                position, self.expected, self.actual
            ),
            None => format!(
                "Type mismatch: expected {}, found {}",
                self.expected, self.actual
            ),
        }
    }
}

/// Shape errors reported while building a node, before any type analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("'{kind}' takes {expected} argument(s), found {found}")]
    Arity {
        kind: &'static str,
        expected: Arity,
        found: usize,
    },

    #[error("'{kind}' cannot assign to this target; expected {expected}")]
    InvalidAssignmentTarget {
        kind: &'static str,
        expected: &'static str,
    },

    #[error("derivative must be taken with respect to a variable")]
    InvalidDerivativeVariable,

    #[error("matrix row {row} has {found} element(s), expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Failures of a guarded analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Mismatch(#[from] TypeMismatch),

    #[error("expression depth {depth} exceeds the configured limit of {limit}")]
    DepthExceeded { depth: usize, limit: usize },
}

impl AnalysisError {
    pub fn as_mismatch(&self) -> Option<&TypeMismatch> {
        match self {
            Self::Mismatch(mismatch) => Some(mismatch),
            Self::DepthExceeded { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid log level '{0}'")]
    InvalidLevel(String),
}
