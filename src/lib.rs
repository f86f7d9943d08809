//! Static result-type analysis for symbolic math expressions.
//!
//! Expressions are immutable trees of [`Expr`] nodes. Every pass over a tree
//! implements [`ExprVisitor`], which has one method per node kind, so adding
//! a kind is a compile error until every pass handles it. The
//! [`TypeAnalyzer`] predicts which [`ResultType`] a tree will produce, or
//! reports the first [`TypeMismatch`] it finds, before anything is
//! evaluated.
//!
//! ```
//! use symath::{analyze, BinaryKind, Expr, ResultType};
//!
//! let sum = Expr::binary(BinaryKind::Add, Expr::number(1.0), Expr::number(2.0)).unwrap();
//! assert_eq!(analyze(&sum), Ok(ResultType::NUMBER));
//! ```

pub mod analysis;
pub mod ast;
pub mod core;
pub mod errors;
pub mod frontend;
pub mod infrastructure;

pub use analysis::{analyze, substitute, Bindings, Scope, Substituter, TypeAnalyzer};
pub use ast::{
    Angle, AngleUnit, Arity, Binary, BinaryKind, Call, Complex, Expr, ExprVisitor, NodeKind,
    Shape, Unary, UnaryKind, Variadic, VariadicKind,
};
pub use crate::core::ResultType;
pub use errors::{AnalysisError, ConfigError, ConstructionError, Operand, Position, TypeMismatch};
pub use frontend::Config;
pub use infrastructure::{init_logging, LogConfig, LogFormat, LogOutput};
