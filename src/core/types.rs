use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::errors::TypeMismatch;

/// Statically predicted category of the value an expression produces.
///
/// Categories are independent bits. A single analyzed node always yields
/// exactly one base bit; composite values (several bits) are used as
/// expected-type sets in diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultType(u16);

impl ResultType {
    pub const NONE: ResultType = ResultType(0);
    /// Not resolvable without a runtime binding (free variables, deferred forms).
    pub const UNDEFINED: ResultType = ResultType(1 << 0);
    pub const NUMBER: ResultType = ResultType(1 << 1);
    pub const COMPLEX: ResultType = ResultType(1 << 2);
    pub const BOOLEAN: ResultType = ResultType(1 << 3);
    pub const VECTOR: ResultType = ResultType(1 << 4);
    pub const MATRIX: ResultType = ResultType(1 << 5);
    pub const EXPRESSION: ResultType = ResultType(1 << 6);
    pub const ANGLE: ResultType = ResultType(1 << 7);
    pub const STRING: ResultType = ResultType(1 << 8);
    pub const POWER: ResultType = ResultType(1 << 9);

    // Composite sets
    pub const NUMBER_OR_COMPLEX: ResultType = Self::NUMBER.or(Self::COMPLEX);
    pub const NUMBER_OR_ANGLE: ResultType = Self::NUMBER.or(Self::ANGLE);
    pub const NUMBER_OR_VECTOR: ResultType = Self::NUMBER.or(Self::VECTOR);
    pub const NUMBER_OR_BOOLEAN: ResultType = Self::NUMBER.or(Self::BOOLEAN);
    pub const VECTOR_OR_MATRIX: ResultType = Self::VECTOR.or(Self::MATRIX);
    pub const NUMBER_OR_COMPLEX_OR_ANGLE: ResultType = Self::NUMBER_OR_COMPLEX.or(Self::ANGLE);
    pub const NUMBER_OR_VECTOR_OR_MATRIX: ResultType = Self::NUMBER.or(Self::VECTOR_OR_MATRIX);
    pub const NUMBER_OR_BOOLEAN_OR_ANGLE: ResultType = Self::NUMBER_OR_BOOLEAN.or(Self::ANGLE);
    pub const NUMBER_OR_COMPLEX_OR_VECTOR: ResultType = Self::NUMBER_OR_COMPLEX.or(Self::VECTOR);
    pub const ARITHMETIC: ResultType = Self::NUMBER_OR_COMPLEX_OR_ANGLE.or(Self::VECTOR_OR_MATRIX);
    pub const ANY: ResultType = ResultType(0x03FF);

    const NAMES: [(ResultType, &'static str); 10] = [
        (Self::UNDEFINED, "undefined"),
        (Self::NUMBER, "number"),
        (Self::COMPLEX, "complex"),
        (Self::BOOLEAN, "boolean"),
        (Self::VECTOR, "vector"),
        (Self::MATRIX, "matrix"),
        (Self::EXPRESSION, "expression"),
        (Self::ANGLE, "angle"),
        (Self::STRING, "string"),
        (Self::POWER, "power"),
    ];

    /// Union of two sets, usable in constant position.
    pub const fn or(self, other: ResultType) -> ResultType {
        ResultType(self.0 | other.0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub const fn is_undefined(self) -> bool {
        self.0 == Self::UNDEFINED.0
    }

    /// True when `self` shares at least one category with `expected`.
    pub const fn belongs_to(self, expected: ResultType) -> bool {
        self.0 & expected.0 != 0
    }

    /// True when every category of `self` is also in `other`.
    pub const fn is_subset_of(self, other: ResultType) -> bool {
        self.0 & !other.0 == 0
    }

    /// Builds the mismatch raised when `actual` is not in this expected set.
    pub fn mismatch(self, actual: ResultType) -> TypeMismatch {
        TypeMismatch::new(self, actual)
    }

    /// Returns `actual` unchanged if it belongs to this set, otherwise the mismatch.
    pub fn require(self, actual: ResultType) -> Result<ResultType, TypeMismatch> {
        if actual.belongs_to(self) {
            Ok(actual)
        } else {
            Err(self.mismatch(actual))
        }
    }

    /// Iterates the base categories contained in this set, in bit order.
    pub fn categories(self) -> impl Iterator<Item = ResultType> {
        Self::NAMES
            .into_iter()
            .map(|(ty, _)| ty)
            .filter(move |ty| ty.belongs_to(self))
    }

    /// Name of a single base category, `None` for composites and `NONE`.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMES
            .iter()
            .find(|(ty, _)| *ty == self)
            .map(|(_, name)| *name)
    }
}

impl BitOr for ResultType {
    type Output = ResultType;

    fn bitor(self, rhs: ResultType) -> ResultType {
        self.or(rhs)
    }
}

impl BitOrAssign for ResultType {
    fn bitor_assign(&mut self, rhs: ResultType) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ResultType {
    type Output = ResultType;

    fn bitand(self, rhs: ResultType) -> ResultType {
        ResultType(self.0 & rhs.0)
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "none");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(ty, _)| ty.belongs_to(*self))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join(" or "))
    }
}

impl fmt::Debug for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResultType({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_bits_are_independent() {
        let all: Vec<ResultType> = ResultType::ANY.categories().collect();
        assert_eq!(all.len(), 10);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(!a.belongs_to(*b), "{} overlaps {}", a, b);
            }
        }
    }

    #[test]
    fn test_composite_membership() {
        let set = ResultType::NUMBER_OR_VECTOR_OR_MATRIX;
        assert!(ResultType::VECTOR.belongs_to(set));
        assert!(!ResultType::COMPLEX.belongs_to(set));
        assert!(ResultType::NUMBER_OR_VECTOR.is_subset_of(set));
        assert!(!set.is_subset_of(ResultType::NUMBER_OR_VECTOR));
        assert!(!ResultType::NONE.belongs_to(ResultType::ANY));
    }

    #[test]
    fn test_require_and_mismatch() {
        let expected = ResultType::NUMBER_OR_ANGLE;
        assert_eq!(expected.require(ResultType::ANGLE), Ok(ResultType::ANGLE));

        let err = expected.require(ResultType::STRING).unwrap_err();
        assert_eq!(err.expected, expected);
        assert_eq!(err.actual, ResultType::STRING);
        assert!(err.position.is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(ResultType::NUMBER.to_string(), "number");
        assert_eq!(ResultType::NUMBER_OR_COMPLEX.to_string(), "number or complex");
        assert_eq!(ResultType::NONE.to_string(), "none");
        assert_eq!(ResultType::MATRIX.name(), Some("matrix"));
        assert_eq!(ResultType::VECTOR_OR_MATRIX.name(), None);
    }
}
