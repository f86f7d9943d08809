//! Result-type rules, one function per rule family.
//!
//! Every rule receives the already analyzed categories of a node's children
//! and either combines them or raises the first mismatch it meets. Rules
//! never recover; the fallback arm always raises.

use crate::core::types::ResultType;
use crate::errors::{Operand, TypeMismatch};

pub type Rule = Result<ResultType, TypeMismatch>;

const U: ResultType = ResultType::UNDEFINED;
const N: ResultType = ResultType::NUMBER;
const C: ResultType = ResultType::COMPLEX;
const B: ResultType = ResultType::BOOLEAN;
const V: ResultType = ResultType::VECTOR;
const M: ResultType = ResultType::MATRIX;
const A: ResultType = ResultType::ANGLE;

/// How a binary table treats an undefined operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndefinedPolicy {
    /// The result depends on the unknown operand and stays undefined.
    Propagate,
    /// The result category is fixed regardless of the operand.
    Resolve(ResultType),
}

/// Admissible `(left, right) -> result` combinations of a binary family.
#[derive(Debug, Clone, Copy)]
pub struct BinaryTable {
    pub rows: &'static [(ResultType, ResultType, ResultType)],
    pub undefined: UndefinedPolicy,
}

impl BinaryTable {
    pub fn lefts(&self) -> ResultType {
        self.rows.iter().fold(ResultType::NONE, |acc, row| acc | row.0)
    }

    pub fn rights(&self) -> ResultType {
        self.rows.iter().fold(ResultType::NONE, |acc, row| acc | row.1)
    }

    /// Left categories admitted next to `right`.
    pub fn partners(&self, right: ResultType) -> ResultType {
        self.rows
            .iter()
            .filter(|row| row.1 == right)
            .fold(ResultType::NONE, |acc, row| acc | row.0)
    }

    pub fn lookup(&self, left: ResultType, right: ResultType) -> Option<ResultType> {
        self.rows
            .iter()
            .find(|row| row.0 == left && row.1 == right)
            .map(|row| row.2)
    }
}

const ADD_SUB_ROWS: [(ResultType, ResultType, ResultType); 9] = [
    (N, N, N),
    (N, A, A),
    (A, N, A),
    (A, A, A),
    (N, C, C),
    (C, N, C),
    (C, C, C),
    (V, V, V),
    (M, M, M),
];

pub const ADD_SUB: BinaryTable = BinaryTable {
    rows: &ADD_SUB_ROWS,
    undefined: UndefinedPolicy::Propagate,
};

pub const MUL: BinaryTable = BinaryTable {
    rows: &[
        (N, N, N),
        (N, A, A),
        (A, N, A),
        (A, A, A),
        (N, C, C),
        (C, N, C),
        (C, C, C),
        (V, V, V),
        (M, M, M),
        (N, V, V),
        (V, N, V),
        (N, M, M),
        (M, N, M),
        (M, V, V),
    ],
    undefined: UndefinedPolicy::Propagate,
};

pub const DIV: BinaryTable = BinaryTable {
    rows: &[
        (N, N, N),
        (A, N, A),
        (A, A, N),
        (N, C, C),
        (C, N, C),
        (C, C, C),
    ],
    undefined: UndefinedPolicy::Propagate,
};

pub const MODULO: BinaryTable = BinaryTable {
    rows: &[(N, N, N)],
    undefined: UndefinedPolicy::Propagate,
};

pub const POWER: BinaryTable = BinaryTable {
    rows: &[(N, N, N), (N, C, C), (C, N, C), (C, C, C), (M, N, M)],
    undefined: UndefinedPolicy::Propagate,
};

pub const COMPARISON: BinaryTable = BinaryTable {
    rows: &[(N, N, B), (A, A, B)],
    undefined: UndefinedPolicy::Resolve(B),
};

pub const EQUALITY: BinaryTable = BinaryTable {
    rows: &[(N, N, B), (B, B, B), (A, A, B)],
    undefined: UndefinedPolicy::Resolve(B),
};

pub const LOGICAL: BinaryTable = BinaryTable {
    rows: &[(B, B, B)],
    undefined: UndefinedPolicy::Resolve(B),
};

pub const SHIFT: BinaryTable = BinaryTable {
    rows: &[(N, N, N)],
    undefined: UndefinedPolicy::Resolve(N),
};

pub const DOT: BinaryTable = BinaryTable {
    rows: &[(V, V, N)],
    undefined: UndefinedPolicy::Propagate,
};

pub const CROSS: BinaryTable = BinaryTable {
    rows: &[(V, V, V)],
    undefined: UndefinedPolicy::Propagate,
};

/// Applies a binary table with operand-tagged diagnostics.
///
/// Under [`UndefinedPolicy::Propagate`] an undefined operand makes the
/// result undefined before anything else is checked. Otherwise the left
/// operand is checked first, then the right, then the pair.
pub fn tabled(table: &BinaryTable, left: ResultType, right: ResultType) -> Rule {
    if table.undefined == UndefinedPolicy::Propagate
        && (left.is_undefined() || right.is_undefined())
    {
        return Ok(U);
    }

    let lefts = table.lefts();
    if !left.is_undefined() && !left.belongs_to(lefts) {
        return Err(TypeMismatch::operand(Operand::Left, lefts, left));
    }
    let rights = table.rights();
    if !right.is_undefined() && !right.belongs_to(rights) {
        return Err(TypeMismatch::operand(Operand::Right, rights, right));
    }

    if let UndefinedPolicy::Resolve(result) = table.undefined {
        if left.is_undefined() || right.is_undefined() {
            return Ok(result);
        }
    }

    table
        .lookup(left, right)
        .ok_or_else(|| TypeMismatch::operand(Operand::Right, table.partners(right), left))
}

/// Bitwise and/or/xor. Unlike the strict logical family an undefined operand
/// on either side leaves the result undefined, and failures are untagged.
pub fn bitwise(left: ResultType, right: ResultType) -> Rule {
    if left.is_undefined() || right.is_undefined() {
        return Ok(U);
    }
    match (left, right) {
        (N, N) => Ok(N),
        (B, B) => Ok(B),
        _ if !left.belongs_to(ResultType::NUMBER_OR_BOOLEAN) => {
            Err(ResultType::NUMBER_OR_BOOLEAN.mismatch(left))
        }
        _ => Err(left.mismatch(right)),
    }
}

/// Define and compound assignment: only the value operand is typed.
pub fn assignment(_key: ResultType, value: ResultType) -> Rule {
    match value {
        N | U => Ok(N),
        _ => Err(TypeMismatch::operand(Operand::Right, N, value)),
    }
}

pub fn while_loop(condition: ResultType, _body: ResultType) -> Rule {
    match condition {
        B | U => Ok(U),
        _ => Err(TypeMismatch::operand(Operand::Left, B, condition)),
    }
}

/// ceil, floor, trunc, frac
pub fn rounding(arg: ResultType) -> Rule {
    match arg {
        N | A | U => Ok(arg),
        _ => Err(ResultType::NUMBER_OR_ANGLE.mismatch(arg)),
    }
}

pub fn negation(arg: ResultType) -> Rule {
    match arg {
        N | A | C | V | M | U => Ok(arg),
        _ => Err(ResultType::ARITHMETIC.mismatch(arg)),
    }
}

pub fn absolute(arg: ResultType) -> Rule {
    match arg {
        N | C | V => Ok(N),
        A | U => Ok(arg),
        _ => Err(ResultType::NUMBER_OR_COMPLEX_OR_ANGLE.or(V).mismatch(arg)),
    }
}

pub fn logical_not(arg: ResultType) -> Rule {
    match arg {
        B | U => Ok(B),
        _ => Err(B.mismatch(arg)),
    }
}

/// sin, cos, tan, cot, sec, csc and their hyperbolic forms
pub fn trig_forward(arg: ResultType) -> Rule {
    match arg {
        N | A => Ok(N),
        C | U => Ok(arg),
        _ => Err(ResultType::NUMBER_OR_COMPLEX_OR_ANGLE.mismatch(arg)),
    }
}

/// arcsin, arccos, ... arsinh, arcosh, ...
pub fn trig_inverse(arg: ResultType) -> Rule {
    match arg {
        N => Ok(A),
        C | U => Ok(arg),
        _ => Err(ResultType::NUMBER_OR_COMPLEX.mismatch(arg)),
    }
}

/// fact, lb
pub fn numeric_only(arg: ResultType) -> Rule {
    match arg {
        N | U => Ok(N),
        _ => Err(N.mismatch(arg)),
    }
}

pub fn logarithm(arg: ResultType) -> Rule {
    match arg {
        N | C | U => Ok(arg),
        _ => Err(ResultType::NUMBER_OR_COMPLEX.mismatch(arg)),
    }
}

/// todeg, torad, tograd
pub fn angle_conversion(arg: ResultType) -> Rule {
    match arg {
        N | A | U => Ok(A),
        _ => Err(ResultType::NUMBER_OR_ANGLE.mismatch(arg)),
    }
}

pub fn determinant(arg: ResultType) -> Rule {
    match arg {
        M => Ok(N),
        U => Ok(U),
        _ => Err(M.mismatch(arg)),
    }
}

/// inverse, transpose
pub fn matrix_to_matrix(arg: ResultType) -> Rule {
    match arg {
        M | U => Ok(arg),
        _ => Err(M.mismatch(arg)),
    }
}

/// avg, min, max, count, stdev, var, sum, product
pub fn statistical(args: &[ResultType]) -> Rule {
    match args {
        [single] => match *single {
            N | V => Ok(N),
            U => Ok(U),
            other => Err(TypeMismatch::argument(0, ResultType::NUMBER_OR_VECTOR, other)),
        },
        _ => all_numbers(args),
    }
}

/// Every argument must be a number; the first undefined argument makes the
/// whole call undefined.
pub fn all_numbers(args: &[ResultType]) -> Rule {
    for (index, arg) in args.iter().enumerate() {
        match *arg {
            N => continue,
            U => return Ok(U),
            other => return Err(TypeMismatch::argument(index, N, other)),
        }
    }
    Ok(N)
}

/// round(value) or round(value, digits)
pub fn round(args: &[ResultType]) -> Rule {
    let value = args.first().copied().unwrap_or(ResultType::NONE);
    if !matches!(value, N | A | U) {
        return Err(TypeMismatch::argument(0, ResultType::NUMBER_OR_ANGLE, value));
    }
    if let Some(&digits) = args.get(1) {
        if !matches!(digits, N | U) {
            return Err(TypeMismatch::argument(1, N, digits));
        }
    }
    Ok(value)
}

pub fn vector_literal(args: &[ResultType]) -> Rule {
    elements(args, N)?;
    Ok(V)
}

pub fn matrix_literal(args: &[ResultType]) -> Rule {
    elements(args, V)?;
    Ok(M)
}

fn elements(args: &[ResultType], expected: ResultType) -> Result<(), TypeMismatch> {
    match args
        .iter()
        .position(|arg| !arg.is_undefined() && !arg.belongs_to(expected))
    {
        Some(index) => Err(TypeMismatch::argument(index, expected, args[index])),
        None => Ok(()),
    }
}

/// if(condition, then) is undefined; if(condition, then, else) takes the
/// category of its then-branch.
pub fn conditional(args: &[ResultType]) -> Rule {
    condition_at(args, 0)?;
    match args {
        [_, then, _] => Ok(*then),
        _ => Ok(U),
    }
}

/// for(init, condition, step, body)
pub fn for_loop(args: &[ResultType]) -> Rule {
    condition_at(args, 1)?;
    Ok(U)
}

fn condition_at(args: &[ResultType], index: usize) -> Result<(), TypeMismatch> {
    match args.get(index).copied() {
        Some(B) | Some(U) => Ok(()),
        Some(other) => Err(TypeMismatch::argument(index, B, other)),
        None => Err(TypeMismatch::argument(index, B, ResultType::NONE)),
    }
}
