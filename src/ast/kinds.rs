//! Node-kind catalogue grouped by arity shape.

use std::fmt;

/// Declared argument count of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Self { min, max: Some(max) }
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {}", max),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Kinds with a single child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryKind {
    Ceil,
    Floor,
    Trunc,
    Frac,
    Neg,
    Abs,
    Not,
    Sin,
    Cos,
    Tan,
    Cot,
    Sec,
    Csc,
    Sinh,
    Cosh,
    Tanh,
    Coth,
    Sech,
    Csch,
    Arcsin,
    Arccos,
    Arctan,
    Arccot,
    Arcsec,
    Arccsc,
    Arsinh,
    Arcosh,
    Artanh,
    Arcoth,
    Arsech,
    Arcsch,
    Fact,
    Lb,
    Ln,
    ToDegree,
    ToRadian,
    ToGradian,
    Determinant,
    Inverse,
    Transpose,
    Sqrt,
    Simplify,
}

impl UnaryKind {
    pub const ALL: [UnaryKind; 42] = [
        Self::Ceil,
        Self::Floor,
        Self::Trunc,
        Self::Frac,
        Self::Neg,
        Self::Abs,
        Self::Not,
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Cot,
        Self::Sec,
        Self::Csc,
        Self::Sinh,
        Self::Cosh,
        Self::Tanh,
        Self::Coth,
        Self::Sech,
        Self::Csch,
        Self::Arcsin,
        Self::Arccos,
        Self::Arctan,
        Self::Arccot,
        Self::Arcsec,
        Self::Arccsc,
        Self::Arsinh,
        Self::Arcosh,
        Self::Artanh,
        Self::Arcoth,
        Self::Arsech,
        Self::Arcsch,
        Self::Fact,
        Self::Lb,
        Self::Ln,
        Self::ToDegree,
        Self::ToRadian,
        Self::ToGradian,
        Self::Determinant,
        Self::Inverse,
        Self::Transpose,
        Self::Sqrt,
        Self::Simplify,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ceil => "ceil",
            Self::Floor => "floor",
            Self::Trunc => "trunc",
            Self::Frac => "frac",
            Self::Neg => "neg",
            Self::Abs => "abs",
            Self::Not => "not",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Cot => "cot",
            Self::Sec => "sec",
            Self::Csc => "csc",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Coth => "coth",
            Self::Sech => "sech",
            Self::Csch => "csch",
            Self::Arcsin => "arcsin",
            Self::Arccos => "arccos",
            Self::Arctan => "arctan",
            Self::Arccot => "arccot",
            Self::Arcsec => "arcsec",
            Self::Arccsc => "arccsc",
            Self::Arsinh => "arsinh",
            Self::Arcosh => "arcosh",
            Self::Artanh => "artanh",
            Self::Arcoth => "arcoth",
            Self::Arsech => "arsech",
            Self::Arcsch => "arcsch",
            Self::Fact => "fact",
            Self::Lb => "lb",
            Self::Ln => "ln",
            Self::ToDegree => "todeg",
            Self::ToRadian => "torad",
            Self::ToGradian => "tograd",
            Self::Determinant => "det",
            Self::Inverse => "inverse",
            Self::Transpose => "transpose",
            Self::Sqrt => "sqrt",
            Self::Simplify => "simplify",
        }
    }
}

/// Kinds with a left and a right child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Nand,
    Nor,
    Implies,
    CondAnd,
    CondOr,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Dot,
    Cross,
    Define,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    While,
    Derivative,
}

impl BinaryKind {
    pub const ALL: [BinaryKind; 33] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Mod,
        Self::Pow,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
        Self::Eq,
        Self::Ne,
        Self::And,
        Self::Or,
        Self::Nand,
        Self::Nor,
        Self::Implies,
        Self::CondAnd,
        Self::CondOr,
        Self::BitAnd,
        Self::BitOr,
        Self::BitXor,
        Self::Shl,
        Self::Shr,
        Self::Dot,
        Self::Cross,
        Self::Define,
        Self::AddAssign,
        Self::SubAssign,
        Self::MulAssign,
        Self::DivAssign,
        Self::While,
        Self::Derivative,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Pow => "pow",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::And => "and",
            Self::Or => "or",
            Self::Nand => "nand",
            Self::Nor => "nor",
            Self::Implies => "implies",
            Self::CondAnd => "cand",
            Self::CondOr => "cor",
            Self::BitAnd => "band",
            Self::BitOr => "bor",
            Self::BitXor => "bxor",
            Self::Shl => "shl",
            Self::Shr => "shr",
            Self::Dot => "dot",
            Self::Cross => "cross",
            Self::Define => "define",
            Self::AddAssign => "addassign",
            Self::SubAssign => "subassign",
            Self::MulAssign => "mulassign",
            Self::DivAssign => "divassign",
            Self::While => "while",
            Self::Derivative => "derivative",
        }
    }

    /// Compound assignments update an existing variable in place.
    pub const fn is_compound_assignment(self) -> bool {
        matches!(
            self,
            Self::AddAssign | Self::SubAssign | Self::MulAssign | Self::DivAssign
        )
    }
}

/// Kinds taking an ordered argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariadicKind {
    Avg,
    Min,
    Max,
    Count,
    Stdev,
    Variance,
    Sum,
    Product,
    Gcd,
    Lcm,
    Round,
    Vector,
    Matrix,
    If,
    For,
}

impl VariadicKind {
    pub const ALL: [VariadicKind; 15] = [
        Self::Avg,
        Self::Min,
        Self::Max,
        Self::Count,
        Self::Stdev,
        Self::Variance,
        Self::Sum,
        Self::Product,
        Self::Gcd,
        Self::Lcm,
        Self::Round,
        Self::Vector,
        Self::Matrix,
        Self::If,
        Self::For,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
            Self::Stdev => "stdev",
            Self::Variance => "var",
            Self::Sum => "sum",
            Self::Product => "product",
            Self::Gcd => "gcd",
            Self::Lcm => "lcm",
            Self::Round => "round",
            Self::Vector => "vector",
            Self::Matrix => "matrix",
            Self::If => "if",
            Self::For => "for",
        }
    }

    pub const fn arity(self) -> Arity {
        match self {
            Self::Avg
            | Self::Min
            | Self::Max
            | Self::Count
            | Self::Stdev
            | Self::Variance
            | Self::Sum
            | Self::Product
            | Self::Vector
            | Self::Matrix => Arity::at_least(1),
            Self::Gcd | Self::Lcm => Arity::at_least(2),
            Self::Round => Arity::between(1, 2),
            Self::If => Arity::between(2, 3),
            Self::For => Arity::exactly(4),
        }
    }
}

/// Any constructible operator kind, tagged with its arity shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Unary(UnaryKind),
    Binary(BinaryKind),
    Variadic(VariadicKind),
}

impl NodeKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unary(kind) => kind.name(),
            Self::Binary(kind) => kind.name(),
            Self::Variadic(kind) => kind.name(),
        }
    }

    pub const fn arity(self) -> Arity {
        match self {
            Self::Unary(_) => Arity::exactly(1),
            Self::Binary(_) => Arity::exactly(2),
            Self::Variadic(kind) => kind.arity(),
        }
    }

    /// Every kind in declaration order.
    pub fn all() -> impl Iterator<Item = NodeKind> {
        UnaryKind::ALL
            .into_iter()
            .map(NodeKind::Unary)
            .chain(BinaryKind::ALL.into_iter().map(NodeKind::Binary))
            .chain(VariadicKind::ALL.into_iter().map(NodeKind::Variadic))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
