//! Immutable expression tree.
//!
//! Children are shared through `Arc`, so rewriting passes build new parents
//! around untouched subtrees instead of copying them. Nodes never change
//! after construction and hold no reference to their parent.

use std::sync::Arc;

use once_cell::sync::Lazy;
use smallvec::SmallVec;

use crate::ast::kinds::{BinaryKind, NodeKind, UnaryKind, VariadicKind};
use crate::errors::ConstructionError;

/// Ordered children of a variadic node or call.
pub type Args = SmallVec<[Arc<Expr>; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleUnit {
    Degree,
    Radian,
    Gradian,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    pub value: f64,
    pub unit: AngleUnit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

/// Structural category of a node by child count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Leaf,
    Unary,
    Binary,
    Variadic,
}

/// An expression node.
///
/// Equality is structural. Numeric payloads compare with `f64` equality, so
/// a tree holding `NaN` is not equal to itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Angle(Angle),
    Complex(Complex),
    Variable(String),
    /// Reference to a named function, producing a lambda when evaluated.
    Delegate(String),
    /// Call of a user-defined function.
    Call(Call),
    Unary(Unary),
    Binary(Binary),
    Variadic(Variadic),
}

impl Expr {
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn boolean(value: bool) -> Self {
        Self::Bool(value)
    }

    pub fn angle(value: f64, unit: AngleUnit) -> Self {
        Self::Angle(Angle { value, unit })
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Self::Complex(Complex { re, im })
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn delegate(name: impl Into<String>) -> Self {
        Self::Delegate(name.into())
    }

    pub fn call(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::Call(Call::new(name, args.into_iter().map(Arc::new).collect()))
    }

    pub fn unary(kind: UnaryKind, arg: Expr) -> Self {
        Self::Unary(Unary::new(kind, Arc::new(arg)))
    }

    pub fn binary(kind: BinaryKind, left: Expr, right: Expr) -> Result<Self, ConstructionError> {
        Binary::new(kind, Arc::new(left), Arc::new(right)).map(Self::Binary)
    }

    pub fn variadic(
        kind: VariadicKind,
        args: impl IntoIterator<Item = Expr>,
    ) -> Result<Self, ConstructionError> {
        Variadic::new(kind, args.into_iter().map(Arc::new).collect()).map(Self::Variadic)
    }

    /// Builds an operator node from a raw argument list, rejecting argument
    /// counts that do not fit the kind's arity shape.
    pub fn from_args(kind: NodeKind, args: Vec<Expr>) -> Result<Self, ConstructionError> {
        let arity_error = ConstructionError::Arity {
            kind: kind.name(),
            expected: kind.arity(),
            found: args.len(),
        };
        if !kind.arity().accepts(args.len()) {
            return Err(arity_error);
        }

        let mut args = args.into_iter();
        match kind {
            NodeKind::Unary(kind) => {
                let arg = args.next().ok_or(arity_error)?;
                Ok(Self::unary(kind, arg))
            }
            NodeKind::Binary(kind) => match (args.next(), args.next()) {
                (Some(left), Some(right)) => Self::binary(kind, left, right),
                _ => Err(arity_error),
            },
            NodeKind::Variadic(kind) => Self::variadic(kind, args),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Self::Number(_)
            | Self::Str(_)
            | Self::Bool(_)
            | Self::Angle(_)
            | Self::Complex(_)
            | Self::Variable(_)
            | Self::Delegate(_) => Shape::Leaf,
            Self::Unary(_) => Shape::Unary,
            Self::Binary(_) => Shape::Binary,
            Self::Call(_) | Self::Variadic(_) => Shape::Variadic,
        }
    }

    /// Direct children in order; empty for leaves.
    pub fn children(&self) -> &[Arc<Expr>] {
        match self {
            Self::Unary(node) => std::slice::from_ref(&node.arg),
            Self::Binary(node) => &node.operands,
            Self::Variadic(node) => &node.args,
            Self::Call(node) => &node.args,
            _ => &[],
        }
    }

    /// Canonical name of this node's kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Angle(_) => "angle",
            Self::Complex(_) => "complex",
            Self::Variable(_) => "variable",
            Self::Delegate(_) => "delegate",
            Self::Call(_) => "call",
            Self::Unary(node) => node.kind.name(),
            Self::Binary(node) => node.kind.name(),
            Self::Variadic(node) => node.kind.name(),
        }
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Stand-in child left behind by `Expr::detach_children`.
static DETACHED: Lazy<Arc<Expr>> = Lazy::new(|| Arc::new(Expr::Number(0.0)));

impl Expr {
    /// Moves this node's children onto `out`, leaving it childless.
    fn detach_children(&mut self, out: &mut Vec<Arc<Expr>>) {
        match self {
            Self::Unary(node) => out.push(std::mem::replace(&mut node.arg, Arc::clone(&DETACHED))),
            Self::Binary(node) => {
                for operand in node.operands.iter_mut() {
                    out.push(std::mem::replace(operand, Arc::clone(&DETACHED)));
                }
            }
            Self::Variadic(node) => out.extend(std::mem::take(&mut node.args)),
            Self::Call(node) => out.extend(std::mem::take(&mut node.args)),
            _ => {}
        }
    }

    fn owns_inner_children(&self) -> bool {
        self.children()
            .iter()
            .any(|child| Arc::strong_count(child) == 1 && !child.children().is_empty())
    }
}

/// Trees deeper than the call stack are dropped with an explicit stack.
/// Subtrees still shared elsewhere are left to their other owners.
impl Drop for Expr {
    fn drop(&mut self) {
        if !self.owns_inner_children() {
            return;
        }
        let mut stack = Vec::new();
        self.detach_children(&mut stack);
        while let Some(child) = stack.pop() {
            if let Ok(mut node) = Arc::try_unwrap(child) {
                node.detach_children(&mut stack);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    kind: UnaryKind,
    arg: Arc<Expr>,
}

impl Unary {
    pub fn new(kind: UnaryKind, arg: Arc<Expr>) -> Self {
        Self { kind, arg }
    }

    pub fn kind(&self) -> UnaryKind {
        self.kind
    }

    pub fn arg(&self) -> &Expr {
        &self.arg
    }

    pub fn arg_shared(&self) -> &Arc<Expr> {
        &self.arg
    }

    /// Clone of this node, optionally replacing its argument.
    pub fn with_arg(&self, arg: Option<Arc<Expr>>) -> Self {
        Self {
            kind: self.kind,
            arg: arg.unwrap_or_else(|| Arc::clone(&self.arg)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    kind: BinaryKind,
    operands: [Arc<Expr>; 2],
}

impl Binary {
    pub fn new(kind: BinaryKind, left: Arc<Expr>, right: Arc<Expr>) -> Result<Self, ConstructionError> {
        validate_binary(kind, &left, &right)?;
        Ok(Self {
            kind,
            operands: [left, right],
        })
    }

    pub fn kind(&self) -> BinaryKind {
        self.kind
    }

    pub fn left(&self) -> &Expr {
        &self.operands[0]
    }

    pub fn right(&self) -> &Expr {
        &self.operands[1]
    }

    pub fn left_shared(&self) -> &Arc<Expr> {
        &self.operands[0]
    }

    pub fn right_shared(&self) -> &Arc<Expr> {
        &self.operands[1]
    }

    /// Clone of this node, optionally replacing either operand. Replacements
    /// are validated the same way as at construction.
    pub fn with_operands(
        &self,
        left: Option<Arc<Expr>>,
        right: Option<Arc<Expr>>,
    ) -> Result<Self, ConstructionError> {
        Self::new(
            self.kind,
            left.unwrap_or_else(|| Arc::clone(&self.operands[0])),
            right.unwrap_or_else(|| Arc::clone(&self.operands[1])),
        )
    }
}

fn validate_binary(kind: BinaryKind, left: &Expr, right: &Expr) -> Result<(), ConstructionError> {
    match kind {
        BinaryKind::Define => {
            let valid = match left {
                Expr::Variable(_) => true,
                Expr::Call(call) => call.args().iter().all(|arg| arg.is_variable()),
                _ => false,
            };
            if !valid {
                return Err(ConstructionError::InvalidAssignmentTarget {
                    kind: kind.name(),
                    expected: "a variable or a function signature",
                });
            }
        }
        kind if kind.is_compound_assignment() => {
            if !left.is_variable() {
                return Err(ConstructionError::InvalidAssignmentTarget {
                    kind: kind.name(),
                    expected: "a variable",
                });
            }
        }
        BinaryKind::Derivative => {
            if !right.is_variable() {
                return Err(ConstructionError::InvalidDerivativeVariable);
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variadic {
    kind: VariadicKind,
    args: Args,
}

impl Variadic {
    pub fn new(kind: VariadicKind, args: Args) -> Result<Self, ConstructionError> {
        let arity = kind.arity();
        if !arity.accepts(args.len()) {
            return Err(ConstructionError::Arity {
                kind: kind.name(),
                expected: arity,
                found: args.len(),
            });
        }
        if kind == VariadicKind::Matrix {
            check_rows(&args)?;
        }
        Ok(Self { kind, args })
    }

    pub fn kind(&self) -> VariadicKind {
        self.kind
    }

    pub fn args(&self) -> &[Arc<Expr>] {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Variable introduced by the init node of a `for` loop.
    pub fn loop_variable(&self) -> Option<&str> {
        if self.kind != VariadicKind::For {
            return None;
        }
        match self.args.first().map(|init| &**init) {
            Some(Expr::Binary(init)) if init.kind() == BinaryKind::Define => init.left().as_variable(),
            _ => None,
        }
    }

    /// Clone of this node, optionally replacing the whole argument list.
    pub fn with_args(&self, args: Option<Args>) -> Result<Self, ConstructionError> {
        match args {
            Some(args) => Self::new(self.kind, args),
            None => Ok(self.clone()),
        }
    }
}

/// Rows written as vector literals must agree in length. Rows of any other
/// form are only known at evaluation time.
fn check_rows(rows: &[Arc<Expr>]) -> Result<(), ConstructionError> {
    let mut expected = None;
    for (row, expr) in rows.iter().enumerate() {
        if let Expr::Variadic(vector) = &**expr {
            if vector.kind() != VariadicKind::Vector {
                continue;
            }
            match expected {
                None => expected = Some(vector.len()),
                Some(len) if len != vector.len() => {
                    return Err(ConstructionError::RaggedMatrix {
                        row,
                        expected: len,
                        found: vector.len(),
                    });
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    name: String,
    args: Args,
}

impl Call {
    pub fn new(name: impl Into<String>, args: Args) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Arc<Expr>] {
        &self.args
    }

    pub fn with_args(&self, args: Option<Args>) -> Self {
        match args {
            Some(args) => Self::new(self.name.clone(), args),
            None => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropping_very_deep_trees() {
        let mut tree = Expr::var("x");
        for _ in 0..200_000 {
            tree = Expr::unary(UnaryKind::Neg, tree);
        }
        drop(tree);

        let mut tree = Expr::number(1.0);
        for i in 0..200_000 {
            tree = Expr::binary(BinaryKind::Add, tree, Expr::number(i as f64)).unwrap();
        }
        drop(tree);
    }

    #[test]
    fn test_drop_keeps_shared_subtrees() {
        let shared = Arc::new(Expr::unary(UnaryKind::Sin, Expr::var("x")));
        let parent = Expr::Binary(
            Binary::new(BinaryKind::Mul, Arc::clone(&shared), Arc::new(Expr::number(2.0))).unwrap(),
        );
        drop(parent);
        assert_eq!(*shared, Expr::unary(UnaryKind::Sin, Expr::var("x")));
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    fn vector(values: &[f64]) -> Expr {
        Expr::variadic(VariadicKind::Vector, values.iter().copied().map(Expr::number)).unwrap()
    }

    #[test]
    fn test_from_args_rejects_wrong_arity() {
        let args = vec![Expr::number(1.0), Expr::number(2.0), Expr::number(3.0)];
        let err = Expr::from_args(NodeKind::Binary(BinaryKind::Add), args).unwrap_err();
        assert!(matches!(
            err,
            ConstructionError::Arity { kind: "add", found: 3, .. }
        ));

        let err = Expr::from_args(NodeKind::Unary(UnaryKind::Sin), vec![]).unwrap_err();
        assert!(matches!(err, ConstructionError::Arity { found: 0, .. }));

        let err = Expr::from_args(
            NodeKind::Variadic(VariadicKind::If),
            vec![Expr::boolean(true)],
        )
        .unwrap_err();
        assert!(matches!(err, ConstructionError::Arity { kind: "if", .. }));
    }

    #[test]
    fn test_from_args_builds_each_shape() {
        let sin = Expr::from_args(NodeKind::Unary(UnaryKind::Sin), vec![Expr::var("x")]).unwrap();
        assert_eq!(sin, Expr::unary(UnaryKind::Sin, Expr::var("x")));

        let add = Expr::from_args(
            NodeKind::Binary(BinaryKind::Add),
            vec![Expr::number(1.0), Expr::number(2.0)],
        )
        .unwrap();
        assert_eq!(add.shape(), Shape::Binary);
        assert_eq!(add.children().len(), 2);

        let avg = Expr::from_args(
            NodeKind::Variadic(VariadicKind::Avg),
            vec![Expr::number(1.0); 5],
        )
        .unwrap();
        assert_eq!(avg.children().len(), 5);
    }

    #[test]
    fn test_assignment_targets() {
        assert!(Expr::binary(BinaryKind::Define, Expr::var("x"), Expr::number(1.0)).is_ok());

        let signature = Expr::call("f", [Expr::var("x"), Expr::var("y")]);
        assert!(Expr::binary(BinaryKind::Define, signature, Expr::var("x")).is_ok());

        let bad_signature = Expr::call("f", [Expr::number(1.0)]);
        assert!(matches!(
            Expr::binary(BinaryKind::Define, bad_signature, Expr::number(1.0)),
            Err(ConstructionError::InvalidAssignmentTarget { kind: "define", .. })
        ));

        let call_target = Expr::call("f", [Expr::var("x")]);
        assert!(matches!(
            Expr::binary(BinaryKind::AddAssign, call_target, Expr::number(1.0)),
            Err(ConstructionError::InvalidAssignmentTarget { kind: "addassign", .. })
        ));
    }

    #[test]
    fn test_derivative_needs_variable() {
        let square = Expr::binary(BinaryKind::Pow, Expr::var("x"), Expr::number(2.0)).unwrap();
        assert!(Expr::binary(BinaryKind::Derivative, square.clone(), Expr::var("x")).is_ok());
        assert_eq!(
            Expr::binary(BinaryKind::Derivative, square, Expr::number(2.0)),
            Err(ConstructionError::InvalidDerivativeVariable)
        );
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let ok = Expr::variadic(VariadicKind::Matrix, [vector(&[1.0, 2.0]), vector(&[3.0, 4.0])]);
        assert!(ok.is_ok());

        let err = Expr::variadic(
            VariadicKind::Matrix,
            [vector(&[1.0, 2.0]), Expr::var("row"), vector(&[3.0])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConstructionError::RaggedMatrix { row: 2, expected: 2, found: 1 }
        );
    }

    #[test]
    fn test_structural_equality_and_sharing() {
        let shared = Arc::new(vector(&[1.0, 2.0]));
        let a = Unary::new(UnaryKind::Transpose, Arc::clone(&shared));
        let b = Unary::new(UnaryKind::Transpose, Arc::new(vector(&[1.0, 2.0])));
        assert_eq!(a, b);

        let same = a.with_arg(None);
        assert!(Arc::ptr_eq(same.arg_shared(), &shared));

        let replaced = a.with_arg(Some(Arc::new(Expr::var("m"))));
        assert_ne!(replaced, a);
        assert_eq!(replaced.kind(), UnaryKind::Transpose);
    }

    #[test]
    fn test_with_operands_revalidates() {
        let node = Binary::new(
            BinaryKind::SubAssign,
            Arc::new(Expr::var("x")),
            Arc::new(Expr::number(1.0)),
        )
        .unwrap();

        let renamed = node.with_operands(None, Some(Arc::new(Expr::number(2.0)))).unwrap();
        assert!(Arc::ptr_eq(renamed.left_shared(), node.left_shared()));
        assert_eq!(renamed.right(), &Expr::number(2.0));

        assert!(node.with_operands(Some(Arc::new(Expr::number(3.0))), None).is_err());
    }

    #[test]
    fn test_loop_variable() {
        let init = Expr::binary(BinaryKind::Define, Expr::var("i"), Expr::number(0.0)).unwrap();
        let cond = Expr::binary(BinaryKind::Lt, Expr::var("i"), Expr::number(10.0)).unwrap();
        let step = Expr::binary(BinaryKind::AddAssign, Expr::var("i"), Expr::number(1.0)).unwrap();
        let body = Expr::var("i");
        let node = Variadic::new(
            VariadicKind::For,
            [init, cond, step, body].into_iter().map(Arc::new).collect(),
        )
        .unwrap();
        assert_eq!(node.loop_variable(), Some("i"));
    }
}
