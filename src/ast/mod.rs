//! Expression tree model
//!
//! This module provides the node kinds, the immutable tree, the dispatch
//! protocol passes plug into, and stack-based structural walks.

pub mod kinds;
pub mod node;
pub mod visitor;
pub mod walker;

pub use kinds::{Arity, BinaryKind, NodeKind, UnaryKind, VariadicKind};
pub use node::{Angle, AngleUnit, Args, Binary, Call, Complex, Expr, Shape, Unary, Variadic};
pub use visitor::ExprVisitor;
