//! Name-based node construction, as used by parsers.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::ast::kinds::NodeKind;
use crate::ast::node::Expr;
use crate::errors::ConstructionError;

static KINDS: Lazy<HashMap<&'static str, NodeKind>> =
    Lazy::new(|| NodeKind::all().map(|kind| (kind.name(), kind)).collect());

/// Node kind registered under `name`, ignoring ASCII case.
pub fn lookup(name: &str) -> Option<NodeKind> {
    KINDS
        .get(name)
        .or_else(|| KINDS.get(name.to_ascii_lowercase().as_str()))
        .copied()
}

/// Builds the node named `name` over `args`.
///
/// Names that are not built-in kinds become user-function calls.
pub fn call(name: &str, args: Vec<Expr>) -> Result<Expr, ConstructionError> {
    match lookup(name) {
        Some(kind) => Expr::from_args(kind, args),
        None => Ok(Expr::call(name, args)),
    }
}
