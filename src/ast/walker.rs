//! Structural traversals that do not go through the dispatch protocol.
//!
//! These walk `Expr::children` with an explicit stack, so they are safe to
//! run on trees too deep for the recursive passes. `depth` is what callers
//! use to enforce a limit before handing a tree to the analyzer.

use std::collections::BTreeSet;

use smallvec::SmallVec;

use crate::ast::kinds::{BinaryKind, VariadicKind};
use crate::ast::node::{Binary, Expr, Variadic};

/// Names bound for the children of a node, as seen from child `index`.
pub type Bound<'a> = SmallVec<[&'a str; 2]>;

/// Number of nodes on the longest root-to-leaf path.
pub fn depth(root: &Expr) -> usize {
    let mut max = 0;
    let mut stack = vec![(root, 1usize)];
    while let Some((node, level)) = stack.pop() {
        max = max.max(level);
        for child in node.children() {
            stack.push((&**child, level + 1));
        }
    }
    max
}

/// Total number of nodes in the tree, shared subtrees counted once per use.
pub fn node_count(root: &Expr) -> usize {
    let mut count = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.children().iter().map(|child| &**child));
    }
    count
}

/// Names introduced by `parent` that are in scope inside child `index`.
///
/// - `derivative(e, x)` binds `x` inside `e`
/// - `for(i := a, cond, step, body)` binds `i` in `cond`, `step` and `body`
/// - `f(x, y) := body` binds `x` and `y` in `body`
pub fn binders(parent: &Expr, index: usize) -> Bound<'_> {
    match parent {
        Expr::Binary(node) => binary_binders(node, index),
        Expr::Variadic(node) => variadic_binders(node, index),
        _ => Bound::new(),
    }
}

pub fn binary_binders(node: &Binary, index: usize) -> Bound<'_> {
    let mut bound = Bound::new();
    match node.kind() {
        BinaryKind::Derivative if index == 0 => {
            bound.extend(node.right().as_variable());
        }
        BinaryKind::Define if index == 1 => {
            if let Expr::Call(signature) = node.left() {
                bound.extend(signature.args().iter().filter_map(|arg| arg.as_variable()));
            }
        }
        _ => {}
    }
    bound
}

pub fn variadic_binders(node: &Variadic, index: usize) -> Bound<'_> {
    let mut bound = Bound::new();
    if node.kind() == VariadicKind::For && index > 0 {
        bound.extend(node.loop_variable());
    }
    bound
}

/// True when child `index` of `parent` names something rather than reading
/// it: assignment keys and the variable of a derivative.
pub fn is_target(parent: &Expr, index: usize) -> bool {
    match parent {
        Expr::Binary(node) => is_binary_target(node, index),
        _ => false,
    }
}

pub fn is_binary_target(node: &Binary, index: usize) -> bool {
    match node.kind() {
        BinaryKind::Derivative => index == 1,
        BinaryKind::Define => index == 0,
        kind => kind.is_compound_assignment() && index == 0,
    }
}

/// Variables read somewhere in the tree and not bound by an enclosing binder.
pub fn free_variables(root: &Expr) -> BTreeSet<String> {
    let mut free = BTreeSet::new();
    let mut stack: Vec<(&Expr, Bound<'_>)> = vec![(root, Bound::new())];

    while let Some((node, bound)) = stack.pop() {
        if let Some(name) = node.as_variable() {
            if !bound.contains(&name) {
                free.insert(name.to_string());
            }
            continue;
        }

        for (index, child) in node.children().iter().enumerate() {
            if is_target(node, index) {
                continue;
            }
            let mut scope = bound.clone();
            scope.extend(binders(node, index));
            stack.push((&**child, scope));
        }
    }

    free
}
