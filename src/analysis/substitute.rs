//! Binding free variables to replacement expressions.
//!
//! The rewrite builds new parents only along paths that contain a
//! replacement; every untouched subtree is shared with the input tree.
//! Binders (`derivative`, `for`, function definitions) are honored through
//! the dispatch context, and assignment keys are never rewritten.

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::debug;

use crate::ast::node::{Angle, Args, Binary, Call, Complex, Expr, Unary, Variadic};
use crate::ast::visitor::ExprVisitor;
use crate::ast::walker;
use crate::errors::ConstructionError;

/// Replacement expressions keyed by variable name.
pub type Bindings = HashMap<String, Arc<Expr>>;

/// `Ok(None)` means the subtree is unchanged.
type Rewrite = Result<Option<Arc<Expr>>, ConstructionError>;

/// Names bound by enclosing binders at the current position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    bound: SmallVec<[String; 4]>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bound.iter().any(|bound| bound == name)
    }

    /// This scope plus `names`.
    pub fn extended<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut scope = self.clone();
        scope.bound.extend(names.into_iter().map(str::to_string));
        scope
    }
}

pub struct Substituter<'a> {
    bindings: &'a Bindings,
    replaced: usize,
}

impl<'a> Substituter<'a> {
    pub fn new(bindings: &'a Bindings) -> Self {
        Self {
            bindings,
            replaced: 0,
        }
    }

    /// Number of variable occurrences replaced so far.
    pub fn replaced(&self) -> usize {
        self.replaced
    }

    pub fn apply(&mut self, root: &Arc<Expr>) -> Result<Arc<Expr>, ConstructionError> {
        let rewritten = root.accept_with(self, &Scope::new())?;
        debug!(replaced = self.replaced, "substitution complete");
        Ok(rewritten.unwrap_or_else(|| Arc::clone(root)))
    }

    fn unary(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        Ok(node
            .arg()
            .accept_with(self, ctx)?
            .map(|arg| Arc::new(Expr::Unary(node.with_arg(Some(arg))))))
    }

    fn binary(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        let mut operands: [Option<Arc<Expr>>; 2] = [None, None];
        for (index, child) in [node.left(), node.right()].into_iter().enumerate() {
            if walker::is_binary_target(node, index) {
                continue;
            }
            let bound = walker::binary_binders(node, index);
            operands[index] = if bound.is_empty() {
                child.accept_with(self, ctx)?
            } else {
                child.accept_with(self, &ctx.extended(bound))?
            };
        }

        match operands {
            [None, None] => Ok(None),
            [left, right] => Ok(Some(Arc::new(Expr::Binary(node.with_operands(left, right)?)))),
        }
    }

    fn variadic(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        let mut changed = false;
        let mut args = Args::new();
        for (index, child) in node.args().iter().enumerate() {
            let bound = walker::variadic_binders(node, index);
            let rewritten = if bound.is_empty() {
                child.accept_with(self, ctx)?
            } else {
                child.accept_with(self, &ctx.extended(bound))?
            };
            changed |= rewritten.is_some();
            args.push(rewritten.unwrap_or_else(|| Arc::clone(child)));
        }

        if !changed {
            return Ok(None);
        }
        Ok(Some(Arc::new(Expr::Variadic(node.with_args(Some(args))?))))
    }
}

/// Replaces the free variables of `root` named in `bindings`.
pub fn substitute(root: &Arc<Expr>, bindings: &Bindings) -> Result<Arc<Expr>, ConstructionError> {
    Substituter::new(bindings).apply(root)
}

impl ExprVisitor for Substituter<'_> {
    type Output = Rewrite;
    type Context = Scope;

    // Leaves
    fn visit_number(&mut self, _value: f64, _ctx: &Scope) -> Rewrite {
        Ok(None)
    }

    fn visit_string(&mut self, _value: &str, _ctx: &Scope) -> Rewrite {
        Ok(None)
    }

    fn visit_boolean(&mut self, _value: bool, _ctx: &Scope) -> Rewrite {
        Ok(None)
    }

    fn visit_angle(&mut self, _value: &Angle, _ctx: &Scope) -> Rewrite {
        Ok(None)
    }

    fn visit_complex(&mut self, _value: &Complex, _ctx: &Scope) -> Rewrite {
        Ok(None)
    }

    fn visit_variable(&mut self, name: &str, ctx: &Scope) -> Rewrite {
        if ctx.is_bound(name) {
            return Ok(None);
        }
        let replacement = self.bindings.get(name).cloned();
        if replacement.is_some() {
            self.replaced += 1;
        }
        Ok(replacement)
    }

    fn visit_delegate(&mut self, _name: &str, _ctx: &Scope) -> Rewrite {
        Ok(None)
    }

    fn visit_call(&mut self, call: &Call, ctx: &Scope) -> Rewrite {
        let mut changed = false;
        let mut args = Args::new();
        for child in call.args() {
            let rewritten = child.accept_with(self, ctx)?;
            changed |= rewritten.is_some();
            args.push(rewritten.unwrap_or_else(|| Arc::clone(child)));
        }

        if !changed {
            return Ok(None);
        }
        Ok(Some(Arc::new(Expr::Call(call.with_args(Some(args))))))
    }

    // Unary
    fn visit_ceil(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_floor(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_trunc(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_frac(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_neg(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_abs(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_not(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_sin(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_cos(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_tan(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_cot(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_sec(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_csc(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_sinh(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_cosh(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_tanh(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_coth(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_sech(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_csch(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_arcsin(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_arccos(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_arctan(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_arccot(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_arcsec(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_arccsc(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_arsinh(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_arcosh(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_artanh(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_arcoth(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_arsech(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_arcsch(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_fact(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_lb(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_ln(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_to_degree(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_to_radian(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_to_gradian(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_determinant(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_inverse(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_transpose(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_sqrt(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    fn visit_simplify(&mut self, node: &Unary, ctx: &Scope) -> Rewrite {
        self.unary(node, ctx)
    }

    // Binary
    fn visit_add(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_sub(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_mul(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_div(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_mod(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_pow(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_lt(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_le(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_gt(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_ge(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_eq(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_ne(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_and(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_or(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_nand(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_nor(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_implies(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_cond_and(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_cond_or(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_bit_and(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_bit_or(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_bit_xor(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_shl(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_shr(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_dot(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_cross(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_define(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_add_assign(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_sub_assign(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_mul_assign(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_div_assign(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_while(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    fn visit_derivative(&mut self, node: &Binary, ctx: &Scope) -> Rewrite {
        self.binary(node, ctx)
    }

    // Variadic
    fn visit_avg(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_min(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_max(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_count(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_stdev(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_variance(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_sum(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_product(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_gcd(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_lcm(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_round(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_vector(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_matrix(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_if(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }

    fn visit_for(&mut self, node: &Variadic, ctx: &Scope) -> Rewrite {
        self.variadic(node, ctx)
    }
}
