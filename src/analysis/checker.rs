//! The static type analyzer.
//!
//! Maps every node of an expression tree to the category of value it will
//! produce, or raises the first [`TypeMismatch`] found. Children are analyzed
//! left to right before the node's own rule is applied. Deferred forms
//! (variables, delegates, user calls, `sqrt`, `simplify`, `derivative`) are
//! undefined without looking at their operands.

use smallvec::SmallVec;
use tracing::{debug, instrument, warn};

use crate::analysis::rules::{self, Rule};
use crate::ast::node::{Angle, Binary, Call, Complex, Expr, Unary, Variadic};
use crate::ast::visitor::ExprVisitor;
use crate::ast::walker;
use crate::core::types::ResultType;
use crate::errors::{AnalysisError, TypeMismatch};
use crate::frontend::config::AnalysisConfig;

/// Depth limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Stateless result-type analyzer.
///
/// [`analyze`](Self::analyze) is the pure core. [`check`](Self::check) adds
/// the depth guard and logging and is what gating callers should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeAnalyzer {
    max_depth: Option<usize>,
}

impl Default for TypeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeAnalyzer {
    pub fn new() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }

    pub fn with_max_depth(limit: usize) -> Self {
        Self {
            max_depth: Some(limit),
        }
    }

    /// Analyzer without a depth guard; `check` then only adds logging.
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_depth: config.depth_limit(),
        }
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Category of `root`, or the first mismatch in left-to-right order.
    pub fn analyze(&self, root: &Expr) -> Result<ResultType, TypeMismatch> {
        let mut pass = *self;
        root.accept(&mut pass)
    }

    /// Like [`analyze`](Self::analyze), but refuses trees deeper than the
    /// configured limit before recursing into them.
    #[instrument(level = "debug", skip_all, fields(kind = root.kind_name()))]
    pub fn check(&self, root: &Expr) -> Result<ResultType, AnalysisError> {
        if let Some(limit) = self.max_depth {
            let depth = walker::depth(root);
            if depth > limit {
                warn!(depth, limit, "expression too deep for type analysis");
                return Err(AnalysisError::DepthExceeded { depth, limit });
            }
        }

        match self.analyze(root) {
            Ok(result) => {
                debug!(result = %result, "type analysis complete");
                Ok(result)
            }
            Err(mismatch) => {
                debug!(
                    expected = %mismatch.expected,
                    actual = %mismatch.actual,
                    position = ?mismatch.position,
                    "type analysis failed"
                );
                Err(mismatch.into())
            }
        }
    }

    fn unary(&mut self, node: &Unary, rule: fn(ResultType) -> Rule) -> Rule {
        let arg = node.arg().accept(self)?;
        rule(arg)
    }

    fn binary<F>(&mut self, node: &Binary, rule: F) -> Rule
    where
        F: FnOnce(ResultType, ResultType) -> Rule,
    {
        let left = node.left().accept(self)?;
        let right = node.right().accept(self)?;
        rule(left, right)
    }

    fn variadic(&mut self, node: &Variadic, rule: fn(&[ResultType]) -> Rule) -> Rule {
        let args = node
            .args()
            .iter()
            .map(|arg| arg.accept(self))
            .collect::<Result<SmallVec<[ResultType; 4]>, _>>()?;
        rule(&args)
    }
}

/// Analyzes `root` with a default analyzer.
pub fn analyze(root: &Expr) -> Result<ResultType, TypeMismatch> {
    TypeAnalyzer::new().analyze(root)
}

impl ExprVisitor for TypeAnalyzer {
    type Output = Rule;
    type Context = ();

    // Leaves
    fn visit_number(&mut self, _value: f64, _ctx: &()) -> Rule {
        Ok(ResultType::NUMBER)
    }

    fn visit_string(&mut self, _value: &str, _ctx: &()) -> Rule {
        Ok(ResultType::STRING)
    }

    fn visit_boolean(&mut self, _value: bool, _ctx: &()) -> Rule {
        Ok(ResultType::BOOLEAN)
    }

    fn visit_angle(&mut self, _value: &Angle, _ctx: &()) -> Rule {
        Ok(ResultType::ANGLE)
    }

    fn visit_complex(&mut self, _value: &Complex, _ctx: &()) -> Rule {
        Ok(ResultType::COMPLEX)
    }

    fn visit_variable(&mut self, _name: &str, _ctx: &()) -> Rule {
        Ok(ResultType::UNDEFINED)
    }

    fn visit_delegate(&mut self, _name: &str, _ctx: &()) -> Rule {
        Ok(ResultType::UNDEFINED)
    }

    fn visit_call(&mut self, _call: &Call, _ctx: &()) -> Rule {
        Ok(ResultType::UNDEFINED)
    }

    // Unary
    fn visit_ceil(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::rounding)
    }

    fn visit_floor(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::rounding)
    }

    fn visit_trunc(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::rounding)
    }

    fn visit_frac(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::rounding)
    }

    fn visit_neg(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::negation)
    }

    fn visit_abs(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::absolute)
    }

    fn visit_not(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::logical_not)
    }

    fn visit_sin(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_cos(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_tan(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_cot(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_sec(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_csc(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_sinh(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_cosh(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_tanh(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_coth(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_sech(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_csch(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_forward)
    }

    fn visit_arcsin(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_arccos(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_arctan(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_arccot(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_arcsec(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_arccsc(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_arsinh(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_arcosh(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_artanh(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_arcoth(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_arsech(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_arcsch(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::trig_inverse)
    }

    fn visit_fact(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::numeric_only)
    }

    fn visit_lb(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::numeric_only)
    }

    fn visit_ln(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::logarithm)
    }

    fn visit_to_degree(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::angle_conversion)
    }

    fn visit_to_radian(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::angle_conversion)
    }

    fn visit_to_gradian(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::angle_conversion)
    }

    fn visit_determinant(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::determinant)
    }

    fn visit_inverse(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::matrix_to_matrix)
    }

    fn visit_transpose(&mut self, node: &Unary, _ctx: &()) -> Rule {
        self.unary(node, rules::matrix_to_matrix)
    }

    fn visit_sqrt(&mut self, _node: &Unary, _ctx: &()) -> Rule {
        Ok(ResultType::UNDEFINED)
    }

    fn visit_simplify(&mut self, _node: &Unary, _ctx: &()) -> Rule {
        Ok(ResultType::UNDEFINED)
    }

    // Binary
    fn visit_add(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::ADD_SUB, l, r))
    }

    fn visit_sub(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::ADD_SUB, l, r))
    }

    fn visit_mul(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::MUL, l, r))
    }

    fn visit_div(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::DIV, l, r))
    }

    fn visit_mod(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::MODULO, l, r))
    }

    fn visit_pow(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::POWER, l, r))
    }

    fn visit_lt(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::COMPARISON, l, r))
    }

    fn visit_le(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::COMPARISON, l, r))
    }

    fn visit_gt(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::COMPARISON, l, r))
    }

    fn visit_ge(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::COMPARISON, l, r))
    }

    fn visit_eq(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::EQUALITY, l, r))
    }

    fn visit_ne(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::EQUALITY, l, r))
    }

    fn visit_and(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::LOGICAL, l, r))
    }

    fn visit_or(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::LOGICAL, l, r))
    }

    fn visit_nand(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::LOGICAL, l, r))
    }

    fn visit_nor(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::LOGICAL, l, r))
    }

    fn visit_implies(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::LOGICAL, l, r))
    }

    fn visit_cond_and(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::LOGICAL, l, r))
    }

    fn visit_cond_or(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::LOGICAL, l, r))
    }

    fn visit_bit_and(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, rules::bitwise)
    }

    fn visit_bit_or(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, rules::bitwise)
    }

    fn visit_bit_xor(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, rules::bitwise)
    }

    fn visit_shl(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::SHIFT, l, r))
    }

    fn visit_shr(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::SHIFT, l, r))
    }

    fn visit_dot(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::DOT, l, r))
    }

    fn visit_cross(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, |l, r| rules::tabled(&rules::CROSS, l, r))
    }

    fn visit_define(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, rules::assignment)
    }

    fn visit_add_assign(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, rules::assignment)
    }

    fn visit_sub_assign(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, rules::assignment)
    }

    fn visit_mul_assign(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, rules::assignment)
    }

    fn visit_div_assign(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, rules::assignment)
    }

    fn visit_while(&mut self, node: &Binary, _ctx: &()) -> Rule {
        self.binary(node, rules::while_loop)
    }

    fn visit_derivative(&mut self, _node: &Binary, _ctx: &()) -> Rule {
        Ok(ResultType::UNDEFINED)
    }

    // Variadic
    fn visit_avg(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::statistical)
    }

    fn visit_min(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::statistical)
    }

    fn visit_max(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::statistical)
    }

    fn visit_count(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::statistical)
    }

    fn visit_stdev(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::statistical)
    }

    fn visit_variance(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::statistical)
    }

    fn visit_sum(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::statistical)
    }

    fn visit_product(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::statistical)
    }

    fn visit_gcd(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::all_numbers)
    }

    fn visit_lcm(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::all_numbers)
    }

    fn visit_round(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::round)
    }

    fn visit_vector(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::vector_literal)
    }

    fn visit_matrix(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::matrix_literal)
    }

    fn visit_if(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::conditional)
    }

    fn visit_for(&mut self, node: &Variadic, _ctx: &()) -> Rule {
        self.variadic(node, rules::for_loop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::kinds::{BinaryKind, UnaryKind};

    fn neg_chain(depth: usize) -> Expr {
        let mut tree = Expr::number(1.0);
        for _ in 1..depth {
            tree = Expr::unary(UnaryKind::Neg, tree);
        }
        tree
    }

    #[test]
    fn test_depth_guard() {
        let tree = neg_chain(10);
        assert_eq!(TypeAnalyzer::with_max_depth(10).check(&tree), Ok(ResultType::NUMBER));
        assert_eq!(
            TypeAnalyzer::with_max_depth(9).check(&tree),
            Err(AnalysisError::DepthExceeded { depth: 10, limit: 9 })
        );
        assert_eq!(TypeAnalyzer::unbounded().check(&tree), Ok(ResultType::NUMBER));
        // The pure core ignores the limit.
        assert_eq!(TypeAnalyzer::with_max_depth(1).analyze(&tree), Ok(ResultType::NUMBER));
    }

    #[test]
    fn test_rejected_deep_tree_can_be_dropped() {
        let tree = neg_chain(200_000);
        assert!(matches!(
            TypeAnalyzer::new().check(&tree),
            Err(AnalysisError::DepthExceeded { depth: 200_000, .. })
        ));
        drop(tree);
    }

    #[test]
    fn test_check_wraps_mismatch() {
        let tree = Expr::binary(BinaryKind::Mod, Expr::boolean(true), Expr::number(1.0)).unwrap();
        let err = TypeAnalyzer::new().check(&tree).unwrap_err();
        let mismatch = err.as_mismatch().unwrap();
        assert_eq!(mismatch.actual, ResultType::BOOLEAN);
        assert_eq!(mismatch.expected, ResultType::NUMBER);
    }

    #[test]
    fn test_from_config() {
        let mut config = AnalysisConfig::default();
        assert_eq!(TypeAnalyzer::from_config(&config), TypeAnalyzer::new());

        config.max_depth = 0;
        assert_eq!(TypeAnalyzer::from_config(&config).max_depth(), None);
    }

    #[test]
    fn test_deferred_nodes_skip_operands() {
        // A mistyped operand under a deferred node is not visited.
        let bad = Expr::unary(UnaryKind::Not, Expr::number(1.0));
        assert!(analyze(&bad).is_err());
        assert_eq!(
            analyze(&Expr::unary(UnaryKind::Sqrt, bad.clone())),
            Ok(ResultType::UNDEFINED)
        );
        assert_eq!(
            analyze(&Expr::binary(BinaryKind::Derivative, bad, Expr::var("x")).unwrap()),
            Ok(ResultType::UNDEFINED)
        );
    }
}
