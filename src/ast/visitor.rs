//! Double-dispatch protocol over expression nodes.
//!
//! A pass implements one method per concrete node kind and a node routes the
//! pass to the method matching its own kind. There are no default methods:
//! adding a kind is a compile error in every pass until it is handled.

use crate::ast::kinds::{BinaryKind, UnaryKind, VariadicKind};
use crate::ast::node::{Angle, Binary, Call, Complex, Expr, Unary, Variadic};

/// Visitor over every node kind.
///
/// `Context` is a read-only value threaded through every call. Passes that
/// need no context use `()` and are entered with [`Expr::accept`]; others
/// are entered with [`Expr::accept_with`].
pub trait ExprVisitor {
    type Output;
    type Context;

    // Leaves
    fn visit_number(&mut self, value: f64, ctx: &Self::Context) -> Self::Output;
    fn visit_string(&mut self, value: &str, ctx: &Self::Context) -> Self::Output;
    fn visit_boolean(&mut self, value: bool, ctx: &Self::Context) -> Self::Output;
    fn visit_angle(&mut self, value: &Angle, ctx: &Self::Context) -> Self::Output;
    fn visit_complex(&mut self, value: &Complex, ctx: &Self::Context) -> Self::Output;
    fn visit_variable(&mut self, name: &str, ctx: &Self::Context) -> Self::Output;
    fn visit_delegate(&mut self, name: &str, ctx: &Self::Context) -> Self::Output;
    fn visit_call(&mut self, call: &Call, ctx: &Self::Context) -> Self::Output;

    // Unary
    fn visit_ceil(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_floor(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_trunc(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_frac(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_neg(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_abs(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_not(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_sin(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_cos(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_tan(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_cot(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_sec(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_csc(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_sinh(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_cosh(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_tanh(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_coth(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_sech(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_csch(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_arcsin(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_arccos(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_arctan(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_arccot(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_arcsec(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_arccsc(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_arsinh(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_arcosh(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_artanh(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_arcoth(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_arsech(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_arcsch(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_fact(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_lb(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_ln(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_to_degree(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_to_radian(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_to_gradian(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_determinant(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_inverse(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_transpose(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_sqrt(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;
    fn visit_simplify(&mut self, node: &Unary, ctx: &Self::Context) -> Self::Output;

    // Binary
    fn visit_add(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_sub(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_mul(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_div(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_mod(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_pow(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_lt(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_le(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_gt(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_ge(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_eq(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_ne(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_and(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_or(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_nand(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_nor(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_implies(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_cond_and(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_cond_or(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_bit_and(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_bit_or(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_bit_xor(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_shl(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_shr(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_dot(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_cross(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_define(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_add_assign(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_sub_assign(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_mul_assign(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_div_assign(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_while(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;
    fn visit_derivative(&mut self, node: &Binary, ctx: &Self::Context) -> Self::Output;

    // Variadic
    fn visit_avg(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_min(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_max(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_count(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_stdev(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_variance(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_sum(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_product(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_gcd(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_lcm(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_round(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_vector(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_matrix(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_if(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
    fn visit_for(&mut self, node: &Variadic, ctx: &Self::Context) -> Self::Output;
}

impl Expr {
    /// Dispatches a context-free pass to this node.
    pub fn accept<V>(&self, visitor: &mut V) -> V::Output
    where
        V: ExprVisitor<Context = ()> + ?Sized,
    {
        self.accept_with(visitor, &())
    }

    /// Dispatches a pass to this node, threading `ctx` into the call.
    pub fn accept_with<V>(&self, visitor: &mut V, ctx: &V::Context) -> V::Output
    where
        V: ExprVisitor + ?Sized,
    {
        match self {
            Expr::Number(value) => visitor.visit_number(*value, ctx),
            Expr::Str(value) => visitor.visit_string(value, ctx),
            Expr::Bool(value) => visitor.visit_boolean(*value, ctx),
            Expr::Angle(value) => visitor.visit_angle(value, ctx),
            Expr::Complex(value) => visitor.visit_complex(value, ctx),
            Expr::Variable(name) => visitor.visit_variable(name, ctx),
            Expr::Delegate(name) => visitor.visit_delegate(name, ctx),
            Expr::Call(call) => visitor.visit_call(call, ctx),
            Expr::Unary(node) => node.accept_with(visitor, ctx),
            Expr::Binary(node) => node.accept_with(visitor, ctx),
            Expr::Variadic(node) => node.accept_with(visitor, ctx),
        }
    }
}

impl Unary {
    pub fn accept_with<V>(&self, visitor: &mut V, ctx: &V::Context) -> V::Output
    where
        V: ExprVisitor + ?Sized,
    {
        match self.kind() {
            UnaryKind::Ceil => visitor.visit_ceil(self, ctx),
            UnaryKind::Floor => visitor.visit_floor(self, ctx),
            UnaryKind::Trunc => visitor.visit_trunc(self, ctx),
            UnaryKind::Frac => visitor.visit_frac(self, ctx),
            UnaryKind::Neg => visitor.visit_neg(self, ctx),
            UnaryKind::Abs => visitor.visit_abs(self, ctx),
            UnaryKind::Not => visitor.visit_not(self, ctx),
            UnaryKind::Sin => visitor.visit_sin(self, ctx),
            UnaryKind::Cos => visitor.visit_cos(self, ctx),
            UnaryKind::Tan => visitor.visit_tan(self, ctx),
            UnaryKind::Cot => visitor.visit_cot(self, ctx),
            UnaryKind::Sec => visitor.visit_sec(self, ctx),
            UnaryKind::Csc => visitor.visit_csc(self, ctx),
            UnaryKind::Sinh => visitor.visit_sinh(self, ctx),
            UnaryKind::Cosh => visitor.visit_cosh(self, ctx),
            UnaryKind::Tanh => visitor.visit_tanh(self, ctx),
            UnaryKind::Coth => visitor.visit_coth(self, ctx),
            UnaryKind::Sech => visitor.visit_sech(self, ctx),
            UnaryKind::Csch => visitor.visit_csch(self, ctx),
            UnaryKind::Arcsin => visitor.visit_arcsin(self, ctx),
            UnaryKind::Arccos => visitor.visit_arccos(self, ctx),
            UnaryKind::Arctan => visitor.visit_arctan(self, ctx),
            UnaryKind::Arccot => visitor.visit_arccot(self, ctx),
            UnaryKind::Arcsec => visitor.visit_arcsec(self, ctx),
            UnaryKind::Arccsc => visitor.visit_arccsc(self, ctx),
            UnaryKind::Arsinh => visitor.visit_arsinh(self, ctx),
            UnaryKind::Arcosh => visitor.visit_arcosh(self, ctx),
            UnaryKind::Artanh => visitor.visit_artanh(self, ctx),
            UnaryKind::Arcoth => visitor.visit_arcoth(self, ctx),
            UnaryKind::Arsech => visitor.visit_arsech(self, ctx),
            UnaryKind::Arcsch => visitor.visit_arcsch(self, ctx),
            UnaryKind::Fact => visitor.visit_fact(self, ctx),
            UnaryKind::Lb => visitor.visit_lb(self, ctx),
            UnaryKind::Ln => visitor.visit_ln(self, ctx),
            UnaryKind::ToDegree => visitor.visit_to_degree(self, ctx),
            UnaryKind::ToRadian => visitor.visit_to_radian(self, ctx),
            UnaryKind::ToGradian => visitor.visit_to_gradian(self, ctx),
            UnaryKind::Determinant => visitor.visit_determinant(self, ctx),
            UnaryKind::Inverse => visitor.visit_inverse(self, ctx),
            UnaryKind::Transpose => visitor.visit_transpose(self, ctx),
            UnaryKind::Sqrt => visitor.visit_sqrt(self, ctx),
            UnaryKind::Simplify => visitor.visit_simplify(self, ctx),
        }
    }
}

impl Binary {
    pub fn accept_with<V>(&self, visitor: &mut V, ctx: &V::Context) -> V::Output
    where
        V: ExprVisitor + ?Sized,
    {
        match self.kind() {
            BinaryKind::Add => visitor.visit_add(self, ctx),
            BinaryKind::Sub => visitor.visit_sub(self, ctx),
            BinaryKind::Mul => visitor.visit_mul(self, ctx),
            BinaryKind::Div => visitor.visit_div(self, ctx),
            BinaryKind::Mod => visitor.visit_mod(self, ctx),
            BinaryKind::Pow => visitor.visit_pow(self, ctx),
            BinaryKind::Lt => visitor.visit_lt(self, ctx),
            BinaryKind::Le => visitor.visit_le(self, ctx),
            BinaryKind::Gt => visitor.visit_gt(self, ctx),
            BinaryKind::Ge => visitor.visit_ge(self, ctx),
            BinaryKind::Eq => visitor.visit_eq(self, ctx),
            BinaryKind::Ne => visitor.visit_ne(self, ctx),
            BinaryKind::And => visitor.visit_and(self, ctx),
            BinaryKind::Or => visitor.visit_or(self, ctx),
            BinaryKind::Nand => visitor.visit_nand(self, ctx),
            BinaryKind::Nor => visitor.visit_nor(self, ctx),
            BinaryKind::Implies => visitor.visit_implies(self, ctx),
            BinaryKind::CondAnd => visitor.visit_cond_and(self, ctx),
            BinaryKind::CondOr => visitor.visit_cond_or(self, ctx),
            BinaryKind::BitAnd => visitor.visit_bit_and(self, ctx),
            BinaryKind::BitOr => visitor.visit_bit_or(self, ctx),
            BinaryKind::BitXor => visitor.visit_bit_xor(self, ctx),
            BinaryKind::Shl => visitor.visit_shl(self, ctx),
            BinaryKind::Shr => visitor.visit_shr(self, ctx),
            BinaryKind::Dot => visitor.visit_dot(self, ctx),
            BinaryKind::Cross => visitor.visit_cross(self, ctx),
            BinaryKind::Define => visitor.visit_define(self, ctx),
            BinaryKind::AddAssign => visitor.visit_add_assign(self, ctx),
            BinaryKind::SubAssign => visitor.visit_sub_assign(self, ctx),
            BinaryKind::MulAssign => visitor.visit_mul_assign(self, ctx),
            BinaryKind::DivAssign => visitor.visit_div_assign(self, ctx),
            BinaryKind::While => visitor.visit_while(self, ctx),
            BinaryKind::Derivative => visitor.visit_derivative(self, ctx),
        }
    }
}

impl Variadic {
    pub fn accept_with<V>(&self, visitor: &mut V, ctx: &V::Context) -> V::Output
    where
        V: ExprVisitor + ?Sized,
    {
        match self.kind() {
            VariadicKind::Avg => visitor.visit_avg(self, ctx),
            VariadicKind::Min => visitor.visit_min(self, ctx),
            VariadicKind::Max => visitor.visit_max(self, ctx),
            VariadicKind::Count => visitor.visit_count(self, ctx),
            VariadicKind::Stdev => visitor.visit_stdev(self, ctx),
            VariadicKind::Variance => visitor.visit_variance(self, ctx),
            VariadicKind::Sum => visitor.visit_sum(self, ctx),
            VariadicKind::Product => visitor.visit_product(self, ctx),
            VariadicKind::Gcd => visitor.visit_gcd(self, ctx),
            VariadicKind::Lcm => visitor.visit_lcm(self, ctx),
            VariadicKind::Round => visitor.visit_round(self, ctx),
            VariadicKind::Vector => visitor.visit_vector(self, ctx),
            VariadicKind::Matrix => visitor.visit_matrix(self, ctx),
            VariadicKind::If => visitor.visit_if(self, ctx),
            VariadicKind::For => visitor.visit_for(self, ctx),
        }
    }
}
