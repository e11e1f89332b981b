//! Simplification - bottom-up constant folding and identity removal
//!
//! Scalar operators with constant operands are evaluated eagerly; additive and
//! multiplicative identities, products with zero and powers 0 and 1 collapse.
//! With a binding table, bound parameters fold into constants first.

use std::sync::Arc;

use crate::ast::{Expr, ExprKind, Scalar, ScalarBinaryOp, ScalarKind, ScalarUnaryOp};
use crate::evaluate::{Parameters, powi};

/// Simplify a tree, leaving every parameter symbolic
pub fn simplify_expr(expr: &Expr) -> Expr {
    Simplifier::new().simplify(expr)
}

/// Simplification engine, optionally with parameter bindings
#[derive(Debug, Clone, Copy, Default)]
pub struct Simplifier<'a> {
    bindings: Option<&'a Parameters>,
}

impl<'a> Simplifier<'a> {
    pub fn new() -> Self {
        Self { bindings: None }
    }

    /// Fold bound parameters into constants
    pub fn with_bindings(mut self, bindings: &'a Parameters) -> Self {
        self.bindings = Some(bindings);
        self
    }

    pub fn simplify(&self, expr: &Expr) -> Expr {
        let out = match &expr.kind {
            ExprKind::Var(_) => return expr.clone(),
            ExprKind::Scalar(s) => Expr::scalar(self.simplify_scalar(s)),
            ExprKind::Add(a, b) => {
                let (a, b) = (self.simplify(a), self.simplify(b));
                match (a.as_constant(), b.as_constant()) {
                    (Some(x), Some(y)) => Expr::constant(x + y),
                    (Some(x), _) if x == 0.0 => b,
                    (_, Some(y)) if y == 0.0 => a,
                    _ => Expr::add_expr(a, b),
                }
            }
            ExprKind::Sub(a, b) => {
                let (a, b) = (self.simplify(a), self.simplify(b));
                match (a.as_constant(), b.as_constant()) {
                    (Some(x), Some(y)) => Expr::constant(x - y),
                    (_, Some(y)) if y == 0.0 => a,
                    (Some(x), _) if x == 0.0 => negate(b),
                    _ => Expr::sub_expr(a, b),
                }
            }
            ExprKind::Mul(a, b) => {
                let (a, b) = (self.simplify(a), self.simplify(b));
                match (a.as_constant(), b.as_constant()) {
                    (Some(x), Some(y)) => Expr::constant(x * y),
                    (Some(x), _) | (_, Some(x)) if x == 0.0 => Expr::constant(0.0),
                    (Some(x), _) if x == 1.0 => b,
                    (_, Some(y)) if y == 1.0 => a,
                    _ => Expr::mul_expr(a, b),
                }
            }
            ExprKind::Pow(base, n) => {
                let base = self.simplify(base);
                match (*n, base.as_constant()) {
                    (0, _) => Expr::constant(1.0),
                    (1, _) => base,
                    (n, Some(c)) => Expr::constant(powi(c, n)),
                    (n, None) => Expr::pow(base, n),
                }
            }
            ExprKind::Neg(a) => negate(self.simplify(a)),
            ExprKind::DivByScalar(a, d) => {
                let a = self.simplify(a);
                let d = self.simplify_scalar(d);
                match (a.as_constant(), d.as_constant()) {
                    (Some(x), Some(y)) => Expr::constant(x / y),
                    (_, Some(y)) if y == 1.0 => a,
                    _ => Expr::div_by_scalar(a, d),
                }
            }
        };
        keep_parentheses(out, expr.parentheses)
    }

    pub fn simplify_scalar(&self, s: &Scalar) -> Scalar {
        let mut out = match &s.kind {
            ScalarKind::Constant(_) => return s.clone(),
            ScalarKind::Param(name) => match self.bindings.and_then(|b| b.get(name)) {
                Some(value) => Scalar::constant(*value),
                None => return s.clone(),
            },
            ScalarKind::Unary(op, a) => {
                let a = self.simplify_scalar(a);
                match (op, &a.kind) {
                    (_, ScalarKind::Constant(c)) => Scalar::constant(op.apply(*c)),
                    (ScalarUnaryOp::Neg, ScalarKind::Unary(ScalarUnaryOp::Neg, inner)) => {
                        inner.as_ref().clone()
                    }
                    _ => Scalar::unary(*op, a),
                }
            }
            ScalarKind::Binary(op, a, b) => {
                let a = self.simplify_scalar(a);
                let b = self.simplify_scalar(b);
                simplify_binary(*op, a, b)
            }
        };
        out.parentheses = out.parentheses.max(s.parentheses);
        out
    }
}

fn simplify_binary(op: ScalarBinaryOp, a: Scalar, b: Scalar) -> Scalar {
    use ScalarBinaryOp::*;

    let (x, y) = (a.as_constant(), b.as_constant());
    if let (Some(x), Some(y)) = (x, y) {
        return Scalar::constant(op.apply(x, y));
    }
    match (op, x, y) {
        (Add, Some(z), _) if z == 0.0 => b,
        (Add | Sub, _, Some(z)) if z == 0.0 => a,
        (Sub, Some(z), _) if z == 0.0 => Scalar::unary(ScalarUnaryOp::Neg, b),
        (Mul, Some(z), _) | (Mul, _, Some(z)) if z == 0.0 => Scalar::constant(0.0),
        (Mul, Some(o), _) if o == 1.0 => b,
        (Mul | Div, _, Some(o)) if o == 1.0 => a,
        (Pow, _, Some(e)) if e == 0.0 => Scalar::constant(1.0),
        (Pow, _, Some(e)) if e == 1.0 => a,
        _ => Scalar::new(ScalarKind::Binary(op, Arc::new(a), Arc::new(b))),
    }
}

fn negate(e: Expr) -> Expr {
    if let Some(c) = e.as_constant() {
        return Expr::constant(-c);
    }
    match &e.kind {
        ExprKind::Neg(inner) => inner.as_ref().clone(),
        _ => Expr::neg_expr(e),
    }
}

fn keep_parentheses(mut e: Expr, parentheses: u8) -> Expr {
    e.parentheses = e.parentheses.max(parentheses);
    e
}
