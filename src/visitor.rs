//! Expression visitor pattern for AST traversal
//!
//! Provides a clean interface for walking both layers of the tree without
//! manually handling the recursive structure. Transforms that build new trees
//! pattern-match directly; read-only analyses are written as visitors.

use crate::ast::{Expr, ExprKind, Scalar, ScalarKind, Var};

/// Trait for visiting expression nodes
///
/// Leaf methods have empty defaults. The interior methods return true to
/// continue into the node's children.
///
/// # Example
/// ```
/// use algesurf::{parse, Var};
/// use algesurf::visitor::{ExprVisitor, walk_expr};
///
/// struct VarCounter { count: usize }
///
/// impl ExprVisitor for VarCounter {
///     fn visit_variable(&mut self, _v: Var) { self.count += 1; }
/// }
///
/// let mut counter = VarCounter { count: 0 };
/// walk_expr(&parse("x*y+x^2").unwrap(), &mut counter);
/// assert_eq!(counter.count, 3);
/// ```
pub trait ExprVisitor {
    fn visit_variable(&mut self, _v: Var) {}

    fn visit_constant(&mut self, _c: f64) {}

    fn visit_param(&mut self, _name: &str) {}

    /// Visit an interior polynomial-layer node
    fn visit_poly_node(&mut self, _expr: &Expr) -> bool {
        true
    }

    /// Visit an interior scalar-layer node
    fn visit_scalar_node(&mut self, _scalar: &Scalar) -> bool {
        true
    }
}

/// Walk an expression tree with a visitor, parents before children
pub fn walk_expr<V: ExprVisitor + ?Sized>(expr: &Expr, visitor: &mut V) {
    match &expr.kind {
        ExprKind::Var(v) => visitor.visit_variable(*v),
        ExprKind::Scalar(s) => walk_scalar(s, visitor),
        ExprKind::Add(l, r) | ExprKind::Sub(l, r) | ExprKind::Mul(l, r) => {
            if visitor.visit_poly_node(expr) {
                walk_expr(l, visitor);
                walk_expr(r, visitor);
            }
        }
        ExprKind::Pow(b, _) | ExprKind::Neg(b) => {
            if visitor.visit_poly_node(expr) {
                walk_expr(b, visitor);
            }
        }
        ExprKind::DivByScalar(a, d) => {
            if visitor.visit_poly_node(expr) {
                walk_expr(a, visitor);
                walk_scalar(d, visitor);
            }
        }
    }
}

/// Walk a scalar subtree with a visitor, parents before children
pub fn walk_scalar<V: ExprVisitor + ?Sized>(scalar: &Scalar, visitor: &mut V) {
    match &scalar.kind {
        ScalarKind::Constant(c) => visitor.visit_constant(*c),
        ScalarKind::Param(name) => visitor.visit_param(name),
        ScalarKind::Unary(_, a) => {
            if visitor.visit_scalar_node(scalar) {
                walk_scalar(a, visitor);
            }
        }
        ScalarKind::Binary(_, a, b) => {
            if visitor.visit_scalar_node(scalar) {
                walk_scalar(a, visitor);
                walk_scalar(b, visitor);
            }
        }
    }
}
