//! Abstract Syntax Tree for surface expressions
//!
//! Two layers share the tree:
//! - the polynomial layer ([`Expr`]) over the variables x, y, z
//! - the scalar layer ([`Scalar`]) over constants and named parameters
//!
//! A polynomial node may hold a scalar subtree as a leaf, never the other way round.
//! The split is enforced by the types: [`ScalarKind`] has no way to reference an [`Expr`].

use std::fmt;
use std::ops::{Add, Deref, Mul, Neg, Sub};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::SurfError;

/// Global counter for expression IDs
static EXPR_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_id() -> u64 {
    EXPR_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// One of the three surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Var {
    X,
    Y,
    Z,
}

impl Var {
    pub const ALL: [Var; 3] = [Var::X, Var::Y, Var::Z];

    pub fn name(self) -> &'static str {
        match self {
            Var::X => "x",
            Var::Y => "y",
            Var::Z => "z",
        }
    }

    pub fn from_name(name: &str) -> Option<Var> {
        match name {
            "x" => Some(Var::X),
            "y" => Some(Var::Y),
            "z" => Some(Var::Z),
            _ => None,
        }
    }

    /// Position in an exponent triple
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Var::X => 0,
            Var::Y => 1,
            Var::Z => 2,
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary operators of the scalar layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Atan2,
}

impl ScalarBinaryOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ScalarBinaryOp::Add => a + b,
            ScalarBinaryOp::Sub => a - b,
            ScalarBinaryOp::Mul => a * b,
            ScalarBinaryOp::Div => a / b,
            ScalarBinaryOp::Pow => a.powf(b),
            ScalarBinaryOp::Atan2 => a.atan2(b),
        }
    }
}

/// Unary operators of the scalar layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarUnaryOp {
    Neg,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Log,
    Sqrt,
    Ceil,
    Floor,
    Abs,
    Sign,
}

impl ScalarUnaryOp {
    /// All operators written in function-call form
    pub const FUNCTIONS: [ScalarUnaryOp; 13] = [
        ScalarUnaryOp::Sin,
        ScalarUnaryOp::Cos,
        ScalarUnaryOp::Tan,
        ScalarUnaryOp::Asin,
        ScalarUnaryOp::Acos,
        ScalarUnaryOp::Atan,
        ScalarUnaryOp::Exp,
        ScalarUnaryOp::Log,
        ScalarUnaryOp::Sqrt,
        ScalarUnaryOp::Ceil,
        ScalarUnaryOp::Floor,
        ScalarUnaryOp::Abs,
        ScalarUnaryOp::Sign,
    ];

    pub fn apply(self, a: f64) -> f64 {
        match self {
            ScalarUnaryOp::Neg => -a,
            ScalarUnaryOp::Sin => a.sin(),
            ScalarUnaryOp::Cos => a.cos(),
            ScalarUnaryOp::Tan => a.tan(),
            ScalarUnaryOp::Asin => a.asin(),
            ScalarUnaryOp::Acos => a.acos(),
            ScalarUnaryOp::Atan => a.atan(),
            ScalarUnaryOp::Exp => a.exp(),
            ScalarUnaryOp::Log => a.ln(),
            ScalarUnaryOp::Sqrt => a.sqrt(),
            ScalarUnaryOp::Ceil => a.ceil(),
            ScalarUnaryOp::Floor => a.floor(),
            ScalarUnaryOp::Abs => a.abs(),
            // signum(0) is 0 here, unlike f64::signum
            ScalarUnaryOp::Sign => {
                if a == 0.0 || a.is_nan() {
                    a
                } else {
                    a.signum()
                }
            }
        }
    }

    /// Function name as written in source text (`-` for negation)
    pub fn name(self) -> &'static str {
        match self {
            ScalarUnaryOp::Neg => "-",
            ScalarUnaryOp::Sin => "sin",
            ScalarUnaryOp::Cos => "cos",
            ScalarUnaryOp::Tan => "tan",
            ScalarUnaryOp::Asin => "asin",
            ScalarUnaryOp::Acos => "acos",
            ScalarUnaryOp::Atan => "atan",
            ScalarUnaryOp::Exp => "exp",
            ScalarUnaryOp::Log => "log",
            ScalarUnaryOp::Sqrt => "sqrt",
            ScalarUnaryOp::Ceil => "ceil",
            ScalarUnaryOp::Floor => "floor",
            ScalarUnaryOp::Abs => "abs",
            ScalarUnaryOp::Sign => "sign",
        }
    }

    pub fn from_name(name: &str) -> Option<ScalarUnaryOp> {
        Self::FUNCTIONS.iter().copied().find(|op| op.name() == name)
    }
}

/// Scalar-layer node: evaluates to a number once parameters are bound
#[derive(Debug, Clone)]
pub struct Scalar {
    pub kind: ScalarKind,
    /// Pairs of parentheses written around this node in the source text
    pub parentheses: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarKind {
    Constant(f64),
    Param(String),
    Binary(ScalarBinaryOp, Arc<Scalar>, Arc<Scalar>),
    Unary(ScalarUnaryOp, Arc<Scalar>),
}

impl Deref for Scalar {
    type Target = ScalarKind;

    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Scalar {
    pub fn new(kind: ScalarKind) -> Self {
        Scalar {
            kind,
            parentheses: 0,
        }
    }

    pub fn constant(value: f64) -> Self {
        Scalar::new(ScalarKind::Constant(value))
    }

    pub fn param(name: impl Into<String>) -> Self {
        Scalar::new(ScalarKind::Param(name.into()))
    }

    pub fn binary(op: ScalarBinaryOp, left: Scalar, right: Scalar) -> Self {
        Scalar::new(ScalarKind::Binary(op, Arc::new(left), Arc::new(right)))
    }

    pub fn unary(op: ScalarUnaryOp, operand: Scalar) -> Self {
        Scalar::new(ScalarKind::Unary(op, Arc::new(operand)))
    }

    /// Wrap this node in one more pair of source parentheses
    pub fn parenthesized(mut self) -> Self {
        self.parentheses = self.parentheses.saturating_add(1);
        self
    }

    pub fn as_constant(&self) -> Option<f64> {
        match &self.kind {
            ScalarKind::Constant(c) => Some(*c),
            _ => None,
        }
    }

    pub fn node_count(&self) -> usize {
        match &self.kind {
            ScalarKind::Constant(_) | ScalarKind::Param(_) => 1,
            ScalarKind::Binary(_, l, r) => 1 + l.node_count() + r.node_count(),
            ScalarKind::Unary(_, a) => 1 + a.node_count(),
        }
    }
}

/// Polynomial-layer node
#[derive(Debug, Clone)]
pub struct Expr {
    /// Unique ID for debugging (not used in equality comparisons)
    pub id: u64,
    pub kind: ExprKind,
    /// Pairs of parentheses written around this node in the source text
    pub parentheses: u8,
    /// Exponent of a `Pow` node as it was written, before folding
    pub written_exponent: Option<Arc<Scalar>>,
}

impl Deref for Expr {
    type Target = ExprKind;

    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

// Structural equality: ids, parentheses and written exponents are cosmetic
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Add(Arc<Expr>, Arc<Expr>),
    Sub(Arc<Expr>, Arc<Expr>),
    Mul(Arc<Expr>, Arc<Expr>),
    /// Power with a non-negative integer exponent
    Pow(Arc<Expr>, u32),
    Neg(Arc<Expr>),
    /// Division by a variable-free divisor
    DivByScalar(Arc<Expr>, Arc<Scalar>),
    Var(Var),
    /// Scalar subtree embedded as a leaf
    Scalar(Arc<Scalar>),
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr {
            id: next_id(),
            kind,
            parentheses: 0,
            written_exponent: None,
        }
    }

    pub fn var(v: Var) -> Self {
        Expr::new(ExprKind::Var(v))
    }

    pub fn x() -> Self {
        Expr::var(Var::X)
    }

    pub fn y() -> Self {
        Expr::var(Var::Y)
    }

    pub fn z() -> Self {
        Expr::var(Var::Z)
    }

    pub fn scalar(s: Scalar) -> Self {
        Expr::new(ExprKind::Scalar(Arc::new(s)))
    }

    pub fn constant(value: f64) -> Self {
        Expr::scalar(Scalar::constant(value))
    }

    pub fn param(name: impl Into<String>) -> Self {
        Expr::scalar(Scalar::param(name))
    }

    pub fn add_expr(left: Expr, right: Expr) -> Self {
        Expr::new(ExprKind::Add(Arc::new(left), Arc::new(right)))
    }

    pub fn sub_expr(left: Expr, right: Expr) -> Self {
        Expr::new(ExprKind::Sub(Arc::new(left), Arc::new(right)))
    }

    pub fn mul_expr(left: Expr, right: Expr) -> Self {
        Expr::new(ExprKind::Mul(Arc::new(left), Arc::new(right)))
    }

    pub fn neg_expr(operand: Expr) -> Self {
        Expr::new(ExprKind::Neg(Arc::new(operand)))
    }

    pub fn pow(base: Expr, exponent: u32) -> Self {
        Expr::new(ExprKind::Pow(Arc::new(base), exponent))
    }

    /// Power with an exponent of unchecked sign
    pub fn pow_checked(base: Expr, exponent: i64) -> Result<Self, SurfError> {
        let exp = u32::try_from(exponent).map_err(|_| {
            SurfError::malformed(format!("power exponent {exponent} is not a non-negative integer"))
        })?;
        Ok(Expr::pow(base, exp))
    }

    pub fn div_by_scalar(dividend: Expr, divisor: Scalar) -> Self {
        Expr::new(ExprKind::DivByScalar(Arc::new(dividend), Arc::new(divisor)))
    }

    /// Division whose divisor must reduce to a scalar
    pub fn div_expr(dividend: Expr, divisor: Expr) -> Result<Self, SurfError> {
        let scalar = divisor.to_scalar().ok_or_else(|| {
            SurfError::malformed(format!("divisor '{divisor}' depends on x, y or z"))
        })?;
        Ok(Expr::div_by_scalar(dividend, scalar))
    }

    /// Wrap this node in one more pair of source parentheses
    pub fn parenthesized(mut self) -> Self {
        self.parentheses = self.parentheses.saturating_add(1);
        self
    }

    /// Keep the source form of a folded exponent for printing
    pub fn with_written_exponent(mut self, exponent: Scalar) -> Self {
        if matches!(self.kind, ExprKind::Pow(..)) {
            self.written_exponent = Some(Arc::new(exponent));
        }
        self
    }

    /// Scalar leaf, if this node is one
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.kind {
            ExprKind::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<f64> {
        self.as_scalar().and_then(Scalar::as_constant)
    }

    #[inline]
    pub fn is_zero_num(&self) -> bool {
        self.as_constant() == Some(0.0)
    }

    #[inline]
    pub fn is_one_num(&self) -> bool {
        self.as_constant() == Some(1.0)
    }

    /// True if none of x, y, z occurs in the tree
    pub fn is_variable_free(&self) -> bool {
        match &self.kind {
            ExprKind::Var(_) => false,
            ExprKind::Scalar(_) => true,
            ExprKind::Add(l, r) | ExprKind::Sub(l, r) | ExprKind::Mul(l, r) => {
                l.is_variable_free() && r.is_variable_free()
            }
            ExprKind::Pow(b, _) | ExprKind::Neg(b) | ExprKind::DivByScalar(b, _) => {
                b.is_variable_free()
            }
        }
    }

    /// Rewrite a variable-free tree into the scalar layer
    pub fn to_scalar(&self) -> Option<Scalar> {
        let kind = match &self.kind {
            ExprKind::Var(_) => return None,
            ExprKind::Scalar(s) => {
                let mut s = s.as_ref().clone();
                s.parentheses = s.parentheses.saturating_add(self.parentheses);
                return Some(s);
            }
            ExprKind::Add(l, r) => binary_kind(ScalarBinaryOp::Add, l, r)?,
            ExprKind::Sub(l, r) => binary_kind(ScalarBinaryOp::Sub, l, r)?,
            ExprKind::Mul(l, r) => binary_kind(ScalarBinaryOp::Mul, l, r)?,
            ExprKind::Pow(b, n) => ScalarKind::Binary(
                ScalarBinaryOp::Pow,
                Arc::new(b.to_scalar()?),
                self.written_exponent
                    .clone()
                    .unwrap_or_else(|| Arc::new(Scalar::constant(f64::from(*n)))),
            ),
            ExprKind::Neg(a) => ScalarKind::Unary(ScalarUnaryOp::Neg, Arc::new(a.to_scalar()?)),
            ExprKind::DivByScalar(a, d) => {
                ScalarKind::Binary(ScalarBinaryOp::Div, Arc::new(a.to_scalar()?), d.clone())
            }
        };
        Some(Scalar {
            kind,
            parentheses: self.parentheses,
        })
    }

    /// Count the total number of nodes, scalar subtrees included
    pub fn node_count(&self) -> usize {
        match &self.kind {
            ExprKind::Var(_) => 1,
            ExprKind::Scalar(s) => s.node_count(),
            ExprKind::Add(l, r) | ExprKind::Sub(l, r) | ExprKind::Mul(l, r) => {
                1 + l.node_count() + r.node_count()
            }
            ExprKind::Pow(b, _) | ExprKind::Neg(b) => 1 + b.node_count(),
            ExprKind::DivByScalar(a, d) => 1 + a.node_count() + d.node_count(),
        }
    }
}

fn binary_kind(op: ScalarBinaryOp, l: &Expr, r: &Expr) -> Option<ScalarKind> {
    Some(ScalarKind::Binary(
        op,
        Arc::new(l.to_scalar()?),
        Arc::new(r.to_scalar()?),
    ))
}

impl From<Var> for Expr {
    fn from(v: Var) -> Self {
        Expr::var(v)
    }
}

impl From<f64> for Expr {
    fn from(c: f64) -> Self {
        Expr::constant(c)
    }
}

impl From<Scalar> for Expr {
    fn from(s: Scalar) -> Self {
        Expr::scalar(s)
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::add_expr(self, rhs)
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::sub_expr(self, rhs)
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::mul_expr(self, rhs)
    }
}

impl Mul<Expr> for f64 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::mul_expr(Expr::constant(self), rhs)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::neg_expr(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_ids_and_parentheses() {
        let a = Expr::x() + Expr::y();
        let b = (Expr::x() + Expr::y()).parenthesized();
        assert_ne!(a.id, b.id);
        assert_eq!(a, b);
    }

    #[test]
    fn test_negative_exponent_rejected() {
        assert!(Expr::pow_checked(Expr::x(), 3).is_ok());
        let err = Expr::pow_checked(Expr::x(), -2).unwrap_err();
        assert!(matches!(err, SurfError::MalformedExpression(_)));
    }

    #[test]
    fn test_polynomial_divisor_rejected() {
        let ok = Expr::div_expr(Expr::x(), Expr::constant(2.0) + Expr::param("a"));
        assert!(ok.is_ok());
        let err = Expr::div_expr(Expr::x(), Expr::y() + Expr::constant(1.0));
        assert!(matches!(err, Err(SurfError::MalformedExpression(_))));
    }

    #[test]
    fn test_to_scalar() {
        let e = Expr::pow(Expr::param("a") + Expr::constant(1.0), 2);
        let s = e.to_scalar().unwrap();
        match &s.kind {
            ScalarKind::Binary(ScalarBinaryOp::Pow, base, exp) => {
                assert!(matches!(base.kind, ScalarKind::Binary(ScalarBinaryOp::Add, _, _)));
                assert_eq!(exp.as_constant(), Some(2.0));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!((Expr::x() * Expr::constant(2.0)).to_scalar().is_none());
    }

    #[test]
    fn test_sign_of_zero() {
        assert_eq!(ScalarUnaryOp::Sign.apply(0.0), 0.0);
        assert_eq!(ScalarUnaryOp::Sign.apply(-3.0), -1.0);
        assert_eq!(ScalarUnaryOp::Sign.apply(2.5), 1.0);
    }

    #[test]
    fn test_node_count() {
        let e = Expr::mul_expr(Expr::param("a"), Expr::pow(Expr::x(), 2));
        assert_eq!(e.node_count(), 4);
    }
}
