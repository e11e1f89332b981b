//! Numeric evaluation of expression trees

use rustc_hash::FxHashMap;

use crate::SurfError;
use crate::ast::{Expr, ExprKind, Scalar, ScalarKind};

/// Named parameter bindings
pub type Parameters = FxHashMap<String, f64>;

/// Build a binding table from `(name, value)` pairs
pub fn parameters<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Parameters {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Evaluate a scalar subtree
///
/// # Errors
/// `SurfError::UnboundParameter` if a parameter has no binding in `params`
pub fn evaluate_scalar(s: &Scalar, params: &Parameters) -> Result<f64, SurfError> {
    match &s.kind {
        ScalarKind::Constant(c) => Ok(*c),
        ScalarKind::Param(name) => params
            .get(name)
            .copied()
            .ok_or_else(|| SurfError::unbound(name.clone())),
        ScalarKind::Binary(op, a, b) => Ok(op.apply(
            evaluate_scalar(a, params)?,
            evaluate_scalar(b, params)?,
        )),
        ScalarKind::Unary(op, a) => Ok(op.apply(evaluate_scalar(a, params)?)),
    }
}

/// Evaluate a tree at the point (x, y, z)
///
/// # Errors
/// `SurfError::UnboundParameter` if a parameter has no binding in `params`
pub fn evaluate(expr: &Expr, x: f64, y: f64, z: f64, params: &Parameters) -> Result<f64, SurfError> {
    let eval = |e: &Expr| evaluate(e, x, y, z, params);
    match &expr.kind {
        ExprKind::Var(v) => Ok([x, y, z][v.index()]),
        ExprKind::Scalar(s) => evaluate_scalar(s, params),
        ExprKind::Add(a, b) => Ok(eval(a)? + eval(b)?),
        ExprKind::Sub(a, b) => Ok(eval(a)? - eval(b)?),
        ExprKind::Mul(a, b) => Ok(eval(a)? * eval(b)?),
        ExprKind::Pow(a, n) => Ok(powi(eval(a)?, *n)),
        ExprKind::Neg(a) => Ok(-eval(a)?),
        ExprKind::DivByScalar(a, d) => Ok(eval(a)? / evaluate_scalar(d, params)?),
    }
}

/// Integer power by squaring
pub(crate) fn powi(mut base: f64, mut exp: u32) -> f64 {
    let mut acc = 1.0;
    while exp > 0 {
        if exp & 1 == 1 {
            acc *= base;
        }
        base *= base;
        exp >>= 1;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_evaluate_point() {
        let e = parse("x^2+y^2+z^2-r^2").unwrap();
        let params = parameters([("r", 2.0)]);
        assert_eq!(evaluate(&e, 1.0, 2.0, 3.0, &params).unwrap(), 10.0);
    }

    #[test]
    fn test_evaluate_unbound() {
        let e = parse("a*x").unwrap();
        let err = evaluate(&e, 1.0, 0.0, 0.0, &Parameters::default()).unwrap_err();
        assert_eq!(err, SurfError::unbound("a"));
    }

    #[test]
    fn test_scalar_functions() {
        let e = parse("atan2(1,1)*4+sign(-2)+floor(1.5)").unwrap();
        let v = evaluate(&e, 0.0, 0.0, 0.0, &Parameters::default()).unwrap();
        assert!((v - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_powi() {
        assert_eq!(powi(3.0, 0), 1.0);
        assert_eq!(powi(-2.0, 5), -32.0);
        assert_eq!(powi(0.5, 3), 0.125);
    }
}
