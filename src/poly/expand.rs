//! Expansion of expression trees into canonical polynomials

use crate::ast::{Expr, ExprKind};
use crate::evaluate::{Parameters, evaluate_scalar};
use crate::poly::XyzPolynomial;
use crate::SurfError;

/// Expand a tree into canonical form
///
/// Scalar subtrees are evaluated under `params`; a division by a scalar scales
/// the dividend by the reciprocal of the divisor.
///
/// # Errors
/// - `SurfError::UnboundParameter` if a scalar subtree names a parameter missing from `params`
/// - `SurfError::MalformedExpression` if a divisor evaluates to zero
pub fn expand(expr: &Expr, params: &Parameters) -> Result<XyzPolynomial, SurfError> {
    Ok(match &expr.kind {
        ExprKind::Var(v) => XyzPolynomial::variable(*v),
        ExprKind::Scalar(s) => XyzPolynomial::constant(evaluate_scalar(s, params)?),
        ExprKind::Add(a, b) => &expand(a, params)? + &expand(b, params)?,
        ExprKind::Sub(a, b) => &expand(a, params)? - &expand(b, params)?,
        ExprKind::Mul(a, b) => &expand(a, params)? * &expand(b, params)?,
        ExprKind::Pow(base, n) => expand(base, params)?.pow(*n),
        ExprKind::Neg(a) => -&expand(a, params)?,
        ExprKind::DivByScalar(a, d) => {
            let divisor = evaluate_scalar(d, params)?;
            if divisor == 0.0 {
                return Err(SurfError::malformed(format!("division by zero: '{d}' evaluates to 0")));
            }
            expand(a, params)?.scale(1.0 / divisor)
        }
    })
}
