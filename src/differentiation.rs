// Differentiation engine - applies calculus rules
//
// Inline checks (0 + u → u, 1 * u → u, u * 0 → 0) keep gradients of high-degree surfaces
// from growing into large trees of zeros before simplification runs.

use crate::ast::{Expr, ExprKind, Var};

impl Expr {
    /// Differentiate this expression with respect to one of x, y, z
    ///
    /// Scalar subtrees are constant. The divisor of a scalar division is variable-free
    /// and is carried through unchanged.
    pub fn derive(&self, var: Var) -> Expr {
        match &self.kind {
            ExprKind::Scalar(_) => Expr::constant(0.0),

            ExprKind::Var(v) => {
                if *v == var {
                    Expr::constant(1.0)
                } else {
                    Expr::constant(0.0)
                }
            }

            // Sum rule: (u + v)' = u' + v'
            ExprKind::Add(u, v) => {
                let u_prime = u.derive(var);
                let v_prime = v.derive(var);
                if u_prime.is_zero_num() {
                    v_prime
                } else if v_prime.is_zero_num() {
                    u_prime
                } else {
                    Expr::add_expr(u_prime, v_prime)
                }
            }

            // Difference rule: (u - v)' = u' - v'
            ExprKind::Sub(u, v) => {
                let u_prime = u.derive(var);
                let v_prime = v.derive(var);
                if v_prime.is_zero_num() {
                    u_prime
                } else if u_prime.is_zero_num() {
                    Expr::neg_expr(v_prime)
                } else {
                    Expr::sub_expr(u_prime, v_prime)
                }
            }

            // Product rule: (u * v)' = u' * v + u * v'
            ExprKind::Mul(u, v) => {
                let u_prime = u.derive(var);
                let v_prime = v.derive(var);
                let left = product(u_prime, v.as_ref().clone());
                let right = product(u.as_ref().clone(), v_prime);
                if left.is_zero_num() {
                    right
                } else if right.is_zero_num() {
                    left
                } else {
                    Expr::add_expr(left, right)
                }
            }

            // Power rule: (u^n)' = n * u^(n-1) * u'
            ExprKind::Pow(u, n) => {
                let u_prime = u.derive(var);
                match *n {
                    0 => Expr::constant(0.0),
                    1 => u_prime,
                    _ if u_prime.is_zero_num() => Expr::constant(0.0),
                    n => {
                        let reduced = if n == 2 {
                            u.as_ref().clone()
                        } else {
                            Expr::pow(u.as_ref().clone(), n - 1)
                        };
                        product(
                            Expr::mul_expr(Expr::constant(f64::from(n)), reduced),
                            u_prime,
                        )
                    }
                }
            }

            ExprKind::Neg(u) => {
                let u_prime = u.derive(var);
                if u_prime.is_zero_num() {
                    u_prime
                } else {
                    Expr::neg_expr(u_prime)
                }
            }

            // (u / c)' = u' / c
            ExprKind::DivByScalar(u, d) => {
                let u_prime = u.derive(var);
                if u_prime.is_zero_num() {
                    u_prime
                } else {
                    Expr::new(ExprKind::DivByScalar(std::sync::Arc::new(u_prime), d.clone()))
                }
            }
        }
    }

    /// The three partial derivatives ∂/∂x, ∂/∂y, ∂/∂z
    pub fn gradient(&self) -> [Expr; 3] {
        Var::ALL.map(|v| self.derive(v))
    }
}

/// Product with 0 and 1 short-circuits
fn product(a: Expr, b: Expr) -> Expr {
    if a.is_zero_num() || b.is_zero_num() {
        Expr::constant(0.0)
    } else if a.is_one_num() {
        b
    } else if b.is_one_num() {
        a
    } else {
        Expr::mul_expr(a, b)
    }
}
