//! Bivariate polynomials left after fixing z

use crate::poly::UnivariatePolynomial;

/// Polynomial in x and y, stored as coefficients of y^j that are polynomials in x
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XyPolynomial {
    by_y_power: Vec<UnivariatePolynomial>,
}

impl XyPolynomial {
    pub fn new(mut by_y_power: Vec<UnivariatePolynomial>) -> Self {
        while by_y_power.last().is_some_and(UnivariatePolynomial::is_zero) {
            by_y_power.pop();
        }
        XyPolynomial { by_y_power }
    }

    /// Coefficient of y^j
    pub fn coefficient(&self, j: usize) -> Option<&UnivariatePolynomial> {
        self.by_y_power.get(j)
    }

    pub fn degree_in_y(&self) -> usize {
        self.by_y_power.len().saturating_sub(1)
    }

    pub fn is_zero(&self) -> bool {
        self.by_y_power.is_empty()
    }

    /// Fix y with Horner's scheme over the x-polynomial coefficients
    pub fn evaluate_y(&self, y: f64) -> UnivariatePolynomial {
        let width = self.by_y_power.iter().map(|p| p.coeffs().len()).max().unwrap_or(0);
        let mut acc = vec![0.0; width];
        for p in self.by_y_power.iter().rev() {
            for a in acc.iter_mut() {
                *a *= y;
            }
            for (a, c) in acc.iter_mut().zip(p.coeffs()) {
                *a += c;
            }
        }
        UnivariatePolynomial::new(acc)
    }

    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.evaluate_y(y).evaluate(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_y() {
        // (1 + x) + (2x^2) y + (-1) y^2
        let p = XyPolynomial::new(vec![
            UnivariatePolynomial::linear(1.0, 1.0),
            UnivariatePolynomial::new(vec![0.0, 0.0, 2.0]),
            UnivariatePolynomial::constant(-1.0),
        ]);
        let q = p.evaluate_y(3.0);
        // 1 + x + 6x^2 - 9
        assert_eq!(q.coeffs(), &[-8.0, 1.0, 6.0]);
        assert_eq!(p.evaluate(1.0, 3.0), -1.0);
    }

    #[test]
    fn test_trailing_zero_rows_dropped() {
        let p = XyPolynomial::new(vec![
            UnivariatePolynomial::constant(1.0),
            UnivariatePolynomial::zero(),
        ]);
        assert_eq!(p.degree_in_y(), 0);
    }
}
