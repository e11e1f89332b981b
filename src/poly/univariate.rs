//! Dense polynomials in one variable

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Coefficient vector, index = degree
///
/// Trailing exact zeros are never stored, so the zero polynomial has no
/// coefficients and `degree` is the index of the last coefficient.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnivariatePolynomial {
    coeffs: Vec<f64>,
}

impl UnivariatePolynomial {
    pub fn new(mut coeffs: Vec<f64>) -> Self {
        while coeffs.last() == Some(&0.0) {
            coeffs.pop();
        }
        UnivariatePolynomial { coeffs }
    }

    pub fn zero() -> Self {
        UnivariatePolynomial { coeffs: Vec::new() }
    }

    pub fn constant(c: f64) -> Self {
        UnivariatePolynomial::new(vec![c])
    }

    /// `c0 + c1 * t`
    pub fn linear(c0: f64, c1: f64) -> Self {
        UnivariatePolynomial::new(vec![c0, c1])
    }

    /// Polynomial with the given real roots and leading coefficient 1
    pub fn from_roots(roots: &[f64]) -> Self {
        roots.iter().fold(UnivariatePolynomial::constant(1.0), |acc, &r| {
            &acc * &UnivariatePolynomial::linear(-r, 1.0)
        })
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree, 0 for constants and the zero polynomial
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn leading_coefficient(&self) -> f64 {
        self.coeffs.last().copied().unwrap_or(0.0)
    }

    /// Horner evaluation
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }

    /// Value and first derivative in one Horner pass
    #[inline]
    pub fn evaluate_with_derivative(&self, t: f64) -> (f64, f64) {
        let mut value = 0.0;
        let mut slope = 0.0;
        for &c in self.coeffs.iter().rev() {
            slope = slope * t + value;
            value = value * t + c;
        }
        (value, slope)
    }

    pub fn derivative(&self) -> Self {
        UnivariatePolynomial::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * i as f64)
                .collect(),
        )
    }

    pub fn scale(&self, factor: f64) -> Self {
        UnivariatePolynomial::new(self.coeffs.iter().map(|c| c * factor).collect())
    }

    /// `p(t + shift)`
    pub fn taylor_shift(&self, shift: f64) -> Self {
        let mut a = self.coeffs.clone();
        let n = a.len();
        for i in 0..n.saturating_sub(1) {
            for j in (i..n - 1).rev() {
                a[j] += shift * a[j + 1];
            }
        }
        UnivariatePolynomial::new(a)
    }

    /// `p(t * factor)`
    pub fn scale_variable(&self, factor: f64) -> Self {
        let mut power = 1.0;
        let mut out = Vec::with_capacity(self.coeffs.len());
        for &c in &self.coeffs {
            out.push(c * power);
            power *= factor;
        }
        UnivariatePolynomial::new(out)
    }

    /// `p(offset + width * t)`, mapping `[0, 1]` onto `[offset, offset + width]`
    pub fn compose_affine(&self, offset: f64, width: f64) -> Self {
        self.taylor_shift(offset).scale_variable(width)
    }

    /// `t^n * p(1/t)`
    pub fn reversed(&self) -> Self {
        let mut coeffs = self.coeffs.clone();
        coeffs.reverse();
        // Leading zeros of the reversed vector are the low-order zeros of `self`
        UnivariatePolynomial::new(coeffs)
    }

    /// Drop trailing coefficients with magnitude at most `rel_eps` times the largest one
    pub fn trimmed(&self, rel_eps: f64) -> Self {
        let max = self.max_abs_coefficient();
        let limit = max * rel_eps;
        let mut coeffs = self.coeffs.clone();
        while coeffs.last().is_some_and(|c| c.abs() <= limit) {
            coeffs.pop();
        }
        UnivariatePolynomial { coeffs }
    }

    pub fn max_abs_coefficient(&self) -> f64 {
        self.coeffs.iter().fold(0.0, |m: f64, c| m.max(c.abs()))
    }

    /// Divide by `(t - root)`, dropping the remainder
    pub fn deflate(&self, root: f64) -> Self {
        let n = self.coeffs.len();
        if n < 2 {
            return UnivariatePolynomial::zero();
        }
        let mut quotient = vec![0.0; n - 1];
        let mut carry = 0.0;
        for i in (1..n).rev() {
            carry = self.coeffs[i] + carry * root;
            quotient[i - 1] = carry;
        }
        UnivariatePolynomial::new(quotient)
    }

    /// Same polynomial with the constant term replaced by `c0`
    pub fn with_constant_term(&self, c0: f64) -> Self {
        let mut coeffs = self.coeffs.clone();
        match coeffs.first_mut() {
            Some(first) => *first = c0,
            None => coeffs.push(c0),
        }
        UnivariatePolynomial::new(coeffs)
    }

    pub fn abs_coefficient_sum(&self) -> f64 {
        self.coeffs.iter().map(|c| c.abs()).sum()
    }

    /// Divide by `t`, dropping the constant term
    pub fn shift_down(&self) -> Self {
        UnivariatePolynomial::new(self.coeffs.iter().skip(1).copied().collect())
    }

    /// Cauchy bound: every real root lies in `[-bound, bound]`
    pub fn cauchy_bound(&self) -> f64 {
        let lead = self.leading_coefficient();
        if lead == 0.0 {
            return 0.0;
        }
        let n = self.degree();
        1.0 + self.coeffs[..n]
            .iter()
            .fold(0.0, |m: f64, c| m.max((c / lead).abs()))
    }

    /// Number of sign changes in the coefficient sequence, zeros skipped
    pub fn sign_variations(&self) -> usize {
        let mut count = 0;
        let mut last = 0.0;
        for &c in &self.coeffs {
            if c == 0.0 {
                continue;
            }
            if last != 0.0 && (c < 0.0) != (last < 0.0) {
                count += 1;
            }
            last = c;
        }
        count
    }
}

impl Add for &UnivariatePolynomial {
    type Output = UnivariatePolynomial;

    fn add(self, rhs: &UnivariatePolynomial) -> UnivariatePolynomial {
        let (long, short) = if self.coeffs.len() >= rhs.coeffs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut coeffs = long.coeffs.clone();
        for (c, s) in coeffs.iter_mut().zip(&short.coeffs) {
            *c += s;
        }
        UnivariatePolynomial::new(coeffs)
    }
}

impl Sub for &UnivariatePolynomial {
    type Output = UnivariatePolynomial;

    fn sub(self, rhs: &UnivariatePolynomial) -> UnivariatePolynomial {
        self + &(-rhs)
    }
}

impl Neg for &UnivariatePolynomial {
    type Output = UnivariatePolynomial;

    fn neg(self) -> UnivariatePolynomial {
        self.scale(-1.0)
    }
}

impl Mul for &UnivariatePolynomial {
    type Output = UnivariatePolynomial;

    fn mul(self, rhs: &UnivariatePolynomial) -> UnivariatePolynomial {
        if self.is_zero() || rhs.is_zero() {
            return UnivariatePolynomial::zero();
        }
        let mut coeffs = vec![0.0; self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        UnivariatePolynomial::new(coeffs)
    }
}

impl fmt::Display for UnivariatePolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for (i, c) in self.coeffs.iter().enumerate().rev() {
            if *c == 0.0 {
                continue;
            }
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            match i {
                0 => write!(f, "{}", c)?,
                1 => write!(f, "{}*t", c)?,
                _ => write!(f, "{}*t^{}", c, i)?,
            }
        }
        Ok(())
    }
}
