//! Canonical trivariate polynomials

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{One, Zero};

use crate::ast::Var;
use crate::evaluate::powi;
use crate::poly::{UnivariatePolynomial, XyPolynomial};

/// Exponents of x, y, z
pub type Exponents = [u32; 3];

/// Polynomial in x, y, z as a map from exponent triples to coefficients
///
/// Zero coefficients are never stored, so two polynomials are equal exactly when
/// their maps are. Every operation builds a new polynomial; operands are only read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XyzPolynomial {
    terms: BTreeMap<Exponents, f64>,
}

impl XyzPolynomial {
    pub fn zero() -> Self {
        XyzPolynomial {
            terms: BTreeMap::new(),
        }
    }

    pub fn constant(c: f64) -> Self {
        XyzPolynomial::monomial([0, 0, 0], c)
    }

    pub fn monomial(exponents: Exponents, coefficient: f64) -> Self {
        let mut p = XyzPolynomial::zero();
        p.accumulate(exponents, coefficient);
        p
    }

    /// The unit monomial of one variable
    pub fn variable(v: Var) -> Self {
        let mut exponents = [0; 3];
        exponents[v.index()] = 1;
        XyzPolynomial::monomial(exponents, 1.0)
    }

    pub fn x() -> Self {
        XyzPolynomial::variable(Var::X)
    }

    pub fn y() -> Self {
        XyzPolynomial::variable(Var::Y)
    }

    pub fn z() -> Self {
        XyzPolynomial::variable(Var::Z)
    }

    /// `c0 + cx * x + cy * y + cz * z`
    pub fn affine(c0: f64, cx: f64, cy: f64, cz: f64) -> Self {
        let mut p = XyzPolynomial::zero();
        p.accumulate([0, 0, 0], c0);
        p.accumulate([1, 0, 0], cx);
        p.accumulate([0, 1, 0], cy);
        p.accumulate([0, 0, 1], cz);
        p
    }

    fn accumulate(&mut self, exponents: Exponents, coefficient: f64) {
        if coefficient == 0.0 {
            return;
        }
        let entry = self.terms.entry(exponents).or_insert(0.0);
        *entry += coefficient;
        if *entry == 0.0 {
            self.terms.remove(&exponents);
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn coefficient(&self, exponents: Exponents) -> f64 {
        self.terms.get(&exponents).copied().unwrap_or(0.0)
    }

    /// Non-zero terms in ascending exponent order
    pub fn terms(&self) -> impl Iterator<Item = (Exponents, f64)> + '_ {
        self.terms.iter().map(|(e, c)| (*e, *c))
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn total_degree(&self) -> u32 {
        self.terms.keys().map(|e| e.iter().sum()).max().unwrap_or(0)
    }

    pub fn degree_in(&self, v: Var) -> u32 {
        self.terms.keys().map(|e| e[v.index()]).max().unwrap_or(0)
    }

    pub fn scale(&self, factor: f64) -> Self {
        let mut out = XyzPolynomial::zero();
        for (e, c) in self.terms() {
            out.accumulate(e, c * factor);
        }
        out
    }

    /// Integer power by repeated squaring
    pub fn pow(&self, mut exp: u32) -> Self {
        let mut acc = XyzPolynomial::one();
        let mut base = self.clone();
        while exp > 0 {
            if exp & 1 == 1 {
                acc = &acc * &base;
            }
            exp >>= 1;
            if exp > 0 {
                base = &base * &base;
            }
        }
        acc
    }

    pub fn evaluate(&self, x: f64, y: f64, z: f64) -> f64 {
        self.terms()
            .map(|([i, j, k], c)| c * powi(x, i) * powi(y, j) * powi(z, k))
            .sum()
    }

    /// Fix z, leaving a polynomial in x and y
    pub fn evaluate_z(&self, z: f64) -> XyPolynomial {
        let z_powers = powers_of(z, self.degree_in(Var::Z));
        let row = vec![0.0; self.degree_in(Var::X) as usize + 1];
        let mut grid = vec![row; self.degree_in(Var::Y) as usize + 1];
        for ([i, j, k], c) in self.terms() {
            grid[j as usize][i as usize] += c * z_powers[k as usize];
        }
        XyPolynomial::new(grid.into_iter().map(UnivariatePolynomial::new).collect())
    }

    /// Composition `self(X, Y, Z)`
    ///
    /// Terms are grouped by their x and y exponents so each power of the
    /// substituted polynomials is computed once.
    pub fn substitute(&self, x: &XyzPolynomial, y: &XyzPolynomial, z: &XyzPolynomial) -> Self {
        let x_powers = polynomial_powers(x, self.degree_in(Var::X));
        let y_powers = polynomial_powers(y, self.degree_in(Var::Y));
        let z_powers = polynomial_powers(z, self.degree_in(Var::Z));

        // (i, j) -> sum over k of c_ijk * Z^k
        let mut inner: BTreeMap<(u32, u32), XyzPolynomial> = BTreeMap::new();
        for ([i, j, k], c) in self.terms() {
            let slot = inner.entry((i, j)).or_default();
            *slot = &*slot + &z_powers[k as usize].scale(c);
        }

        // i -> sum over j of Y^j * inner(i, j)
        let mut middle: BTreeMap<u32, XyzPolynomial> = BTreeMap::new();
        for ((i, j), q) in inner {
            let slot = middle.entry(i).or_default();
            *slot = &*slot + &(&y_powers[j as usize] * &q);
        }

        middle
            .into_iter()
            .fold(XyzPolynomial::zero(), |acc, (i, r)| &acc + &(&x_powers[i as usize] * &r))
    }
}

fn powers_of(value: f64, max: u32) -> Vec<f64> {
    let mut out = Vec::with_capacity(max as usize + 1);
    let mut p = 1.0;
    for _ in 0..=max {
        out.push(p);
        p *= value;
    }
    out
}

fn polynomial_powers(p: &XyzPolynomial, max: u32) -> Vec<XyzPolynomial> {
    let mut out = Vec::with_capacity(max as usize + 1);
    out.push(XyzPolynomial::one());
    for i in 1..=max as usize {
        let next = &out[i - 1] * p;
        out.push(next);
    }
    out
}

impl Add for &XyzPolynomial {
    type Output = XyzPolynomial;

    fn add(self, rhs: &XyzPolynomial) -> XyzPolynomial {
        let mut out = self.clone();
        for (e, c) in rhs.terms() {
            out.accumulate(e, c);
        }
        out
    }
}

impl Sub for &XyzPolynomial {
    type Output = XyzPolynomial;

    fn sub(self, rhs: &XyzPolynomial) -> XyzPolynomial {
        let mut out = self.clone();
        for (e, c) in rhs.terms() {
            out.accumulate(e, -c);
        }
        out
    }
}

impl Mul for &XyzPolynomial {
    type Output = XyzPolynomial;

    fn mul(self, rhs: &XyzPolynomial) -> XyzPolynomial {
        let mut out = XyzPolynomial::zero();
        for (a, ca) in self.terms() {
            for (b, cb) in rhs.terms() {
                out.accumulate([a[0] + b[0], a[1] + b[1], a[2] + b[2]], ca * cb);
            }
        }
        out
    }
}

impl Neg for &XyzPolynomial {
    type Output = XyzPolynomial;

    fn neg(self) -> XyzPolynomial {
        self.scale(-1.0)
    }
}

impl Add for XyzPolynomial {
    type Output = XyzPolynomial;

    fn add(self, rhs: XyzPolynomial) -> XyzPolynomial {
        &self + &rhs
    }
}

impl Mul for XyzPolynomial {
    type Output = XyzPolynomial;

    fn mul(self, rhs: XyzPolynomial) -> XyzPolynomial {
        &self * &rhs
    }
}

impl Zero for XyzPolynomial {
    fn zero() -> Self {
        XyzPolynomial::zero()
    }

    fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }
}

impl One for XyzPolynomial {
    fn one() -> Self {
        XyzPolynomial::constant(1.0)
    }
}

impl fmt::Display for XyzPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        let mut first = true;
        for (exponents, c) in self.terms.iter().rev() {
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            write!(f, "{}", c)?;
            for (v, &e) in Var::ALL.iter().zip(exponents) {
                match e {
                    0 => {}
                    1 => write!(f, "*{}", v)?,
                    _ => write!(f, "*{}^{}", v, e)?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_coefficients_absent() {
        let p = &XyzPolynomial::x() - &XyzPolynomial::x();
        assert!(p.is_zero());
        assert_eq!(p, XyzPolynomial::zero());
        assert_eq!(p.term_count(), 0);
    }

    #[test]
    fn test_operations_do_not_mutate_operands() {
        let x = XyzPolynomial::x();
        let y = XyzPolynomial::y();
        let sum = &x + &y;
        let product = &sum * &x;
        let _ = &product - &sum;
        assert_eq!(x, XyzPolynomial::monomial([1, 0, 0], 1.0));
        assert_eq!(y, XyzPolynomial::monomial([0, 1, 0], 1.0));
        assert_eq!(sum.term_count(), 2);
    }

    #[test]
    fn test_pow_binomial() {
        let p = (&XyzPolynomial::x() + &XyzPolynomial::constant(1.0)).pow(3);
        assert_eq!(p.coefficient([0, 0, 0]), 1.0);
        assert_eq!(p.coefficient([1, 0, 0]), 3.0);
        assert_eq!(p.coefficient([2, 0, 0]), 3.0);
        assert_eq!(p.coefficient([3, 0, 0]), 1.0);
        assert_eq!(p.total_degree(), 3);
        assert_eq!(XyzPolynomial::y().pow(0), XyzPolynomial::one());
    }

    #[test]
    fn test_evaluate_z_then_y() {
        // x^2 y + 3 y z^2 - z
        let p = &(&XyzPolynomial::monomial([2, 1, 0], 1.0) + &XyzPolynomial::monomial([0, 1, 2], 3.0))
            - &XyzPolynomial::z();
        let (x, y, z) = (1.5, -0.5, 2.0);
        let xy = p.evaluate_z(z);
        assert!((xy.evaluate(x, y) - p.evaluate(x, y, z)).abs() < 1e-12);
        let t = xy.evaluate_y(y);
        assert!((t.evaluate(x) - p.evaluate(x, y, z)).abs() < 1e-12);
    }

    #[test]
    fn test_substitute_matches_pointwise_composition() {
        // sphere x^2 + y^2 + z^2 - 1
        let sphere = &(&(&XyzPolynomial::x().pow(2) + &XyzPolynomial::y().pow(2))
            + &XyzPolynomial::z().pow(2))
            - &XyzPolynomial::one();
        let px = XyzPolynomial::affine(0.5, 1.0, 0.0, 2.0);
        let py = XyzPolynomial::affine(-1.0, 0.0, 3.0, 0.0);
        let pz = &XyzPolynomial::x() * &XyzPolynomial::y();
        let composed = sphere.substitute(&px, &py, &pz);

        for &(a, b, c) in &[(0.1, 0.2, 0.3), (-1.0, 2.0, 0.5), (3.0, -0.25, -2.0)] {
            let expected = sphere.evaluate(px.evaluate(a, b, c), py.evaluate(a, b, c), pz.evaluate(a, b, c));
            assert!((composed.evaluate(a, b, c) - expected).abs() < 1e-9);
        }
    }
}
