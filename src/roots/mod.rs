//! Real root isolation for univariate polynomials
//!
//! Two strategies share one interface: closed formulas for low degrees and
//! Descartes-rule subdivision for everything else.
mod closed_form;
mod descartes;

use std::fmt;

pub use closed_form::ClosedFormRootFinder;
pub use descartes::DescartesRootFinder;

use crate::poly::UnivariatePolynomial;

const POLISH_STEPS: usize = 4;

/// Finds real roots of a univariate polynomial
///
/// Roots are returned in increasing order without multiplicities. Interval
/// bounds are inclusive at both ends. The zero polynomial, constants and empty
/// or zero-length intervals have no roots.
pub trait RealRootFinder: Send + Sync + fmt::Debug {
    fn find_all_roots(&self, p: &UnivariatePolynomial) -> Vec<f64>;

    fn find_all_roots_in(&self, p: &UnivariatePolynomial, lo: f64, hi: f64) -> Vec<f64>;

    /// Smallest root in `[lo, hi]`
    fn find_first_root_in(&self, p: &UnivariatePolynomial, lo: f64, hi: f64) -> Option<f64> {
        self.find_all_roots_in(p, lo, hi).first().copied()
    }
}

/// Closed formulas up to degree 2, subdivision above
pub fn root_finder_for_degree(degree: u32) -> Box<dyn RealRootFinder> {
    if degree <= 2 {
        Box::new(ClosedFormRootFinder)
    } else {
        Box::new(DescartesRootFinder::default())
    }
}

/// A few Newton steps on `p` starting at `x`
///
/// A step is kept only while it shrinks the residual and the total move stays
/// within `max_move`, so the result never leaves the root's neighbourhood.
pub(crate) fn polish(p: &UnivariatePolynomial, x0: f64, max_move: f64) -> f64 {
    let mut x = x0;
    let mut best = p.evaluate(x).abs();
    for _ in 0..POLISH_STEPS {
        let (f, df) = p.evaluate_with_derivative(x);
        if f == 0.0 || df == 0.0 {
            break;
        }
        let next = x - f / df;
        if !((next - x0).abs() <= max_move) {
            break;
        }
        let residual = p.evaluate(next).abs();
        if !(residual < best) {
            break;
        }
        best = residual;
        x = next;
    }
    x
}

/// Sort, drop non-finite values and merge roots closer than `eps`
pub(crate) fn normalize_roots(mut roots: Vec<f64>, eps: f64) -> Vec<f64> {
    roots.retain(|r| r.is_finite());
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|b, a| (*b - *a).abs() <= eps * (1.0 + a.abs()));
    roots
}
