use super::{RealRootFinder, normalize_roots, polish};
use crate::poly::UnivariatePolynomial;

/// Coefficients of the interval polynomial below this fraction of the largest one are dropped
const RELATIVE_ZERO: f64 = 1e-13;
const MAX_REFINE_STEPS: usize = 100;
/// Roots closer than this in local coordinates are one root
const MERGE_DISTANCE: f64 = 1e-12;
/// Largest move of the final Newton polish, relative to the search interval
const POLISH_RANGE: f64 = 1e-6;

/// Root isolation by Descartes' rule of signs with bisection of `[0, 1]`
///
/// The search interval is mapped onto `[0, 1]`. Each subinterval carries its own
/// polynomial so that the interval is always `[0, 1]` in local coordinates. A
/// subinterval whose sign-variation bound is 0 holds no root; a bound of 1 with a
/// sign change is refined by safeguarded Newton steps; anything else is halved.
/// Values at split points and interval ends that vanish up to rounding count as
/// roots there. Isolated roots are polished on the input polynomial.
#[derive(Debug, Clone, Copy)]
pub struct DescartesRootFinder {
    max_depth: u32,
}

impl Default for DescartesRootFinder {
    fn default() -> Self {
        DescartesRootFinder { max_depth: 40 }
    }
}

impl DescartesRootFinder {
    /// Bisection depth after which a remaining cluster is reported as one root at its midpoint
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn isolate(&self, p: &UnivariatePolynomial, lo: f64, hi: f64, first_only: bool) -> Vec<f64> {
        if !(lo < hi) || !lo.is_finite() || !hi.is_finite() {
            return Vec::new();
        }
        let width = hi - lo;
        let shifted = p.compose_affine(lo, width).trimmed(RELATIVE_ZERO);
        let q = normalized(snap_constant_term(shifted.clone(), &shifted));
        if q.degree() == 0 {
            return Vec::new();
        }

        let mut local = Vec::new();
        let done = self.subdivide(q.clone(), 0.0, 1.0, 0, &mut local, first_only);
        // The bound only counts the open interval; the right end is checked once here
        if !done && vanishes(q.evaluate(1.0), &q) {
            local.push(1.0);
        }

        let roots = normalize_roots(local, MERGE_DISTANCE)
            .into_iter()
            .map(|x| {
                let t = lo + width * x;
                let polished = polish(p, t, POLISH_RANGE * width);
                if (lo..=hi).contains(&polished) { polished } else { t }
            })
            .collect();
        normalize_roots(roots, MERGE_DISTANCE)
    }

    /// Search `s` on `[0, 1]`, standing for `[a, b]`; returns true once the first root is found in `first_only` mode
    fn subdivide(
        &self,
        mut s: UnivariatePolynomial,
        a: f64,
        b: f64,
        depth: u32,
        roots: &mut Vec<f64>,
        first_only: bool,
    ) -> bool {
        if s.coeffs().first() == Some(&0.0) {
            if roots.last() != Some(&a) {
                roots.push(a);
            }
            if first_only {
                return true;
            }
            while s.coeffs().first() == Some(&0.0) {
                s = s.shift_down();
            }
        }
        if s.degree() == 0 {
            return false;
        }

        let bound = descartes_bound(&s);
        if bound == 0 {
            return false;
        }
        if bound == 1 {
            if let Some(x) = refine(&s) {
                roots.push(a + (b - a) * x);
                return first_only;
            }
        }
        if depth >= self.max_depth {
            roots.push(0.5 * (a + b));
            return first_only;
        }

        let mid = 0.5 * (a + b);
        let left = normalized(s.scale_variable(0.5));
        // A value at the split point lost in rounding is a root at `mid`
        let right = normalized(snap_constant_term(left.taylor_shift(1.0), &left));
        if self.subdivide(left, a, mid, depth + 1, roots, first_only) {
            return true;
        }
        self.subdivide(right, mid, b, depth + 1, roots, first_only)
    }
}

impl RealRootFinder for DescartesRootFinder {
    fn find_all_roots(&self, p: &UnivariatePolynomial) -> Vec<f64> {
        let p = p.trimmed(0.0);
        if p.degree() == 0 {
            return Vec::new();
        }
        let bound = p.cauchy_bound();
        self.isolate(&p, -bound, bound, false)
    }

    fn find_all_roots_in(&self, p: &UnivariatePolynomial, lo: f64, hi: f64) -> Vec<f64> {
        self.isolate(p, lo, hi, false)
    }

    fn find_first_root_in(&self, p: &UnivariatePolynomial, lo: f64, hi: f64) -> Option<f64> {
        self.isolate(p, lo, hi, true).first().copied()
    }
}

/// Whether `value`, computed from the coefficients of `p`, is zero up to rounding
fn vanishes(value: f64, p: &UnivariatePolynomial) -> bool {
    value.abs() <= 8.0 * (p.degree() + 1) as f64 * f64::EPSILON * p.abs_coefficient_sum()
}

/// Replace a constant term that vanishes up to rounding by an exact zero
///
/// `source` is the polynomial the constant term was computed from.
fn snap_constant_term(p: UnivariatePolynomial, source: &UnivariatePolynomial) -> UnivariatePolynomial {
    match p.coeffs().first() {
        Some(&c0) if c0 != 0.0 && vanishes(c0, source) => p.with_constant_term(0.0),
        _ => p,
    }
}

/// Upper bound on the number of roots in the open interval `(0, 1)`
///
/// Sign variations of `(x + 1)^n s(1 / (x + 1))`, which maps `(0, inf)` onto `(0, 1)`.
fn descartes_bound(s: &UnivariatePolynomial) -> usize {
    s.reversed().taylor_shift(1.0).sign_variations()
}

/// Scale by a power of two so the largest coefficient lies in `[1, 2)`
///
/// Power-of-two factors are exact, so roots at dyadic points stay exact zeros.
fn normalized(p: UnivariatePolynomial) -> UnivariatePolynomial {
    let max = p.max_abs_coefficient();
    if max == 0.0 || !max.is_finite() {
        return p;
    }
    let exponent = max.log2().floor() as i32;
    p.scale(2f64.powi(-exponent))
}

/// Locate the single root of `s` in `(0, 1]`, or `None` without a sign change
fn refine(s: &UnivariatePolynomial) -> Option<f64> {
    if s.degree() == 0 {
        return None;
    }
    if vanishes(s.evaluate(1.0), s) {
        // Root at the right end belongs to the neighbour; look for the one inside
        return refine(&s.deflate(1.0)).filter(|&x| x < 1.0);
    }
    let f_lo = s.evaluate(0.0);
    let f_hi = s.evaluate(1.0);
    if (f_lo < 0.0) == (f_hi < 0.0) {
        return None;
    }

    let negative_at_lo = f_lo < 0.0;
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    let mut x = 0.5;
    for _ in 0..MAX_REFINE_STEPS {
        let (f, df) = s.evaluate_with_derivative(x);
        if f == 0.0 {
            return Some(x);
        }
        if (f < 0.0) == negative_at_lo {
            lo = x;
        } else {
            hi = x;
        }
        let newton = x - f / df;
        let next = if df != 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
        if (next - x).abs() <= 1e-14 * x.abs().max(1e-3) || hi - lo <= f64::EPSILON {
            return Some(next);
        }
        x = next;
    }
    Some(x)
}
