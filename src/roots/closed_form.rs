use std::f64::consts::PI;

use super::{DescartesRootFinder, RealRootFinder, normalize_roots, polish};
use crate::poly::UnivariatePolynomial;

/// Coefficients below this fraction of the largest one count as zero for degrees 3 and 4
const RELATIVE_ZERO: f64 = 1e-14;

/// Closed formulas for degree up to 4; higher degrees go to subdivision
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosedFormRootFinder;

impl RealRootFinder for ClosedFormRootFinder {
    fn find_all_roots(&self, p: &UnivariatePolynomial) -> Vec<f64> {
        let c = p.coeffs();
        let roots = match p.degree() {
            _ if p.is_zero() => return Vec::new(),
            0 => return Vec::new(),
            1 => vec![-c[0] / c[1]],
            2 => return normalize_roots(solve_quadratic(c[2], c[1], c[0]), 0.0),
            3 | 4 => {
                let trimmed = p.trimmed(RELATIVE_ZERO);
                let t = trimmed.coeffs();
                match trimmed.degree() {
                    _ if trimmed.is_zero() => return Vec::new(),
                    0 => return Vec::new(),
                    1 => vec![-t[0] / t[1]],
                    2 => solve_quadratic(t[2], t[1], t[0]),
                    3 => solve_cubic(t[3], t[2], t[1], t[0]),
                    _ => solve_quartic(t[4], t[3], t[2], t[1], t[0]),
                }
                .into_iter()
                .map(|r| polish(&trimmed, r, f64::INFINITY))
                .collect()
            }
            _ => return DescartesRootFinder::default().find_all_roots(p),
        };
        normalize_roots(roots, 1e-12)
    }

    fn find_all_roots_in(&self, p: &UnivariatePolynomial, lo: f64, hi: f64) -> Vec<f64> {
        if !(lo < hi) {
            return Vec::new();
        }
        let mut roots = self.find_all_roots(p);
        roots.retain(|r| (lo..=hi).contains(r));
        roots
    }
}

/// Roots of `a x^2 + b x + c`, avoiding cancellation between `-b` and the root of the discriminant
pub(crate) fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a == 0.0 {
        return if b == 0.0 { Vec::new() } else { vec![-c / b] };
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    if disc == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    let q = if q == 0.0 { -0.5 * disc.sqrt() } else { q };
    if c == 0.0 {
        // One root at zero; q / a is the other
        return vec![0.0, q / a];
    }
    vec![q / a, c / q]
}

/// Real roots of `a x^3 + b x^2 + c x + d`
pub(crate) fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a == 0.0 {
        return solve_quadratic(b, c, d);
    }

    // Normalize: x^3 + px^2 + qx + r = 0
    let p = b / a;
    let q = c / a;
    let r = d / a;

    // Depressed cubic via substitution x = y - p/3: y^3 + aa*y + bb = 0
    let p2 = p * p;
    let aa = q - p2 / 3.0;
    let bb = r - p * q / 3.0 + 2.0 * p2 * p / 27.0;
    let shift = p / 3.0;

    let delta = bb * bb / 4.0 + aa * aa * aa / 27.0;
    let scale = (bb * bb / 4.0).abs().max((aa * aa * aa / 27.0).abs());
    let tiny = 1e-14 * scale.max(f64::MIN_POSITIVE);

    if delta > tiny {
        // One real root (Cardano)
        let sqrt_delta = delta.sqrt();
        let u = (-bb / 2.0 + sqrt_delta).cbrt();
        let v = (-bb / 2.0 - sqrt_delta).cbrt();
        vec![u + v - shift]
    } else if delta.abs() <= tiny {
        if aa.abs() <= 1e-14 * (1.0 + p2) {
            // Triple root
            vec![-shift]
        } else {
            // Double root
            let u = (-bb / 2.0).cbrt();
            vec![2.0 * u - shift, -u - shift]
        }
    } else {
        // Three real roots (trigonometric form)
        let m = 2.0 * (-aa / 3.0).sqrt();
        let theta = (3.0 * bb / (aa * m)).clamp(-1.0, 1.0).acos() / 3.0;
        vec![
            m * theta.cos() - shift,
            m * (theta - 2.0 * PI / 3.0).cos() - shift,
            m * (theta + 2.0 * PI / 3.0).cos() - shift,
        ]
    }
}

/// Real roots of `a x^4 + b x^3 + c x^2 + d x + e` (Ferrari)
pub(crate) fn solve_quartic(a: f64, b: f64, c: f64, d: f64, e: f64) -> Vec<f64> {
    if a == 0.0 {
        return solve_cubic(b, c, d, e);
    }

    // Normalize: x^4 + px^3 + qx^2 + rx + s = 0
    let p = b / a;
    let q = c / a;
    let r = d / a;
    let s = e / a;

    // Depressed quartic via x = y - p/4: y^4 + a2*y^2 + a1*y + a0 = 0
    let p2 = p * p;
    let a2 = q - 3.0 * p2 / 8.0;
    let a1 = r - p * q / 2.0 + p2 * p / 8.0;
    let a0 = s - p * r / 4.0 + p2 * q / 16.0 - 3.0 * p2 * p2 / 256.0;
    let shift = p / 4.0;

    let magnitude = 1.0 + a2.abs() + a0.abs().sqrt();
    let mut roots = Vec::with_capacity(4);

    if a1.abs() <= 1e-14 * magnitude * magnitude.sqrt() {
        // Biquadratic: z = y^2
        for z in solve_quadratic(1.0, a2, a0) {
            if z > 0.0 {
                let y = z.sqrt();
                roots.push(y - shift);
                roots.push(-y - shift);
            } else if z == 0.0 {
                roots.push(-shift);
            }
        }
        return roots;
    }

    // Resolvent cubic 8m^3 + 8 a2 m^2 + (2 a2^2 - 8 a0) m - a1^2 = 0 has a positive root
    let m = solve_cubic(8.0, 8.0 * a2, 2.0 * a2 * a2 - 8.0 * a0, -a1 * a1)
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);
    if !(m > 0.0) {
        return roots;
    }
    let sq = (2.0 * m).sqrt();
    let offset = a1 / (2.0 * sq);

    // y^2 - sq*y + (a2/2 + m + offset) = 0 and y^2 + sq*y + (a2/2 + m - offset) = 0
    for y in solve_quadratic(1.0, -sq, a2 / 2.0 + m + offset) {
        roots.push(y - shift);
    }
    for y in solve_quadratic(1.0, sq, a2 / 2.0 + m - offset) {
        roots.push(y - shift);
    }
    roots
}
