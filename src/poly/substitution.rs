//! Staged substitution of ray families into surface polynomials
//!
//! The ray components are polynomials in (t, u, v), held in the x, y, z slots of an
//! [`XyzPolynomial`]. Composing the surface with them once per draw leaves a
//! polynomial in (t, u, v); fixing v per row and u per column then costs only
//! partial evaluations.

use glam::DVec3;

use crate::poly::{UnivariatePolynomial, XyPolynomial, XyzPolynomial};

/// The three coordinates of a ray family as polynomials in (t, u, v)
#[derive(Debug, Clone, PartialEq)]
pub struct RayComponents {
    pub x: XyzPolynomial,
    pub y: XyzPolynomial,
    pub z: XyzPolynomial,
}

impl RayComponents {
    /// Compose `p` with the ray family
    pub fn compose(&self, p: &XyzPolynomial) -> XyzPolynomial {
        p.substitute(&self.x, &self.y, &self.z)
    }

    /// The point of the ray (u, v) at parameter t
    pub fn point(&self, t: f64, u: f64, v: f64) -> DVec3 {
        DVec3::new(
            self.x.evaluate(t, u, v),
            self.y.evaluate(t, u, v),
            self.z.evaluate(t, u, v),
        )
    }
}

/// Surface polynomial composed with a ray family, awaiting a row
#[derive(Debug, Clone)]
pub struct RowSubstitutor {
    tuv: XyzPolynomial,
}

impl RowSubstitutor {
    pub fn new(surface: &XyzPolynomial, rays: &RayComponents) -> Self {
        RowSubstitutor {
            tuv: rays.compose(surface),
        }
    }

    pub fn composed(&self) -> &XyzPolynomial {
        &self.tuv
    }

    pub fn for_row(&self, v: f64) -> ColumnSubstitutor {
        ColumnSubstitutor {
            tu: self.tuv.evaluate_z(v),
        }
    }
}

/// Polynomial in (t, u) for one row
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSubstitutor {
    tu: XyPolynomial,
}

impl ColumnSubstitutor {
    /// Polynomial in t along the ray (u, v)
    pub fn for_column(&self, u: f64) -> UnivariatePolynomial {
        self.tu.evaluate_y(u)
    }
}

/// The three partial derivatives composed with a ray family
#[derive(Debug, Clone)]
pub struct GradientRowSubstitutor {
    components: [RowSubstitutor; 3],
}

impl GradientRowSubstitutor {
    pub fn new(gradient: &[XyzPolynomial; 3], rays: &RayComponents) -> Self {
        GradientRowSubstitutor {
            components: [
                RowSubstitutor::new(&gradient[0], rays),
                RowSubstitutor::new(&gradient[1], rays),
                RowSubstitutor::new(&gradient[2], rays),
            ],
        }
    }

    pub fn for_row(&self, v: f64) -> GradientColumnSubstitutor {
        GradientColumnSubstitutor {
            components: [
                self.components[0].for_row(v),
                self.components[1].for_row(v),
                self.components[2].for_row(v),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientColumnSubstitutor {
    components: [ColumnSubstitutor; 3],
}

impl GradientColumnSubstitutor {
    pub fn for_column(&self, u: f64) -> GradientAlongRay {
        GradientAlongRay {
            components: [
                self.components[0].for_column(u),
                self.components[1].for_column(u),
                self.components[2].for_column(u),
            ],
        }
    }
}

/// Surface gradient along one ray as a function of t
#[derive(Debug, Clone, PartialEq)]
pub struct GradientAlongRay {
    components: [UnivariatePolynomial; 3],
}

impl GradientAlongRay {
    pub fn at(&self, t: f64) -> DVec3 {
        DVec3::new(
            self.components[0].evaluate(t),
            self.components[1].evaluate(t),
            self.components[2].evaluate(t),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::Parameters;
    use crate::poly::expand;
    use crate::{Var, parse};

    fn poly(input: &str) -> XyzPolynomial {
        expand(&parse(input).unwrap(), &Parameters::default()).unwrap()
    }

    /// Perspective-like family: origin (0, 0, 2), direction (u, v, -1)
    fn rays() -> RayComponents {
        RayComponents {
            x: &XyzPolynomial::x() * &XyzPolynomial::y(),
            y: &XyzPolynomial::x() * &XyzPolynomial::z(),
            z: XyzPolynomial::affine(2.0, -1.0, 0.0, 0.0),
        }
    }

    #[test]
    fn test_row_then_column_matches_direct_evaluation() {
        let surface = poly("x^2+y^2+z^2-1+x*y*z");
        let rows = RowSubstitutor::new(&surface, &rays());
        let (u, v) = (0.2, -0.1);
        let along = rows.for_row(v).for_column(u);
        for t in [0.0, 0.5, 1.3, 2.0] {
            let p = rays().point(t, u, v);
            let direct = surface.evaluate(p.x, p.y, p.z);
            assert!((along.evaluate(t) - direct).abs() < 1e-12);
        }
    }

    #[test]
    fn test_center_ray_hits_unit_sphere_at_one() {
        let rows = RowSubstitutor::new(&poly("x^2+y^2+z^2-1"), &rays());
        let along = rows.for_row(0.0).for_column(0.0);
        // (2 - t)^2 - 1
        assert_eq!(along.degree(), 2);
        assert!(along.evaluate(1.0).abs() < 1e-15);
        assert!(along.evaluate(3.0).abs() < 1e-15);
    }

    #[test]
    fn test_gradient_along_ray() {
        let surface = parse("x^2+y^2+z^2-1").unwrap();
        let params = Parameters::default();
        let gradient = Var::ALL.map(|v| expand(&surface.derive(v), &params).unwrap());
        let rows = GradientRowSubstitutor::new(&gradient, &rays());
        let g = rows.for_row(0.25).for_column(-0.5).at(1.0);
        let p = rays().point(1.0, -0.5, 0.25);
        assert!((g - 2.0 * p).length() < 1e-12);
    }

    #[test]
    fn test_same_row_gives_identical_result() {
        let rows = RowSubstitutor::new(&poly("x^3-y*z+2"), &rays());
        assert_eq!(rows.for_row(0.375), rows.for_row(0.375));
    }
}
