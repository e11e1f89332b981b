//! Staged substitution against tree-level composition
//!
//! The renderer never substitutes rays into trees; it composes canonical
//! polynomials once and specialises per row and column. These tests check that
//! pipeline against the direct route on the same surfaces and cameras.

#[cfg(test)]
mod staged_substitution_tests {
    use glam::{DMat4, DVec3};

    use crate::geometry::{Camera, RayCreator};
    use crate::poly::{GradientRowSubstitutor, RowSubstitutor, expand};
    use crate::roots::{DescartesRootFinder, RealRootFinder};
    use crate::{Expr, Parameters, Var, evaluate, parameters, parse, substitute_variables};

    const TORUS: &str = "(x^2+y^2+z^2+R^2-r^2)^2-4*R^2*(x^2+y^2)";

    fn torus_bindings() -> Parameters {
        parameters([("R", 0.6), ("r", 0.25)])
    }

    fn creator(camera: Camera) -> RayCreator {
        let transform = DMat4::from_rotation_x(0.7) * DMat4::from_rotation_z(0.2);
        let surface = DMat4::from_scale(DVec3::splat(1.1));
        RayCreator::new(&camera, transform, surface, 64, 48)
    }

    /// The ray through (u, v) as trees in one variable: x plays the role of t
    fn ray_trees(rc: &RayCreator, u: f64, v: f64) -> [Expr; 3] {
        let ray = rc.surface_ray(u, v);
        let o = ray.origin.to_array();
        let d = ray.direction.to_array();
        [0, 1, 2].map(|i| Expr::constant(o[i]) + Expr::constant(d[i]) * Expr::x())
    }

    #[test]
    fn test_row_column_matches_tree_substitution() {
        let surface = parse(TORUS).unwrap();
        let params = torus_bindings();
        let expanded = expand(&surface, &params).unwrap();

        for camera in [Camera::default(), Camera::orthographic(2.5)] {
            let rc = creator(camera);
            let rows = RowSubstitutor::new(&expanded, &rc.ray_components());
            for (px, py) in [(0.0, 0.0), (31.5, 23.0), (63.0, 10.25)] {
                let (u, v) = (rc.u_at(px), rc.v_at(py));
                let along = rows.for_row(v).for_column(u);
                let composed = substitute_variables(&surface, &ray_trees(&rc, u, v));
                for t in [-0.5, 0.0, 1.25, 2.5, 3.75] {
                    let staged = along.evaluate(t);
                    let direct = evaluate(&composed, t, 0.0, 0.0, &params).unwrap();
                    assert!(
                        (staged - direct).abs() <= 1e-9 * (1.0 + direct.abs()),
                        "pixel ({}, {}) t={}: {} vs {}",
                        px,
                        py,
                        t,
                        staged,
                        direct
                    );
                }
            }
        }
    }

    #[test]
    fn test_gradient_along_ray_matches_tree_gradient() {
        let surface = parse(TORUS).unwrap();
        let params = torus_bindings();
        let gradient = Var::ALL.map(|v| expand(&surface.derive(v), &params).unwrap());

        let rc = creator(Camera::default());
        let rows = GradientRowSubstitutor::new(&gradient, &rc.ray_components());
        let (u, v) = (rc.u_at(20.0), rc.v_at(30.0));
        let along = rows.for_row(v).for_column(u);
        for t in [0.5, 2.0, 3.0] {
            let p = rc.surface_ray(u, v).at(t);
            let expected = Var::ALL.map(|var| {
                evaluate(&surface.derive(var), p.x, p.y, p.z, &params).unwrap()
            });
            let got = along.at(t);
            assert!((got - DVec3::from_array(expected)).length() < 1e-9 * (1.0 + got.length()));
        }
    }

    #[test]
    fn test_torus_hits_from_staged_polynomial() {
        // Looking down the torus axis from z = 3
        let surface = parse(TORUS).unwrap();
        let params = torus_bindings();
        let expanded = expand(&surface, &params).unwrap();
        let camera = Camera::orthographic(2.0)
            .with_transform(DMat4::from_translation(DVec3::new(0.0, 0.0, 3.0)));
        let rc = RayCreator::new(&camera, DMat4::IDENTITY, DMat4::IDENTITY, 3, 3);
        let rows = RowSubstitutor::new(&expanded, &rc.ray_components());

        // The central ray runs along the torus axis and misses
        let center = rows.for_row(rc.v_at(1.0)).for_column(rc.u_at(1.0));
        assert!(DescartesRootFinder::default().find_all_roots(&center).is_empty());

        // A ray through the tube centre line crosses it twice
        let through_tube = rows.for_row(0.0).for_column(0.6);
        let roots = DescartesRootFinder::default().find_all_roots(&through_tube);
        assert_eq!(roots.len(), 2, "{:?}", roots);
        let ray = rc.surface_ray(0.6, 0.0);
        for t in roots {
            let p = ray.at(t);
            let ring = ((p.x * p.x + p.y * p.y).sqrt() - 0.6).hypot(p.z);
            assert!((ring - 0.25).abs() < 1e-9, "hit {:?} off the tube", p);
        }
    }

    #[test]
    fn test_constant_surface_derivative_is_zero_everywhere() {
        let e = parse("a*b-sin(c)").unwrap();
        let params = parameters([("a", 1.0), ("b", 2.0), ("c", 0.3)]);
        for v in Var::ALL {
            assert!(expand(&e.derive(v), &params).unwrap().is_zero());
        }
    }
}
