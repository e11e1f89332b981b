use glam::Vec3;

use super::draw_state::DrawState;
use super::provider::RowPair;
use crate::geometry::Ray;
use crate::poly::UnivariatePolynomial;

/// Traces single rays against the surface of a draw call
#[derive(Debug, Clone, Copy)]
pub(crate) struct PolynomialTracer<'a> {
    state: &'a DrawState,
}

impl<'a> PolynomialTracer<'a> {
    pub fn new(state: &'a DrawState) -> Self {
        PolynomialTracer { state }
    }

    /// Color of the ray through (u, row.v)
    pub fn trace(&self, row: &RowPair, u: f64) -> Vec3 {
        match self.closest_hit(row, u) {
            Some(t) => self.shade(row, u, t),
            None => self.state.background,
        }
    }

    /// Smallest visible ray parameter at which the ray meets the surface
    pub fn closest_hit(&self, row: &RowPair, u: f64) -> Option<f64> {
        let state = self.state;
        let clipping_ray = state.ray_creator.clipping_ray(u, row.v);
        let intervals = state.clipper.clip_ray(&clipping_ray);
        if intervals.is_empty() {
            return None;
        }

        let poly = row.surface.for_column(u);
        let eye = state.ray_creator.eye_location();
        intervals.iter().find_map(|interval| {
            // nothing in front of the eye counts
            let start = interval.start.max(eye);
            let end = interval.end;
            if !(end - start > 0.0) {
                return None;
            }
            self.first_root(&poly, start, end, &clipping_ray)
        })
    }

    fn first_root(&self, poly: &UnivariatePolynomial, start: f64, end: f64, clipping_ray: &Ray) -> Option<f64> {
        let state = self.state;
        if state.clipper.point_clipping_necessary() {
            state
                .root_finder
                .find_all_roots_in(poly, start, end)
                .into_iter()
                .find(|&t| state.clipper.clip_point(clipping_ray.at(t)))
        } else {
            state.root_finder.find_first_root_in(poly, start, end)
        }
    }

    fn shade(&self, row: &RowPair, u: f64, t: f64) -> Vec3 {
        let state = self.state;
        let gradient = row.gradient.for_column(u).at(t);
        let mut normal = state.ray_creator.normal_to_camera(gradient);
        // singular points keep their zero normal
        let length = normal.length();
        if length != 0.0 {
            normal /= length;
        }

        let ray = state.ray_creator.camera_ray(u, row.v);
        let view = (-ray.direction).normalize_or_zero();
        let point = ray.at(t);
        if normal.dot(view) <= 0.0 {
            state.back.shade(point, view, -normal)
        } else {
            state.front.shade(point, view, normal)
        }
    }
}

/// Quantise a color channel to a byte
#[inline]
pub(crate) fn to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[inline]
pub(crate) fn to_rgb(c: Vec3) -> [u8; 3] {
    [to_byte(c.x), to_byte(c.y), to_byte(c.z)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Camera;
    use crate::parse;
    use crate::render::RenderConfig;
    use crate::render::provider::RowProvider;
    use crate::scene::Scene;
    use crate::shading::Material;

    fn state_for(surface: &str, width: u32, height: u32) -> DrawState {
        let scene = Scene::new(parse(surface).unwrap())
            .with_camera(Camera::default())
            .with_background(Vec3::new(0.0, 0.0, 1.0))
            .with_back_material(Material {
                color: Vec3::new(1.0, 0.0, 0.0),
                specular_intensity: 0.0,
                ..Material::default()
            });
        DrawState::new(&scene, &RenderConfig::default(), width, height).unwrap()
    }

    #[test]
    fn test_centre_ray_hits_sphere_front() {
        // camera at z = 3 looking down -z; sphere of radius 0.5 hit at t = 2.5
        let state = state_for("x^2+y^2+z^2-0.25", 9, 9);
        let tracer = PolynomialTracer::new(&state);
        let mut provider = RowProvider::new(&state, 0.0, 1);
        let row = provider.get(4);
        let u = state.ray_creator.u_at(4.0);
        assert!(u.abs() < 1e-12 && row.v.abs() < 1e-12);
        let t = tracer.closest_hit(&row, u).unwrap();
        assert!((t - 2.5).abs() < 1e-9);
        let c = tracer.trace(&row, u);
        assert_ne!(c, state.background);
    }

    #[test]
    fn test_corner_ray_misses() {
        let state = state_for("x^2+y^2+z^2-0.25", 9, 9);
        let tracer = PolynomialTracer::new(&state);
        let mut provider = RowProvider::new(&state, 0.0, 1);
        let row = provider.get(0);
        assert_eq!(tracer.trace(&row, state.ray_creator.u_at(0.0)), state.background);
    }

    #[test]
    fn test_plane_seen_from_behind_uses_back_material() {
        // gradient of -z points away from the camera
        let state = state_for("-z", 5, 5);
        let tracer = PolynomialTracer::new(&state);
        let mut provider = RowProvider::new(&state, 0.0, 1);
        let row = provider.get(2);
        let c = tracer.trace(&row, 0.0);
        assert!(c.x > 0.0 && c.y == 0.0 && c.z == 0.0, "{:?}", c);
    }

    #[test]
    fn test_to_byte_rounding() {
        assert_eq!(to_byte(0.0), 0);
        assert_eq!(to_byte(1.0), 255);
        assert_eq!(to_byte(0.5), 128);
        assert_eq!(to_byte(-3.0), 0);
        assert_eq!(to_rgb(Vec3::new(1.0, 0.0, 0.2)), [255, 0, 51]);
    }
}
