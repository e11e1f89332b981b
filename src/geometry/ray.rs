use glam::{DMat4, DVec3};

/// `origin + t * direction`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Ray { origin, direction }
    }

    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + t * self.direction
    }

    /// Image under an affine map; the parametrisation by t is preserved
    pub fn transformed(&self, m: &DMat4) -> Ray {
        Ray {
            origin: m.transform_point3(self.origin),
            direction: m.transform_vector3(self.direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transformed_keeps_parameter() {
        let ray = Ray::new(DVec3::new(1.0, 0.0, 0.0), DVec3::new(0.0, 2.0, -1.0));
        let m = DMat4::from_translation(DVec3::new(0.0, 0.0, 5.0)) * DMat4::from_scale(DVec3::splat(2.0));
        let moved = ray.transformed(&m);
        for t in [-1.0, 0.0, 0.5, 3.0] {
            assert!((moved.at(t) - m.transform_point3(ray.at(t))).length() < 1e-12);
        }
    }
}
