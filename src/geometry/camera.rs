use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

/// Projection of a [`Camera`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraKind {
    /// Rays from the origin through the image plane at z = -1
    Perspective { fov_y_degrees: f64 },
    /// Parallel rays along -z; `height` is the visible extent in v
    Orthographic { height: f64 },
}

/// Camera description handed over by the scene loader
///
/// The camera looks down its local -z axis with +y up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub kind: CameraKind,
    pub camera_to_world: DMat4,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            kind: CameraKind::Perspective { fov_y_degrees: 60.0 },
            camera_to_world: DMat4::from_translation(DVec3::new(0.0, 0.0, 3.0)),
        }
    }
}

impl Camera {
    pub fn perspective(fov_y_degrees: f64) -> Self {
        Camera {
            kind: CameraKind::Perspective { fov_y_degrees },
            ..Camera::default()
        }
    }

    pub fn orthographic(height: f64) -> Self {
        Camera {
            kind: CameraKind::Orthographic { height },
            ..Camera::default()
        }
    }

    pub fn with_transform(mut self, camera_to_world: DMat4) -> Self {
        self.camera_to_world = camera_to_world;
        self
    }

    /// Place the camera at `eye`, looking at `target`
    pub fn looking_at(self, eye: DVec3, target: DVec3, up: DVec3) -> Self {
        self.with_transform(DMat4::look_at_rh(eye, target, up).inverse())
    }

    /// Half the visible extent of the image plane in v
    pub fn half_height(&self) -> f64 {
        match self.kind {
            CameraKind::Perspective { fov_y_degrees } => (0.5 * fov_y_degrees.to_radians()).tan(),
            CameraKind::Orthographic { height } => 0.5 * height,
        }
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self.kind, CameraKind::Perspective { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let cam = Camera::default();
        assert!(cam.is_perspective());
        assert!((cam.half_height() - (30f64).to_radians().tan()).abs() < 1e-15);
        let eye = cam.camera_to_world.transform_point3(DVec3::ZERO);
        assert_eq!(eye, DVec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_looking_at() {
        let cam = Camera::orthographic(2.0).looking_at(
            DVec3::new(5.0, 0.0, 0.0),
            DVec3::ZERO,
            DVec3::Y,
        );
        let forward = cam.camera_to_world.transform_vector3(DVec3::NEG_Z);
        assert!((forward - DVec3::NEG_X).length() < 1e-12);
        assert_eq!(cam.half_height(), 1.0);
    }
}
