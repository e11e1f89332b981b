use glam::{DMat3, DMat4, DVec3};

use super::{Camera, CameraKind, Ray};
use crate::poly::{RayComponents, XyzPolynomial};

/// Generates the rays of one draw call
///
/// Pixel coordinates are continuous: the centre of pixel `(i, j)` is `(i, j)`,
/// its corners are half a pixel away. Row 0 is the top of the image. The
/// centres of the outermost pixels lie on the boundary of the (u, v) window.
#[derive(Debug, Clone)]
pub struct RayCreator {
    kind: CameraKind,
    camera_to_clipping: DMat4,
    camera_to_surface: DMat4,
    normal_to_camera: DMat3,
    u_interval: (f64, f64),
    v_interval: (f64, f64),
    u_start: f64,
    v_start: f64,
    u_step: f64,
    v_step: f64,
}

impl RayCreator {
    /// `transform` maps world space to clipping space, `surface_transform` clipping to surface space
    pub fn new(
        camera: &Camera,
        transform: DMat4,
        surface_transform: DMat4,
        width: u32,
        height: u32,
    ) -> Self {
        let camera_to_clipping = transform * camera.camera_to_world;
        let camera_to_surface = surface_transform * camera_to_clipping;
        // Gradients are covectors: they map back with the transpose of the linear part
        let normal_to_camera = DMat3::from_mat4(camera_to_surface).transpose();

        let aspect = if height == 0 {
            1.0
        } else {
            f64::from(width) / f64::from(height)
        };
        let half_v = camera.half_height();
        let half_u = half_v * aspect;
        let u_interval = (-half_u, half_u);
        let v_interval = (-half_v, half_v);

        RayCreator {
            kind: camera.kind,
            camera_to_clipping,
            camera_to_surface,
            normal_to_camera,
            u_interval,
            v_interval,
            u_start: if width > 1 { u_interval.0 } else { 0.0 },
            v_start: if height > 1 { v_interval.1 } else { 0.0 },
            u_step: step(u_interval, width),
            v_step: step(v_interval, height),
        }
    }

    pub fn u_interval(&self) -> (f64, f64) {
        self.u_interval
    }

    pub fn v_interval(&self) -> (f64, f64) {
        self.v_interval
    }

    /// Distance in u between neighbouring pixel centres
    pub fn u_step(&self) -> f64 {
        self.u_step
    }

    /// Distance in v between neighbouring pixel centres, positive
    pub fn v_step(&self) -> f64 {
        self.v_step
    }

    /// u coordinate of the continuous pixel column `x`
    #[inline]
    pub fn u_at(&self, x: f64) -> f64 {
        self.u_start + x * self.u_step
    }

    /// v coordinate of the continuous pixel row `y`
    #[inline]
    pub fn v_at(&self, y: f64) -> f64 {
        self.v_start - y * self.v_step
    }

    pub fn camera_ray(&self, u: f64, v: f64) -> Ray {
        match self.kind {
            CameraKind::Perspective { .. } => Ray::new(DVec3::ZERO, DVec3::new(u, v, -1.0)),
            CameraKind::Orthographic { .. } => Ray::new(DVec3::new(u, v, 0.0), DVec3::NEG_Z),
        }
    }

    pub fn clipping_ray(&self, u: f64, v: f64) -> Ray {
        self.camera_ray(u, v).transformed(&self.camera_to_clipping)
    }

    pub fn surface_ray(&self, u: f64, v: f64) -> Ray {
        self.camera_ray(u, v).transformed(&self.camera_to_surface)
    }

    /// Ray parameter of the eye: rays must not hit anything before it
    pub fn eye_location(&self) -> f64 {
        match self.kind {
            CameraKind::Perspective { .. } => 0.0,
            CameraKind::Orthographic { .. } => f64::NEG_INFINITY,
        }
    }

    /// Surface-space gradient to camera-space normal (not normalised)
    pub fn normal_to_camera(&self, gradient: DVec3) -> DVec3 {
        self.normal_to_camera * gradient
    }

    pub fn camera_to_clipping(&self) -> &DMat4 {
        &self.camera_to_clipping
    }

    pub fn camera_to_surface(&self) -> &DMat4 {
        &self.camera_to_surface
    }

    /// Surface-space rays as polynomials in (t, u, v)
    pub fn ray_components(&self) -> RayComponents {
        // Camera-space ray family
        let camera = match self.kind {
            CameraKind::Perspective { .. } => [
                XyzPolynomial::monomial([1, 1, 0], 1.0),
                XyzPolynomial::monomial([1, 0, 1], 1.0),
                XyzPolynomial::monomial([1, 0, 0], -1.0),
            ],
            CameraKind::Orthographic { .. } => [
                XyzPolynomial::y(),
                XyzPolynomial::z(),
                XyzPolynomial::monomial([1, 0, 0], -1.0),
            ],
        };
        let m = &self.camera_to_surface;
        let row = |i: usize| {
            let mut out = XyzPolynomial::constant(m.w_axis[i]);
            for (j, component) in camera.iter().enumerate() {
                let factor = m.col(j)[i];
                if factor != 0.0 {
                    out = &out + &component.scale(factor);
                }
            }
            out
        };
        RayComponents {
            x: row(0),
            y: row(1),
            z: row(2),
        }
    }
}

/// Spacing of `n` pixel centres spread over `interval`; a single centre sits in the middle
fn step(interval: (f64, f64), n: u32) -> f64 {
    let span = interval.1 - interval.0;
    if n > 1 { span / f64::from(n - 1) } else { span }
}
