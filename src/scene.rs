//! Everything a draw call reads besides the render configuration

use glam::{DMat4, Vec3};
use log::warn;

use crate::ast::Expr;
use crate::evaluate::Parameters;
use crate::geometry::Camera;
use crate::shading::{LightSource, MAX_LIGHTS, Material};

/// Surface, bindings, camera, materials and lights
///
/// Light positions are given in camera space. `transform` maps world space to
/// clipping space, where the bounding volume lives; `surface_transform` maps
/// clipping space to the coordinates of the surface polynomial.
#[derive(Debug, Clone)]
pub struct Scene {
    pub surface: Expr,
    pub parameters: Parameters,
    pub camera: Camera,
    pub front_material: Material,
    pub back_material: Material,
    pub lights: [Option<LightSource>; MAX_LIGHTS],
    pub background: Vec3,
    pub transform: DMat4,
    pub surface_transform: DMat4,
}

impl Scene {
    /// A scene with default camera and materials and one light at the eye
    pub fn new(surface: Expr) -> Self {
        let mut lights = [None; MAX_LIGHTS];
        lights[0] = Some(LightSource::default());
        Scene {
            surface,
            parameters: Parameters::default(),
            camera: Camera::default(),
            front_material: Material::default(),
            back_material: Material::default(),
            lights,
            background: Vec3::ONE,
            transform: DMat4::IDENTITY,
            surface_transform: DMat4::IDENTITY,
        }
    }

    pub fn with_surface(mut self, surface: Expr) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_front_material(mut self, material: Material) -> Self {
        self.front_material = material;
        self
    }

    pub fn with_back_material(mut self, material: Material) -> Self {
        self.back_material = material;
        self
    }

    /// Put `light` into `slot`; slots beyond [`MAX_LIGHTS`] are ignored
    pub fn with_light(mut self, slot: usize, light: Option<LightSource>) -> Self {
        match self.lights.get_mut(slot) {
            Some(entry) => *entry = light,
            None => warn!("light slot {} out of range (max {})", slot, MAX_LIGHTS),
        }
        self
    }

    pub fn with_background(mut self, background: Vec3) -> Self {
        self.background = background;
        self
    }

    pub fn with_transform(mut self, transform: DMat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_surface_transform(mut self, surface_transform: DMat4) -> Self {
        self.surface_transform = surface_transform;
        self
    }

    /// Lights that exist and are switched on
    pub fn active_lights(&self) -> impl Iterator<Item = &LightSource> + '_ {
        self.lights.iter().flatten().filter(|l| l.is_on())
    }
}
