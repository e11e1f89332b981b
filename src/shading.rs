//! Phong-style reflectance
//!
//! Light positions, hit points, view vectors and normals are all in camera space.

use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Number of light slots in a scene
pub const MAX_LIGHTS: usize = 8;

/// Reflectance of one side of the surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Vec3,
    pub ambient_intensity: f32,
    pub diffuse_intensity: f32,
    pub specular_intensity: f32,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            color: Vec3::splat(0.5),
            ambient_intensity: 0.1,
            diffuse_intensity: 0.23232,
            specular_intensity: 0.9,
            shininess: 1.0,
        }
    }
}

impl Material {
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn ambient_color(&self) -> Vec3 {
        self.color * self.ambient_intensity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LightStatus {
    #[default]
    On,
    Off,
}

/// Point light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub status: LightStatus,
    pub position: DVec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for LightSource {
    fn default() -> Self {
        LightSource {
            status: LightStatus::On,
            position: DVec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

impl LightSource {
    pub fn at(position: DVec3) -> Self {
        LightSource {
            position,
            ..LightSource::default()
        }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn is_on(&self) -> bool {
        self.status == LightStatus::On
    }
}

/// Light and material factors that do not depend on the hit point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightProducts {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl LightProducts {
    pub fn new(light: &LightSource, material: &Material) -> Self {
        LightProducts {
            diffuse: material.color * light.color * (material.diffuse_intensity * light.intensity),
            specular: light.color * (material.specular_intensity * light.intensity),
            shininess: material.shininess,
        }
    }
}

/// Shades hit points for one material against a fixed set of lights
#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    ambient: Vec3,
    lights: Vec<(DVec3, LightProducts)>,
}

impl Shader {
    /// Lights that are switched off are skipped
    pub fn new<'a>(material: &Material, lights: impl IntoIterator<Item = &'a LightSource>) -> Self {
        let lights = lights
            .into_iter()
            .filter(|l| l.is_on())
            .map(|l| (l.position, LightProducts::new(l, material)))
            .collect();
        Shader {
            ambient: material.ambient_color(),
            lights,
        }
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Color at `point` seen along `view` (unit, towards the eye) with unit `normal`
    pub fn shade(&self, point: DVec3, view: DVec3, normal: DVec3) -> Vec3 {
        let mut color = self.ambient;
        for (position, products) in &self.lights {
            let l = (*position - point).normalize_or_zero();
            let lambert = normal.dot(l);
            if lambert > 0.0 {
                color += products.diffuse * lambert as f32;

                let h = (l + view).normalize_or_zero();
                let highlight = normal.dot(h).max(0.0).powf(f64::from(products.shininess));
                color += products.specular * highlight as f32;
            }
        }
        color.clamp(Vec3::ZERO, Vec3::ONE)
    }
}
