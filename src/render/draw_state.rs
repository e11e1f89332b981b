use glam::Vec3;
use log::{debug, warn};

use super::{AntiAliasingPattern, RenderConfig};
use crate::SurfError;
use crate::geometry::{Clipper, RayCreator};
use crate::poly::{GradientRowSubstitutor, RowSubstitutor, XyzPolynomial, expand};
use crate::roots::{RealRootFinder, root_finder_for_degree};
use crate::scene::Scene;
use crate::shading::Shader;
use crate::simplification::Simplifier;

/// Everything a draw call computes up front, read-only while tiles run
#[derive(Debug)]
pub(crate) struct DrawState {
    pub degree: u32,
    pub rows: RowSubstitutor,
    pub gradient_rows: GradientRowSubstitutor,
    pub root_finder: Box<dyn RealRootFinder>,
    pub front: Shader,
    pub back: Shader,
    pub background: Vec3,
    pub pattern: AntiAliasingPattern,
    pub threshold: f32,
    pub ray_creator: RayCreator,
    pub clipper: Box<dyn Clipper>,
}

impl DrawState {
    /// Expand the surface and its gradient and compose both with the camera's ray family
    ///
    /// # Errors
    /// `SurfError::UnboundParameter` if the surface names a parameter without binding
    pub fn new(scene: &Scene, config: &RenderConfig, width: u32, height: u32) -> Result<Self, SurfError> {
        let params = &scene.parameters;
        let surface = expand(&scene.surface, params)?;
        if surface.is_zero() {
            warn!("surface polynomial is identically zero; nothing will be visible");
        }

        let simplifier = Simplifier::new().with_bindings(params);
        let [dx, dy, dz] = scene.surface.gradient();
        let gradient: [XyzPolynomial; 3] = [
            expand(&simplifier.simplify(&dx), params)?,
            expand(&simplifier.simplify(&dy), params)?,
            expand(&simplifier.simplify(&dz), params)?,
        ];

        let degree = surface.total_degree();
        let root_finder = root_finder_for_degree(degree);
        debug!(
            "surface of degree {} with {} terms, root finder {:?}",
            degree,
            surface.term_count(),
            root_finder
        );

        let ray_creator = RayCreator::new(
            &scene.camera,
            scene.transform,
            scene.surface_transform,
            width,
            height,
        );
        let rays = ray_creator.ray_components();

        Ok(DrawState {
            degree,
            rows: RowSubstitutor::new(&surface, &rays),
            gradient_rows: GradientRowSubstitutor::new(&gradient, &rays),
            root_finder,
            front: Shader::new(&scene.front_material, scene.active_lights()),
            back: Shader::new(&scene.back_material, scene.active_lights()),
            background: scene.background,
            pattern: config.pattern,
            threshold: config.threshold(),
            ray_creator,
            clipper: config.clip.clipper(),
        })
    }
}
