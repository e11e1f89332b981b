//! Algebraic Surface Ray Tracer
//!
//! Renders implicit surfaces `f(x, y, z) = 0` where `f` is a polynomial in x, y, z
//! whose coefficients may be arbitrary real expressions in named parameters.
//!
//! # Features
//! - Two-layer expression trees: a polynomial layer over x, y, z and a scalar layer
//!   of parameters, constants and elementary functions
//! - Differentiation, simplification, degree analysis and copying parameter renames
//! - Expansion into canonical XYZ polynomials with partial evaluation of parameters
//! - Staged substitution of the camera's ray family into the surface, per row and column
//! - Real root isolation: closed forms for degree ≤ 2, Descartes' rule of signs above
//! - Phong shading with front and back materials and up to eight lights
//! - Tile-parallel rendering with adaptive 2×2 supersampling and cooperative cancellation
//!
//! # Usage Examples
//!
//! ## One-shot rendering
//! ```ignore
//! use algesurf::render_str;
//! let rgb = render_str("x^2+y^2+z^2-r^2", &[("r", 1.0)], 64, 64).unwrap();
//! assert_eq!(rgb.len(), 64 * 64 * 3);
//! ```
//!
//! ## Scene and renderer
//! ```ignore
//! use algesurf::{parse, Renderer, RenderConfig, Scene};
//! let scene = Scene::new(parse("x^4-5*x^2+y^4-5*y^2+z^4-5*z^2+11.8").unwrap());
//! let renderer = Renderer::new(scene.with_parameter("a", 1.0), RenderConfig::default())?;
//! let mut rgb = vec![0u8; 320 * 240 * 3];
//! renderer.draw(&mut rgb, 320, 240)?;
//! ```

mod analysis;
mod ast;
mod differentiation;
mod display;
mod error;
mod evaluate;
pub mod geometry;
mod parser;
pub mod poly;
pub mod render;
pub mod roots;
pub mod scene;
pub mod shading;
mod simplification;
pub mod visitor;

#[cfg(test)]
mod tests;

// Re-export key types for easier usage
pub use analysis::{degree, parameters as free_parameters, rename_parameters, substitute_variables};
pub use ast::{Expr, ExprKind, Scalar, ScalarBinaryOp, ScalarKind, ScalarUnaryOp, Var};
pub use error::SurfError;
pub use evaluate::{Parameters, evaluate, evaluate_scalar, parameters};
pub use parser::parse;
pub use poly::{UnivariatePolynomial, XyzPolynomial, expand};
pub use render::{AntiAliasingMode, AntiAliasingPattern, RenderConfig, Renderer};
pub use scene::Scene;
pub use simplification::{Simplifier, simplify_expr};

/// Parse, differentiate and simplify in one call
///
/// # Arguments
/// * `formula` - Surface polynomial (e.g., "x^2 + a*y^2 - z")
/// * `var` - One of "x", "y", "z"
///
/// # Returns
/// The simplified partial derivative, printed, or an error if `formula` does not parse
/// or `var` is not a coordinate variable
///
/// # Example
/// ```ignore
/// let d = derive_str("x^3 + a*y", "x").unwrap();
/// assert_eq!(d, "3 * x^2");
/// ```
pub fn derive_str(formula: &str, var: &str) -> Result<String, SurfError> {
    let var = Var::from_name(var)
        .ok_or_else(|| SurfError::malformed(format!("'{}' is not one of x, y, z", var)))?;
    let expr = parse(formula)?;
    Ok(simplify_expr(&expr.derive(var)).to_string())
}

/// Render a surface with default scene, camera and antialiasing settings
///
/// # Arguments
/// * `formula` - Surface polynomial
/// * `bindings` - Values for every parameter in `formula`
/// * `width`, `height` - Image size in pixels
///
/// # Returns
/// `width * height * 3` bytes of row-major RGB
///
/// # Note
/// Each call builds a fresh worker pool. Keep a [`Renderer`] around to draw repeatedly.
pub fn render_str(
    formula: &str,
    bindings: &[(&str, f64)],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, SurfError> {
    let scene = Scene::new(parse(formula)?).with_parameters(parameters(bindings.iter().copied()));
    let renderer = Renderer::new(scene, RenderConfig::default())?;
    let mut rgb = vec![0u8; width as usize * height as usize * 3];
    renderer.draw(&mut rgb, width, height)?;
    Ok(rgb)
}
