//! Canonical polynomial engine
//!
//! [`expand`] turns a tree into an [`XyzPolynomial`]; partial evaluation then reduces
//! arity to [`XyPolynomial`] and finally [`UnivariatePolynomial`].
mod expand;
mod substitution;
mod univariate;
mod xy;
mod xyz;

pub use expand::expand;
pub use substitution::{
    ColumnSubstitutor, GradientAlongRay, GradientColumnSubstitutor, GradientRowSubstitutor,
    RayComponents, RowSubstitutor,
};
pub use univariate::UnivariatePolynomial;
pub use xy::XyPolynomial;
pub use xyz::{Exponents, XyzPolynomial};
