//! Rays, cameras and bounding volumes
//!
//! Three coordinate systems take part in a draw: camera space (where rays are
//! generated and shading happens), clipping space (where the bounding volume
//! lives) and surface space (where the polynomial is defined).
mod camera;
mod clipping;
mod ray;
mod ray_creator;

pub use camera::{Camera, CameraKind};
pub use clipping::{ClipBlowUpSurface, ClipToSphere, ClipToTorus, ClipVolume, Clipper, Interval};
pub use ray::Ray;
pub use ray_creator::RayCreator;
