//! Bounding volumes restricting where the surface is visible

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::Ray;
use crate::poly::UnivariatePolynomial;
use crate::roots::{ClosedFormRootFinder, RealRootFinder};

/// Closed range `[start, end]` of the ray parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Interval { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Overlap with `other`, `None` if they are disjoint
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Interval { start, end })
    }
}

/// A bounding volume in clipping space
pub trait Clipper: Send + Sync + fmt::Debug {
    /// Sorted, disjoint parameter intervals where the ray is inside the volume
    fn clip_ray(&self, ray: &Ray) -> Vec<Interval>;

    /// Whether `p` lies inside the volume
    fn clip_point(&self, p: DVec3) -> bool;

    /// True if points found inside a clipped interval still need [`Clipper::clip_point`]
    fn point_clipping_necessary(&self) -> bool;

    /// [`Clipper::clip_ray`] restricted to `bounds`
    fn clip_ray_within(&self, ray: &Ray, bounds: Interval) -> Vec<Interval> {
        self.clip_ray(ray)
            .iter()
            .filter_map(|i| i.intersect(&bounds))
            .collect()
    }

    /// Point test for a point taken from an interval returned by `clip_ray`
    fn accepts(&self, p: DVec3) -> bool {
        !self.point_clipping_necessary() || self.clip_point(p)
    }
}

/// Ball of the given radius around the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipToSphere {
    radius: f64,
}

impl Default for ClipToSphere {
    fn default() -> Self {
        ClipToSphere { radius: 1.0 }
    }
}

impl ClipToSphere {
    pub fn new(radius: f64) -> Self {
        ClipToSphere { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Clipper for ClipToSphere {
    fn clip_ray(&self, ray: &Ray) -> Vec<Interval> {
        let length = ray.direction.length();
        if length == 0.0 {
            return Vec::new();
        }
        let d = ray.direction / length;
        let o = ray.origin;

        let b = -o.dot(d);
        let c = o.dot(o) - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return Vec::new();
        }
        let sqrt_disc = disc.sqrt();
        vec![Interval::new((b - sqrt_disc) / length, (b + sqrt_disc) / length)]
    }

    fn clip_point(&self, p: DVec3) -> bool {
        p.length_squared() <= self.radius * self.radius
    }

    fn point_clipping_necessary(&self) -> bool {
        false
    }
}

/// Solid torus around the x axis with major radius `major` and tube radius `minor`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipToTorus {
    major: f64,
    minor: f64,
}

impl Default for ClipToTorus {
    fn default() -> Self {
        ClipToTorus::new(1.0, 1.0)
    }
}

impl ClipToTorus {
    pub fn new(major: f64, minor: f64) -> Self {
        ClipToTorus { major, minor }
    }

    pub fn major(&self) -> f64 {
        self.major
    }

    pub fn minor(&self) -> f64 {
        self.minor
    }

    /// `(|p|^2 + R^2 - r^2)^2 - 4 R^2 (y^2 + z^2)` along the ray
    fn boundary_polynomial(&self, ray: &Ray) -> UnivariatePolynomial {
        let x = UnivariatePolynomial::linear(ray.origin.x, ray.direction.x);
        let y = UnivariatePolynomial::linear(ray.origin.y, ray.direction.y);
        let z = UnivariatePolynomial::linear(ray.origin.z, ray.direction.z);
        let (big, small) = (self.major * self.major, self.minor * self.minor);

        let x2 = &x * &x;
        let yz2 = &(&y * &y) + &(&z * &z);
        let inner = &(&x2 + &yz2) + &UnivariatePolynomial::constant(big - small);
        &(&inner * &inner) - &yz2.scale(4.0 * big)
    }

    fn contains(&self, p: DVec3) -> bool {
        let (big, small) = (self.major * self.major, self.minor * self.minor);
        let term = p.length_squared() + big - small;
        term * term <= 4.0 * big * (p.y * p.y + p.z * p.z)
    }
}

impl Clipper for ClipToTorus {
    fn clip_ray(&self, ray: &Ray) -> Vec<Interval> {
        let roots = ClosedFormRootFinder.find_all_roots(&self.boundary_polynomial(ray));
        // Tangential roots may be merged, so decide each gap by its midpoint
        let mut intervals: Vec<Interval> = Vec::with_capacity(2);
        for pair in roots.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if !self.contains(ray.at(0.5 * (start + end))) {
                continue;
            }
            match intervals.last_mut() {
                Some(last) if last.end == start => last.end = end,
                _ => intervals.push(Interval::new(start, end)),
            }
        }
        intervals
    }

    fn clip_point(&self, p: DVec3) -> bool {
        self.contains(p)
    }

    fn point_clipping_necessary(&self) -> bool {
        false
    }
}

/// Torus clipping plus a point test that cuts a blow-up surface open along its exceptional curve
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClipBlowUpSurface {
    torus: ClipToTorus,
}

const BLOWUP_EPS: f64 = 1e-4;

impl ClipBlowUpSurface {
    pub fn new(major: f64, minor: f64) -> Self {
        ClipBlowUpSurface {
            torus: ClipToTorus::new(major, minor),
        }
    }

    pub fn major(&self) -> f64 {
        self.torus.major
    }

    pub fn minor(&self) -> f64 {
        self.torus.minor
    }
}

fn blowup_f(u: f64) -> f64 {
    u * u - 0.25
}

fn blowup_g(v: f64) -> f64 {
    v * v - 0.25
}

impl Clipper for ClipBlowUpSurface {
    fn clip_ray(&self, ray: &Ray) -> Vec<Interval> {
        self.torus.clip_ray(ray)
    }

    fn clip_point(&self, p: DVec3) -> bool {
        let big = self.torus.major;
        let small = self.torus.minor;

        // Coordinates in the disc swept around the x axis
        let u = p.x;
        let radial = (p.y * p.y + p.z * p.z).sqrt();
        let far = big + radial;
        let (inside, outside) = if u * u + far * far < big * big {
            (far, big - radial)
        } else {
            (big - radial, far)
        };

        if u * u + inside * inside > small * small {
            return false;
        }

        let f = blowup_f(u);
        let g = blowup_g(outside);
        let norm = g * g + f * f;
        let dz = (p.z * norm - 2.0 * (big - outside) * f * g).abs();
        let dy = (p.y * norm + (big - outside) * (g * g - f * f)).abs();
        dz.max(dy) >= BLOWUP_EPS * norm
    }

    fn point_clipping_necessary(&self) -> bool {
        true
    }
}

/// Bounding volume selection for a render configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClipVolume {
    Sphere { radius: f64 },
    Torus { major: f64, minor: f64 },
    BlowUp { major: f64, minor: f64 },
}

impl Default for ClipVolume {
    fn default() -> Self {
        ClipVolume::Sphere { radius: 1.0 }
    }
}

impl ClipVolume {
    pub fn clipper(&self) -> Box<dyn Clipper> {
        match *self {
            ClipVolume::Sphere { radius } => Box::new(ClipToSphere::new(radius)),
            ClipVolume::Torus { major, minor } => Box::new(ClipToTorus::new(major, minor)),
            ClipVolume::BlowUp { major, minor } => Box::new(ClipBlowUpSurface::new(major, minor)),
        }
    }
}
