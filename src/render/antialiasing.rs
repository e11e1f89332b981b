//! Sampling patterns for 2x2 adaptive supersampling

use serde::{Deserialize, Serialize};

/// When to take samples beyond the four pixel corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AntiAliasingMode {
    /// Refine every pixel
    Supersampling,
    /// Refine only pixels whose corner colors differ noticeably
    #[default]
    AdaptiveSupersampling,
}

impl AntiAliasingMode {
    /// Color distance above which a pixel is refined
    pub fn default_threshold(&self) -> f32 {
        match self {
            AntiAliasingMode::Supersampling => 0.0,
            AntiAliasingMode::AdaptiveSupersampling => 0.3,
        }
    }
}

/// Sample layout inside a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AntiAliasingPattern {
    /// One sample at the pixel centre, no anti-aliasing
    OrderedGrid1x1,
    /// Average of the four corners
    OrderedGrid2x2,
    OrderedGrid3x3,
    #[default]
    OrderedGrid4x4,
    /// Four corners and the centre
    Quincunx,
}

/// Sample at `(iu / steps, iv / steps)` from the upper-left pixel corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPoint {
    pub iu: u32,
    pub iv: u32,
    pub weight: f32,
}

impl AntiAliasingPattern {
    /// Subdivisions of a pixel side; corners sit at 0 and `steps`
    pub fn steps(&self) -> u32 {
        match self {
            AntiAliasingPattern::OrderedGrid1x1 | AntiAliasingPattern::OrderedGrid2x2 => 1,
            AntiAliasingPattern::OrderedGrid3x3 | AntiAliasingPattern::Quincunx => 2,
            AntiAliasingPattern::OrderedGrid4x4 => 3,
        }
    }

    /// Whether pixels are computed from shared corner samples
    pub fn uses_corners(&self) -> bool {
        !matches!(self, AntiAliasingPattern::OrderedGrid1x1)
    }

    /// Whether extra samples are ever taken
    pub fn supersamples(&self) -> bool {
        !matches!(
            self,
            AntiAliasingPattern::OrderedGrid1x1 | AntiAliasingPattern::OrderedGrid2x2
        )
    }

    /// Weight of each corner once extra samples are taken
    pub fn corner_weight(&self) -> f32 {
        match self {
            AntiAliasingPattern::OrderedGrid1x1 => 1.0,
            AntiAliasingPattern::OrderedGrid2x2 => 0.25,
            AntiAliasingPattern::OrderedGrid3x3 => 1.0 / 9.0,
            AntiAliasingPattern::OrderedGrid4x4 => 1.0 / 16.0,
            AntiAliasingPattern::Quincunx => 0.125,
        }
    }

    /// Samples taken in addition to the corners, top row first
    pub fn extra_samples(&self) -> Vec<SamplingPoint> {
        match self {
            AntiAliasingPattern::OrderedGrid1x1 | AntiAliasingPattern::OrderedGrid2x2 => Vec::new(),
            AntiAliasingPattern::Quincunx => vec![SamplingPoint {
                iu: 1,
                iv: 1,
                weight: 0.5,
            }],
            AntiAliasingPattern::OrderedGrid3x3 | AntiAliasingPattern::OrderedGrid4x4 => {
                let n = self.steps();
                let weight = self.corner_weight();
                let is_corner = |iu: u32, iv: u32| (iu == 0 || iu == n) && (iv == 0 || iv == n);
                (0..=n)
                    .flat_map(|iv| (0..=n).map(move |iu| (iu, iv)))
                    .filter(|&(iu, iv)| !is_corner(iu, iv))
                    .map(|(iu, iv)| SamplingPoint { iu, iv, weight })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AntiAliasingPattern; 5] = [
        AntiAliasingPattern::OrderedGrid1x1,
        AntiAliasingPattern::OrderedGrid2x2,
        AntiAliasingPattern::OrderedGrid3x3,
        AntiAliasingPattern::OrderedGrid4x4,
        AntiAliasingPattern::Quincunx,
    ];

    #[test]
    fn test_weights_sum_to_one() {
        for pattern in ALL.into_iter().filter(|p| p.supersamples()) {
            let extra: f32 = pattern.extra_samples().iter().map(|s| s.weight).sum();
            let total = 4.0 * pattern.corner_weight() + extra;
            assert!((total - 1.0).abs() < 1e-6, "{:?}", pattern);
        }
    }

    #[test]
    fn test_sample_counts() {
        assert_eq!(AntiAliasingPattern::OrderedGrid3x3.extra_samples().len(), 5);
        assert_eq!(AntiAliasingPattern::OrderedGrid4x4.extra_samples().len(), 12);
        assert_eq!(AntiAliasingPattern::Quincunx.extra_samples().len(), 1);
        assert!(AntiAliasingPattern::OrderedGrid2x2.extra_samples().is_empty());
        for pattern in ALL {
            for s in pattern.extra_samples() {
                assert!(s.iu <= pattern.steps() && s.iv <= pattern.steps());
            }
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(AntiAliasingPattern::default(), AntiAliasingPattern::OrderedGrid4x4);
        assert_eq!(AntiAliasingMode::default().default_threshold(), 0.3);
        assert_eq!(AntiAliasingMode::Supersampling.default_threshold(), 0.0);
    }
}
