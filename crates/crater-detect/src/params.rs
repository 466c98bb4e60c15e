use crater_core::Circle;
use serde::{Deserialize, Serialize};

/// Tolerance deciding whether two circles describe the same crater.
///
/// With `minr = min(a.r, b.r)`, circles coincide when
/// `|ca - cb|^2 / minr^2 < longlat_thresh2` and `|ra - rb| / minr < rad_thresh`.
/// Both terms are symmetric in `a` and `b`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleTolerance {
    /// Squared center offset, in units of the smaller radius squared.
    pub longlat_thresh2: f32,
    /// Radius difference, in units of the smaller radius.
    pub rad_thresh: f32,
}

impl Default for CircleTolerance {
    fn default() -> Self {
        Self {
            longlat_thresh2: 1.8,
            rad_thresh: 1.0,
        }
    }
}

impl CircleTolerance {
    /// Combined normalized distance `dL + dR` when `a` and `b` coincide.
    #[inline]
    pub fn cost(&self, a: &Circle, b: &Circle) -> Option<f32> {
        let minr = a.r.min(b.r);
        if minr.is_nan() || minr <= 0.0 {
            return None;
        }
        let d_center = a.center_dist2(b) / (minr * minr);
        let d_radius = (a.r - b.r).abs() / minr;
        (d_center < self.longlat_thresh2 && d_radius < self.rad_thresh)
            .then_some(d_center + d_radius)
    }

    #[inline]
    pub fn coincide(&self, a: &Circle, b: &Circle) -> bool {
        self.cost(a, b).is_some()
    }
}

/// Ring template extraction settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractParams {
    /// Smallest template radius in pixels (values below 1 are treated as 1).
    pub min_radius: u32,
    /// Largest template radius in pixels, inclusive.
    pub max_radius: u32,
    /// Rim thickness of the ring template in pixels.
    pub ring_width: u32,
    /// Mask probability at or above which a pixel counts as rim.
    pub target_thresh: f32,
    /// Minimum ZNCC score for a template placement to become a candidate.
    pub template_thresh: f32,
    /// Candidates closer than this are merged, keeping the best score.
    pub duplicate: CircleTolerance,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            min_radius: 5,
            max_radius: 40,
            ring_width: 2,
            target_thresh: 0.1,
            template_thresh: 0.5,
            duplicate: CircleTolerance::default(),
        }
    }
}

impl ExtractParams {
    /// Inclusive radius range scanned by the extractor; empty when `min > max`.
    pub fn radii(&self) -> std::ops::RangeInclusive<u32> {
        self.min_radius.max(1)..=self.max_radius
    }
}

/// Matching settings for extracted vs. reference circles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    pub tolerance: CircleTolerance,
}
