//! Binary ring templates scored by zero-mean normalized cross-correlation.

use crater_core::BinaryMask;

/// Number of rim offsets probed before the full correlation.
const PRECHECK_SAMPLES: usize = 24;
/// Fraction of `template_thresh^2` the sampled rim coverage must reach.
const PRECHECK_COVERAGE_FRAC: f32 = 0.5;

/// Ring of radius `radius` and thickness `ring_width` inside a square template
/// of side `2 * (radius + ring_width + 1)`, centered on the evaluated pixel.
#[derive(Clone, Debug)]
pub(crate) struct RingTemplate {
    radius: u32,
    half: i32,
    /// Template pixel count `side^2`.
    n: f64,
    /// On-pixel offsets `(dx, dy)` relative to the center.
    on: Vec<(i32, i32)>,
    precheck_stride: usize,
}

/// Rim membership rule shared by the templates and the synthetic renderer.
#[inline]
pub(crate) fn on_rim(dx: i32, dy: i32, radius: f32, ring_width: f32) -> bool {
    let d = ((dx * dx + dy * dy) as f32).sqrt();
    (d - radius).abs() <= 0.5 * ring_width
}

impl RingTemplate {
    pub(crate) fn new(radius: u32, ring_width: u32) -> Self {
        let half = (radius + ring_width + 1) as i32;
        let mut on = Vec::new();
        for dy in -half..half {
            for dx in -half..half {
                if on_rim(dx, dy, radius as f32, ring_width as f32) {
                    on.push((dx, dy));
                }
            }
        }
        let side = f64::from(2 * half);
        let precheck_stride = (on.len() / PRECHECK_SAMPLES).max(1);
        Self {
            radius,
            half,
            n: side * side,
            on,
            precheck_stride,
        }
    }

    #[inline]
    pub(crate) fn radius(&self) -> u32 {
        self.radius
    }

    /// Cheap rejection: coverage of a sparse subset of the rim offsets.
    #[inline]
    pub(crate) fn passes_precheck(&self, mask: &BinaryMask, cx: i32, cy: i32, thresh: f32) -> bool {
        let mut hits = 0usize;
        let mut total = 0usize;
        for &(dx, dy) in self.on.iter().step_by(self.precheck_stride) {
            hits += usize::from(mask.get(cx + dx, cy + dy));
            total += 1;
        }
        if total == 0 {
            return false;
        }
        (hits as f32 / total as f32) >= PRECHECK_COVERAGE_FRAC * thresh * thresh
    }

    /// ZNCC between the zero-padded mask window centered at `(cx, cy)` and the template.
    ///
    /// Returns 0 for flat windows (no variance).
    pub(crate) fn score(&self, mask: &BinaryMask, cx: i32, cy: i32) -> f32 {
        let s = f64::from(mask.window_sum(
            cx - self.half,
            cy - self.half,
            cx + self.half,
            cy + self.half,
        ));
        if s == 0.0 {
            return 0.0;
        }
        let k = self.on.len() as f64;
        let cross = self
            .on
            .iter()
            .map(|&(dx, dy)| u32::from(mask.get(cx + dx, cy + dy)))
            .sum::<u32>() as f64;

        // Binary data: sum of squares equals the sum.
        let var_window = s - s * s / self.n;
        let var_template = k - k * k / self.n;
        let denom = (var_window * var_template).sqrt();
        if denom <= f64::EPSILON {
            return 0.0;
        }
        ((cross - s * k / self.n) / denom) as f32
    }

    /// True when the template window holds no rim pixels at all.
    #[inline]
    pub(crate) fn window_is_empty(&self, mask: &BinaryMask, cx: i32, cy: i32) -> bool {
        mask.window_sum(
            cx - self.half,
            cy - self.half,
            cx + self.half,
            cy + self.half,
        ) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::draw_ring;
    use approx::assert_relative_eq;
    use crater_core::ProbMap;

    #[test]
    fn template_rim_is_nonempty_for_small_radii() {
        for r in 1..6 {
            let t = RingTemplate::new(r, 2);
            assert!(!t.on.is_empty(), "radius {r}");
            assert_eq!(t.radius(), r);
        }
    }

    #[test]
    fn exact_ring_scores_one() {
        let mut map = ProbMap::zeros(48).expect("mask");
        draw_ring(&mut map, 24, 24, 10.0, 2.0, 1.0);
        let bin = map.view().binarize(0.5);
        let t = RingTemplate::new(10, 2);
        assert_relative_eq!(t.score(&bin, 24, 24), 1.0, epsilon = 1e-5);
        assert!(t.passes_precheck(&bin, 24, 24, 0.5));
    }

    #[test]
    fn off_center_and_wrong_radius_score_lower() {
        let mut map = ProbMap::zeros(48).expect("mask");
        draw_ring(&mut map, 24, 24, 10.0, 2.0, 1.0);
        let bin = map.view().binarize(0.5);
        let exact = RingTemplate::new(10, 2).score(&bin, 24, 24);
        let shifted = RingTemplate::new(10, 2).score(&bin, 26, 24);
        let larger = RingTemplate::new(13, 2).score(&bin, 24, 24);
        assert!(shifted < exact);
        assert!(larger < exact);
    }

    #[test]
    fn empty_window_scores_zero() {
        let map = ProbMap::zeros(32).expect("mask");
        let bin = map.view().binarize(0.5);
        let t = RingTemplate::new(6, 2);
        assert!(t.window_is_empty(&bin, 16, 16));
        assert_eq!(t.score(&bin, 16, 16), 0.0);
        assert!(!t.passes_precheck(&bin, 16, 16, 0.5));
    }
}
