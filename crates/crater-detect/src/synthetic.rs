//! Synthetic rim rendering for tests, benchmarks and calibration of thresholds.
//!
//! Rings use the same membership rule as the extractor templates, so a ring
//! drawn at an integer center correlates perfectly with the matching template.

use crater_core::{Circle, MaskError, ProbMap};

use crate::template::on_rim;

/// Draw a ring of `radius` and thickness `ring_width` centered at `(cx, cy)`.
///
/// Pixels are set to `value` (max-combined with what is already there);
/// parts outside the mask are clipped.
pub fn draw_ring(mask: &mut ProbMap, cx: i32, cy: i32, radius: f32, ring_width: f32, value: f32) {
    let reach = (radius + ring_width).ceil() as i32 + 1;
    let dim = mask.dim() as i32;
    for y in (cy - reach).max(0)..(cy + reach + 1).min(dim) {
        for x in (cx - reach).max(0)..(cx + reach + 1).min(dim) {
            if on_rim(x - cx, y - cy, radius, ring_width) {
                let current = mask.view().get(x, y);
                mask.set(x as usize, y as usize, current.max(value));
            }
        }
    }
}

/// Render every circle as a full-probability rim of width `ring_width` on a `dim` mask.
///
/// Centers are rounded to the nearest pixel.
pub fn render_rims(dim: usize, circles: &[Circle], ring_width: f32) -> Result<ProbMap, MaskError> {
    let mut mask = ProbMap::zeros(dim)?;
    for c in circles {
        draw_ring(
            &mut mask,
            c.x.round() as i32,
            c.y.round() as i32,
            c.r,
            ring_width,
            1.0,
        );
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_pixels_respect_width() {
        let mut mask = ProbMap::zeros(32).expect("mask");
        draw_ring(&mut mask, 16, 16, 8.0, 2.0, 1.0);
        let view = mask.view();
        assert_eq!(view.get(16 + 8, 16), 1.0);
        assert_eq!(view.get(16 + 9, 16), 1.0);
        assert_eq!(view.get(16 + 10, 16), 0.0);
        assert_eq!(view.get(16, 16), 0.0);
    }

    #[test]
    fn clipped_ring_stays_in_bounds() {
        let mut mask = ProbMap::zeros(16).expect("mask");
        draw_ring(&mut mask, 0, 0, 6.0, 2.0, 0.7);
        assert!((mask.view().get(6, 0) - 0.7).abs() < 1e-6);
    }
}
