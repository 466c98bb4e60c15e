use crater_core::{Circle, ProbMapView};
use serde::{Deserialize, Serialize};

use crate::dedup::suppress_duplicates;
use crate::params::ExtractParams;
use crate::template::RingTemplate;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Extracted circle with its template correlation score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredCircle {
    pub circle: Circle,
    /// ZNCC in `(template_thresh, 1]`.
    pub score: f32,
}

/// Ring template extractor.
///
/// Templates for every radius in `params.radii()` are built once in
/// [`CircleExtractor::new`]; extraction itself is a pure function of the mask.
pub struct CircleExtractor {
    params: ExtractParams,
    templates: Vec<RingTemplate>,
}

impl CircleExtractor {
    pub fn new(params: ExtractParams) -> Self {
        let templates = params
            .radii()
            .map(|r| RingTemplate::new(r, params.ring_width))
            .collect();
        Self { params, templates }
    }

    pub fn params(&self) -> &ExtractParams {
        &self.params
    }

    /// Extract de-duplicated circles, best score first.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, mask), fields(dim = mask.dim(), radii = self.templates.len()))
    )]
    pub fn extract_scored(&self, mask: &ProbMapView<'_>) -> Vec<ScoredCircle> {
        let binary = mask.binarize(self.params.target_thresh);
        if binary.count() == 0 {
            return Vec::new();
        }

        let dim = mask.dim() as i32;
        let thresh = self.params.template_thresh;
        let mut candidates = Vec::new();

        for template in &self.templates {
            let r = template.radius() as f32;
            for cy in 0..dim {
                for cx in 0..dim {
                    if template.window_is_empty(&binary, cx, cy)
                        || !template.passes_precheck(&binary, cx, cy, thresh)
                    {
                        continue;
                    }
                    let score = template.score(&binary, cx, cy);
                    if score > thresh {
                        candidates.push(ScoredCircle {
                            circle: Circle::new(cx as f32, cy as f32, r),
                            score,
                        });
                    }
                }
            }
        }

        let raw = candidates.len();
        let kept = suppress_duplicates(candidates, &self.params.duplicate);
        log::debug!(
            "extracted {} circles from {} template hits (dim={})",
            kept.len(),
            raw,
            dim
        );
        kept
    }

    /// Extract de-duplicated circles without scores.
    pub fn extract(&self, mask: &ProbMapView<'_>) -> Vec<Circle> {
        self.extract_scored(mask)
            .into_iter()
            .map(|c| c.circle)
            .collect()
    }
}

/// One-shot convenience wrapper around [`CircleExtractor`].
pub fn extract_circles(mask: &ProbMapView<'_>, params: &ExtractParams) -> Vec<Circle> {
    CircleExtractor::new(params.clone()).extract(mask)
}
