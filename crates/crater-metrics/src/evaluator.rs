use crater_core::ProbMapView;
use crater_detect::{
    CircleExtractor, CircleMatcher, ExtractParams, GroundTruthFilter, GroundTruthRow,
    MatchParams, ReferenceSet,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::EvalError;
use crate::scores::ImageScores;
use crate::store::{image_id, GroundTruthStore};
use crate::summary::{ImageOutcome, ImageReport, RunStatistics, SkipReason, SummaryAccumulator};

/// Full evaluation configuration. Every field has a default, so partial JSON works.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub extract: ExtractParams,
    pub matching: MatchParams,
    pub ground_truth: GroundTruthFilter,
    /// F-beta weight; `1.0` is the harmonic mean of precision and recall.
    pub beta: f64,
    /// Minimum number of scored images before summary statistics are produced.
    pub min_images_for_summary: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            extract: ExtractParams::default(),
            matching: MatchParams::default(),
            ground_truth: GroundTruthFilter::default(),
            beta: 1.0,
            min_images_for_summary: 4,
        }
    }
}

/// Batch evaluator: extraction, matching, scoring and aggregation.
///
/// Per-image work is independent and runs on the rayon pool when the
/// `rayon` feature is enabled. Aggregation always happens in image order.
pub struct Evaluator {
    config: EvalConfig,
    extractor: CircleExtractor,
    matcher: CircleMatcher,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        let extractor = CircleExtractor::new(config.extract.clone());
        let matcher = CircleMatcher::new(config.matching.clone());
        Self {
            config,
            extractor,
            matcher,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate `predictions[i]` against `ground_truth[i]` for every image.
    ///
    /// Fails fast when the two batches differ in length or a mask is not
    /// `dim × dim`. An empty batch yields no images and no summary.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, predictions, ground_truth), fields(n = predictions.len()))
    )]
    pub fn evaluate<G>(
        &self,
        predictions: &[ProbMapView<'_>],
        ground_truth: &[G],
        dim: usize,
    ) -> Result<RunStatistics, EvalError>
    where
        G: AsRef<[GroundTruthRow]> + Sync,
    {
        if predictions.len() != ground_truth.len() {
            return Err(EvalError::CountMismatch {
                predictions: predictions.len(),
                ground_truth: ground_truth.len(),
            });
        }
        for (index, mask) in predictions.iter().enumerate() {
            if mask.dim() != dim {
                return Err(EvalError::DimensionMismatch {
                    index,
                    expected: dim,
                    got: mask.dim(),
                });
            }
        }

        #[cfg(feature = "rayon")]
        let images: Vec<ImageReport> = predictions
            .par_iter()
            .zip(ground_truth.par_iter())
            .enumerate()
            .map(|(index, (mask, rows))| self.score_image(index, mask, rows.as_ref(), dim))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let images: Vec<ImageReport> = predictions
            .iter()
            .zip(ground_truth.iter())
            .enumerate()
            .map(|(index, (mask, rows))| self.score_image(index, mask, rows.as_ref(), dim))
            .collect();

        Ok(self.aggregate(images))
    }

    /// Like [`Evaluator::evaluate`], with ground truth looked up by [`image_id`].
    ///
    /// An image without a table in `store` has no usable craters and is skipped.
    pub fn evaluate_store<S>(
        &self,
        predictions: &[ProbMapView<'_>],
        store: &S,
        dim: usize,
    ) -> Result<RunStatistics, EvalError>
    where
        S: GroundTruthStore + ?Sized,
    {
        let tables: Vec<&[GroundTruthRow]> = (0..predictions.len())
            .map(|i| {
                let id = image_id(i);
                match store.ground_truth(&id) {
                    Some(rows) => rows,
                    None => {
                        log::debug!("no ground truth for {id}");
                        &[]
                    }
                }
            })
            .collect();
        self.evaluate(predictions, &tables, dim)
    }

    /// Evaluate a single image; `index` only labels the report.
    pub fn evaluate_image(
        &self,
        index: usize,
        mask: &ProbMapView<'_>,
        rows: &[GroundTruthRow],
        dim: usize,
    ) -> Result<ImageReport, EvalError> {
        if mask.dim() != dim {
            return Err(EvalError::DimensionMismatch {
                index,
                expected: dim,
                got: mask.dim(),
            });
        }
        Ok(self.score_image(index, mask, rows, dim))
    }

    fn score_image(
        &self,
        index: usize,
        mask: &ProbMapView<'_>,
        rows: &[GroundTruthRow],
        dim: usize,
    ) -> ImageReport {
        let references = match self.config.ground_truth.reference_set(rows, dim) {
            ReferenceSet::Usable(circles) => circles,
            ReferenceSet::Insufficient { usable } => {
                log::debug!("image {index}: only {usable} usable ground-truth craters");
                return ImageReport {
                    index,
                    outcome: ImageOutcome::Skipped {
                        reason: SkipReason::InsufficientGroundTruth { usable },
                    },
                };
            }
        };

        let candidates = self.extractor.extract(mask);
        let record = self.matcher.match_circles(&candidates, &references);
        let outcome = match ImageScores::from_record(&record, self.config.beta) {
            Some(scores) => ImageOutcome::Scored { record, scores },
            None => ImageOutcome::Skipped {
                reason: SkipReason::NoMatches {
                    n_csv: record.n_csv,
                    n_templ: record.n_templ,
                },
            },
        };
        ImageReport { index, outcome }
    }

    fn aggregate(&self, images: Vec<ImageReport>) -> RunStatistics {
        let mut acc = SummaryAccumulator::default();
        for image in &images {
            match &image.outcome {
                ImageOutcome::Scored { scores, .. } => {
                    if scores.has_duplicates {
                        log::info!("duplicate(s) found in image {}", image.index);
                    }
                    acc.push(scores);
                }
                ImageOutcome::Skipped {
                    reason: SkipReason::NoMatches { n_csv, n_templ },
                } => {
                    log::info!(
                        "skipping image {}, N_csv={n_csv}, N_templ={n_templ}, N_match=0",
                        image.index
                    );
                }
                ImageOutcome::Skipped { .. } => {}
            }
        }

        let summary = if acc.count() >= self.config.min_images_for_summary.max(1) {
            acc.finish()
        } else {
            log::warn!(
                "insufficient data: {} of {} images scored, need {}",
                acc.count(),
                images.len(),
                self.config.min_images_for_summary
            );
            None
        };

        RunStatistics {
            beta: self.config.beta,
            images,
            summary,
        }
    }
}
