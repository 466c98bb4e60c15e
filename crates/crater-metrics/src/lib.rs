//! Evaluation of crater rim predictions.
//!
//! [`Evaluator::evaluate`] runs extraction and matching for every image of a
//! batch, scores the images that have enough ground truth and at least one
//! match, and reduces the per-image scores into mean/std statistics.
//!
//! ```no_run
//! use crater_metrics::{EvalConfig, Evaluator};
//! use crater_core::ProbMap;
//! use crater_detect::GroundTruthRow;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let masks = vec![ProbMap::zeros(256)?];
//! let truth: Vec<Vec<GroundTruthRow>> = vec![Vec::new()];
//! let views: Vec<_> = masks.iter().map(ProbMap::view).collect();
//!
//! let stats = Evaluator::new(EvalConfig::default()).evaluate(&views, &truth, 256)?;
//! stats.log_summary();
//! # Ok(())
//! # }
//! ```

mod error;
mod evaluator;
mod scores;
mod stats;
mod store;
mod summary;
mod xent;

pub use error::EvalError;
pub use evaluator::{EvalConfig, Evaluator};
pub use scores::ImageScores;
pub use stats::{Distribution, RunningStats};
pub use store::{image_id, GroundTruthStore};
pub use summary::{ImageOutcome, ImageReport, RunStatistics, SkipReason, SummaryStatistics};
pub use xent::binary_cross_entropy;
