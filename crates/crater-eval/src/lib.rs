//! High-level facade crate for the `crater-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core, detection and metrics crates
//! - JSON I/O for evaluation configs, dataset manifests and reports
//! - (feature `image`) loading prediction masks from grayscale images
//! - (feature `cli`) the `crater-eval` command-line tool
//!
//! ## Quickstart
//!
//! ```no_run
//! use crater_eval::io::Dataset;
//! use crater_eval::metrics::{EvalConfig, Evaluator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = Dataset::load("dev/dataset.json")?;
//! let masks = dataset.load_masks()?;
//! let views: Vec<_> = masks.iter().map(|m| m.view()).collect();
//!
//! let evaluator = Evaluator::new(EvalConfig::default());
//! let stats = evaluator.evaluate(&views, &dataset.ground_truth(), dataset.dim)?;
//! println!("{stats}");
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `crater_eval::core`: circles, probability masks, logging setup.
//! - `crater_eval::detect`: ring template extraction, ground-truth filtering, circle matching.
//! - `crater_eval::metrics`: per-image scores, batch evaluation, summary statistics.
//! - `crater_eval::io`: config/dataset/report files.
//! - `crater_eval::mask_image` (feature `image`): grayscale image <-> mask conversion.

pub use crater_core as core;
pub use crater_detect as detect;
pub use crater_metrics as metrics;

pub use crater_core::{Circle, ProbMap, ProbMapView};
pub use crater_detect::{ExtractParams, GroundTruthRow, MatchParams};
pub use crater_metrics::{EvalConfig, Evaluator, RunStatistics};

pub mod io;

#[cfg(feature = "image")]
pub mod mask_image;
