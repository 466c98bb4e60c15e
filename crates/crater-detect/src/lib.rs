//! Circle extraction and matching for crater rim masks.
//!
//! Pipeline pieces:
//! - [`CircleExtractor`]: ring template matching (ZNCC) over a binarized
//!   prediction mask, followed by duplicate suppression;
//! - [`GroundTruthFilter`]: turns tabular ground truth into a [`ReferenceSet`],
//!   dropping border and out-of-band craters;
//! - [`CircleMatcher`]: one-to-one matching of extracted circles against the
//!   reference set, reporting duplicate claims in both directions.

mod dedup;
mod extract;
mod ground_truth;
mod matcher;
mod params;
pub mod synthetic;
mod template;

pub use dedup::suppress_duplicates;
pub use extract::{extract_circles, CircleExtractor, ScoredCircle};
pub use ground_truth::{GroundTruthFilter, GroundTruthRow, ReferenceSet};
pub use matcher::{CircleMatcher, Duplicate, MatchError, MatchRecord, MatchedPair};
pub use params::{CircleTolerance, ExtractParams, MatchParams};

pub use crater_core::{Circle, ProbMap, ProbMapView};
