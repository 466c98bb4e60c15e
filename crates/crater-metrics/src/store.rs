use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crater_detect::GroundTruthRow;

/// Identifier of the `index`-th image in a split: `img_00000`, `img_00001`, ...
pub fn image_id(index: usize) -> String {
    format!("img_{index:05}")
}

/// Per-image ground-truth lookup, keyed by [`image_id`].
pub trait GroundTruthStore {
    /// Rows for `image_id`, or `None` when the store has no table for it.
    fn ground_truth(&self, image_id: &str) -> Option<&[GroundTruthRow]>;
}

impl<S: BuildHasher> GroundTruthStore for HashMap<String, Vec<GroundTruthRow>, S> {
    fn ground_truth(&self, image_id: &str) -> Option<&[GroundTruthRow]> {
        self.get(image_id).map(Vec::as_slice)
    }
}

impl GroundTruthStore for BTreeMap<String, Vec<GroundTruthRow>> {
    fn ground_truth(&self, image_id: &str) -> Option<&[GroundTruthRow]> {
        self.get(image_id).map(Vec::as_slice)
    }
}
