use crater_core::MaskError;

/// Contract violations detected before or during evaluation.
///
/// Data-quality issues (too little ground truth, no matches, too few images)
/// are not errors; they show up as skipped images or a missing summary.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("got {predictions} prediction masks but {ground_truth} ground-truth tables")]
    CountMismatch {
        predictions: usize,
        ground_truth: usize,
    },

    #[error("mask {index} has side {got}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("empty batch")]
    EmptyBatch,

    #[error(transparent)]
    Mask(#[from] MaskError),
}
