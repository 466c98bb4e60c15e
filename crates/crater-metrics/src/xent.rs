use crater_core::ProbMapView;

use crate::EvalError;

/// Probability clamp used before taking logarithms.
const EPSILON: f64 = 1e-7;

/// Mean pixel-wise binary cross-entropy of predicted masks against target masks.
pub fn binary_cross_entropy(
    predictions: &[ProbMapView<'_>],
    targets: &[ProbMapView<'_>],
) -> Result<f64, EvalError> {
    if predictions.len() != targets.len() {
        return Err(EvalError::CountMismatch {
            predictions: predictions.len(),
            ground_truth: targets.len(),
        });
    }
    if predictions.is_empty() {
        return Err(EvalError::EmptyBatch);
    }

    let mut total = 0.0f64;
    let mut count = 0usize;
    for (index, (pred, target)) in predictions.iter().zip(targets).enumerate() {
        if pred.dim() != target.dim() {
            return Err(EvalError::DimensionMismatch {
                index,
                expected: target.dim(),
                got: pred.dim(),
            });
        }
        for (&p, &t) in pred.data().iter().zip(target.data()) {
            let p = f64::from(p).clamp(EPSILON, 1.0 - EPSILON);
            let t = f64::from(t);
            total -= t * p.ln() + (1.0 - t) * (1.0 - p).ln();
        }
        count += pred.data().len();
    }
    Ok(total / count as f64)
}
