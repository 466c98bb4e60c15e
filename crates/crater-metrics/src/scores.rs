use crater_detect::MatchRecord;
use serde::{Deserialize, Serialize};

/// Per-image detection scores derived from a [`MatchRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageScores {
    pub n_match: usize,
    pub n_csv: usize,
    pub n_templ: usize,
    /// `N_match / N_templ`.
    pub precision: f64,
    /// `N_match / N_csv`.
    pub recall: f64,
    /// F-beta of precision and recall.
    pub fscore: f64,
    /// `(N_templ - N_match) / N_templ`: extracted circles unexplained by ground truth.
    pub frac_new: f64,
    /// `(N_templ - N_match) / N_csv`.
    pub frac_new2: f64,
    pub max_radius: f64,
    /// Mean absolute fractional errors over matched pairs.
    pub err_x: f64,
    pub err_y: f64,
    pub err_r: f64,
    pub has_duplicates: bool,
}

impl ImageScores {
    /// Score one record; `None` when nothing matched.
    pub fn from_record(record: &MatchRecord, beta: f64) -> Option<Self> {
        if record.n_match == 0 || record.n_templ == 0 || record.n_csv == 0 {
            return None;
        }
        let n_match = record.n_match as f64;
        let n_csv = record.n_csv as f64;
        let n_templ = record.n_templ as f64;
        let unexplained = (record.n_templ - record.n_match) as f64;

        let precision = n_match / n_templ;
        let recall = n_match / n_csv;
        let err = record.mean_abs_error()?;

        Some(Self {
            n_match: record.n_match,
            n_csv: record.n_csv,
            n_templ: record.n_templ,
            precision,
            recall,
            fscore: fbeta(precision, recall, beta),
            frac_new: unexplained / n_templ,
            frac_new2: unexplained / n_csv,
            max_radius: f64::from(record.max_radius),
            err_x: f64::from(err.x),
            err_y: f64::from(err.y),
            err_r: f64::from(err.r),
            has_duplicates: record.has_duplicates(),
        })
    }
}

/// `(1 + b^2) * p * r / (b^2 * p + r)`; 0 when both are 0.
pub(crate) fn fbeta(precision: f64, recall: f64, beta: f64) -> f64 {
    let b2 = beta * beta;
    let denom = b2 * precision + recall;
    if denom <= 0.0 {
        return 0.0;
    }
    (1.0 + b2) * precision * recall / denom
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crater_detect::{MatchError, MatchedPair};

    fn record(n_match: usize, n_csv: usize, n_templ: usize) -> MatchRecord {
        let pairs = (0..n_match)
            .map(|i| MatchedPair {
                candidate: i,
                reference: i,
                cost: 0.0,
                error: MatchError {
                    x: 0.1,
                    y: -0.2,
                    r: 0.05,
                },
            })
            .collect();
        MatchRecord {
            n_match,
            n_csv,
            n_templ,
            max_radius: 12.0,
            pairs,
            duplicates: Vec::new(),
        }
    }

    #[test]
    fn four_of_five_with_one_spurious() {
        let s = ImageScores::from_record(&record(4, 5, 5), 1.0).expect("scored");
        assert_relative_eq!(s.precision, 0.8);
        assert_relative_eq!(s.recall, 0.8);
        assert_relative_eq!(s.fscore, 0.8, epsilon = 1e-12);
        assert_relative_eq!(s.frac_new, 0.2, epsilon = 1e-12);
        assert_relative_eq!(s.frac_new2, 0.2, epsilon = 1e-12);
        assert_relative_eq!(s.err_x, 0.1, epsilon = 1e-6);
        assert_relative_eq!(s.err_y, 0.2, epsilon = 1e-6);
        assert_relative_eq!(s.max_radius, 12.0);
        assert!(!s.has_duplicates);
    }

    #[test]
    fn beta_weights_recall() {
        let s1 = ImageScores::from_record(&record(3, 6, 4), 1.0).expect("scored");
        let s2 = ImageScores::from_record(&record(3, 6, 4), 2.0).expect("scored");
        // p = 0.75, r = 0.5
        assert_relative_eq!(s1.fscore, 0.6, epsilon = 1e-12);
        assert_relative_eq!(s2.fscore, 5.0 * 0.375 / (4.0 * 0.75 + 0.5), epsilon = 1e-12);
        assert!(s2.fscore < s1.fscore);
    }

    #[test]
    fn zero_matches_are_not_scored() {
        assert!(ImageScores::from_record(&record(0, 5, 3), 1.0).is_none());
    }

    #[test]
    fn fbeta_degenerate_is_zero() {
        assert_eq!(fbeta(0.0, 0.0, 1.0), 0.0);
    }
}
