use crater_core::Circle;
use serde::{Deserialize, Serialize};

use crate::params::MatchParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Fractional error of a matched candidate relative to its reference.
///
/// Positions are normalized by the reference radius: `(x_pred - x_true) / r_true`;
/// the radius term is `(r_pred - r_true) / r_true`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchError {
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

impl MatchError {
    fn between(candidate: &Circle, reference: &Circle) -> Self {
        let scale = reference.r;
        Self {
            x: (candidate.x - reference.x) / scale,
            y: (candidate.y - reference.y) / scale,
            r: (candidate.r - reference.r) / scale,
        }
    }

    fn abs(self) -> Self {
        Self {
            x: self.x.abs(),
            y: self.y.abs(),
            r: self.r.abs(),
        }
    }
}

/// One accepted candidate/reference correspondence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub candidate: usize,
    pub reference: usize,
    /// Combined normalized center + radius distance.
    pub cost: f32,
    pub error: MatchError,
}

/// A circle that more than one counterpart could claim.
///
/// Both directions are reported separately; the accepted pair (if any) is
/// included in the index lists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Duplicate {
    /// One reference circle within tolerance of several candidates.
    Reference {
        reference: usize,
        candidates: Vec<usize>,
    },
    /// One candidate within tolerance of several reference circles.
    Candidate {
        candidate: usize,
        references: Vec<usize>,
    },
}

/// Result of matching one image's candidates against its references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Accepted one-to-one matches.
    pub n_match: usize,
    /// Reference (ground-truth) circles.
    pub n_csv: usize,
    /// Candidate (extracted) circles.
    pub n_templ: usize,
    /// Largest radius among matched candidates, 0 without matches.
    pub max_radius: f32,
    pub pairs: Vec<MatchedPair>,
    pub duplicates: Vec<Duplicate>,
}

impl MatchRecord {
    /// Mean absolute fractional error over matched pairs.
    pub fn mean_abs_error(&self) -> Option<MatchError> {
        if self.pairs.is_empty() {
            return None;
        }
        let n = self.pairs.len() as f32;
        let sum = self
            .pairs
            .iter()
            .map(|p| p.error.abs())
            .fold(MatchError::default(), |acc, e| MatchError {
                x: acc.x + e.x,
                y: acc.y + e.y,
                r: acc.r + e.r,
            });
        Some(MatchError {
            x: sum.x / n,
            y: sum.y / n,
            r: sum.r / n,
        })
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}

/// Greedy minimum-cost one-to-one circle matcher.
pub struct CircleMatcher {
    params: MatchParams,
}

impl CircleMatcher {
    pub fn new(params: MatchParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MatchParams {
        &self.params
    }

    /// Match `candidates` against `references`.
    ///
    /// All pairs that coincide under the tolerance are ranked by cost
    /// (ties by candidate, then reference index) and accepted while both
    /// sides are still free. Claims that lose are reported as duplicates.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, candidates, references),
            fields(n_templ = candidates.len(), n_csv = references.len())
        )
    )]
    pub fn match_circles(&self, candidates: &[Circle], references: &[Circle]) -> MatchRecord {
        let tolerance = &self.params.tolerance;

        let mut feasible: Vec<(usize, usize, f32)> = Vec::new();
        for (ci, cand) in candidates.iter().enumerate() {
            for (ri, reference) in references.iter().enumerate() {
                if let Some(cost) = tolerance.cost(cand, reference) {
                    feasible.push((ci, ri, cost));
                }
            }
        }
        feasible.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));

        let mut cand_used = vec![false; candidates.len()];
        let mut ref_used = vec![false; references.len()];
        let mut pairs = Vec::new();
        for &(ci, ri, cost) in &feasible {
            if cand_used[ci] || ref_used[ri] {
                continue;
            }
            cand_used[ci] = true;
            ref_used[ri] = true;
            pairs.push(MatchedPair {
                candidate: ci,
                reference: ri,
                cost,
                error: MatchError::between(&candidates[ci], &references[ri]),
            });
        }
        pairs.sort_by_key(|p| p.candidate);

        let duplicates = collect_duplicates(&feasible, candidates.len(), references.len());
        if !duplicates.is_empty() {
            log::info!(
                "{} duplicate claim(s) among {} candidates and {} references",
                duplicates.len(),
                candidates.len(),
                references.len()
            );
            for dup in &duplicates {
                log::debug!("duplicate: {dup:?}");
            }
        }

        let max_radius = pairs
            .iter()
            .map(|p| candidates[p.candidate].r)
            .fold(0.0f32, f32::max);

        MatchRecord {
            n_match: pairs.len(),
            n_csv: references.len(),
            n_templ: candidates.len(),
            max_radius,
            pairs,
            duplicates,
        }
    }
}

fn collect_duplicates(
    feasible: &[(usize, usize, f32)],
    n_candidates: usize,
    n_references: usize,
) -> Vec<Duplicate> {
    let mut by_reference: Vec<Vec<usize>> = vec![Vec::new(); n_references];
    let mut by_candidate: Vec<Vec<usize>> = vec![Vec::new(); n_candidates];
    for &(ci, ri, _) in feasible {
        by_reference[ri].push(ci);
        by_candidate[ci].push(ri);
    }

    let mut out = Vec::new();
    for (reference, mut candidates) in by_reference.into_iter().enumerate() {
        if candidates.len() > 1 {
            candidates.sort_unstable();
            out.push(Duplicate::Reference {
                reference,
                candidates,
            });
        }
    }
    for (candidate, mut references) in by_candidate.into_iter().enumerate() {
        if references.len() > 1 {
            references.sort_unstable();
            out.push(Duplicate::Candidate {
                candidate,
                references,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matcher() -> CircleMatcher {
        CircleMatcher::new(MatchParams::default())
    }

    fn field() -> Vec<Circle> {
        vec![
            Circle::new(20.0, 20.0, 6.0),
            Circle::new(60.0, 25.0, 9.0),
            Circle::new(35.0, 70.0, 12.0),
            Circle::new(90.0, 90.0, 5.0),
        ]
    }

    #[test]
    fn identical_sets_match_fully() {
        let circles = field();
        let rec = matcher().match_circles(&circles, &circles);
        assert_eq!(rec.n_match, 4);
        assert_eq!(rec.n_csv, 4);
        assert_eq!(rec.n_templ, 4);
        assert!(rec.duplicates.is_empty());
        assert_relative_eq!(rec.max_radius, 12.0);
        let err = rec.mean_abs_error().expect("matches");
        assert_relative_eq!(err.x, 0.0);
        assert_relative_eq!(err.r, 0.0);
        for p in &rec.pairs {
            assert_eq!(p.candidate, p.reference);
        }
    }

    #[test]
    fn empty_inputs_give_zero_matches() {
        let rec = matcher().match_circles(&[], &field());
        assert_eq!(rec.n_match, 0);
        assert_eq!(rec.n_csv, 4);
        assert_eq!(rec.n_templ, 0);
        assert_eq!(rec.max_radius, 0.0);
        assert!(rec.mean_abs_error().is_none());

        let rec = matcher().match_circles(&field(), &[]);
        assert_eq!(rec.n_match, 0);
        assert_eq!(rec.n_templ, 4);
    }

    #[test]
    fn role_swap_keeps_pair_decisions() {
        let refs = field();
        let cands = vec![
            Circle::new(21.0, 20.0, 6.5),
            Circle::new(58.0, 26.0, 9.0),
            Circle::new(120.0, 120.0, 7.0),
        ];
        let forward = matcher().match_circles(&cands, &refs);
        let backward = matcher().match_circles(&refs, &cands);

        assert_eq!(forward.n_match, backward.n_match);
        assert_eq!(forward.n_csv, backward.n_templ);
        assert_eq!(forward.n_templ, backward.n_csv);

        let mut f: Vec<(usize, usize)> =
            forward.pairs.iter().map(|p| (p.candidate, p.reference)).collect();
        let mut b: Vec<(usize, usize)> =
            backward.pairs.iter().map(|p| (p.reference, p.candidate)).collect();
        f.sort_unstable();
        b.sort_unstable();
        assert_eq!(f, b);
    }

    #[test]
    fn closest_candidate_wins_and_loser_is_flagged() {
        let refs = vec![Circle::new(50.0, 50.0, 10.0)];
        let cands = vec![
            Circle::new(53.0, 50.0, 10.0),
            Circle::new(50.5, 50.0, 10.0),
        ];
        let rec = matcher().match_circles(&cands, &refs);
        assert_eq!(rec.n_match, 1);
        assert_eq!(rec.pairs[0].candidate, 1);
        assert_eq!(
            rec.duplicates,
            vec![Duplicate::Reference {
                reference: 0,
                candidates: vec![0, 1]
            }]
        );
    }

    #[test]
    fn candidate_claiming_two_references_is_flagged() {
        let refs = vec![Circle::new(50.0, 50.0, 10.0), Circle::new(54.0, 50.0, 10.0)];
        let cands = vec![Circle::new(52.0, 50.0, 10.0)];
        let rec = matcher().match_circles(&cands, &refs);
        assert_eq!(rec.n_match, 1);
        assert_eq!(
            rec.duplicates,
            vec![Duplicate::Candidate {
                candidate: 0,
                references: vec![0, 1]
            }]
        );
    }

    #[test]
    fn fractional_errors_are_signed_and_scaled() {
        let refs = vec![Circle::new(40.0, 40.0, 10.0)];
        let cands = vec![Circle::new(42.0, 39.0, 11.0)];
        let rec = matcher().match_circles(&cands, &refs);
        let e = rec.pairs[0].error;
        assert_relative_eq!(e.x, 0.2);
        assert_relative_eq!(e.y, -0.1);
        assert_relative_eq!(e.r, 0.1);
        assert_relative_eq!(rec.max_radius, 11.0);
    }

    #[test]
    fn greedy_assignment_prefers_globally_cheapest_pairs() {
        // Candidate 0 sits between both references; candidate 1 only fits reference 1.
        let refs = vec![Circle::new(50.0, 50.0, 10.0), Circle::new(60.0, 50.0, 10.0)];
        let cands = vec![Circle::new(55.0, 50.0, 10.0), Circle::new(60.0, 50.0, 10.0)];
        let rec = matcher().match_circles(&cands, &refs);
        assert_eq!(rec.n_match, 2);
        let mut pairs: Vec<(usize, usize)> =
            rec.pairs.iter().map(|p| (p.candidate, p.reference)).collect();
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(0, 0), (1, 1)]);
    }
}
