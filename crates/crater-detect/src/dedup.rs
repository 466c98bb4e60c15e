use crate::extract::ScoredCircle;
use crate::params::CircleTolerance;

fn sort_by_score(circles: &mut [ScoredCircle]) {
    circles.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.circle.r.total_cmp(&b.circle.r))
            .then(a.circle.y.total_cmp(&b.circle.y))
            .then(a.circle.x.total_cmp(&b.circle.x))
    });
}

/// Remove duplicate detections: keep the highest-scoring circle of every
/// group that coincides under `tolerance`.
///
/// Every kept circle is a local score maximum, and no two kept circles
/// coincide. The result is ordered by descending score and does not depend
/// on the input order.
pub fn suppress_duplicates(
    mut circles: Vec<ScoredCircle>,
    tolerance: &CircleTolerance,
) -> Vec<ScoredCircle> {
    sort_by_score(&mut circles);

    let mut kept: Vec<ScoredCircle> = Vec::new();
    for candidate in circles {
        if kept
            .iter()
            .all(|k| !tolerance.coincide(&k.circle, &candidate.circle))
        {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crater_core::Circle;

    fn scored(x: f32, y: f32, r: f32, score: f32) -> ScoredCircle {
        ScoredCircle {
            circle: Circle::new(x, y, r),
            score,
        }
    }

    #[test]
    fn keeps_best_of_cluster() {
        let input = vec![
            scored(10.0, 10.0, 6.0, 0.6),
            scored(11.0, 10.0, 6.0, 0.9),
            scored(10.0, 11.0, 7.0, 0.7),
        ];
        let out = suppress_duplicates(input, &CircleTolerance::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].circle, Circle::new(11.0, 10.0, 6.0));
    }

    #[test]
    fn distinct_craters_survive() {
        let input = vec![
            scored(10.0, 10.0, 6.0, 0.6),
            scored(40.0, 10.0, 6.0, 0.9),
            // concentric but twice the radius: genuine overlap
            scored(10.0, 10.0, 14.0, 0.8),
        ];
        let out = suppress_duplicates(input, &CircleTolerance::default());
        assert_eq!(out.len(), 3);
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn result_is_input_order_independent() {
        let a = vec![
            scored(10.0, 10.0, 6.0, 0.8),
            scored(12.0, 10.0, 6.0, 0.8),
            scored(30.0, 30.0, 9.0, 0.55),
        ];
        let mut b = a.clone();
        b.reverse();
        let tol = CircleTolerance::default();
        assert_eq!(suppress_duplicates(a, &tol), suppress_duplicates(b, &tol));
    }
}
