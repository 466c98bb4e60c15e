use serde::{Deserialize, Serialize};

/// Mean and population standard deviation of one metric across images.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub mean: f64,
    pub std: f64,
}

/// Mergeable streaming accumulator (Welford update, Chan et al. merge).
///
/// Pushing values one by one and merging partial accumulators give the same
/// result up to rounding, whatever the order, which makes it safe for
/// parallel fan-in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    max: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.max = if self.count == 1 {
            value
        } else {
            self.max.max(value)
        };
    }

    pub fn merge(self, other: RunningStats) -> RunningStats {
        if self.count == 0 {
            return other;
        }
        if other.count == 0 {
            return self;
        }
        let na = self.count as f64;
        let nb = other.count as f64;
        let n = na + nb;
        let delta = other.mean - self.mean;
        RunningStats {
            count: self.count + other.count,
            mean: self.mean + delta * nb / n,
            m2: self.m2 + other.m2 + delta * delta * na * nb / n,
            max: self.max.max(other.max),
        }
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Population standard deviation (divides by `n`).
    pub fn std(&self) -> Option<f64> {
        (self.count > 0).then(|| (self.m2 / self.count as f64).max(0.0).sqrt())
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    pub fn distribution(&self) -> Option<Distribution> {
        Some(Distribution {
            mean: self.mean()?,
            std: self.std()?,
        })
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = RunningStats::new();
        for v in iter {
            stats.push(v);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_has_no_moments() {
        let s = RunningStats::new();
        assert_eq!(s.count(), 0);
        assert!(s.mean().is_none());
        assert!(s.distribution().is_none());
        assert!(s.max().is_none());
    }

    #[test]
    fn matches_population_formulas() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let s: RunningStats = values.iter().copied().collect();
        let d = s.distribution().expect("non-empty");
        assert_relative_eq!(d.mean, 5.0, epsilon = 1e-12);
        assert_relative_eq!(d.std, 2.0, epsilon = 1e-12);
        assert_relative_eq!(s.max().expect("max"), 9.0);
    }

    #[test]
    fn merge_equals_sequential_push() {
        let values = [0.8, 0.55, 1.0, 0.25, 0.9, 0.6, 0.75];
        let all: RunningStats = values.iter().copied().collect();
        let left: RunningStats = values[..3].iter().copied().collect();
        let right: RunningStats = values[3..].iter().copied().collect();
        let merged = right.merge(left);
        assert_eq!(merged.count(), all.count());
        assert_relative_eq!(merged.mean().unwrap(), all.mean().unwrap(), epsilon = 1e-12);
        assert_relative_eq!(merged.std().unwrap(), all.std().unwrap(), epsilon = 1e-12);
        assert_relative_eq!(merged.max().unwrap(), 1.0);
    }

    #[test]
    fn merging_with_empty_is_identity() {
        let s: RunningStats = [1.0, 3.0].into_iter().collect();
        assert_eq!(s.merge(RunningStats::new()), s);
        assert_eq!(RunningStats::new().merge(s), s);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let s: RunningStats = std::iter::once(0.8).collect();
        let d = s.distribution().expect("one value");
        assert_relative_eq!(d.mean, 0.8);
        assert_relative_eq!(d.std, 0.0);
    }
}
