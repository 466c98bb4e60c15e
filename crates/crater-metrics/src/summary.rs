use std::fmt;

use crater_detect::MatchRecord;
use serde::{Deserialize, Serialize};

use crate::scores::ImageScores;
use crate::stats::{Distribution, RunningStats};

/// Why an image did not contribute to the statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer usable ground-truth craters than the filter requires.
    InsufficientGroundTruth { usable: usize },
    /// Extraction and matching ran, but nothing matched.
    NoMatches { n_csv: usize, n_templ: usize },
}

/// Outcome for one image of the batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageOutcome {
    Scored {
        record: MatchRecord,
        scores: ImageScores,
    },
    Skipped {
        reason: SkipReason,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageReport {
    /// Position of the image in the evaluated batch.
    pub index: usize,
    pub outcome: ImageOutcome,
}

impl ImageReport {
    pub fn scores(&self) -> Option<&ImageScores> {
        match &self.outcome {
            ImageOutcome::Scored { scores, .. } => Some(scores),
            ImageOutcome::Skipped { .. } => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match &self.outcome {
            ImageOutcome::Scored { .. } => None,
            ImageOutcome::Skipped { reason } => Some(*reason),
        }
    }
}

/// Mean/std of every per-image metric over the scored images.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub n_images: usize,
    pub recall: Distribution,
    pub precision: Distribution,
    pub fscore: Distribution,
    pub frac_new: Distribution,
    pub frac_new2: Distribution,
    pub err_x: Distribution,
    pub err_y: Distribution,
    pub err_r: Distribution,
    pub max_radius: Distribution,
    /// Largest matched radius over all scored images.
    pub max_radius_overall: f64,
    /// Scored images in which at least one duplicate claim was found.
    pub images_with_duplicates: usize,
}

#[derive(Default)]
pub(crate) struct SummaryAccumulator {
    recall: RunningStats,
    precision: RunningStats,
    fscore: RunningStats,
    frac_new: RunningStats,
    frac_new2: RunningStats,
    err_x: RunningStats,
    err_y: RunningStats,
    err_r: RunningStats,
    max_radius: RunningStats,
    duplicates: usize,
}

impl SummaryAccumulator {
    pub(crate) fn push(&mut self, s: &ImageScores) {
        self.recall.push(s.recall);
        self.precision.push(s.precision);
        self.fscore.push(s.fscore);
        self.frac_new.push(s.frac_new);
        self.frac_new2.push(s.frac_new2);
        self.err_x.push(s.err_x);
        self.err_y.push(s.err_y);
        self.err_r.push(s.err_r);
        self.max_radius.push(s.max_radius);
        self.duplicates += usize::from(s.has_duplicates);
    }

    pub(crate) fn count(&self) -> usize {
        self.recall.count() as usize
    }

    pub(crate) fn finish(&self) -> Option<SummaryStatistics> {
        Some(SummaryStatistics {
            n_images: self.count(),
            recall: self.recall.distribution()?,
            precision: self.precision.distribution()?,
            fscore: self.fscore.distribution()?,
            frac_new: self.frac_new.distribution()?,
            frac_new2: self.frac_new2.distribution()?,
            err_x: self.err_x.distribution()?,
            err_y: self.err_y.distribution()?,
            err_r: self.err_r.distribution()?,
            max_radius: self.max_radius.distribution()?,
            max_radius_overall: self.max_radius.max()?,
            images_with_duplicates: self.duplicates,
        })
    }
}

/// Statistics of one evaluation pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// F-beta weight used for `fscore`.
    pub beta: f64,
    /// One report per input image, in input order.
    pub images: Vec<ImageReport>,
    /// `None` when fewer images were scored than the configured minimum.
    pub summary: Option<SummaryStatistics>,
}

impl RunStatistics {
    pub fn scored(&self) -> impl Iterator<Item = (usize, &ImageScores)> {
        self.images
            .iter()
            .filter_map(|img| img.scores().map(|s| (img.index, s)))
    }

    pub fn skipped(&self) -> impl Iterator<Item = (usize, SkipReason)> + '_ {
        self.images
            .iter()
            .filter_map(|img| img.skip_reason().map(|r| (img.index, r)))
    }

    pub fn n_scored(&self) -> usize {
        self.scored().count()
    }

    /// Write the summary through `log` at info level.
    pub fn log_summary(&self) {
        match &self.summary {
            Some(summary) => {
                for line in summary.lines(self.beta) {
                    log::info!("{line}");
                }
            }
            None => log::warn!(
                "insufficient data: {} scored image(s), summary statistics skipped",
                self.n_scored()
            ),
        }
    }
}

impl SummaryStatistics {
    /// Human-readable report lines.
    pub fn lines(&self, beta: f64) -> Vec<String> {
        vec![
            format!(
                "mean and std of N_match/N_csv (recall) = {:.6}, {:.6}",
                self.recall.mean, self.recall.std
            ),
            format!(
                "mean and std of N_match/(N_match + (N_templ-N_match)) (precision) = {:.6}, {:.6}",
                self.precision.mean, self.precision.std
            ),
            format!(
                "mean and std of F_{beta} score = {:.6}, {:.6}",
                self.fscore.mean, self.fscore.std
            ),
            format!(
                "mean and std of (N_templ - N_match)/N_templ (fraction of craters that are new) = {:.6}, {:.6}",
                self.frac_new.mean, self.frac_new.std
            ),
            format!(
                "mean and std of (N_templ - N_match)/N_csv (fraction of craters that are new, 2) = {:.6}, {:.6}",
                self.frac_new2.mean, self.frac_new2.std
            ),
            format!(
                "mean fractional difference between pred and GT craters (x, y, r) = {:.6}, {:.6}, {:.6}",
                self.err_x.mean, self.err_y.mean, self.err_r.mean
            ),
            format!(
                "mean and std of maximum detected pixel radius in an image = {:.6}, {:.6}",
                self.max_radius.mean, self.max_radius.std
            ),
            format!(
                "absolute maximum detected pixel radius over all images = {:.6}",
                self.max_radius_overall
            ),
            format!(
                "images scored = {}, with duplicates = {}",
                self.n_images, self.images_with_duplicates
            ),
        ]
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, reason) in self.skipped() {
            if let SkipReason::NoMatches { n_csv, n_templ } = reason {
                writeln!(
                    f,
                    "skipping image {index}, N_csv={n_csv}, N_templ={n_templ}, N_match=0"
                )?;
            }
        }
        match &self.summary {
            Some(summary) => {
                for line in summary.lines(self.beta) {
                    writeln!(f, "{line}")?;
                }
                Ok(())
            }
            None => writeln!(
                f,
                "insufficient data: {} scored image(s), summary statistics skipped",
                self.n_scored()
            ),
        }
    }
}
