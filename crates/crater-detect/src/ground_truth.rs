use crater_core::Circle;
use serde::{Deserialize, Serialize};

/// One human-annotated crater: pixel center and diameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthRow {
    pub x: f32,
    pub y: f32,
    #[serde(alias = "Diameter (pix)", alias = "diam")]
    pub diameter: f32,
}

impl GroundTruthRow {
    pub fn circle(&self) -> Circle {
        Circle::from_diameter(self.x, self.y, self.diameter)
    }
}

/// Rules turning ground-truth rows into a reference set for one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundTruthFilter {
    /// Craters must have `diameter > 2 * min_radius`.
    pub min_radius: f32,
    /// Craters must have `diameter < 2 * max_radius`.
    pub max_radius: f32,
    /// Border margin as a fraction of the radius: the crater center must stay
    /// at least `cutrad * diameter / 2` inside every image edge.
    pub cutrad: f32,
    /// Images with fewer surviving craters are skipped.
    pub min_circles: usize,
}

impl Default for GroundTruthFilter {
    fn default() -> Self {
        Self {
            min_radius: 2.0,
            max_radius: 50.0,
            cutrad: 0.8,
            min_circles: 3,
        }
    }
}

impl GroundTruthFilter {
    /// Whether a row survives the radius band and border filters on a `dim` image.
    pub fn accepts(&self, row: &GroundTruthRow, dim: usize) -> bool {
        let d = row.diameter;
        if !(d > 2.0 * self.min_radius && d < 2.0 * self.max_radius && d > 0.0) {
            return false;
        }
        let margin = self.cutrad * d / 2.0;
        let dim = dim as f32;
        row.x + margin <= dim && row.y + margin <= dim && row.x - margin > 0.0 && row.y - margin > 0.0
    }

    /// Filter `rows` for a `dim × dim` image.
    pub fn reference_set(&self, rows: &[GroundTruthRow], dim: usize) -> ReferenceSet {
        let circles: Vec<Circle> = rows
            .iter()
            .filter(|row| self.accepts(row, dim))
            .map(GroundTruthRow::circle)
            .collect();
        if circles.len() < self.min_circles {
            ReferenceSet::Insufficient {
                usable: circles.len(),
            }
        } else {
            ReferenceSet::Usable(circles)
        }
    }
}

/// Ground truth for one image after filtering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "circles", rename_all = "snake_case")]
pub enum ReferenceSet {
    /// Enough craters to score the image; every radius is positive.
    Usable(Vec<Circle>),
    /// Too few craters survived filtering; the image is skipped.
    Insufficient { usable: usize },
}

impl ReferenceSet {
    pub fn circles(&self) -> Option<&[Circle]> {
        match self {
            ReferenceSet::Usable(circles) => Some(circles),
            ReferenceSet::Insufficient { .. } => None,
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, ReferenceSet::Usable(_))
    }

    /// Number of craters that survived filtering.
    pub fn usable_count(&self) -> usize {
        match self {
            ReferenceSet::Usable(circles) => circles.len(),
            ReferenceSet::Insufficient { usable } => *usable,
        }
    }
}
