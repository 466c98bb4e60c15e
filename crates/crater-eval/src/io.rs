//! File formats: evaluation config, dataset manifest and evaluation report.
//!
//! All files are JSON. Paths inside a dataset manifest are resolved relative
//! to the manifest's directory.

use std::fs;
use std::path::{Path, PathBuf};

use crater_core::MaskError;
use crater_detect::{GroundTruthRow, ScoredCircle};
use crater_metrics::{image_id, EvalConfig, EvalError, RunStatistics};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum EvalIoError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "image")]
    #[error("{}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{}: mask is {width}x{height}, expected a square {dim}x{dim} image", path.display())]
    MaskShape {
        path: PathBuf,
        width: u32,
        height: u32,
        dim: usize,
    },

    #[error("dataset lists no images")]
    EmptyDataset,

    #[error("{with_target} of {total} dataset entries have a target mask; need all or none")]
    PartialTargets { with_target: usize, total: usize },

    #[error(transparent)]
    Mask(#[from] MaskError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, EvalIoError> {
    let text = fs::read_to_string(path).map_err(|source| EvalIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| EvalIoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), EvalIoError> {
    let io_err = |source| EvalIoError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| EvalIoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_err)
}

/// Load an [`EvalConfig`]; missing fields take their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<EvalConfig, EvalIoError> {
    read_json(path.as_ref())
}

pub fn write_config(path: impl AsRef<Path>, config: &EvalConfig) -> Result<(), EvalIoError> {
    write_json(path.as_ref(), config)
}

/// One image of a dataset manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Defaults to `img_{index:05}` when empty.
    #[serde(default)]
    pub id: String,
    /// Predicted rim probabilities as an 8-bit grayscale image.
    pub mask_path: PathBuf,
    /// Optional target rim mask, used for the pixel-level cross-entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<PathBuf>,
    #[serde(default)]
    pub ground_truth: Vec<GroundTruthRow>,
}

/// Dataset manifest: square masks of side `dim` and their annotated craters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub dim: usize,
    pub entries: Vec<DatasetEntry>,
}

impl Dataset {
    /// Read a manifest and resolve its relative paths against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EvalIoError> {
        let path = path.as_ref();
        let mut dataset: Dataset = read_json(path)?;
        if dataset.entries.is_empty() {
            return Err(EvalIoError::EmptyDataset);
        }
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for (index, entry) in dataset.entries.iter_mut().enumerate() {
            if entry.id.is_empty() {
                entry.id = image_id(index);
            }
            entry.mask_path = base.join(&entry.mask_path);
            if let Some(target) = entry.target_path.as_mut() {
                *target = base.join(&*target);
            }
        }
        log::debug!(
            "loaded dataset {} with {} entries (dim={})",
            path.display(),
            dataset.entries.len(),
            dataset.dim
        );
        Ok(dataset)
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    /// Ground-truth tables in entry order.
    pub fn ground_truth(&self) -> Vec<&[GroundTruthRow]> {
        self.entries
            .iter()
            .map(|e| e.ground_truth.as_slice())
            .collect()
    }

    /// Target mask paths when every entry has one, `None` when no entry has one.
    pub fn target_paths(&self) -> Result<Option<Vec<&Path>>, EvalIoError> {
        let targets: Vec<&Path> = self
            .entries
            .iter()
            .filter_map(|e| e.target_path.as_deref())
            .collect();
        match targets.len() {
            0 => Ok(None),
            n if n == self.entries.len() => Ok(Some(targets)),
            n => Err(EvalIoError::PartialTargets {
                with_target: n,
                total: self.entries.len(),
            }),
        }
    }
}

/// Circles found in one mask by the `extract` command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub mask_path: PathBuf,
    pub dim: usize,
    pub circles: Vec<ScoredCircle>,
}

/// Everything an evaluation run produced, as written by the `evaluate` command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub config: EvalConfig,
    /// Image ids in evaluation order; `statistics.images[i]` belongs to `ids[i]`.
    pub ids: Vec<String>,
    /// Mean pixel-wise binary cross-entropy, when target masks were given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_xe: Option<f64>,
    pub statistics: RunStatistics,
}

impl EvalReport {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EvalIoError> {
        read_json(path.as_ref())
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), EvalIoError> {
        write_json(path.as_ref(), self)
    }
}
