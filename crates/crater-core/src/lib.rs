//! Core types for crater rim evaluation.
//!
//! This crate is intentionally small: circles, validated probability masks
//! and their binarized form with an integral image. It does *not* depend on
//! any network runtime or image codec.

mod circle;
mod logger;
mod mask;

pub use circle::Circle;
pub use mask::{BinaryMask, MaskError, ProbMap, ProbMapView};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
