//! Grayscale image <-> probability mask conversion.

use std::path::Path;

use crater_core::{MaskError, ProbMap};
use image::GrayImage;

use crate::io::{Dataset, EvalIoError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Map 8-bit intensities to probabilities (`v / 255`). The image must be square.
pub fn gray_to_mask(img: &GrayImage) -> Result<ProbMap, MaskError> {
    if img.width() != img.height() {
        return Err(MaskError::NotSquare {
            width: img.width() as usize,
            height: img.height() as usize,
        });
    }
    ProbMap::from_u8(img.width() as usize, img.as_raw())
}

/// Quantize a mask to 8 bits, rounding to the nearest level.
pub fn mask_to_gray(mask: &ProbMap) -> GrayImage {
    let dim = mask.dim() as u32;
    let view = mask.view();
    GrayImage::from_fn(dim, dim, |x, y| {
        image::Luma([(view.get(x as i32, y as i32) * 255.0).round() as u8])
    })
}

fn open_gray(path: &Path) -> Result<GrayImage, EvalIoError> {
    image::open(path)
        .map(|img| img.to_luma8())
        .map_err(|source| EvalIoError::Image {
            path: path.to_path_buf(),
            source,
        })
}

fn check_shape(path: &Path, img: &GrayImage, dim: usize) -> Result<(), EvalIoError> {
    if img.width() as usize != dim || img.height() as usize != dim {
        return Err(EvalIoError::MaskShape {
            path: path.to_path_buf(),
            width: img.width(),
            height: img.height(),
            dim,
        });
    }
    Ok(())
}

/// Load a `dim × dim` mask from any format `image` can decode (converted to luma).
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(path), fields(path = %path.display())))]
pub fn load_mask(path: &Path, dim: usize) -> Result<ProbMap, EvalIoError> {
    let img = open_gray(path)?;
    check_shape(path, &img, dim)?;
    Ok(gray_to_mask(&img)?)
}

/// Load a mask whose side is taken from the image itself; it must be square.
pub fn open_mask(path: &Path) -> Result<ProbMap, EvalIoError> {
    let img = open_gray(path)?;
    check_shape(path, &img, img.width() as usize)?;
    Ok(gray_to_mask(&img)?)
}

/// Save a mask as an 8-bit grayscale image; the format follows the extension.
pub fn save_mask(path: &Path, mask: &ProbMap) -> Result<(), EvalIoError> {
    mask_to_gray(mask)
        .save(path)
        .map_err(|source| EvalIoError::Image {
            path: path.to_path_buf(),
            source,
        })
}

impl Dataset {
    /// Load every prediction mask, in entry order.
    pub fn load_masks(&self) -> Result<Vec<ProbMap>, EvalIoError> {
        self.entries
            .iter()
            .map(|e| load_mask(&e.mask_path, self.dim))
            .collect()
    }

    /// Load target masks when the manifest lists them for every entry.
    pub fn load_targets(&self) -> Result<Option<Vec<ProbMap>>, EvalIoError> {
        let Some(paths) = self.target_paths()? else {
            return Ok(None);
        };
        paths
            .into_iter()
            .map(|p| load_mask(p, self.dim))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crater_detect::synthetic::render_rims;
    use crater_detect::Circle;

    #[test]
    fn png_roundtrip_keeps_binary_rims() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mask.png");
        let mask = render_rims(32, &[Circle::new(16.0, 16.0, 8.0)], 2.0).expect("mask");
        save_mask(&path, &mask).expect("save");
        let back = load_mask(&path, 32).expect("load");
        assert_eq!(back, mask);
    }

    #[test]
    fn wrong_size_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mask.png");
        GrayImage::new(16, 8).save(&path).expect("save");
        match load_mask(&path, 16) {
            Err(EvalIoError::MaskShape { width, height, .. }) => {
                assert_eq!((width, height), (16, 8));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(open_mask(&path), Err(EvalIoError::MaskShape { .. })));
    }

    #[test]
    fn non_square_image_is_not_square() {
        let err = gray_to_mask(&GrayImage::new(4, 2)).unwrap_err();
        assert_eq!(
            err,
            MaskError::NotSquare {
                width: 4,
                height: 2
            }
        );
        assert_eq!(err.to_string(), "mask must be square, got 4x2");
    }

    #[test]
    fn intensities_map_to_unit_interval() {
        let img = GrayImage::from_raw(2, 2, vec![0, 255, 51, 102]).expect("image");
        let mask = gray_to_mask(&img).expect("mask");
        let view = mask.view();
        assert_eq!(view.get(0, 0), 0.0);
        assert_eq!(view.get(1, 0), 1.0);
        assert!((view.get(0, 1) - 0.2).abs() < 1e-6);
    }
}
