use serde::{Deserialize, Serialize};

/// Errors raised when a probability mask violates its layout contract.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MaskError {
    #[error("mask side must be positive")]
    EmptyMask,

    #[error("invalid mask buffer length (expected {expected} values, got {got})")]
    InvalidLength { expected: usize, got: usize },

    #[error("mask value {value} at index {index} is not a probability in [0, 1]")]
    OutOfRange { index: usize, value: f32 },

    #[error("mask must be square, got {width}x{height}")]
    NotSquare { width: usize, height: usize },
}

fn validate(dim: usize, data: &[f32]) -> Result<(), MaskError> {
    if dim == 0 {
        return Err(MaskError::EmptyMask);
    }
    let expected = dim * dim;
    if data.len() != expected {
        return Err(MaskError::InvalidLength {
            expected,
            got: data.len(),
        });
    }
    if let Some((index, &value)) = data
        .iter()
        .enumerate()
        .find(|(_, v)| !(0.0..=1.0).contains(*v))
    {
        return Err(MaskError::OutOfRange { index, value });
    }
    Ok(())
}

/// Borrowed square probability mask, row-major, `dim * dim` values in `[0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct ProbMapView<'a> {
    dim: usize,
    data: &'a [f32],
}

impl<'a> ProbMapView<'a> {
    pub fn new(dim: usize, data: &'a [f32]) -> Result<Self, MaskError> {
        validate(dim, data)?;
        Ok(Self { dim, data })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn data(&self) -> &'a [f32] {
        self.data
    }

    /// Probability at `(x, y)`; zero outside the mask.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> f32 {
        let n = self.dim as i32;
        if x < 0 || y < 0 || x >= n || y >= n {
            return 0.0;
        }
        self.data[y as usize * self.dim + x as usize]
    }

    /// Threshold the mask: `p >= threshold` becomes 1.
    pub fn binarize(&self, threshold: f32) -> BinaryMask {
        let bits = self
            .data
            .iter()
            .map(|&p| u8::from(p >= threshold))
            .collect();
        BinaryMask::from_bits(self.dim, bits)
    }
}

/// Owned square probability mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProbMap", into = "RawProbMap")]
pub struct ProbMap {
    dim: usize,
    data: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct RawProbMap {
    dim: usize,
    data: Vec<f32>,
}

impl TryFrom<RawProbMap> for ProbMap {
    type Error = MaskError;

    fn try_from(raw: RawProbMap) -> Result<Self, Self::Error> {
        ProbMap::new(raw.dim, raw.data)
    }
}

impl From<ProbMap> for RawProbMap {
    fn from(map: ProbMap) -> Self {
        RawProbMap {
            dim: map.dim,
            data: map.data,
        }
    }
}

impl ProbMap {
    pub fn new(dim: usize, data: Vec<f32>) -> Result<Self, MaskError> {
        validate(dim, &data)?;
        Ok(Self { dim, data })
    }

    pub fn zeros(dim: usize) -> Result<Self, MaskError> {
        Self::new(dim, vec![0.0; dim * dim])
    }

    /// Build a mask from 8-bit intensities, mapping `v` to `v / 255`.
    pub fn from_u8(dim: usize, pixels: &[u8]) -> Result<Self, MaskError> {
        let data = pixels.iter().map(|&v| f32::from(v) / 255.0).collect();
        Self::new(dim, data)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn view(&self) -> ProbMapView<'_> {
        ProbMapView {
            dim: self.dim,
            data: &self.data,
        }
    }

    /// Set one pixel, clamping the value into `[0, 1]`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        if x < self.dim && y < self.dim {
            self.data[y * self.dim + x] = if value.is_nan() {
                0.0
            } else {
                value.clamp(0.0, 1.0)
            };
        }
    }
}

/// Binarized mask with a summed-area table for O(1) window counts.
#[derive(Clone, Debug)]
pub struct BinaryMask {
    dim: usize,
    bits: Vec<u8>,
    /// `(dim + 1)^2` prefix sums; row/column 0 are zero.
    integral: Vec<u32>,
}

impl BinaryMask {
    fn from_bits(dim: usize, bits: Vec<u8>) -> Self {
        let stride = dim + 1;
        let mut integral = vec![0u32; stride * stride];
        for y in 0..dim {
            let mut row_sum = 0u32;
            for x in 0..dim {
                row_sum += u32::from(bits[y * dim + x]);
                integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
            }
        }
        Self {
            dim,
            bits,
            integral,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Bit at `(x, y)`; zero outside the mask (zero padding).
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        let n = self.dim as i32;
        if x < 0 || y < 0 || x >= n || y >= n {
            return 0;
        }
        self.bits[y as usize * self.dim + x as usize]
    }

    /// Total number of set pixels.
    pub fn count(&self) -> u32 {
        let stride = self.dim + 1;
        self.integral[stride * stride - 1]
    }

    /// Number of set pixels in the half-open window `[x0, x1) × [y0, y1)`.
    ///
    /// The window may extend past the mask; outside pixels count as zero.
    pub fn window_sum(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> u32 {
        let n = self.dim as i32;
        let cx0 = x0.clamp(0, n) as usize;
        let cy0 = y0.clamp(0, n) as usize;
        let cx1 = x1.clamp(0, n) as usize;
        let cy1 = y1.clamp(0, n) as usize;
        if cx1 <= cx0 || cy1 <= cy0 {
            return 0;
        }
        let stride = self.dim + 1;
        let at = |x: usize, y: usize| self.integral[y * stride + x];
        at(cx1, cy1) + at(cx0, cy0) - at(cx0, cy1) - at(cx1, cy0)
    }
}
