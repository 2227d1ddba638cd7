//! Core types for image decoding.

use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format: {0}")]
    InvalidFormat(String),

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// I/O error during file reading.
    #[error("I/O error reading {path}: {message}")]
    IoError { path: String, message: String },

    /// The pixel buffer does not match the declared dimensions.
    #[error("Invalid pixel data: expected {expected} bytes (width * height), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// A decoded single-channel image.
///
/// Pixels are stored row-major, one byte per pixel. The plane is never
/// mutated after construction, so it can be shared freely across tile
/// workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePlane {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    pixels: Vec<u8>,
}

impl ImagePlane {
    /// Number of channels in every plane handled by this crate.
    pub const CHANNELS: u8 = 1;

    /// Create a plane from raw luma bytes.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::InvalidPixelData` if `pixels.len()` is not
    /// `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(DecodeError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a plane from an `image::GrayImage`.
    pub fn from_gray_image(img: image::GrayImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Always 1: colour sources are reduced to luma on load.
    pub fn channels(&self) -> u8 {
        Self::CHANNELS
    }

    /// Raw row-major pixel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, or `None` when the coordinate lies outside the plane.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize) * (self.width as usize) + x as usize;
        self.pixels.get(idx).copied()
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
