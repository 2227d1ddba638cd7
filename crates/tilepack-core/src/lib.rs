//! Tilepack Core - tiling and bit-packing engine
//!
//! This crate splits a greyscale image into a square grid of tiles, packs
//! each tile's pixels at a reduced bit depth, compresses them with zstd and
//! writes one file per tile.
//!
//! # Pipeline
//!
//! 1. [`decode`] - load the image as a single 8-bit channel
//! 2. [`tiling`] - derive the tile grid and per-tile pixel windows
//! 3. [`pack`] - bit-pack each window at `bits_per_pixel`
//! 4. [`encode`] - compress and write the tile file
//! 5. [`driver`] - run the above for every tile, serially or in parallel

pub mod decode;
pub mod driver;
pub mod encode;
pub mod error;
pub mod pack;
pub mod tiling;

pub use decode::{decode_gray, load_gray, DecodeError, ImagePlane};
pub use driver::{build_tiles, build_tiles_from_file, BuildSummary, Parallelism};
pub use encode::{Compressor, OutputTarget, ZstdCompressor};
pub use error::TileError;
pub use pack::{pack_tile, PackedBuffer};
pub use tiling::{compute_tile_grid, TileCoord, TileGrid};

/// Default subdivision count (a single tile).
pub const DEFAULT_SUBDIVISIONS: u8 = 0;
/// Default bits kept per pixel (lossless).
pub const DEFAULT_BITS_PER_PIXEL: u8 = 8;
/// Default margin in pixels.
pub const DEFAULT_MARGIN: u8 = 0;
/// Default zstd compression level.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 3;

/// Settings for a tiling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Options {
    /// Grid density: `2^subdivisions` tiles per side
    pub subdivisions: u8,
    /// Low-order bits kept per pixel (1 to 8)
    pub bits_per_pixel: u8,
    /// Extra pixels read past interior tile edges
    pub margin: u8,
    /// Level handed to the compressor
    pub compression_level: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            subdivisions: DEFAULT_SUBDIVISIONS,
            bits_per_pixel: DEFAULT_BITS_PER_PIXEL,
            margin: DEFAULT_MARGIN,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl Options {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check values that are wrong regardless of the image.
    pub fn validate(&self) -> Result<(), TileError> {
        if !(1..=8).contains(&self.bits_per_pixel) {
            return Err(TileError::InvalidArgument(format!(
                "bits per pixel must be between 1 and 8, got {}",
                self.bits_per_pixel
            )));
        }
        Ok(())
    }

    /// Total tiles this configuration produces.
    pub fn tile_count(&self) -> Option<u64> {
        1u64.checked_shl(2 * u32::from(self.subdivisions))
    }
}
