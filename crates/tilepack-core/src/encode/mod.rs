//! Tile encoding: compression and on-disk serialization.
//!
//! This module provides functionality for:
//! - Compressing packed tile buffers with zstd
//! - Writing tile files with the fixed 11-byte header
//! - Reading tile files back for verification
//!
//! # Examples
//!
//! ```ignore
//! use tilepack_core::encode::{Compressor, ZstdCompressor};
//!
//! let compressed = ZstdCompressor.compress(packed.as_bytes(), 3).unwrap();
//! write_tile(&compressed, &header, coord, &OutputTarget::CurrentDir).unwrap();
//! ```

mod compress;
mod tile_file;

pub use compress::{decompress, CompressError, Compressor, ZstdCompressor};
pub use tile_file::{
    read_tile, tile_file_name, write_tile, OutputTarget, TileFile, TileHeader, TileIoError,
    DEFAULT_PREFIX, HEADER_LEN, TILE_EXTENSION,
};
