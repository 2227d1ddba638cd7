//! Top-level error type for a tiling run.
//!
//! Each stage has its own error enum; they all fold into [`TileError`], whose
//! variants are the five failure classes a run can end with. Every one of
//! them aborts the run.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::{CompressError, TileIoError};
use crate::pack::PackError;
use crate::tiling::GridError;

#[derive(Debug, Error)]
pub enum TileError {
    /// Bad option value or geometry request
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The source image could not be loaded
    #[error("Failed to load image: {0}")]
    Decode(#[from] DecodeError),

    /// A packed or compressed buffer could not be allocated
    #[error("Out of memory: failed to allocate {bytes} bytes")]
    Allocation { bytes: usize },

    /// The compressor reported a failure
    #[error("{0}")]
    Compression(String),

    /// Writing (or reading) a tile file failed
    #[error(transparent)]
    Io(#[from] TileIoError),
}

impl From<GridError> for TileError {
    fn from(err: GridError) -> Self {
        TileError::InvalidArgument(err.to_string())
    }
}

impl From<PackError> for TileError {
    fn from(err: PackError) -> Self {
        match err {
            PackError::Allocation { bytes } => TileError::Allocation { bytes },
            other => TileError::InvalidArgument(other.to_string()),
        }
    }
}

impl From<CompressError> for TileError {
    fn from(err: CompressError) -> Self {
        match err {
            CompressError::Allocation { bytes } => TileError::Allocation { bytes },
            other => TileError::Compression(other.to_string()),
        }
    }
}
