//! Zstandard compression of packed tile buffers.
//!
//! The pipeline only needs "bytes in, compressed bytes out", so the
//! compressor sits behind the [`Compressor`] trait. [`ZstdCompressor`] is the
//! production implementation; tests substitute failing or counting ones.

use thiserror::Error;

/// Errors reported by a compressor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompressError {
    /// The compressor rejected the input or level
    #[error("Compression failed: {0}")]
    Encoding(String),

    /// The output buffer could not be allocated
    #[error("Failed to allocate {bytes} bytes for compressed buffer")]
    Allocation { bytes: usize },

    /// A payload could not be decompressed
    #[error("Decompression failed: {0}")]
    Decoding(String),
}

/// Byte compressor used for every tile.
///
/// Implementations must be deterministic: the same input and level always
/// produce the same output. They are shared across worker threads.
pub trait Compressor: Send + Sync {
    /// Compress `input` at `level`.
    fn compress(&self, input: &[u8], level: u8) -> Result<Vec<u8>, CompressError>;
}

/// Compressor backed by the `zstd` crate's single-shot API.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZstdCompressor;

impl ZstdCompressor {
    pub fn new() -> Self {
        Self
    }
}

impl Compressor for ZstdCompressor {
    fn compress(&self, input: &[u8], level: u8) -> Result<Vec<u8>, CompressError> {
        let bound = zstd::zstd_safe::compress_bound(input.len());

        let mut output = Vec::new();
        output
            .try_reserve_exact(bound)
            .map_err(|_| CompressError::Allocation { bytes: bound })?;
        output.resize(bound, 0);

        let written = zstd::bulk::compress_to_buffer(input, &mut output, i32::from(level))
            .map_err(|e| CompressError::Encoding(e.to_string()))?;
        output.truncate(written);

        Ok(output)
    }
}

/// Decompress a single zstd frame produced by [`ZstdCompressor`].
pub fn decompress(payload: &[u8]) -> Result<Vec<u8>, CompressError> {
    zstd::stream::decode_all(payload).map_err(|e| CompressError::Decoding(e.to_string()))
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Same input always produces same output (deterministic).
        #[test]
        fn prop_deterministic_output(
            data in prop::collection::vec(any::<u8>(), 0..2048),
            level in 1u8..=19,
        ) {
            let first = ZstdCompressor.compress(&data, level).unwrap();
            let second = ZstdCompressor.compress(&data, level).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: compressed output never exceeds the advertised bound.
        #[test]
        fn prop_within_bound(data in prop::collection::vec(any::<u8>(), 0..2048)) {
            let compressed = ZstdCompressor.compress(&data, 3).unwrap();
            prop_assert!(compressed.len() <= zstd::zstd_safe::compress_bound(data.len()));
        }
    }
}
