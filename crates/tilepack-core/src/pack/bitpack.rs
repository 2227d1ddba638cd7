//! Fixed-width bit packing of 8-bit pixel values.
//!
//! Each value is truncated to its low `bits_per_pixel` bits and appended to
//! the output at a running bit cursor, least-significant bit first. A value
//! that does not fit in the rest of the current byte spills its high bits
//! into the next one. There is no padding between values; only the final
//! byte may carry unused (zero) bits.
//!
//! Truncation is lossy: `0b1011_0110` packed at 3 bpp is stored as `0b110`.

use bitvec::prelude::*;
use thiserror::Error;

use crate::decode::ImagePlane;
use crate::tiling::{TileCoord, TileGrid, TileWindow};
use crate::Options;

/// Value packed for window positions that fall outside the source plane.
pub const PADDING_VALUE: u8 = 0;

/// Errors that can occur while packing or unpacking pixel data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackError {
    /// Bit depth outside 1..=8
    #[error("Invalid bit depth {0}: must be between 1 and 8")]
    InvalidBitDepth(u8),

    /// The output buffer could not be allocated
    #[error("Failed to allocate {bytes} bytes for packed buffer")]
    Allocation { bytes: usize },

    /// `pixel_count * bits_per_pixel` does not fit in `usize`
    #[error("Packed size overflows for {pixel_count} pixels at {bits_per_pixel} bpp")]
    SizeOverflow {
        pixel_count: usize,
        bits_per_pixel: u8,
    },

    /// Tile coordinate outside the grid
    #[error("Tile ({tx}, {ty}) is outside a {tiles_per_side}x{tiles_per_side} grid")]
    OutOfGrid {
        tx: u32,
        ty: u32,
        tiles_per_side: u32,
    },

    /// Packed input shorter than the requested value count needs
    #[error("Packed buffer truncated: need {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Bit-packed pixel values for one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBuffer {
    bytes: Vec<u8>,
    bits_per_pixel: u8,
    pixel_count: usize,
}

impl PackedBuffer {
    /// Packed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the buffer and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Size in bytes: `ceil(pixel_count * bits_per_pixel / 8)`.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    /// Number of values packed.
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Recover the (masked) values.
    pub fn unpack(&self) -> Result<Vec<u8>, PackError> {
        unpack_values(&self.bytes, self.bits_per_pixel, self.pixel_count)
    }
}

/// Byte length of `pixel_count` values packed at `bits_per_pixel`.
///
/// Returns `None` on overflow.
pub fn packed_len(pixel_count: usize, bits_per_pixel: u8) -> Option<usize> {
    pixel_count
        .checked_mul(usize::from(bits_per_pixel))
        .map(|bits| bits.div_ceil(8))
}

/// Pack the pixel window of tile `coord` from `plane`.
///
/// Window positions outside the plane (the right and bottom overshoot when
/// the image size is not a multiple of the tile count, or margin reaching
/// past the edge) are packed as [`PADDING_VALUE`].
///
/// # Errors
///
/// - `PackError::InvalidBitDepth` if `options.bits_per_pixel` is not 1..=8
/// - `PackError::OutOfGrid` if `coord` is outside `grid`
/// - `PackError::Allocation` if the output buffer cannot be reserved
pub fn pack_tile(
    plane: &ImagePlane,
    options: &Options,
    grid: &TileGrid,
    coord: TileCoord,
) -> Result<PackedBuffer, PackError> {
    check_bit_depth(options.bits_per_pixel)?;
    if !grid.contains(coord) {
        return Err(PackError::OutOfGrid {
            tx: coord.tx,
            ty: coord.ty,
            tiles_per_side: grid.tiles_per_side,
        });
    }

    let window = TileWindow::for_tile(grid, options.margin, coord);
    let values = window
        .positions()
        .map(|(x, y)| plane.get(x, y).unwrap_or(PADDING_VALUE));

    pack_iter(values, window.pixel_count(), options.bits_per_pixel)
}

/// Pack a slice of values at `bits_per_pixel`.
pub fn pack_values(values: &[u8], bits_per_pixel: u8) -> Result<PackedBuffer, PackError> {
    check_bit_depth(bits_per_pixel)?;
    pack_iter(values.iter().copied(), values.len(), bits_per_pixel)
}

/// Unpack `count` values stored at `bits_per_pixel`.
///
/// Trailing bytes beyond what `count` values need are ignored.
pub fn unpack_values(bytes: &[u8], bits_per_pixel: u8, count: usize) -> Result<Vec<u8>, PackError> {
    check_bit_depth(bits_per_pixel)?;
    let expected = packed_len(count, bits_per_pixel).ok_or(PackError::SizeOverflow {
        pixel_count: count,
        bits_per_pixel,
    })?;
    if bytes.len() < expected {
        return Err(PackError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }

    let width = usize::from(bits_per_pixel);
    let bits = BitSlice::<u8, Lsb0>::from_slice(bytes);

    let values = bits[..count * width]
        .chunks(width)
        .map(|chunk| {
            let mut value = 0u8;
            for (i, bit) in chunk.iter().by_vals().enumerate() {
                if bit {
                    value |= 1 << i;
                }
            }
            value
        })
        .collect();
    Ok(values)
}

fn check_bit_depth(bits_per_pixel: u8) -> Result<(), PackError> {
    if (1..=8).contains(&bits_per_pixel) {
        Ok(())
    } else {
        Err(PackError::InvalidBitDepth(bits_per_pixel))
    }
}

#[inline]
fn low_bits_mask(bits_per_pixel: u8) -> u8 {
    ((1u16 << bits_per_pixel) - 1) as u8
}

fn pack_iter(
    values: impl Iterator<Item = u8>,
    pixel_count: usize,
    bits_per_pixel: u8,
) -> Result<PackedBuffer, PackError> {
    let len = packed_len(pixel_count, bits_per_pixel).ok_or(PackError::SizeOverflow {
        pixel_count,
        bits_per_pixel,
    })?;

    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| PackError::Allocation { bytes: len })?;
    bytes.resize(len, 0);

    let mask = low_bits_mask(bits_per_pixel);
    let bpp = usize::from(bits_per_pixel);
    let mut cursor = 0usize;

    for value in values.take(pixel_count) {
        let v = value & mask;
        let byte_idx = cursor / 8;
        let shift = cursor % 8;

        bytes[byte_idx] |= v << shift;
        if shift + bpp > 8 {
            bytes[byte_idx + 1] |= v >> (8 - shift);
        }

        cursor += bpp;
    }

    Ok(PackedBuffer {
        bytes,
        bits_per_pixel,
        pixel_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::compute_tile_grid;

    /// Plane where each pixel holds `(y * width + x) % 256`.
    fn ramp_plane(width: u32, height: u32) -> ImagePlane {
        let pixels = (0..width * height).map(|i| (i % 256) as u8).collect();
        ImagePlane::new(width, height, pixels).unwrap()
    }

    fn options(bits_per_pixel: u8, margin: u8) -> Options {
        Options {
            bits_per_pixel,
            margin,
            ..Options::default()
        }
    }

    #[test]
    fn test_three_bit_layout() {
        let packed = pack_values(&[0, 1, 2, 3, 4, 5, 6, 7, 0], 3).unwrap();

        assert_eq!(packed.len(), 4);
        assert_eq!(packed.as_bytes(), &[0x88, 0xC6, 0xFA, 0x00]);
        assert_eq!(packed.unpack().unwrap(), vec![0, 1, 2, 3, 4, 5, 6, 7, 0]);
    }

    #[test]
    fn test_one_bit_layout() {
        let packed = pack_values(&[1, 0, 1, 1, 0, 0, 0, 1, 1], 1).unwrap();
        assert_eq!(packed.as_bytes(), &[0b1000_1101, 0b0000_0001]);
    }

    #[test]
    fn test_eight_bit_is_identity() {
        let values = [0u8, 17, 128, 255];
        let packed = pack_values(&values, 8).unwrap();
        assert_eq!(packed.as_bytes(), &values);
    }

    #[test]
    fn test_high_bits_are_truncated() {
        // 0xB6 = 0b1011_0110, low 3 bits = 0b110
        let packed = pack_values(&[0xB6], 3).unwrap();
        assert_eq!(packed.as_bytes(), &[0b110]);
        assert_eq!(packed.unpack().unwrap(), vec![6]);
    }

    #[test]
    fn test_value_spanning_bytes() {
        // Second 5-bit value starts at bit 5 and spills 2 bits into byte 1
        let packed = pack_values(&[0b00000, 0b11111], 5).unwrap();
        assert_eq!(packed.as_bytes(), &[0b1110_0000, 0b0000_0011]);
    }

    #[test]
    fn test_invalid_bit_depth() {
        assert_eq!(pack_values(&[1], 0), Err(PackError::InvalidBitDepth(0)));
        assert_eq!(pack_values(&[1], 9), Err(PackError::InvalidBitDepth(9)));
        assert_eq!(unpack_values(&[1], 0, 1), Err(PackError::InvalidBitDepth(0)));
    }

    #[test]
    fn test_empty_input() {
        let packed = pack_values(&[], 5).unwrap();
        assert!(packed.is_empty());
        assert_eq!(packed.unpack().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_unpack_truncated() {
        let err = unpack_values(&[0xFF], 3, 3).unwrap_err();
        assert_eq!(
            err,
            PackError::Truncated {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_packed_len() {
        assert_eq!(packed_len(9, 3), Some(4));
        assert_eq!(packed_len(1024, 8), Some(1024));
        assert_eq!(packed_len(1, 1), Some(1));
        assert_eq!(packed_len(0, 7), Some(0));
        assert_eq!(packed_len(usize::MAX, 8), None);
    }

    #[test]
    fn test_pack_tile_64_even_grid() {
        let plane = ramp_plane(64, 64);
        let grid = compute_tile_grid(64, 64, 1).unwrap();
        let opts = options(8, 0);

        for coord in grid.coords() {
            let packed = pack_tile(&plane, &opts, &grid, coord).unwrap();
            assert_eq!(packed.len(), 1024);
            assert_eq!(packed.pixel_count(), 32 * 32);
        }

        // Tile (1, 0) starts at source (32, 0)
        let packed = pack_tile(&plane, &opts, &grid, TileCoord::new(1, 0)).unwrap();
        assert_eq!(packed.as_bytes()[0], 32);
        // Second row of that tile starts at source (32, 1) = 96
        assert_eq!(packed.as_bytes()[32], 96);
    }

    #[test]
    fn test_pack_tile_10_even_grid() {
        let plane = ramp_plane(10, 10);
        let grid = compute_tile_grid(10, 10, 1).unwrap();
        let opts = options(8, 0);

        let packed = pack_tile(&plane, &opts, &grid, TileCoord::new(1, 1)).unwrap();
        assert_eq!(packed.len(), 25);
        let expected: Vec<u8> = (5..10)
            .flat_map(|y| (5..10).map(move |x| (y * 10 + x) as u8))
            .collect();
        assert_eq!(packed.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_pack_tile_9_pads_out_of_bounds() {
        let plane = ImagePlane::new(9, 9, vec![200u8; 81]).unwrap();
        let grid = compute_tile_grid(9, 9, 1).unwrap();
        let opts = options(8, 0);

        // Top-left tile lies fully inside the plane
        let inside = pack_tile(&plane, &opts, &grid, TileCoord::new(0, 0)).unwrap();
        assert!(inside.as_bytes().iter().all(|&v| v == 200));

        // Bottom-right tile covers source 5..10; column 9 and row 9 are padding
        let edge = pack_tile(&plane, &opts, &grid, TileCoord::new(1, 1)).unwrap();
        let values = edge.as_bytes();
        assert_eq!(values.len(), 25);
        for row in 0..5 {
            for col in 0..5 {
                let v = values[row * 5 + col];
                if row == 4 || col == 4 {
                    assert_eq!(v, PADDING_VALUE, "row {} col {}", row, col);
                } else {
                    assert_eq!(v, 200, "row {} col {}", row, col);
                }
            }
        }
    }

    #[test]
    fn test_pack_tile_does_not_wrap_rows() {
        // Right-edge overshoot must not pick up pixels from the next row
        let plane = ramp_plane(3, 3);
        let grid = compute_tile_grid(3, 3, 1).unwrap();
        let packed = pack_tile(&plane, &options(8, 0), &grid, TileCoord::new(1, 0)).unwrap();

        // Window is x 2..4, y 0..2 over a 3-wide plane
        assert_eq!(packed.as_bytes(), &[2, 0, 5, 0]);
    }

    #[test]
    fn test_pack_tile_interior_margin() {
        let plane = ramp_plane(16, 16);
        let grid = compute_tile_grid(16, 16, 2).unwrap();
        let opts = options(8, 2);

        let interior = pack_tile(&plane, &opts, &grid, TileCoord::new(1, 2)).unwrap();
        assert_eq!(interior.pixel_count(), 6 * 6);
        // First row reads 6 px starting at (4, 8), reaching into tile (2, 2)
        let first_row: Vec<u8> = (4..10).map(|x| (8 * 16 + x) as u8).collect();
        assert_eq!(&interior.as_bytes()[..6], first_row.as_slice());

        let corner = pack_tile(&plane, &opts, &grid, TileCoord::new(3, 3)).unwrap();
        assert_eq!(corner.pixel_count(), 4 * 4);
    }

    #[test]
    fn test_pack_tile_sub_byte_depth() {
        let plane = ramp_plane(8, 8);
        let grid = compute_tile_grid(8, 8, 1).unwrap();
        let packed = pack_tile(&plane, &options(4, 0), &grid, TileCoord::new(0, 0)).unwrap();

        assert_eq!(packed.len(), 8);
        let expected: Vec<u8> = (0..4)
            .flat_map(|y| (0..4).map(move |x| ((y * 8 + x) as u8) & 0x0F))
            .collect();
        assert_eq!(packed.unpack().unwrap(), expected);
    }

    #[test]
    fn test_pack_tile_out_of_grid() {
        let plane = ramp_plane(8, 8);
        let grid = compute_tile_grid(8, 8, 1).unwrap();
        let err = pack_tile(&plane, &options(8, 0), &grid, TileCoord::new(2, 0)).unwrap_err();
        assert_eq!(
            err,
            PackError::OutOfGrid {
                tx: 2,
                ty: 0,
                tiles_per_side: 2
            }
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
