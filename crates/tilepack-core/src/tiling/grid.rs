//! Tile grid geometry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while deriving a tile grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    EmptyImage { width: u32, height: u32 },

    /// `1 << subdivisions` does not fit the grid counter
    #[error("Subdivision count {0} overflows the tile counter")]
    Overflow(u8),

    /// More tiles per side than pixels along the shorter edge
    #[error(
        "Subdivision count {subdivisions} gives {tiles_per_side} tiles per side, \
         more than the shorter image edge ({min_edge} px)"
    )]
    TooManyTiles {
        subdivisions: u8,
        tiles_per_side: u32,
        min_edge: u32,
    },
}

/// Square grid of equally sized tiles covering an image.
///
/// When the image dimensions are not multiples of `tiles_per_side`, the last
/// row and column of tiles extend past the image edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Number of tiles along each axis (`2^subdivisions`).
    pub tiles_per_side: u32,
    /// Tile width in pixels, excluding margin.
    pub tile_width: u32,
    /// Tile height in pixels, excluding margin.
    pub tile_height: u32,
}

impl TileGrid {
    /// Total number of tiles in the grid.
    pub fn tile_count(&self) -> usize {
        (self.tiles_per_side as usize) * (self.tiles_per_side as usize)
    }

    /// Iterate tile coordinates row by row (`ty` outer, `tx` inner).
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let n = self.tiles_per_side;
        (0..n).flat_map(move |ty| (0..n).map(move |tx| TileCoord { tx, ty }))
    }

    /// Coordinate of the `index`-th tile in row-major order.
    pub fn coord_at(&self, index: usize) -> TileCoord {
        let n = self.tiles_per_side as usize;
        TileCoord {
            tx: (index % n) as u32,
            ty: (index / n) as u32,
        }
    }

    /// True if `coord` lies inside the grid.
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.tx < self.tiles_per_side && coord.ty < self.tiles_per_side
    }
}

/// Position of a tile within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column index.
    pub tx: u32,
    /// Row index.
    pub ty: u32,
}

impl TileCoord {
    pub fn new(tx: u32, ty: u32) -> Self {
        Self { tx, ty }
    }
}

/// Derive the tile grid for an image.
///
/// `tiles_per_side = 2^subdivisions` and each tile covers
/// `ceil(width / tiles_per_side) x ceil(height / tiles_per_side)` pixels.
///
/// # Errors
///
/// - `GridError::EmptyImage` if either dimension is zero
/// - `GridError::Overflow` if the shift overflows `u32`
/// - `GridError::TooManyTiles` if there would be more tiles per side than
///   pixels along the shorter edge
pub fn compute_tile_grid(width: u32, height: u32, subdivisions: u8) -> Result<TileGrid, GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::EmptyImage { width, height });
    }

    let tiles_per_side = 1u32
        .checked_shl(u32::from(subdivisions))
        .ok_or(GridError::Overflow(subdivisions))?;

    let min_edge = width.min(height);
    if tiles_per_side > min_edge {
        return Err(GridError::TooManyTiles {
            subdivisions,
            tiles_per_side,
            min_edge,
        });
    }

    Ok(TileGrid {
        tiles_per_side,
        tile_width: width.div_ceil(tiles_per_side),
        tile_height: height.div_ceil(tiles_per_side),
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every subdivision count up to log2(min edge) yields a grid
        /// that covers the whole image.
        #[test]
        fn prop_grid_covers_image(
            width in 1u32..=4096,
            height in 1u32..=4096,
            subdivisions in 0u8..=12,
        ) {
            let min_edge = width.min(height);
            prop_assume!(subdivisions <= (31 - min_edge.leading_zeros()) as u8);

            let grid = compute_tile_grid(width, height, subdivisions).unwrap();
            prop_assert_eq!(grid.tiles_per_side, 1u32 << subdivisions);
            prop_assert!(grid.tile_width * grid.tiles_per_side >= width);
            prop_assert!(grid.tile_height * grid.tiles_per_side >= height);
            // Overshoot is less than one tile
            prop_assert!(grid.tile_width * grid.tiles_per_side < width + grid.tiles_per_side);
            prop_assert!(grid.tile_height * grid.tiles_per_side < height + grid.tiles_per_side);
        }
    }
}
