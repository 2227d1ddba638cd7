//! Pixel windows read by each tile.
//!
//! A tile's window starts at `(tx * tile_width, ty * tile_height)` and spans
//! the tile size plus, for interior tiles only, `margin` extra pixels toward
//! the higher index along that axis. Tiles on the first or last column (row)
//! get no horizontal (vertical) margin.

use super::{TileCoord, TileGrid};

/// Rectangle of source pixels packed into one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileWindow {
    /// Left edge in source pixels.
    pub x: u32,
    /// Top edge in source pixels.
    pub y: u32,
    /// Width including any margin.
    pub x_max: u32,
    /// Height including any margin.
    pub y_max: u32,
}

impl TileWindow {
    /// Compute the window for `coord` in `grid`.
    pub fn for_tile(grid: &TileGrid, margin: u8, coord: TileCoord) -> Self {
        let last = grid.tiles_per_side.saturating_sub(1);
        let grow = |index: u32| {
            if index > 0 && index < last {
                u32::from(margin)
            } else {
                0
            }
        };

        Self {
            x: coord.tx * grid.tile_width,
            y: coord.ty * grid.tile_height,
            x_max: grid.tile_width + grow(coord.tx),
            y_max: grid.tile_height + grow(coord.ty),
        }
    }

    /// Number of pixels covered by the window.
    pub fn pixel_count(&self) -> usize {
        (self.x_max as usize) * (self.y_max as usize)
    }

    /// Iterate source coordinates in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (u32, u32)> {
        let (x0, y0, w, h) = (self.x, self.y, self.x_max, self.y_max);
        (0..h).flat_map(move |dy| (0..w).map(move |dx| (x0 + dx, y0 + dy)))
    }
}
