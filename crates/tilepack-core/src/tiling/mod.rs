//! Tile geometry: grid layout and per-tile pixel windows.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner of the source image
//! - `tx` indexes columns, `ty` indexes rows
//! - The grid is always square: `2^subdivisions` tiles per side

mod grid;
mod window;

pub use grid::{compute_tile_grid, GridError, TileCoord, TileGrid};
pub use window::TileWindow;
