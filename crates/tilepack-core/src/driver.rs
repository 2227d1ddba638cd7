//! Tile build driver.
//!
//! Runs Pack -> Compress -> Write for every tile of the grid. Tiles share
//! only the read-only source plane and the output directory, so they can be
//! processed in any order and on any thread. Every mode stops at the first
//! failing tile and returns that error; files written for earlier tiles are
//! left on disk.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::decode::{load_gray, ImagePlane};
use crate::encode::{write_tile, Compressor, OutputTarget, TileHeader, ZstdCompressor};
use crate::error::TileError;
use crate::pack::pack_tile;
use crate::tiling::{compute_tile_grid, TileCoord, TileGrid};
use crate::Options;

/// How tiles are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// One tile at a time, row by row.
    Serial,
    /// Rayon's global pool.
    #[default]
    Auto,
    /// A dedicated pool with this many worker threads.
    Threads(NonZeroUsize),
}

impl Parallelism {
    /// Map a `--jobs` style count: `None` is automatic, `1` is serial.
    pub fn from_jobs(jobs: Option<usize>) -> Self {
        match jobs.and_then(NonZeroUsize::new) {
            None => Parallelism::Auto,
            Some(n) if n.get() == 1 => Parallelism::Serial,
            Some(n) => Parallelism::Threads(n),
        }
    }
}

/// Result of processing one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileOutcome {
    pub coord: TileCoord,
    pub path: PathBuf,
    pub packed_bytes: usize,
    pub compressed_bytes: usize,
}

/// Totals for a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub grid: TileGrid,
    /// Per-tile results in row-major order.
    pub tiles: Vec<TileOutcome>,
}

impl BuildSummary {
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn packed_bytes(&self) -> u64 {
        self.tiles.iter().map(|t| t.packed_bytes as u64).sum()
    }

    pub fn compressed_bytes(&self) -> u64 {
        self.tiles.iter().map(|t| t.compressed_bytes as u64).sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.tiles.iter().map(|t| t.path.as_path())
    }
}

/// Pack, compress and write a single tile.
pub fn process_tile(
    plane: &ImagePlane,
    options: &Options,
    grid: &TileGrid,
    header: &TileHeader,
    coord: TileCoord,
    target: &OutputTarget,
    compressor: &dyn Compressor,
) -> Result<TileOutcome, TileError> {
    let packed = pack_tile(plane, options, grid, coord)?;
    let compressed = compressor.compress(packed.as_bytes(), options.compression_level)?;
    let path = write_tile(&compressed, header, coord, target)?;

    debug!(
        tx = coord.tx,
        ty = coord.ty,
        packed = packed.len(),
        compressed = compressed.len(),
        "Wrote {}",
        path.display()
    );

    Ok(TileOutcome {
        coord,
        path,
        packed_bytes: packed.len(),
        compressed_bytes: compressed.len(),
    })
}

/// Split `plane` into tiles and write them to `target`.
///
/// # Errors
///
/// Returns the first error hit by any tile. Invalid options and impossible
/// grids are rejected before any file is written.
pub fn build_tiles(
    plane: &ImagePlane,
    options: &Options,
    target: &OutputTarget,
    compressor: &dyn Compressor,
    parallelism: Parallelism,
) -> Result<BuildSummary, TileError> {
    options.validate()?;

    let grid = compute_tile_grid(plane.width, plane.height, options.subdivisions)?;
    info!(
        "Subdivisions: {} ({}x{} for {} total tiles)",
        options.subdivisions,
        grid.tiles_per_side,
        grid.tiles_per_side,
        grid.tile_count()
    );
    info!("Target tile size: {}x{}", grid.tile_width, grid.tile_height);

    let header = TileHeader::new(&grid, options)?;
    target.ensure_exists()?;

    let run_tile = |coord: TileCoord| {
        process_tile(plane, options, &grid, &header, coord, target, compressor).inspect_err(|e| {
            warn!(tx = coord.tx, ty = coord.ty, "Tile failed: {}", e);
        })
    };

    let mut tiles = match parallelism {
        Parallelism::Serial => grid.coords().map(run_tile).collect::<Result<Vec<_>, _>>()?,
        Parallelism::Auto => run_parallel(&grid, &run_tile)?,
        Parallelism::Threads(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n.get())
                .build()
                .map_err(|e| TileError::InvalidArgument(format!("worker pool: {}", e)))?;
            pool.install(|| run_parallel(&grid, &run_tile))?
        }
    };
    tiles.sort_by_key(|t| (t.coord.ty, t.coord.tx));

    let summary = BuildSummary { grid, tiles };
    info!(
        "Done. {} tiles created in {} ({} packed bytes -> {} compressed bytes)",
        summary.tile_count(),
        target.display_location(),
        summary.packed_bytes(),
        summary.compressed_bytes()
    );
    Ok(summary)
}

/// Load `input` and tile it with the zstd compressor.
pub fn build_tiles_from_file(
    input: &Path,
    options: &Options,
    target: &OutputTarget,
    parallelism: Parallelism,
) -> Result<BuildSummary, TileError> {
    options.validate()?;
    let plane = load_gray(input)?;
    build_tiles(&plane, options, target, &ZstdCompressor, parallelism)
}

fn run_parallel<F>(grid: &TileGrid, run_tile: &F) -> Result<Vec<TileOutcome>, TileError>
where
    F: Fn(TileCoord) -> Result<TileOutcome, TileError> + Sync,
{
    (0..grid.tile_count())
        .into_par_iter()
        .map(|i| run_tile(grid.coord_at(i)))
        .collect()
}
