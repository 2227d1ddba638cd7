//! On-disk tile artifacts.
//!
//! # Layout
//!
//! All integers are little-endian.
//!
//! | offset | type | field               |
//! |--------|------|---------------------|
//! | 0      | i32  | tile width          |
//! | 4      | i32  | tile height         |
//! | 8      | u8   | bits per pixel      |
//! | 9      | u8   | compression level   |
//! | 10     | u8   | margin              |
//! | 11     | ...  | zstd payload to EOF |
//!
//! Width and height are the nominal grid tile size; interior tiles carry
//! `margin` extra pixels per axis on top of that.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::tiling::{TileCoord, TileGrid};
use crate::Options;

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 11;

/// File extension of tile artifacts.
pub const TILE_EXTENSION: &str = "zst";

/// Filename prefix used when writing into the current directory.
pub const DEFAULT_PREFIX: &str = "tile";

/// Errors raised while writing or reading tile files.
#[derive(Debug, Error)]
pub enum TileIoError {
    /// Output directory could not be created
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tile file could not be written
    #[error("Failed to write tile {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tile file could not be read
    #[error("Failed to read tile {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tile dimension does not fit the 32-bit signed header field
    #[error("Tile dimension {0} does not fit in the header")]
    DimensionOverflow(u32),

    /// Header is short or malformed
    #[error("Invalid tile header: {0}")]
    InvalidHeader(String),
}

/// Fixed header written before every tile payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileHeader {
    pub tile_width: i32,
    pub tile_height: i32,
    pub bits_per_pixel: u8,
    pub compression_level: u8,
    pub margin: u8,
}

impl TileHeader {
    /// Build the header shared by every tile of `grid`.
    pub fn new(grid: &TileGrid, options: &Options) -> Result<Self, TileIoError> {
        let to_i32 =
            |v: u32| i32::try_from(v).map_err(|_| TileIoError::DimensionOverflow(v));
        Ok(Self {
            tile_width: to_i32(grid.tile_width)?,
            tile_height: to_i32(grid.tile_height)?,
            bits_per_pixel: options.bits_per_pixel,
            compression_level: options.compression_level,
            margin: options.margin,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&self.tile_width.to_le_bytes());
        out[4..8].copy_from_slice(&self.tile_height.to_le_bytes());
        out[8] = self.bits_per_pixel;
        out[9] = self.compression_level;
        out[10] = self.margin;
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TileIoError> {
        if bytes.len() < HEADER_LEN {
            return Err(TileIoError::InvalidHeader(format!(
                "expected at least {} bytes, got {}",
                HEADER_LEN,
                bytes.len()
            )));
        }
        let mut w = [0u8; 4];
        let mut h = [0u8; 4];
        w.copy_from_slice(&bytes[0..4]);
        h.copy_from_slice(&bytes[4..8]);

        let header = Self {
            tile_width: i32::from_le_bytes(w),
            tile_height: i32::from_le_bytes(h),
            bits_per_pixel: bytes[8],
            compression_level: bytes[9],
            margin: bytes[10],
        };
        if header.tile_width <= 0 || header.tile_height <= 0 {
            return Err(TileIoError::InvalidHeader(format!(
                "non-positive tile size {}x{}",
                header.tile_width, header.tile_height
            )));
        }
        if !(1..=8).contains(&header.bits_per_pixel) {
            return Err(TileIoError::InvalidHeader(format!(
                "bits per pixel {} out of range",
                header.bits_per_pixel
            )));
        }
        Ok(header)
    }
}

/// Where tile files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// `tile_<tx>_<ty>.zst` in the process working directory.
    CurrentDir,
    /// `<dir>/<dir name>_<tx>_<ty>.zst`, creating `dir` if needed.
    Directory(PathBuf),
}

impl OutputTarget {
    /// Target for an optional output directory argument.
    pub fn from_optional(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(dir) if !dir.as_os_str().is_empty() => OutputTarget::Directory(dir),
            _ => OutputTarget::CurrentDir,
        }
    }

    /// Full path of the file for `coord`.
    pub fn tile_path(&self, coord: TileCoord) -> PathBuf {
        match self {
            OutputTarget::CurrentDir => PathBuf::from(tile_file_name(DEFAULT_PREFIX, coord)),
            OutputTarget::Directory(dir) => {
                let prefix = dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
                dir.join(tile_file_name(&prefix, coord))
            }
        }
    }

    /// Create the output directory if there is one. Safe to call concurrently.
    pub fn ensure_exists(&self) -> Result<(), TileIoError> {
        if let OutputTarget::Directory(dir) = self {
            fs::create_dir_all(dir).map_err(|source| TileIoError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Human-readable location for log messages.
    pub fn display_location(&self) -> String {
        match self {
            OutputTarget::CurrentDir => ".".to_string(),
            OutputTarget::Directory(dir) => dir.display().to_string(),
        }
    }
}

/// `<prefix>_<tx:03>_<ty:03>.zst`
pub fn tile_file_name(prefix: &str, coord: TileCoord) -> String {
    format!(
        "{}_{:03}_{:03}.{}",
        prefix, coord.tx, coord.ty, TILE_EXTENSION
    )
}

/// Write one tile (header then payload) and return its path.
pub fn write_tile(
    compressed: &[u8],
    header: &TileHeader,
    coord: TileCoord,
    target: &OutputTarget,
) -> Result<PathBuf, TileIoError> {
    target.ensure_exists()?;

    let path = target.tile_path(coord);
    let write_err = |source| TileIoError::Write {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&header.to_bytes()).map_err(write_err)?;
    writer.write_all(compressed).map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    Ok(path)
}

/// A tile file split into header and compressed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFile {
    pub header: TileHeader,
    pub payload: Vec<u8>,
}

impl TileFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, TileIoError> {
        let header = TileHeader::from_bytes(bytes)?;
        Ok(Self {
            header,
            payload: bytes[HEADER_LEN..].to_vec(),
        })
    }
}

/// Read and parse a tile file.
pub fn read_tile(path: &Path) -> Result<TileFile, TileIoError> {
    let bytes = fs::read(path).map_err(|source| TileIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    TileFile::parse(&bytes)
}
