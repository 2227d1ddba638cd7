//! Image loading for the tiling pipeline.
//!
//! This module provides functionality for:
//! - Decoding JPEG and PNG images from bytes or from disk
//! - Reducing any colour source to a single 8-bit luma plane
//!
//! # Examples
//!
//! ```ignore
//! use tilepack_core::decode::load_gray;
//!
//! let plane = load_gray(Path::new("heightmap.png")).unwrap();
//! println!("Loaded {}x{} plane", plane.width, plane.height);
//! ```

mod gray;
mod types;

pub use gray::{decode_gray, load_gray};
pub use types::{DecodeError, ImagePlane};
