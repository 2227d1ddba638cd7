//! Greyscale decoding of JPEG and PNG sources.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageError, ImageReader};
use tracing::info;

use super::{DecodeError, ImagePlane};

/// Decode an encoded image from bytes into a single-channel plane.
///
/// Colour images are reduced to luma by the `image` crate.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format is not recognized.
/// Returns `DecodeError::CorruptedFile` if the data cannot be decoded.
pub fn decode_gray(bytes: &[u8]) -> Result<ImagePlane, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let img = reader.decode().map_err(map_image_error)?;
    Ok(into_plane(img))
}

/// Load an image file from disk into a single-channel plane.
///
/// # Errors
///
/// Returns `DecodeError::IoError` if the file cannot be opened, otherwise the
/// same errors as [`decode_gray`].
pub fn load_gray(path: &Path) -> Result<ImagePlane, DecodeError> {
    info!("Loading image {}", path.display());

    let reader = ImageReader::open(path)
        .map_err(|e| DecodeError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
        .with_guessed_format()
        .map_err(|e| DecodeError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let img = reader.decode().map_err(map_image_error)?;
    let source_channels = img.color().channel_count();
    let plane = into_plane(img);

    info!(
        "Loaded image {}: {}x{} ({} channels)",
        path.display(),
        plane.width,
        plane.height,
        source_channels
    );
    Ok(plane)
}

fn into_plane(img: DynamicImage) -> ImagePlane {
    ImagePlane::from_gray_image(img.into_luma8())
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(e) => DecodeError::InvalidFormat(e.to_string()),
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}
