//! Image loading.
//!
//! Decoding runs without touching any engine state, so a host can await a
//! load while gestures and the registry stay usable, then hand the decoded
//! image to [`crate::engine::EngineCore::place_image`].

#[cfg(test)]
#[path = "load_test.rs"]
mod load_test;

use std::path::PathBuf;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where an image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Encoded bytes in any format the `image` crate was built with.
    Bytes(Vec<u8>),
    /// A file on disk. Not available in the browser.
    Path(PathBuf),
    /// An already-decoded RGBA buffer.
    Decoded(RgbaImage),
}

/// Pixel dimensions of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    #[must_use]
    pub fn of(image: &RgbaImage) -> Self {
        Self { width: image.width(), height: image.height() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
    #[error("loading from a file path is not supported on this target")]
    Unsupported,
}

/// Decode `source` into an RGBA buffer.
///
/// # Errors
///
/// Returns [`LoadError`] when the file can't be read, the bytes don't decode,
/// or the result has a zero dimension.
pub async fn load_image(source: ImageSource) -> Result<RgbaImage, LoadError> {
    let image = match source {
        ImageSource::Decoded(image) => image,
        ImageSource::Bytes(bytes) => decode(&bytes)?,
        ImageSource::Path(path) => {
            let bytes = read_file(path).await?;
            decode(&bytes)?
        }
    };
    if image.width() == 0 || image.height() == 0 {
        return Err(LoadError::Empty);
    }
    debug!(width = image.width(), height = image.height(), "image loaded");
    Ok(image)
}

fn decode(bytes: &[u8]) -> Result<RgbaImage, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_file(path: PathBuf) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(&path).await.map_err(|source| LoadError::Io { path, source })
}

#[cfg(target_arch = "wasm32")]
async fn read_file(_path: PathBuf) -> Result<Vec<u8>, LoadError> {
    Err(LoadError::Unsupported)
}
