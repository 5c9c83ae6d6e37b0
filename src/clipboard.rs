//! Clipboard seam for image paste.
//!
//! The engine never calls a browser clipboard API itself. Hosts implement
//! [`ClipboardSource`] over whatever clipboard they have and pass it to
//! [`crate::engine::EngineCore::paste_image`].

use serde::{Deserialize, Serialize};

use crate::load::ImageSource;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard access denied")]
    Denied,
    #[error("clipboard read failed: {0}")]
    Read(String),
}

/// Provider of clipboard image contents. Enables fakes in tests.
#[async_trait::async_trait(?Send)]
pub trait ClipboardSource {
    /// Read the first image on the clipboard, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`ClipboardError`] if the clipboard can't be read.
    async fn read_image(&self) -> Result<Option<ImageSource>, ClipboardError>;
}

/// Where a pasted image was placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PasteResult {
    /// Original image width in pixels.
    pub width: u32,
    /// Original image height in pixels.
    pub height: u32,
    /// Canvas x of the placed image's top-left corner.
    pub x: f64,
    /// Canvas y of the placed image's top-left corner.
    pub y: f64,
}
