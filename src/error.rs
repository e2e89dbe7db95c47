//! Error types for asset resolution and icon rendering.

use thiserror::Error;

/// Result type alias using IconError.
pub type Result<T> = std::result::Result<T, IconError>;

/// Main error type for resolution and rendering operations.
#[derive(Error, Debug)]
pub enum IconError {
    /// Remote or local lookup returned nothing usable.
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// HTTP client could not be built. Failed requests are `NotFound`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to decode or encode an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Model inheritance chain too deep (circular reference protection).
    #[error("Model inheritance too deep (possible circular reference): {0}")]
    InheritanceTooDeep(String),

    /// The rendering pipeline could not produce an image.
    #[error("Render failure: {0}")]
    RenderFailure(String),

    /// Configuration could not be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IconError {
    /// Whether this error only means "nothing there" rather than a broken pipeline.
    pub fn is_not_found(&self) -> bool {
        matches!(self, IconError::NotFound(_))
    }
}
