//! Error types for the compositing engine.

/// Result type alias using [`OverlayError`].
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Errors raised while preparing, rendering or delivering an overlay.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("font unavailable: {0}")]
    FontUnavailable(String),

    #[error("icon load failed: {0}")]
    Icon(String),

    #[error("drawing surface unavailable: {0}")]
    Surface(String),

    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayError {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn font_unavailable(msg: impl Into<String>) -> Self {
        Self::FontUnavailable(msg.into())
    }

    pub fn icon(msg: impl Into<String>) -> Self {
        Self::Icon(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }
}
