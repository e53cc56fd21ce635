//! Error types for the fallible boundaries (markup, config, host IO)
//!
//! The pagination core itself never fails; it degrades to a fallback
//! placement and logs instead.

use thiserror::Error;

/// Markup that could not be turned into a content tree
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("fragment has no root element")]
    MissingRoot,
}

/// Invalid pager configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("margins leave no content area on a {width}x{height} page")]
    EmptyContentArea { width: f32, height: f32 },
}

/// Top-level error for host-facing entry points
#[derive(Debug, Error)]
pub enum PagerError {
    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}
