//! Error types for spmpix-core.

use thiserror::Error;

/// Result type alias for spmpix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for spmpix operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Image or canvas dimensions that cannot be laid out.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Physical scale that cannot produce a nanometers-per-pixel ratio.
    #[error("invalid scale: scan range {scan_range_nm} nm over {pixel_width} px")]
    InvalidScale { scan_range_nm: f64, pixel_width: u32 },

    /// A required metadata parameter is absent or not an integer.
    #[error("missing or non-integer parameter: {0}")]
    MissingParameter(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
