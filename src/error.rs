//! Error types for chakra-drive.
//!
//! Errors here are construction-time faults (bad geometry, unreadable
//! configuration). Per-cycle control and estimation operations never
//! return errors; they degrade to a best-effort result instead.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// chakra-drive error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error while reading or writing configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    /// Module geometry is unusable (duplicate offsets, all-zero offsets)
    #[error("Invalid module geometry: {0}")]
    InvalidGeometry(String),

    /// A configuration parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
