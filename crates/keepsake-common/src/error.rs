//! Error types for Keepsake.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for Keepsake operations.
#[derive(Debug, Error)]
pub enum KeepsakeError {
    /// Drawing surface errors
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Snapshot encoding errors
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Drawing surface errors.
///
/// A missing surface is never surfaced to the page; animators that cannot
/// acquire one simply stay inert.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The environment has no rendering support.
    #[error("Drawing surface unavailable: {0}")]
    Unavailable(String),

    /// Requested surface exceeds the maximum dimension.
    #[error("Surface {width}x{height} exceeds the maximum of {max} per side")]
    TooLarge {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Maximum supported side length
        max: u32,
    },
}

/// Audio playback errors.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No output device could be opened.
    #[error("Failed to initialize audio device: {0}")]
    DeviceInitFailed(String),

    /// The track could not be opened or decoded.
    #[error("Failed to load track '{path}': {message}")]
    LoadFailed {
        /// Path to the track
        path: PathBuf,
        /// Error message
        message: String,
    },
}

/// Result type alias for Keepsake operations.
pub type KeepsakeResult<T> = Result<T, KeepsakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_error_converts() {
        let err: KeepsakeError = SurfaceError::Unavailable("headless".into()).into();
        assert!(matches!(err, KeepsakeError::Surface(_)));
        assert!(err.to_string().contains("headless"));
    }

    #[test]
    fn test_config_error_message() {
        let err = KeepsakeError::Config("invalid type: string \"wide\"".into());
        assert_eq!(
            err.to_string(),
            "Config error: invalid type: string \"wide\""
        );
    }

    #[test]
    fn test_too_large_message() {
        let err = SurfaceError::TooLarge {
            width: 20_000,
            height: 10,
            max: 16_384,
        };
        assert_eq!(
            err.to_string(),
            "Surface 20000x10 exceeds the maximum of 16384 per side"
        );
    }
}
