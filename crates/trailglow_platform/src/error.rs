//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// No overlay surface or drawing context could be obtained
    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// `start()` was called on something that is already running
    #[error("Already started")]
    AlreadyStarted,

    /// Registering or removing an event listener failed
    #[error("Event listener error: {0}")]
    Listener(String),

    /// Requesting an animation frame failed
    #[error("Frame scheduling failed: {0}")]
    FrameScheduling(String),

    /// Removing the overlay from the document failed
    #[error("Failed to detach surface: {0}")]
    Detach(String),

    /// Generic platform error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
