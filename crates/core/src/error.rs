//! Workspace-level error types.

use thiserror::Error;

/// Top-level error for the demo.
///
/// Lower layers carry their own error types; this is the common currency
/// between the platform layer and the application.
#[derive(Error, Debug)]
pub enum Error {
    /// Vulkan reported a failure.
    #[error("Vulkan error: {0}")]
    Vulkan(String),

    /// Window or surface handling failed.
    #[error("Window error: {0}")]
    Window(String),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A bug in this codebase, not in the caller's usage.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Window("surface lost".to_string());
        assert_eq!(err.to_string(), "Window error: surface lost");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
