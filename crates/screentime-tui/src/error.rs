//! Error types for the screentime TUI.

use std::io;

use screentime_tracker::TrackerError;
use thiserror::Error;

/// TUI application errors.
#[derive(Error, Debug)]
pub enum TuiError {
    /// Raw mode or the alternate screen could not be set up, typically
    /// because stdout is not a TTY.
    #[error("Failed to initialize terminal: {0}")]
    TerminalInit(String),

    /// The terminal could not be restored; running `reset` can help.
    #[error("Failed to restore terminal: {0}")]
    TerminalCleanup(String),

    /// The tracker actor went away mid-request.
    #[error("Tracker unavailable: {0}")]
    Tracker(#[from] TrackerError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience Result type alias for TUI operations.
pub type Result<T> = std::result::Result<T, TuiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_init_error_display() {
        let error = TuiError::TerminalInit("not a TTY".to_string());
        let display = error.to_string();
        assert!(display.contains("Failed to initialize terminal"));
        assert!(display.contains("not a TTY"));
    }

    #[test]
    fn test_tracker_error_from_conversion() {
        let error: TuiError = TrackerError::ChannelClosed.into();
        assert!(matches!(error, TuiError::Tracker(_)));
        assert_eq!(error.to_string(), "Tracker unavailable: tracker channel closed");
    }

    #[test]
    fn test_io_error_from_conversion() {
        let error: TuiError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(error, TuiError::Io(_)));
        assert!(error.to_string().contains("IO error"));
    }
}
