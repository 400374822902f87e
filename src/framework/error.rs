//! # Framework Errors
//!
//! Failures of the channel between a handle and its controller. Component errors
//! (`SearchError`, `CommentError`, ...) wrap these via `From`.

/// Errors that can occur while talking to a controller task.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("Controller closed")]
    ControllerClosed,
    #[error("Controller dropped response channel")]
    ControllerDropped,
}
