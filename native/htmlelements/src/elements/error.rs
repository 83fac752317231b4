//! Errors raised when an element parser cannot be positioned

/// Precondition violations at parser construction.
///
/// Malformed markup is never an error; it becomes `Error` elements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElementsError {
    #[error("invalid start position {position}: {reason}")]
    InvalidStartPosition { position: i64, reason: &'static str },
}

impl ElementsError {
    pub(crate) fn invalid_start(position: i64, reason: &'static str) -> Self {
        ElementsError::InvalidStartPosition { position, reason }
    }
}
