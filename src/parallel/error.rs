use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransformError>;

/// Reason a transform run was aborted.
///
/// Only one of these is ever reported per run: the first one recorded wins and
/// every later failure is dropped.
#[derive(Error, Debug)]
pub enum TransformError {
    /// The message is wrapped with the failing index; the transform's own
    /// error is kept untouched as the `source`.
    #[error("transform at index {index} failed: {source}")]
    Transform {
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("transform cancelled")]
    Cancelled,

    #[error("transform deadline exceeded")]
    DeadlineExceeded,

    #[error("transform worker panicked")]
    Panicked,

    #[error("invalid transform configuration - {0}")]
    InvalidConfig(String),
}

impl TransformError {
    /// Index of the failing element, when the failure came from a transform.
    pub fn index(&self) -> Option<usize> {
        match self {
            TransformError::Transform { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// True for the cancellation family (explicit cancel or expired deadline).
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            TransformError::Cancelled | TransformError::DeadlineExceeded
        )
    }
}
