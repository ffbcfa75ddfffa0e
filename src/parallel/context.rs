use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use super::error::TransformError;

/// Cancellable execution context shared by every task of a run.
///
/// Cancellation is cooperative: tasks only look at the context right before
/// they hand a value to the merge loop. A deadline is checked lazily at the
/// same point, so an expired context behaves like a cancelled one without any
/// timer thread.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Derive a context that is cancelled whenever `self` is, but whose own
    /// cancellation does not propagate upwards.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.err().is_some()
    }

    /// Why the context is done, if it is.
    pub fn err(&self) -> Option<TransformError> {
        if self.token.is_cancelled() {
            return Some(TransformError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(TransformError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
