//! Public error types for effect-cell.

use thiserror::Error;

/// Boxed failure payload carried out of a user-supplied effect callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for side-effect execution.
///
/// Returned from: `StateCell::set` / `set_with` (synchronous mode) and
/// `StateCell::wait_idle`; delivered to the configured error sink for
/// asynchronously executed effects.
#[derive(Debug, Error)]
pub enum EffectError {
    /// The effect callback reported a failure
    #[error("effect failed: {0}")]
    Failed(BoxError),

    /// The effect callback panicked
    #[error("effect panicked: {0}")]
    Panicked(String),

    /// The effect task was cancelled before completing (runtime shutdown)
    #[error("effect task cancelled")]
    Cancelled,
}

impl From<tokio::task::JoinError> for EffectError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            EffectError::Panicked(panic_message(err.into_panic()))
        } else {
            EffectError::Cancelled
        }
    }
}

/// Best-effort extraction of a panic payload into a displayable message.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
