use sagw_wells::SagwError;
use thiserror::Error;

/// Failure of a background task.
///
/// Cancellation is not an error; a canceled task simply completes without
/// side effects.
#[derive(Debug, Error)]
pub enum TaskError {
    /// No session to the service could be opened
    #[error("Session error: {0}")]
    Session(String),

    /// The background work failed
    #[error("{0}")]
    Processing(String),

    /// The main-thread completion handler failed
    #[error("Completion failed: {0}")]
    Completion(String),

    /// The background work panicked
    #[error("Task panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    /// Session error carrying the last line of the underlying message.
    pub fn session(error: &SagwError) -> TaskError {
        let message = error.to_string();
        let last = message.lines().last().unwrap_or_default().to_string();
        TaskError::Session(last)
    }
}

impl From<SagwError> for TaskError {
    fn from(error: SagwError) -> Self {
        TaskError::Processing(error.to_string())
    }
}
