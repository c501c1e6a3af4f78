//! Background tasks for the groundwater tools.
//!
//! A task does its slow work (network access, reshaping) in `run` on the
//! tokio worker pool and touches shared state only in `finished_success`,
//! which the [`TaskManager`] calls from the single main-thread completion
//! loop.

mod error;
mod manager;
mod session;

pub use error::TaskError;
pub use manager::{Completion, Outcome, TaskManager};
pub use session::{acquire_session, DEFAULT_RETRY_DELAY};

use std::fmt;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Unique identifier of a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        TaskId(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// What a running task can see of its own submission.
#[derive(Debug, Clone)]
pub struct TaskContext {
    id: TaskId,
    kind: &'static str,
    description: String,
    token: CancellationToken,
}

impl TaskContext {
    pub fn new(kind: &'static str, description: &str, token: CancellationToken) -> Self {
        TaskContext {
            id: TaskId::new(),
            kind,
            description: description.to_string(),
            token,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token to select against in long awaits.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// A unit of background work with a main-thread completion step.
pub trait Task: Send + 'static {
    /// Log target of the task's messages.
    const KIND: &'static str;

    /// Main-thread state the completion step mutates.
    type State: 'static;

    fn description(&self) -> String;

    /// The background work. `Ok(true)` means success; `Ok(false)` means the
    /// task gave up without an error, e.g. after noticing cancellation.
    fn run(&mut self, ctx: &TaskContext) -> impl Future<Output = Result<bool, TaskError>> + Send;

    /// Apply the results to the main-thread state.
    fn finished_success(self, state: &mut Self::State) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_ids_are_hex_and_unique() {
        let a = TaskId::new();
        let b = TaskId::new();
        assert_ne!(a, b);
        let text = a.to_string();
        assert_eq!(text.len(), 32);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn context_follows_its_token() {
        let token = CancellationToken::new();
        let ctx = TaskContext::new("FindMapCanvasWellsTask", "find wells", token.clone());
        assert_eq!(ctx.kind(), "FindMapCanvasWellsTask");
        assert_eq!(ctx.description(), "find wells");
        assert!(!ctx.is_canceled());
        token.cancel();
        assert!(ctx.is_canceled());
    }
}
