use crate::{Task, TaskContext, TaskError, TaskId};
use std::collections::HashMap;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

type FinishFn<S> = Box<dyn FnOnce(&mut S) -> anyhow::Result<()> + Send>;

/// How the background part of a task ended.
pub enum Outcome<S> {
    /// `run` succeeded; holds the task's completion step
    Success(FinishFn<S>),
    /// `run` returned `Ok(false)`
    Unsuccessful,
    Canceled,
    Failed(TaskError),
}

impl<S> std::fmt::Debug for Outcome<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success(_) => f.write_str("Success"),
            Outcome::Unsuccessful => f.write_str("Unsuccessful"),
            Outcome::Canceled => f.write_str("Canceled"),
            Outcome::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

/// Message sent from a finished background task to the completion loop.
#[derive(Debug)]
pub struct Completion<S> {
    pub id: TaskId,
    pub kind: &'static str,
    pub description: String,
    pub outcome: Outcome<S>,
}

struct Pending {
    kind: &'static str,
    description: String,
    token: CancellationToken,
}

/// Runs tasks in the background and their completion steps on the caller.
///
/// Must be used from within a tokio runtime.
pub struct TaskManager<S: 'static> {
    sender: UnboundedSender<Completion<S>>,
    receiver: UnboundedReceiver<Completion<S>>,
    pending: HashMap<TaskId, Pending>,
}

impl<S: 'static> Default for TaskManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> TaskManager<S> {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded_channel();
        TaskManager {
            sender,
            receiver,
            pending: HashMap::new(),
        }
    }

    /// Start `task` in the background.
    pub fn add_task<T: Task<State = S>>(&mut self, mut task: T) -> TaskId {
        let description = task.description();
        let token = CancellationToken::new();
        let ctx = TaskContext::new(T::KIND, &description, token.clone());
        let id = ctx.id();
        log::info!(target: T::KIND, "Started task \"{}\"", description);

        let worker = tokio::spawn(async move {
            let result = task.run(&ctx).await;
            (task, result)
        });

        let sender = self.sender.clone();
        let watched = token.clone();
        let completion_description = description.clone();
        tokio::spawn(async move {
            let outcome = match worker.await {
                _ if watched.is_cancelled() => Outcome::Canceled,
                Ok((task, Ok(true))) => {
                    let finish: FinishFn<S> =
                        Box::new(move |state: &mut S| task.finished_success(state));
                    Outcome::Success(finish)
                }
                Ok((_, Ok(false))) => Outcome::Unsuccessful,
                Ok((_, Err(e))) => Outcome::Failed(e),
                Err(e) if e.is_panic() => Outcome::Failed(TaskError::Panicked(e.to_string())),
                Err(_) => Outcome::Canceled,
            };
            // the receiver only goes away with the manager
            let _ = sender.send(Completion {
                id,
                kind: T::KIND,
                description: completion_description,
                outcome,
            });
        });

        self.pending.insert(
            id,
            Pending {
                kind: T::KIND,
                description,
                token,
            },
        );
        id
    }

    /// Request cancellation of one task. Returns false for unknown ids.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.pending.get(&id) {
            Some(pending) => {
                pending.token.cancel();
                log::info!(target: pending.kind, "Task \"{}\" was canceled", pending.description);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        let ids: Vec<TaskId> = self.pending.keys().copied().collect();
        for id in ids {
            self.cancel(id);
        }
    }

    /// Number of tasks whose completion has not been handled yet.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Wait for the next finished task, `None` once nothing is pending.
    pub async fn next_completion(&mut self) -> Option<Completion<S>> {
        if self.pending.is_empty() {
            return None;
        }
        self.receiver.recv().await
    }

    /// Handle a completion on the main thread.
    ///
    /// Successful tasks get their completion step applied to `state`.
    /// Unsuccessful and canceled tasks leave `state` untouched. A failed task
    /// is logged and its error returned.
    pub fn finish(&mut self, completion: Completion<S>, state: &mut S) -> Result<(), TaskError> {
        self.pending.remove(&completion.id);
        let Completion {
            kind,
            description,
            outcome,
            ..
        } = completion;
        match outcome {
            Outcome::Success(finish) => {
                log::info!(target: kind, "Task \"{}\" completed.", description);
                finish(state).map_err(|e| {
                    log::error!(target: kind, "Task \"{}\" Exception: {:#}", description, e);
                    TaskError::Completion(format!("{:#}", e))
                })
            }
            Outcome::Unsuccessful | Outcome::Canceled => {
                log::warn!(
                    target: kind,
                    "Task \"{}\" not successful but without exception (probably the task was manually canceled by the user)",
                    description
                );
                Ok(())
            }
            Outcome::Failed(e) => {
                log::error!(target: kind, "Task \"{}\" Exception: {}", description, e);
                Err(e)
            }
        }
    }

    /// Handle completions until no task is pending. Stops at the first
    /// failed task and returns its error.
    pub async fn run_until_idle(&mut self, state: &mut S) -> Result<(), TaskError> {
        while let Some(completion) = self.next_completion().await {
            self.finish(completion, state)?;
        }
        Ok(())
    }
}
