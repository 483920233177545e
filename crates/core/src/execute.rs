//! Plan execution
//!
//! Runs each action once, records its outcome and keeps going. A move is a
//! copy followed by a delete of the same object, and the delete is only
//! issued after that object's copy succeeded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use futures::stream;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::RemotePath;
use crate::plan::{ObjectAction, OperationPlan, Verb};
use crate::traits::{ObjectStore, lookup_object};

/// Default number of in-flight actions
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Why an action failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The source object did not exist
    NotFound,
    /// Any other store failure
    Transport,
    /// Never started because the run was interrupted
    Cancelled,
}

impl From<&Error> for ErrorKind {
    fn from(error: &Error) -> Self {
        match error {
            Error::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Transport,
        }
    }
}

/// Outcome of one action
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub action: ObjectAction,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExecutionResult {
    fn ok(action: ObjectAction) -> Self {
        Self {
            action,
            succeeded: true,
            error_kind: None,
            message: None,
        }
    }

    fn failed(action: ObjectAction, kind: ErrorKind, message: String) -> Self {
        Self {
            action,
            succeeded: false,
            error_kind: Some(kind),
            message: Some(message),
        }
    }
}

/// All outcomes of a plan, in plan order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    pub results: Vec<ExecutionResult>,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.succeeded)
    }

    pub fn was_cancelled(&self) -> bool {
        self.results
            .iter()
            .any(|r| r.error_kind == Some(ErrorKind::Cancelled))
    }
}

/// Shared interrupt flag
///
/// Raising it stops new actions from starting; running ones finish.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Executes plans against a store
pub struct Executor<'a> {
    store: &'a dyn ObjectStore,
    concurrency: usize,
    cancel: CancelFlag,
}

impl<'a> Executor<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self {
            store,
            concurrency: DEFAULT_CONCURRENCY,
            cancel: CancelFlag::new(),
        }
    }

    /// Maximum in-flight actions (at least 1)
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run every action of `plan` and return outcomes in plan order
    pub async fn execute(&self, plan: OperationPlan) -> ExecutionReport {
        tracing::debug!(
            verb = %plan.verb,
            actions = plan.actions.len(),
            concurrency = self.concurrency,
            "Executing plan"
        );

        let results = stream::iter(plan.actions)
            .map(|action| self.run(action))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        ExecutionReport { results }
    }

    async fn run(&self, action: ObjectAction) -> ExecutionResult {
        if self.cancel.is_cancelled() {
            return ExecutionResult::failed(
                action,
                ErrorKind::Cancelled,
                "interrupted before start".to_string(),
            );
        }

        match self.apply(&action).await {
            Ok(()) => {
                tracing::debug!(verb = %action.verb, source = %action.source, "Action succeeded");
                ExecutionResult::ok(action)
            }
            Err(e) => {
                tracing::warn!(verb = %action.verb, source = %action.source, error = %e, "Action failed");
                let kind = ErrorKind::from(&e);
                ExecutionResult::failed(action, kind, e.to_string())
            }
        }
    }

    async fn apply(&self, action: &ObjectAction) -> Result<()> {
        match action.verb {
            Verb::List => match action.info {
                Some(_) => Ok(()),
                None => lookup_object(self.store, &action.source).await.map(|_| ()),
            },
            Verb::Remove => {
                // Deleting an absent key succeeds on S3, so check first
                if action.info.is_none() {
                    lookup_object(self.store, &action.source).await?;
                }
                self.store.delete_object(&action.source).await
            }
            Verb::Copy => {
                let dst = destination(action)?;
                self.store.copy_object(&action.source, dst).await
            }
            Verb::Move => {
                let dst = destination(action)?;
                self.store.copy_object(&action.source, dst).await?;
                self.store
                    .delete_object(&action.source)
                    .await
                    .map_err(|e| {
                        Error::General(format!("copied to {dst} but removing source failed: {e}"))
                    })
            }
        }
    }
}

fn destination(action: &ObjectAction) -> Result<&RemotePath> {
    action.destination.as_ref().ok_or_else(|| {
        Error::InvalidPlan(format!(
            "{} of {} has no destination",
            action.verb, action.source
        ))
    })
}
