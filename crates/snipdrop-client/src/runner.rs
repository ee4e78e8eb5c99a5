//! Fire-and-forget execution of remote operations.
//!
//! Callers get a [`TaskHandle`] back immediately. They may await it, or drop it
//! and let the task finish on its own. Errors and panics are logged either way.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use snipdrop_core::SyncError;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Schedules operations on a tokio runtime without blocking the caller.
#[derive(Debug, Clone)]
pub struct TaskRunner {
    handle: Handle,
}

impl TaskRunner {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Runner bound to the runtime the caller is executing on.
    pub fn current() -> Result<Self, SyncError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| SyncError::Task(format!("No tokio runtime available: {}", e)))
    }

    /// Schedule `operation` and return immediately.
    ///
    /// Invocations are independent: no ordering holds between two scheduled
    /// operations. Dropping the returned handle does not cancel the task.
    pub fn run<T, F>(&self, name: &'static str, operation: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, SyncError>> + Send + 'static,
    {
        let join = self.handle.spawn(async move {
            let result = match AssertUnwindSafe(operation).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(SyncError::Task(format!(
                    "{} panicked: {}",
                    name,
                    panic_message(payload.as_ref())
                ))),
            };
            match &result {
                Ok(_) => debug!(task = name, "Task completed"),
                Err(e) => warn!(task = name, error = %e, "Task failed"),
            }
            result
        });

        TaskHandle { name, join }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Result channel of a scheduled operation.
#[derive(Debug)]
pub struct TaskHandle<T> {
    name: &'static str,
    join: JoinHandle<Result<T, SyncError>>,
}

impl<T> TaskHandle<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the operation and observe its outcome.
    ///
    /// A panicking or aborted operation surfaces as `SyncError::Task`.
    pub async fn join(self) -> Result<T, SyncError> {
        match self.join.await {
            Ok(result) => result,
            Err(e) => {
                warn!(task = self.name, error = %e, "Task did not complete");
                Err(SyncError::Task(format!("{}: {}", self.name, e)))
            }
        }
    }
}
