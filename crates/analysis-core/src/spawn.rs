//! Task submission for background work.
//!
//! Persisting fresh analyses must not hold up the response, so the coalescer
//! hands each persist to a [`TaskSpawner`]. Spawned tasks are independent,
//! unbounded in number, and keep running if the request that spawned them is
//! dropped.
//!
//! - [`TokioSpawner`] - Detached tokio tasks
//! - [`TrackingSpawner`] - Tokio tasks whose handles are kept so the host can drain them

use futures::future::{BoxFuture, join_all};
use std::fmt::Debug;
use std::sync::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Capability to run a future in the background without awaiting it.
pub trait TaskSpawner: Send + Sync + Debug {
    /// Submits a task. Must not block and must not wait for the task.
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

fn spawn_on(handle: Option<&Handle>, task: BoxFuture<'static, ()>) -> Option<JoinHandle<()>> {
    match handle {
        Some(handle) => Some(handle.spawn(task)),
        None => match Handle::try_current() {
            Ok(handle) => Some(handle.spawn(task)),
            Err(e) => {
                warn!(error = %e, "No tokio runtime available, dropping background task");
                None
            }
        },
    }
}

/// Spawns detached tasks on a tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioSpawner {
    handle: Option<Handle>,
}

impl TokioSpawner {
    /// Spawns onto whichever runtime is current at spawn time.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Spawns onto a specific runtime.
    #[must_use]
    pub const fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        // Dropping the JoinHandle detaches the task.
        drop(spawn_on(self.handle.as_ref(), task));
    }
}

/// Spawns tokio tasks and remembers their handles.
///
/// Use [`drain`](Self::drain) on shutdown, or in tests, to wait for every
/// task submitted so far. Tasks are never aborted.
#[derive(Debug, Default)]
pub struct TrackingSpawner {
    handle: Option<Handle>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl TrackingSpawner {
    /// Creates a tracking spawner that uses the runtime current at spawn time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracking spawner bound to a specific runtime.
    #[must_use]
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
            pending: Mutex::default(),
        }
    }

    /// Returns the number of tasks submitted since the last drain.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or_default()
    }

    /// Waits for every task submitted so far.
    ///
    /// Returns the number of tasks that completed. Tasks that panicked are
    /// logged and not counted.
    pub async fn drain(&self) -> usize {
        let handles = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(e) => std::mem::take(&mut *e.into_inner()),
        };

        let total = handles.len();
        let completed = join_all(handles)
            .await
            .into_iter()
            .filter(|result| match result {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Background task failed");
                    false
                }
            })
            .count();

        debug!(total, completed, "Drained background tasks");
        completed
    }
}

impl TaskSpawner for TrackingSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        if let Some(join) = spawn_on(self.handle.as_ref(), task) {
            match self.pending.lock() {
                Ok(mut pending) => pending.push(join),
                Err(e) => e.into_inner().push(join),
            }
        }
    }
}
