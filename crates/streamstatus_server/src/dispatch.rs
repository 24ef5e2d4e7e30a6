//! Hands accepted events to the sync cycle off the request path.

use crate::error::{ServerError, ServerResult};
use crate::sync::SyncRunner;
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use streamstatus_core::SyncEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Default bound of the sync queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// How accepted events reach the sync cycle.
///
/// Both strategies run one cycle at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// A bounded queue drained by a single worker.
    Queue {
        /// Events that may wait before deliveries are refused.
        capacity: usize,
    },
    /// A blocking task per event, serialized on the repository lock.
    Inline,
}

impl DispatchMode {
    /// Sets the queue bound. Has no effect on [`DispatchMode::Inline`].
    pub fn with_capacity(self, capacity: usize) -> Self {
        match self {
            Self::Queue { .. } => Self::Queue { capacity },
            Self::Inline => Self::Inline,
        }
    }
}

impl Default for DispatchMode {
    fn default() -> Self {
        Self::Queue {
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl FromStr for DispatchMode {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(Self::default()),
            "inline" => Ok(Self::Inline),
            other => Err(ServerError::Config(format!(
                "unknown dispatch mode {other:?} (expected queue or inline)"
            ))),
        }
    }
}

/// Dispatches sync events to a [`SyncRunner`].
///
/// Must be started inside a tokio runtime.
pub struct SyncDispatcher {
    mode: DispatchMode,
    runner: Arc<dyn SyncRunner>,
    queue: Mutex<Option<mpsc::Sender<SyncEvent>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl SyncDispatcher {
    /// Starts the dispatcher, spawning the queue worker if needed.
    pub fn start(mode: DispatchMode, runner: Arc<dyn SyncRunner>) -> Self {
        let mut tasks = Vec::new();
        let queue = match mode {
            DispatchMode::Queue { capacity } => {
                let (tx, rx) = mpsc::channel(capacity.max(1));
                tasks.push(tokio::spawn(drain(rx, Arc::clone(&runner))));
                Some(tx)
            }
            DispatchMode::Inline => None,
        };

        Self {
            mode,
            runner,
            queue: Mutex::new(queue),
            tasks: Mutex::new(tasks),
            closed: AtomicBool::new(false),
        }
    }

    /// The strategy in use.
    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Schedules a sync cycle for `event`.
    ///
    /// # Errors
    ///
    /// [`ServerError::QueueFull`] if the queue is at capacity,
    /// [`ServerError::ShuttingDown`] after [`SyncDispatcher::shutdown`].
    pub fn dispatch(&self, event: SyncEvent) -> ServerResult<()> {
        match self.mode {
            DispatchMode::Queue { .. } => {
                let queue = self.queue.lock();
                let sender = queue.as_ref().ok_or(ServerError::ShuttingDown)?;
                sender.try_send(event).map_err(|e| match e {
                    mpsc::error::TrySendError::Full(_) => ServerError::QueueFull,
                    mpsc::error::TrySendError::Closed(_) => ServerError::ShuttingDown,
                })
            }
            DispatchMode::Inline => {
                let mut tasks = self.tasks.lock();
                if self.closed.load(Ordering::SeqCst) {
                    return Err(ServerError::ShuttingDown);
                }
                tasks.retain(|task| !task.is_finished());
                let runner = Arc::clone(&self.runner);
                tasks.push(tokio::task::spawn_blocking(move || {
                    runner.run_cycle(&event);
                }));
                Ok(())
            }
        }
    }

    /// Stops accepting events and waits for scheduled cycles to finish.
    pub async fn shutdown(&self) {
        self.queue.lock().take();
        let tasks = {
            let mut tasks = self.tasks.lock();
            self.closed.store(true, Ordering::SeqCst);
            std::mem::take(&mut *tasks)
        };
        debug!(pending = tasks.len(), "waiting for sync tasks");
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "sync task failed");
            }
        }
    }
}

async fn drain(mut rx: mpsc::Receiver<SyncEvent>, runner: Arc<dyn SyncRunner>) {
    while let Some(event) = rx.recv().await {
        let runner = Arc::clone(&runner);
        let cycle = tokio::task::spawn_blocking(move || {
            runner.run_cycle(&event);
        });
        if let Err(e) = cycle.await {
            error!(error = %e, "sync cycle panicked");
        }
    }
    debug!("sync queue closed");
}
