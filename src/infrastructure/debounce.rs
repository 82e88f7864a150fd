// Trailing-edge debounce for client-initiated lookups
//
// Every schedule() takes a new ticket. A scheduled task wakes after the quiet
// window and runs only if its ticket is still the newest one. Work that has
// already started is never interrupted.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::trace;

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    generation: Arc<AtomicU64>,
    last: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: Arc::new(AtomicU64::new(0)),
            last: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Runs `task` once the window elapses with no newer schedule or cancel.
    pub async fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let window = self.window;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if generation.load(Ordering::SeqCst) != ticket {
                trace!(ticket, "debounced task superseded");
                return;
            }
            task.await;
        });

        *self.last.lock().await = Some(handle);
    }

    /// Drops whatever is still waiting. A task already past its window keeps running.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Waits for the most recently scheduled task to finish or bow out.
    pub async fn settle(&self) {
        let handle = self.last.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
