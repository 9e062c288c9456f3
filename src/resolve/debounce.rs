use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::task::JoinHandle;
use tracing::trace;

/// Last-write-wins scheduling. Each `schedule` supersedes everything
/// scheduled before it; superseded work that is already running is left to
/// finish, but its ticket goes stale so it can tell not to publish.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
    alive: Arc<AtomicBool>,
    pending: Option<JoinHandle<()>>,
}

/// Handed to scheduled work. Check it after every await, before touching
/// shared state.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: Arc<AtomicU64>,
    alive: Arc<AtomicBool>,
    issued: u64,
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
            && self.generation.load(Ordering::SeqCst) == self.issued
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            alive: Arc::new(AtomicBool::new(true)),
            pending: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Runs `work` once the quiet period passes without another call.
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&mut self, work: F)
    where
        F: FnOnce(Ticket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if !self.is_alive() {
            return;
        }
        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let ticket = Ticket {
            generation: self.generation.clone(),
            alive: self.alive.clone(),
            issued,
        };
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !ticket.is_current() {
                trace!(issued, "debounced work superseded");
                return;
            }
            work(ticket).await;
        }));
    }

    /// Invalidates every ticket and stops the latest scheduled work.
    pub fn close(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(x) = self.pending.take() {
            x.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.close();
    }
}
