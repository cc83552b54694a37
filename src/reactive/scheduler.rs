//! Concurrency contexts a subscription can be moved onto.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::runtime::Handle;

/// Unit of work submitted to a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs subscription work somewhere.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, task: Task);
}

/// Runs tasks inline on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn schedule(&self, task: Task) {
        task();
    }
}

/// Spawns a dedicated OS thread per task.
#[derive(Debug)]
pub struct ThreadScheduler {
    name_prefix: String,
    counter: AtomicUsize,
}

impl ThreadScheduler {
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: name_prefix.into(),
            counter: AtomicUsize::new(0),
        }
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new("fluxcall")
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, task: Task) {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{n}", self.name_prefix);
        if let Err(e) = std::thread::Builder::new().name(name.clone()).spawn(task) {
            tracing::error!(thread = %name, error = %e, "failed to spawn scheduler thread");
        }
    }
}

/// Runs tasks on a tokio runtime's blocking pool.
///
/// Suited to synchronous calls, which block their thread for the whole request.
#[derive(Debug, Clone)]
pub struct TokioBlockingScheduler {
    handle: Handle,
}

impl TokioBlockingScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime of the current context, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioBlockingScheduler {
    fn schedule(&self, task: Task) {
        drop(self.handle.spawn_blocking(task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn immediate_runs_inline() {
        let (tx, rx) = mpsc::channel();
        ImmediateScheduler.schedule(Box::new(move || tx.send(std::thread::current().id()).unwrap()));
        assert_eq!(rx.try_recv().unwrap(), std::thread::current().id());
    }

    #[test]
    fn thread_scheduler_names_its_threads() {
        let scheduler = ThreadScheduler::new("io");
        let (tx, rx) = mpsc::channel();
        scheduler.schedule(Box::new(move || {
            tx.send(std::thread::current().name().map(str::to_string)).unwrap()
        }));
        assert_eq!(rx.recv().unwrap().as_deref(), Some("io-0"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tokio_blocking_scheduler_runs_off_the_caller() {
        let scheduler = TokioBlockingScheduler::current().expect("inside runtime");
        let (tx, rx) = tokio::sync::oneshot::channel();
        scheduler.schedule(Box::new(move || {
            let _ = tx.send(42);
        }));
        assert_eq!(rx.await.unwrap(), 42);
    }
}
