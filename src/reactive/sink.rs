//! Emitter handed to [`Flux::create`](super::Flux::create) population functions.
//!
//! Events pushed into a [`FluxSink`] are delivered only against outstanding
//! demand. Delivery is serialized through a work-in-progress counter so the
//! sink can be driven from any thread, including re-entrantly from inside a
//! subscriber callback.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::hooks;
use super::subscriber::{Demand, Subscriber, Subscription};
use crate::error::Error;

/// What to do with items emitted faster than the subscriber requests them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowStrategy {
    /// Keep only the most recent undelivered item.
    #[default]
    Latest,
    /// Queue every undelivered item.
    Buffer,
}

type Disposer = Box<dyn FnOnce() + Send>;

enum Signal<T> {
    Next(T),
    Error(Error),
    Complete,
}

struct SinkState<T> {
    queue: VecDeque<T>,
    requested: u64,
    done: bool,
    error: Option<Error>,
    cancelled: bool,
    terminated: bool,
    disposers: Vec<Disposer>,
    disposed: bool,
}

impl<T> SinkState<T> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            requested: 0,
            done: false,
            error: None,
            cancelled: false,
            terminated: false,
            disposers: Vec::new(),
            disposed: false,
        }
    }

    fn accepting(&self) -> bool {
        !self.done && !self.cancelled
    }

    fn next_signal(&mut self) -> Option<Signal<T>> {
        if self.cancelled || self.terminated {
            self.queue.clear();
            return None;
        }
        if self.requested > 0
            && let Some(item) = self.queue.pop_front()
        {
            if self.requested != u64::MAX {
                self.requested -= 1;
            }
            return Some(Signal::Next(item));
        }
        if self.done && self.queue.is_empty() {
            self.terminated = true;
            return Some(match self.error.take() {
                Some(error) => Signal::Error(error),
                None => Signal::Complete,
            });
        }
        None
    }

    fn take_disposers(&mut self) -> Vec<Disposer> {
        self.disposed = true;
        std::mem::take(&mut self.disposers)
    }
}

struct SinkShared<T> {
    id: Uuid,
    overflow: OverflowStrategy,
    state: Mutex<SinkState<T>>,
    wip: AtomicUsize,
    downstream: Mutex<Option<Box<dyn Subscriber<T>>>>,
}

impl<T: Send + 'static> SinkShared<T> {
    fn state(&self) -> MutexGuard<'_, SinkState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, item: T) {
        {
            let mut state = self.state();
            if !state.accepting() {
                tracing::trace!(sink = %self.id, "next ignored after termination");
                return;
            }
            if self.overflow == OverflowStrategy::Latest {
                state.queue.clear();
            }
            state.queue.push_back(item);
        }
        self.drain();
    }

    fn terminate(&self, error: Option<Error>) {
        {
            let mut state = self.state();
            if state.cancelled && !state.done {
                // The consumer left; a cancelled call reporting back is expected.
                tracing::trace!(sink = %self.id, "terminal event ignored after cancellation");
                return;
            }
            if state.done {
                drop(state);
                if let Some(error) = error {
                    hooks::on_error_dropped(error);
                }
                return;
            }
            state.done = true;
            state.error = error;
        }
        self.drain();
    }

    fn add_disposer(&self, disposer: Disposer) {
        let mut state = self.state();
        if state.disposed {
            drop(state);
            disposer();
            return;
        }
        state.disposers.push(disposer);
    }

    fn dispose(&self) {
        let disposers = self.state().take_disposers();
        for disposer in disposers {
            disposer();
        }
    }

    fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }
        self.drain_loop(1);
    }

    /// Deliver pending signals. The caller must own `missed` units of `wip`.
    fn drain_loop(&self, mut missed: usize) {
        loop {
            loop {
                let signal = self.state().next_signal();
                match signal {
                    Some(signal) => self.deliver(signal),
                    None => break,
                }
            }
            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn deliver(&self, signal: Signal<T>) {
        let mut slot = self
            .downstream
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(subscriber) = slot.as_mut() else {
            return;
        };

        match signal {
            Signal::Next(item) => {
                if let Err(error) = subscriber.on_next(item) {
                    tracing::debug!(sink = %self.id, error = %error, "subscriber rejected item, cancelling");
                    {
                        let mut state = self.state();
                        state.cancelled = true;
                        state.terminated = true;
                        state.queue.clear();
                    }
                    self.dispose();
                    if let Err(inner) = subscriber.on_error(error) {
                        hooks::on_error_dropped(inner);
                    }
                    *slot = None;
                }
            }
            Signal::Error(error) => {
                tracing::trace!(sink = %self.id, "delivering error");
                if let Err(inner) = subscriber.on_error(error) {
                    hooks::on_error_dropped(inner);
                }
                *slot = None;
                drop(slot);
                self.dispose();
            }
            Signal::Complete => {
                tracing::trace!(sink = %self.id, "delivering completion");
                subscriber.on_complete();
                *slot = None;
                drop(slot);
                self.dispose();
            }
        }
    }
}

impl<T: Send + 'static> Demand for SinkShared<T> {
    fn request(&self, n: u64) {
        if n == 0 {
            tracing::trace!(sink = %self.id, "ignoring request for zero items");
            return;
        }
        {
            let mut state = self.state();
            if state.cancelled {
                return;
            }
            state.requested = state.requested.saturating_add(n);
        }
        self.drain();
    }

    fn cancel(&self) {
        {
            let mut state = self.state();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            state.queue.clear();
        }
        tracing::trace!(sink = %self.id, "subscription cancelled");
        self.dispose();
        // Release the subscriber unless a drain is mid-delivery; that drain
        // observes the cancellation and stops on its own.
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            if let Ok(mut slot) = self.downstream.try_lock() {
                *slot = None;
            }
            self.drain_loop(1);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.state().cancelled
    }
}

/// Bridge-facing handle for pushing events into one subscription.
pub struct FluxSink<T> {
    shared: Arc<SinkShared<T>>,
}

impl<T> Clone for FluxSink<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Send + 'static> FluxSink<T> {
    /// Bind a new sink to `subscriber`, calling its `on_subscribe` first.
    pub(crate) fn attach(mut subscriber: Box<dyn Subscriber<T>>, overflow: OverflowStrategy) -> Self {
        let shared = Arc::new(SinkShared {
            id: Uuid::new_v4(),
            overflow,
            state: Mutex::new(SinkState::new()),
            // Held by `attach` until the subscriber is installed.
            wip: AtomicUsize::new(1),
            downstream: Mutex::new(None),
        });
        tracing::trace!(sink = %shared.id, ?overflow, "subscriber attached");

        let demand: Arc<dyn Demand> = shared.clone();
        subscriber.on_subscribe(Subscription::new(demand));
        *shared
            .downstream
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(subscriber);
        shared.drain_loop(1);

        Self { shared }
    }

    /// Emit a value.
    pub fn next(&self, item: T) {
        self.shared.push(item);
    }

    /// Terminate with an error.
    ///
    /// Errors after termination go to the dropped-error hook; errors after
    /// cancellation are discarded.
    pub fn error(&self, error: Error) {
        self.shared.terminate(Some(error));
    }

    /// Terminate successfully.
    pub fn complete(&self) {
        self.shared.terminate(None);
    }

    /// Run `disposer` once the subscription is cancelled or has delivered its
    /// terminal event. Runs immediately if that already happened.
    pub fn on_dispose<F>(&self, disposer: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.add_disposer(Box::new(disposer));
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.state().cancelled
    }

    /// Outstanding downstream demand.
    pub fn requested(&self) -> u64 {
        self.shared.state().requested
    }
}

impl<T> fmt::Debug for FluxSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluxSink")
            .field("id", &self.shared.id)
            .field("overflow", &self.shared.overflow)
            .finish()
    }
}
