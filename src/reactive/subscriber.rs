//! Subscriber, subscription and disposal contracts.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// One event observed by a subscriber.
///
/// A subscription sees zero or more `Next` events followed by exactly one
/// terminal event (`Error` or `Complete`).
#[derive(Debug)]
pub enum StreamEvent<T> {
    Next(T),
    Error(Error),
    Complete,
}

impl<T> StreamEvent<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Next(_))
    }
}

/// Consumer side of a [`Flux`](super::Flux).
///
/// Returning `Err` from `on_next` or `on_error` signals that the subscriber
/// rejected the event. Producers react by cancelling upstream and, where the
/// subscriber channel is already closed, reporting through
/// [`hooks::on_error_dropped`](super::hooks::on_error_dropped).
pub trait Subscriber<T>: Send {
    fn on_subscribe(&mut self, subscription: Subscription);

    fn on_next(&mut self, item: T) -> Result<()>;

    fn on_error(&mut self, error: Error) -> Result<()>;

    fn on_complete(&mut self);
}

impl<T, S> Subscriber<T> for Box<S>
where
    S: Subscriber<T> + ?Sized,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        (**self).on_subscribe(subscription)
    }

    fn on_next(&mut self, item: T) -> Result<()> {
        (**self).on_next(item)
    }

    fn on_error(&mut self, error: Error) -> Result<()> {
        (**self).on_error(error)
    }

    fn on_complete(&mut self) {
        (**self).on_complete()
    }
}

/// Something that can be torn down.
pub trait Disposable: Send + Sync {
    /// Release the resource. Repeated calls are no-ops.
    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

/// Producer-side operations behind a [`Subscription`].
pub(crate) trait Demand: Send + Sync {
    fn request(&self, n: u64);

    fn cancel(&self);

    fn is_cancelled(&self) -> bool;
}

/// Handle a subscriber uses to signal demand or cancel.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<dyn Demand>,
}

impl Subscription {
    pub(crate) fn new(inner: Arc<dyn Demand>) -> Self {
        Self { inner }
    }

    /// Request `n` more items. Demand saturates at `u64::MAX` (unbounded).
    pub fn request(&self, n: u64) {
        self.inner.request(n);
    }

    /// Stop the flow of events and release upstream resources.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

impl Disposable for Subscription {
    fn dispose(&self) {
        self.cancel();
    }

    fn is_disposed(&self) -> bool {
        self.is_cancelled()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
