//! Cold, multi-subscriber event source.

use std::fmt;
use std::sync::Arc;

use super::mono::{Mono, SingleSubscriber};
use super::scheduler::Scheduler;
use super::sink::{FluxSink, OverflowStrategy};
use super::stream::FluxStream;
use super::subscriber::Subscriber;

type Source<T> = dyn Fn(Box<dyn Subscriber<T>>) + Send + Sync;

/// A cold stream of `T`.
///
/// Nothing happens until a subscriber arrives, and every subscriber replays the
/// source from scratch. Cloning a `Flux` shares the recipe, not any state.
pub struct Flux<T> {
    source: Arc<Source<T>>,
}

impl<T> Clone for Flux<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<T: Send + 'static> Flux<T> {
    /// Build a flux whose subscribers are fed through a [`FluxSink`].
    ///
    /// `emitter` runs once per subscription, after the subscriber received its
    /// `on_subscribe`, on whichever thread performs the subscription.
    pub fn create<F>(emitter: F, overflow: OverflowStrategy) -> Self
    where
        F: Fn(FluxSink<T>) + Send + Sync + 'static,
    {
        Self::from_source(move |subscriber| {
            let sink = FluxSink::attach(subscriber, overflow);
            emitter(sink);
        })
    }

    /// Build a flux from a raw subscribe function.
    pub fn from_source<F>(source: F) -> Self
    where
        F: Fn(Box<dyn Subscriber<T>>) + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(source),
        }
    }

    /// A flux that completes immediately.
    pub fn empty() -> Self {
        Self::create(|sink| sink.complete(), OverflowStrategy::Buffer)
    }

    /// A flux replaying the given items to every subscriber.
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Clone + Sync,
    {
        let items: Vec<T> = items.into_iter().collect();
        Self::create(
            move |sink| {
                for item in &items {
                    sink.next(item.clone());
                }
                sink.complete();
            },
            OverflowStrategy::Buffer,
        )
    }

    pub fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<T> + 'static,
    {
        self.subscribe_boxed(Box::new(subscriber));
    }

    pub fn subscribe_boxed(&self, subscriber: Box<dyn Subscriber<T>>) {
        (self.source)(subscriber);
    }

    /// Wrap every downstream subscriber in an upstream-facing one.
    ///
    /// `operator` runs once per subscription, so per-subscriber state lives in
    /// the subscriber it returns.
    pub fn lift<U, F>(self, operator: F) -> Flux<U>
    where
        U: Send + 'static,
        F: Fn(Box<dyn Subscriber<U>>) -> Box<dyn Subscriber<T>> + Send + Sync + 'static,
    {
        Flux::from_source(move |downstream| self.subscribe_boxed(operator(downstream)))
    }

    /// Perform each subscription, emitter function included, on `scheduler`.
    pub fn subscribe_on(self, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::from_source(move |subscriber| {
            let upstream = self.clone();
            scheduler.schedule(Box::new(move || upstream.subscribe_boxed(subscriber)));
        })
    }

    /// Coerce to exactly one value.
    ///
    /// Completing empty fails with [`Error::NoSuchElement`](crate::error::Error::NoSuchElement);
    /// a second value fails with [`Error::TooManyElements`](crate::error::Error::TooManyElements).
    pub fn single(self) -> Mono<T> {
        Mono::from_flux(self.lift(|downstream| -> Box<dyn Subscriber<T>> {
            Box::new(SingleSubscriber::new(downstream))
        }))
    }

    /// Subscribe and consume the events as a `futures::Stream`.
    pub fn stream(&self) -> FluxStream<T> {
        let (stream, subscriber) = FluxStream::channel();
        self.subscribe(subscriber);
        stream
    }
}

impl<T> fmt::Debug for Flux<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flux").finish_non_exhaustive()
    }
}
