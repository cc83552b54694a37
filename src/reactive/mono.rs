//! Single-value publisher and the coercion that produces it.

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;

use super::flux::Flux;
use super::hooks;
use super::scheduler::Scheduler;
use super::stream::FluxStream;
use super::subscriber::{Subscriber, Subscription};
use crate::error::{Error, Result};

/// A cold publisher of exactly one value or an error.
pub struct Mono<T> {
    flux: Flux<T>,
}

impl<T> Clone for Mono<T> {
    fn clone(&self) -> Self {
        Self {
            flux: self.flux.clone(),
        }
    }
}

impl<T: Send + 'static> Mono<T> {
    /// Wrap a flux already known to emit at most one value.
    pub(crate) fn from_flux(flux: Flux<T>) -> Self {
        Self { flux }
    }

    pub fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<T> + 'static,
    {
        self.flux.subscribe(subscriber);
    }

    pub fn subscribe_boxed(&self, subscriber: Box<dyn Subscriber<T>>) {
        self.flux.subscribe_boxed(subscriber);
    }

    pub fn subscribe_on(self, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            flux: self.flux.subscribe_on(scheduler),
        }
    }

    pub fn stream(&self) -> FluxStream<T> {
        self.flux.stream()
    }

    /// Resolve to the value. Subscribes on first poll.
    pub fn to_future(&self) -> impl Future<Output = Result<T>> + Send + use<T> {
        let flux = self.flux.clone();
        async move {
            let mut stream = flux.stream();
            stream.next().await.unwrap_or(Err(Error::NoSuchElement))
        }
    }

    /// Subscribe and block the current thread until the value arrives.
    ///
    /// Must not be called from inside an async runtime.
    pub fn block(&self) -> Result<T> {
        futures::executor::block_on(self.to_future())
    }

    pub fn into_flux(self) -> Flux<T> {
        self.flux
    }
}

impl<T> fmt::Debug for Mono<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mono").finish_non_exhaustive()
    }
}

/// Holds the first value until completion, rejecting empty and multi-valued sources.
pub(crate) struct SingleSubscriber<T> {
    downstream: Box<dyn Subscriber<T>>,
    upstream: Option<Subscription>,
    value: Option<T>,
    done: bool,
}

impl<T> SingleSubscriber<T> {
    pub(crate) fn new(downstream: Box<dyn Subscriber<T>>) -> Self {
        Self {
            downstream,
            upstream: None,
            value: None,
            done: false,
        }
    }

    fn fail(&mut self, error: Error) {
        if let Err(inner) = self.downstream.on_error(error) {
            hooks::on_error_dropped(inner);
        }
    }
}

impl<T: Send> Subscriber<T> for SingleSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.upstream = Some(subscription.clone());
        self.downstream.on_subscribe(subscription.clone());
        // The value is held until completion, so upstream demand is unbounded.
        subscription.request(u64::MAX);
    }

    fn on_next(&mut self, item: T) -> Result<()> {
        if self.done {
            return Ok(());
        }
        if self.value.is_some() {
            self.done = true;
            self.value = None;
            if let Some(upstream) = &self.upstream {
                upstream.cancel();
            }
            self.fail(Error::TooManyElements);
            return Ok(());
        }
        self.value = Some(item);
        Ok(())
    }

    fn on_error(&mut self, error: Error) -> Result<()> {
        if self.done {
            hooks::on_error_dropped(error);
            return Ok(());
        }
        self.done = true;
        self.value = None;
        self.downstream.on_error(error)
    }

    fn on_complete(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        match self.value.take() {
            Some(value) => match self.downstream.on_next(value) {
                Ok(()) => self.downstream.on_complete(),
                Err(error) => self.fail(error),
            },
            None => self.fail(Error::NoSuchElement),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::OverflowStrategy;

    #[tokio::test]
    async fn one_value_succeeds() {
        let mono = Flux::from_items(vec!["hey"]).single();
        assert_eq!(mono.to_future().await.unwrap(), "hey");
    }

    #[tokio::test]
    async fn empty_source_fails() {
        let mono = Flux::<u8>::empty().single();
        assert!(matches!(mono.to_future().await, Err(Error::NoSuchElement)));
    }

    #[tokio::test]
    async fn two_values_fail() {
        let mono = Flux::create(
            |sink| {
                sink.next(1);
                sink.next(2);
                sink.complete();
            },
            OverflowStrategy::Buffer,
        )
        .single();
        assert!(matches!(mono.to_future().await, Err(Error::TooManyElements)));
    }

    #[tokio::test]
    async fn upstream_error_passes_through() {
        let mono = Flux::<u8>::create(|sink| sink.error(Error::Canceled), OverflowStrategy::Latest)
            .single();
        assert!(matches!(mono.to_future().await, Err(Error::Canceled)));
    }

    #[test]
    fn to_future_subscribes_on_first_poll() {
        let subscriptions = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = subscriptions.clone();
        let mono = Flux::create(
            move |sink| {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                sink.next(1u8);
                sink.complete();
            },
            OverflowStrategy::Latest,
        )
        .single();

        let pending = mono.to_future();
        assert_eq!(subscriptions.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert_eq!(futures::executor::block_on(pending).unwrap(), 1);
        assert_eq!(subscriptions.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn block_outside_runtime() {
        let mono = Flux::from_items(vec![5u32]).single();
        assert_eq!(mono.block().unwrap(), 5);
    }
}
