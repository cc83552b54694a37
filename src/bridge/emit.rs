//! Emission strategies: turn one call into one response event.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::dispose::DisposableCallback;
use crate::call::{Call, Response};
use crate::reactive::{Disposable, Flux, FluxSink, OverflowStrategy};

/// How a subscription runs its call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Block the subscribing thread on [`Call::execute`].
    #[default]
    Sync,
    /// Register a completion callback with [`Call::enqueue`] and return.
    Async,
}

/// Population function running the call on the subscribing thread.
pub fn execute_emitter<T>(original: Arc<dyn Call<T>>) -> impl Fn(FluxSink<Response<T>>) + Send + Sync + 'static
where
    T: Send + 'static,
{
    move |sink| {
        // One-shot: every subscriber gets its own copy.
        let call: Arc<dyn Call<T>> = Arc::from(original.clone_call());

        let cancel = call.clone();
        sink.on_dispose(move || cancel.cancel());
        if sink.is_cancelled() {
            return;
        }

        tracing::debug!("executing call");
        let response = match call.execute() {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(error = %error, "call failed");
                sink.error(error);
                return;
            }
        };
        sink.next(response);
        sink.complete();
    }
}

/// Population function enqueuing the call and returning immediately.
pub fn enqueue_emitter<T>(original: Arc<dyn Call<T>>) -> impl Fn(FluxSink<Response<T>>) + Send + Sync + 'static
where
    T: Send + 'static,
{
    move |sink| {
        let call: Arc<dyn Call<T>> = Arc::from(original.clone_call());

        let callback = Arc::new(DisposableCallback::new(call.clone(), sink.clone()));
        let disposable = callback.clone();
        sink.on_dispose(move || disposable.dispose());
        if sink.is_cancelled() {
            return;
        }

        tracing::debug!("enqueuing call");
        call.enqueue(callback);
    }
}

/// A cold stream emitting the call's response, keeping only the latest
/// undelivered event.
pub fn response_flux<T>(call: Arc<dyn Call<T>>, mode: ExecutionMode) -> Flux<Response<T>>
where
    T: Send + 'static,
{
    match mode {
        ExecutionMode::Sync => Flux::create(execute_emitter(call), OverflowStrategy::Latest),
        ExecutionMode::Async => Flux::create(enqueue_emitter(call), OverflowStrategy::Latest),
    }
}
