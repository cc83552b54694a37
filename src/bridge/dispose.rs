//! Completion callback that doubles as the subscription's cancel handle.

use std::sync::Arc;

use crate::call::{Call, Callback, Response};
use crate::error::Error;
use crate::reactive::{Disposable, FluxSink};

/// Receives the outcome of an enqueued call and cancels it on dispose.
///
/// One instance exists per subscription. It is registered both as the call's
/// completion callback and as the sink's dispose action, so stream-side
/// cancellation reaches the call and the call's outcome reaches the stream.
pub struct DisposableCallback<T> {
    call: Arc<dyn Call<T>>,
    sink: FluxSink<Response<T>>,
}

impl<T: Send + 'static> DisposableCallback<T> {
    pub fn new(call: Arc<dyn Call<T>>, sink: FluxSink<Response<T>>) -> Self {
        Self { call, sink }
    }
}

impl<T: Send + 'static> Callback<T> for DisposableCallback<T> {
    fn on_response(&self, response: Response<T>) {
        tracing::debug!(status = response.code(), "enqueued call responded");
        self.sink.next(response);
        self.sink.complete();
    }

    fn on_failure(&self, error: Error) {
        tracing::debug!(error = %error, "enqueued call failed");
        self.sink.error(error);
    }
}

impl<T: Send + 'static> Disposable for DisposableCallback<T> {
    fn dispose(&self) {
        self.call.cancel();
    }

    fn is_disposed(&self) -> bool {
        self.call.is_canceled()
    }
}
