//! Call Module
//!
//! The upstream side of the bridge: a one-shot request that can be executed
//! on the current thread or enqueued with a completion callback.
//!
//! A [`Call`] runs at most once. Streams that want replay-from-scratch semantics
//! clone the call for every subscriber and own that clone exclusively.

mod response;
mod result;

pub use response::Response;
pub use result::CallResult;

use std::sync::Arc;

use crate::error::Result;

/// A one-shot, clonable representation of a single request.
pub trait Call<T>: Send + Sync {
    /// Create a fresh, unexecuted copy of this call.
    fn clone_call(&self) -> Box<dyn Call<T>>;

    /// Execute on the current thread, blocking until the response arrives.
    fn execute(&self) -> Result<Response<T>>;

    /// Execute asynchronously and report the outcome to `callback` exactly once.
    ///
    /// Returns immediately. Failures that prevent the call from starting are
    /// reported through [`Callback::on_failure`].
    fn enqueue(&self, callback: Arc<dyn Callback<T>>);

    /// Request cancellation. Redundant calls are harmless.
    fn cancel(&self);

    fn is_canceled(&self) -> bool;
}

/// Completion receiver for [`Call::enqueue`].
pub trait Callback<T>: Send + Sync {
    fn on_response(&self, response: Response<T>);

    fn on_failure(&self, error: crate::error::Error);
}
