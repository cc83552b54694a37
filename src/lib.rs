//! # fluxcall - One-shot HTTP calls as reactive streams
//!
//! fluxcall adapts a one-shot, clonable [`Call`](call::Call) into a cold,
//! backpressure-aware [`Flux`](reactive::Flux) or [`Mono`](reactive::Mono).
//! Each subscriber gets its own copy of the call; cancelling the subscription
//! cancels that copy.
//!
#![deny(unsafe_code)]

//! ## Shapes
//!
//! - **Body**: the decoded body; a non-2xx response fails the stream with [`HttpError`]
//! - **Response**: every response, successful or not, as a value
//! - **Result**: responses and call failures both as values; the stream never errors
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fluxcall::prelude::*;
//!
//! let http = HttpCallFactory::builder()
//!     .base_url("https://api.example.com")
//!     .build()?;
//! let adapter = FluxCallAdapterFactory::create_async()
//!     .get_declared("Mono<String>")?
//!     .expect("Mono is handled");
//!
//! let body = adapter
//!     .adapt(http.get("/greeting", StringConverter))
//!     .into_body()
//!     .and_then(Publisher::into_mono)
//!     .expect("Mono<String> adapts to a body Mono");
//! println!("{}", body.to_future().await?);
//! ```

pub mod adapter;
pub mod bridge;
pub mod call;
pub mod error;
pub mod http;
pub mod reactive;
pub mod telemetry;
pub mod utils;

pub use error::{Error, HttpError, Result};

/// Commonly used types.
pub mod prelude {
    pub use crate::adapter::{
        Adapted, CallAdapter, Cardinality, ExecutionMode, FluxCallAdapterFactory, Publisher,
        Shape, TypeRef,
    };
    pub use crate::call::{Call, CallResult, Callback, Response};
    pub use crate::error::{Error, HttpError, Result};
    pub use crate::http::{
        BodyConverter, HttpCallFactory, JsonConverter, ReqwestCall, StringConverter,
    };
    pub use crate::reactive::{
        Flux, FluxStream, ImmediateScheduler, Mono, Scheduler, StreamEvent, Subscriber,
        Subscription, ThreadScheduler, TokioBlockingScheduler,
    };
}
