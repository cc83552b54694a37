//! Call-to-stream bridge.
//!
//! - `emit`: runs a cloned call per subscription and pushes exactly one
//!   response or error into a `FluxSink`
//! - `dispose`: links sink disposal to call cancellation
//! - `shape`: body / result transformers over the response stream

mod dispose;
mod emit;
mod shape;

pub use dispose::DisposableCallback;
pub use emit::{ExecutionMode, enqueue_emitter, execute_emitter, response_flux};
pub use shape::{Shape, body, result};
