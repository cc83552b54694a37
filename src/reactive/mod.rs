//! Reactive Module
//!
//! A small push-based stream engine, just large enough to host the call bridge:
//! - `Flux` / `Mono`: cold publishers, replayed per subscriber
//! - `FluxSink`: emitter with demand tracking and an overflow strategy
//! - `Subscriber` / `Subscription`: the consumer contract
//! - schedulers for `subscribe_on`
//! - `hooks`: the dropped-error side channel
//! - `FluxStream`: a `futures::Stream` adapter for async consumers

mod flux;
pub mod hooks;
mod mono;
mod scheduler;
mod sink;
mod stream;
mod subscriber;

pub use flux::Flux;
pub use mono::Mono;
pub use scheduler::{ImmediateScheduler, Scheduler, Task, ThreadScheduler, TokioBlockingScheduler};
pub use sink::{FluxSink, OverflowStrategy};
pub use stream::FluxStream;
pub use subscriber::{Disposable, StreamEvent, Subscriber, Subscription};
