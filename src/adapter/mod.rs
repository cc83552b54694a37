//! Adapter Dispatch
//!
//! Picks the emission strategy, shape transformer, scheduler and cardinality
//! once, from the return type a service method declares, and applies them to
//! each call.
//!
//! # Example
//!
//! ```rust,ignore
//! use fluxcall::adapter::FluxCallAdapterFactory;
//!
//! let factory = FluxCallAdapterFactory::create_async();
//! let adapter = factory.get_declared("Flux<String>")?.expect("handled");
//! let body = adapter.adapt(call).into_body().expect("body shape");
//! ```

mod call_adapter;
mod factory;
mod type_ref;

pub use crate::bridge::{ExecutionMode, Shape};
pub use call_adapter::{Adapted, CallAdapter, Cardinality, Publisher};
pub use factory::{FluxCallAdapterFactory, FluxCallAdapterFactoryBuilder};
pub use type_ref::TypeRef;
