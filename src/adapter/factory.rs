//! Factory selecting a [`CallAdapter`] from a declared return type.

use std::fmt;
use std::sync::Arc;

use crate::bridge::{ExecutionMode, Shape};
use crate::error::{Error, Result};
use crate::reactive::Scheduler;

use super::{CallAdapter, Cardinality, TypeRef};

const FLUX: &str = "Flux";
const MONO: &str = "Mono";
const RESPONSE: &str = "Response";
const RESULT: &str = "Result";

/// Creates adapters for `Flux<..>` and `Mono<..>` return types.
///
/// Supported declarations, for any body type `Foo`:
/// - `Flux<Foo>` / `Mono<Foo>`: the decoded body; non-2xx responses fail the stream
/// - `Flux<Response<Foo>>` / `Mono<Response<Foo>>`: the full response
/// - `Flux<Result<Foo>>` / `Mono<Result<Foo>>`: outcomes as values, never a stream error
#[derive(Clone, Default)]
pub struct FluxCallAdapterFactory {
    mode: ExecutionMode,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl FluxCallAdapterFactory {
    /// Synchronous streams that subscribe on the caller's thread.
    pub fn create() -> Self {
        Self::default()
    }

    /// Asynchronous streams that enqueue their call and return immediately.
    pub fn create_async() -> Self {
        Self::builder().asynchronous(true).build()
    }

    /// Synchronous streams that subscribe on `scheduler` by default.
    pub fn create_with_scheduler(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::builder().scheduler(scheduler).build()
    }

    pub fn builder() -> FluxCallAdapterFactoryBuilder {
        FluxCallAdapterFactoryBuilder::default()
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Select an adapter for `return_type`.
    ///
    /// Returns `Ok(None)` for types this factory does not handle and a
    /// configuration error for raw (unparameterized) declarations.
    pub fn get(&self, return_type: &TypeRef) -> Result<Option<CallAdapter>> {
        let cardinality = match return_type.raw_name() {
            FLUX => Cardinality::Flux,
            MONO => Cardinality::Mono,
            _ => return Ok(None),
        };

        let Some(observable) = return_type.parameter_upper_bound(0) else {
            let name = return_type.raw_name();
            return Err(Error::configuration(format!(
                "{name} return type must be parameterized as {name}<Foo> or {name}<? extends Foo>"
            )));
        };

        let (shape, response_type) = match observable.raw_name() {
            RESPONSE => (Shape::Response, wrapped_type(&observable, RESPONSE)?),
            RESULT => (Shape::Result, wrapped_type(&observable, RESULT)?),
            _ => (Shape::Body, observable),
        };

        tracing::debug!(
            return_type = %return_type,
            response_type = %response_type,
            ?shape,
            ?cardinality,
            mode = ?self.mode,
            "selected call adapter"
        );
        Ok(Some(CallAdapter::new(
            response_type,
            shape,
            cardinality,
            self.mode,
            self.scheduler.clone(),
        )))
    }

    /// Parse `signature` and select an adapter for it.
    pub fn get_declared(&self, signature: &str) -> Result<Option<CallAdapter>> {
        self.get(&signature.parse()?)
    }
}

fn wrapped_type(observable: &TypeRef, name: &str) -> Result<TypeRef> {
    observable.parameter_upper_bound(0).ok_or_else(|| {
        Error::configuration(format!(
            "{name} must be parameterized as {name}<Foo> or {name}<? extends Foo>"
        ))
    })
}

impl fmt::Debug for FluxCallAdapterFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluxCallAdapterFactory")
            .field("mode", &self.mode)
            .field("scheduler", &self.scheduler.is_some())
            .finish()
    }
}

/// Builder for [`FluxCallAdapterFactory`].
#[derive(Default)]
pub struct FluxCallAdapterFactoryBuilder {
    mode: Option<ExecutionMode>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl FluxCallAdapterFactoryBuilder {
    /// Enqueue calls instead of executing them on the subscribing thread.
    pub fn asynchronous(mut self, asynchronous: bool) -> Self {
        self.mode = Some(if asynchronous {
            ExecutionMode::Async
        } else {
            ExecutionMode::Sync
        });
        self
    }

    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Default scheduler every adapted stream subscribes on.
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn build(self) -> FluxCallAdapterFactory {
        FluxCallAdapterFactory {
            mode: self.mode.unwrap_or_default(),
            scheduler: self.scheduler,
        }
    }
}
