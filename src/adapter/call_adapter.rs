//! Adapter turning a call into the publisher a service method declared.

use std::fmt;
use std::sync::Arc;

use crate::bridge::{self, ExecutionMode, Shape};
use crate::call::{Call, CallResult, Response};
use crate::reactive::{Flux, FluxStream, Mono, Scheduler};

use super::TypeRef;

/// Single- or multi-value publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Flux,
    Mono,
}

/// A stream in the cardinality the declaration asked for.
#[derive(Debug)]
pub enum Publisher<T> {
    Flux(Flux<T>),
    Mono(Mono<T>),
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Flux(flux) => Self::Flux(flux.clone()),
            Self::Mono(mono) => Self::Mono(mono.clone()),
        }
    }
}

impl<T: Send + 'static> Publisher<T> {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::Flux(_) => Cardinality::Flux,
            Self::Mono(_) => Cardinality::Mono,
        }
    }

    /// View as a multi-value stream; a `Mono` keeps its single-value check.
    pub fn into_flux(self) -> Flux<T> {
        match self {
            Self::Flux(flux) => flux,
            Self::Mono(mono) => mono.into_flux(),
        }
    }

    pub fn into_mono(self) -> Option<Mono<T>> {
        match self {
            Self::Flux(_) => None,
            Self::Mono(mono) => Some(mono),
        }
    }

    /// Subscribe and consume as a `futures::Stream`.
    pub fn stream(&self) -> FluxStream<T> {
        match self {
            Self::Flux(flux) => flux.stream(),
            Self::Mono(mono) => mono.stream(),
        }
    }
}

/// Output of [`CallAdapter::adapt`], tagged by shape.
#[derive(Debug)]
pub enum Adapted<T> {
    Body(Publisher<T>),
    Response(Publisher<Response<T>>),
    Result(Publisher<CallResult<T>>),
}

impl<T: Send + 'static> Adapted<T> {
    pub fn shape(&self) -> Shape {
        match self {
            Self::Body(_) => Shape::Body,
            Self::Response(_) => Shape::Response,
            Self::Result(_) => Shape::Result,
        }
    }

    pub fn into_body(self) -> Option<Publisher<T>> {
        match self {
            Self::Body(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<Publisher<Response<T>>> {
        match self {
            Self::Response(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_result(self) -> Option<Publisher<CallResult<T>>> {
        match self {
            Self::Result(p) => Some(p),
            _ => None,
        }
    }
}

/// Adapter selected once for a declared return type.
#[derive(Clone)]
pub struct CallAdapter {
    response_type: TypeRef,
    shape: Shape,
    cardinality: Cardinality,
    mode: ExecutionMode,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl CallAdapter {
    pub(crate) fn new(
        response_type: TypeRef,
        shape: Shape,
        cardinality: Cardinality,
        mode: ExecutionMode,
        scheduler: Option<Arc<dyn Scheduler>>,
    ) -> Self {
        Self {
            response_type,
            shape,
            cardinality,
            mode,
            scheduler,
        }
    }

    /// Type the call's body must be decoded into.
    pub fn response_type(&self) -> &TypeRef {
        &self.response_type
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn adapt<T, C>(&self, call: C) -> Adapted<T>
    where
        T: Send + 'static,
        C: Call<T> + 'static,
    {
        self.adapt_shared(Arc::new(call))
    }

    /// Build the stream for `call`. Nothing runs until a subscriber arrives.
    pub fn adapt_shared<T>(&self, call: Arc<dyn Call<T>>) -> Adapted<T>
    where
        T: Send + 'static,
    {
        let responses = bridge::response_flux(call, self.mode);
        match self.shape {
            Shape::Body => Adapted::Body(self.finish(bridge::body(responses))),
            Shape::Response => Adapted::Response(self.finish(responses)),
            Shape::Result => Adapted::Result(self.finish(bridge::result(responses))),
        }
    }

    fn finish<U: Send + 'static>(&self, flux: Flux<U>) -> Publisher<U> {
        let flux = match &self.scheduler {
            Some(scheduler) => flux.subscribe_on(scheduler.clone()),
            None => flux,
        };
        match self.cardinality {
            Cardinality::Flux => Publisher::Flux(flux),
            Cardinality::Mono => Publisher::Mono(flux.single()),
        }
    }
}

impl fmt::Debug for CallAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallAdapter")
            .field("response_type", &self.response_type.to_string())
            .field("shape", &self.shape)
            .field("cardinality", &self.cardinality)
            .field("mode", &self.mode)
            .field("scheduler", &self.scheduler.is_some())
            .finish()
    }
}
