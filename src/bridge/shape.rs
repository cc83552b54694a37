//! Shape transformers over a stream of responses.

use serde::{Deserialize, Serialize};

use crate::call::{CallResult, Response};
use crate::error::{Error, HttpError, Result};
use crate::reactive::{Flux, Subscriber, Subscription, hooks};

/// Representation a consumer asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Decoded body; non-2xx responses become [`Error::Http`].
    Body,
    /// The full response, successful or not.
    Response,
    /// A [`CallResult`], so failures arrive as values.
    Result,
}

/// Emit bodies of successful responses and fail on the rest.
pub fn body<T>(responses: Flux<Response<T>>) -> Flux<T>
where
    T: Send + 'static,
{
    responses.lift(|downstream| -> Box<dyn Subscriber<Response<T>>> {
        Box::new(BodySubscriber::new(downstream))
    })
}

/// Emit every outcome as a [`CallResult`] followed by completion.
pub fn result<T>(responses: Flux<Response<T>>) -> Flux<CallResult<T>>
where
    T: Send + 'static,
{
    responses.lift(|downstream| -> Box<dyn Subscriber<Response<T>>> {
        Box::new(ResultSubscriber::new(downstream))
    })
}

pub(crate) struct BodySubscriber<T> {
    downstream: Box<dyn Subscriber<T>>,
    /// Set once this subscriber delivered its own terminal event downstream.
    terminated: bool,
}

impl<T> BodySubscriber<T> {
    pub(crate) fn new(downstream: Box<dyn Subscriber<T>>) -> Self {
        Self {
            downstream,
            terminated: false,
        }
    }
}

impl<T: Send> Subscriber<Response<T>> for BodySubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, response: Response<T>) -> Result<()> {
        match response.try_into_body() {
            Ok(body) => self.downstream.on_next(body),
            Err(response) => {
                self.terminated = true;
                let error = Error::Http(HttpError::from_response(response));
                if let Err(inner) = self.downstream.on_error(error) {
                    hooks::on_error_dropped(inner);
                }
                Ok(())
            }
        }
    }

    fn on_error(&mut self, error: Error) -> Result<()> {
        if !self.terminated {
            return self.downstream.on_error(error);
        }
        // The HTTP error already terminated downstream; nothing else may follow.
        hooks::on_error_dropped(Error::protocol(
            "upstream error arrived after the body subscriber delivered its HTTP error",
            error,
        ));
        Ok(())
    }

    fn on_complete(&mut self) {
        if !self.terminated {
            self.downstream.on_complete();
        }
    }
}

pub(crate) struct ResultSubscriber<T> {
    downstream: Box<dyn Subscriber<CallResult<T>>>,
}

impl<T> ResultSubscriber<T> {
    pub(crate) fn new(downstream: Box<dyn Subscriber<CallResult<T>>>) -> Self {
        Self { downstream }
    }
}

impl<T: Send> Subscriber<Response<T>> for ResultSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, response: Response<T>) -> Result<()> {
        self.downstream.on_next(CallResult::Response(response))
    }

    fn on_error(&mut self, error: Error) -> Result<()> {
        if let Err(rejected) = self.downstream.on_next(CallResult::Error(error)) {
            if let Err(inner) = self.downstream.on_error(rejected) {
                hooks::on_error_dropped(inner);
            }
            return Ok(());
        }
        self.downstream.on_complete();
        Ok(())
    }

    fn on_complete(&mut self) {
        self.downstream.on_complete();
    }
}
