//! [`Call`] backed by `reqwest`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use tokio::runtime::{Handle, RuntimeFlavor};

use super::BodyConverter;
use crate::call::{Call, Callback, Response};
use crate::error::{Error, Result};
use crate::utils::cancel::CancelHandle;

/// Everything needed to send the request again from scratch.
#[derive(Debug, Clone)]
pub(crate) struct RequestSpec {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Bytes>,
}

/// A one-shot HTTP exchange.
///
/// `execute` blocks the calling thread on the runtime handle. Inside a
/// multi-thread runtime it moves off the worker with `block_in_place`; inside a
/// current-thread runtime it fails with a configuration error instead. `enqueue`
/// spawns onto the runtime and returns immediately.
pub struct ReqwestCall<T> {
    client: Client,
    runtime: Handle,
    spec: RequestSpec,
    converter: Arc<dyn BodyConverter<T>>,
    cancel: CancelHandle,
    executed: AtomicBool,
}

impl<T: Send + 'static> ReqwestCall<T> {
    pub(crate) fn new(
        client: Client,
        runtime: Handle,
        spec: RequestSpec,
        converter: Arc<dyn BodyConverter<T>>,
    ) -> Self {
        Self {
            client,
            runtime,
            spec,
            converter,
            cancel: CancelHandle::new(),
            executed: AtomicBool::new(false),
        }
    }

    pub fn method(&self) -> &Method {
        &self.spec.method
    }

    pub fn url(&self) -> &str {
        &self.spec.url
    }

    fn claim(&self) -> Result<()> {
        if self.executed.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyExecuted);
        }
        Ok(())
    }

    /// The cancellable exchange, detached from `self`.
    fn exchange(&self) -> impl Future<Output = Result<Response<T>>> + Send + use<T> {
        let client = self.client.clone();
        let spec = self.spec.clone();
        let converter = self.converter.clone();
        let cancel = self.cancel.clone();
        async move {
            cancel
                .run_until_cancelled(send(client, spec, converter))
                .await
                .unwrap_or(Err(Error::Canceled))
        }
    }
}

async fn send<T>(
    client: Client,
    spec: RequestSpec,
    converter: Arc<dyn BodyConverter<T>>,
) -> Result<Response<T>> {
    tracing::debug!(method = %spec.method, url = %spec.url, "sending request");
    let mut request = client.request(spec.method, &spec.url).headers(spec.headers);
    if let Some(body) = spec.body {
        request = request.body(body);
    }

    let response = request.send().await.map_err(Error::io)?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await.map_err(Error::io)?;
    tracing::debug!(status = status.as_u16(), bytes = body.len(), "received response");

    if status.is_success() {
        Ok(Response::success_with(status, headers, converter.convert(body)?))
    } else {
        Ok(Response::error_with(status, headers, body))
    }
}

impl<T: Send + 'static> Call<T> for ReqwestCall<T> {
    fn clone_call(&self) -> Box<dyn Call<T>> {
        Box::new(Self::new(
            self.client.clone(),
            self.runtime.clone(),
            self.spec.clone(),
            self.converter.clone(),
        ))
    }

    fn execute(&self) -> Result<Response<T>> {
        self.claim()?;
        if self.cancel.is_cancelled() {
            return Err(Error::Canceled);
        }
        match Handle::try_current().map(|current| current.runtime_flavor()) {
            Err(_) => self.runtime.block_on(self.exchange()),
            Ok(RuntimeFlavor::MultiThread) => {
                tokio::task::block_in_place(|| self.runtime.block_on(self.exchange()))
            }
            Ok(_) => Err(Error::configuration(
                "synchronous execute called from async context; use create_async() or a blocking scheduler",
            )),
        }
    }

    fn enqueue(&self, callback: Arc<dyn Callback<T>>) {
        if let Err(error) = self.claim() {
            callback.on_failure(error);
            return;
        }
        let exchange = self.exchange();
        self.runtime.spawn(async move {
            match exchange.await {
                Ok(response) => callback.on_response(response),
                Err(error) => callback.on_failure(error),
            }
        });
    }

    fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!(method = %self.spec.method, url = %self.spec.url, "canceling call");
            self.cancel.cancel();
        }
    }

    fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<T> fmt::Debug for ReqwestCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestCall")
            .field("method", &self.spec.method)
            .field("url", &self.spec.url)
            .field("executed", &self.executed.load(Ordering::Acquire))
            .field("canceled", &self.cancel.is_cancelled())
            .finish()
    }
}
