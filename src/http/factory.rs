//! Factory producing [`ReqwestCall`]s against one base URL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;

use super::BodyConverter;
use super::call::{ReqwestCall, RequestSpec};
use crate::error::{Error, Result};

/// HTTP settings shared by every call a factory creates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub headers: HashMap<String, String>,
}

/// Build an HTTP client from [`HttpConfig`].
pub fn build_http_client(config: &HttpConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }
    builder
        .build()
        .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {e}")))
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (k, v) in headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|e| Error::configuration(format!("Invalid header name '{k}': {e}")))?;
        let value = HeaderValue::from_str(v)
            .map_err(|e| Error::configuration(format!("Invalid header value for '{k}': {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Creates calls relative to a base URL, on a shared client and runtime.
#[derive(Debug, Clone)]
pub struct HttpCallFactory {
    client: Client,
    runtime: Handle,
    base_url: String,
    headers: HeaderMap,
}

impl HttpCallFactory {
    pub fn builder() -> HttpCallFactoryBuilder {
        HttpCallFactoryBuilder::default()
    }

    /// Factory for `base_url` on the current tokio runtime.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get<T, C>(&self, path: &str, converter: C) -> ReqwestCall<T>
    where
        T: Send + 'static,
        C: BodyConverter<T> + 'static,
    {
        self.request(Method::GET, path, None, converter)
    }

    /// POST `body` serialized as JSON.
    pub fn post_json<T, B, C>(&self, path: &str, body: &B, converter: C) -> Result<ReqwestCall<T>>
    where
        T: Send + 'static,
        B: Serialize + ?Sized,
        C: BodyConverter<T> + 'static,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|e| Error::configuration(format!("Failed to serialize request body: {e}")))?;
        let mut spec = self.spec(Method::POST, path, Some(Bytes::from(payload)));
        spec.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(ReqwestCall::new(
            self.client.clone(),
            self.runtime.clone(),
            spec,
            Arc::new(converter),
        ))
    }

    pub fn request<T, C>(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
        converter: C,
    ) -> ReqwestCall<T>
    where
        T: Send + 'static,
        C: BodyConverter<T> + 'static,
    {
        ReqwestCall::new(
            self.client.clone(),
            self.runtime.clone(),
            self.spec(method, path, body),
            Arc::new(converter),
        )
    }

    fn spec(&self, method: Method, path: &str, body: Option<Bytes>) -> RequestSpec {
        RequestSpec {
            method,
            url: self.url(path),
            headers: self.headers.clone(),
            body,
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        match (self.base_url.ends_with('/'), path.starts_with('/')) {
            (true, true) => format!("{}{}", self.base_url, &path[1..]),
            (false, false) if !path.is_empty() => format!("{}/{}", self.base_url, path),
            _ => format!("{}{}", self.base_url, path),
        }
    }
}

/// Builder for [`HttpCallFactory`].
#[derive(Debug, Default)]
pub struct HttpCallFactoryBuilder {
    config: HttpConfig,
    client: Option<Client>,
    runtime: Option<Handle>,
}

impl HttpCallFactoryBuilder {
    /// Start from a deserialized [`HttpConfig`].
    pub fn config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Header sent with every call.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    /// Use a preconfigured client; timeout and user agent settings are ignored.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Runtime that drives the calls. Defaults to the current runtime.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> Result<HttpCallFactory> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| {
                Error::configuration("HttpCallFactory requires a tokio runtime handle")
            })?,
        };
        let client = match self.client {
            Some(client) => client,
            None => build_http_client(&self.config)?,
        };
        let headers = header_map(&self.config.headers)?;
        Ok(HttpCallFactory {
            client,
            runtime,
            base_url: self.config.base_url,
            headers,
        })
    }
}
