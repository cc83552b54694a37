//! Structured error for non-2xx responses.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::call::Response;

/// A response that completed at the HTTP layer but carried a non-2xx status.
///
/// Keeps the status line, headers and raw error body of the failed response so
/// consumers of body-shaped streams can still inspect what the server said.
#[derive(Debug, Clone, thiserror::Error)]
#[error("HTTP {} {message}", .status.as_u16())]
pub struct HttpError {
    status: StatusCode,
    message: String,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl HttpError {
    /// Capture the metadata of an unsuccessful response.
    pub fn from_response<T>(response: Response<T>) -> Self {
        let message = response.message().to_string();
        let (status, headers, _, body) = response.into_parts();
        Self {
            status,
            message,
            headers,
            body,
        }
    }

    /// Numeric status code.
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Status reason phrase.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw error body, if the server sent one.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}
