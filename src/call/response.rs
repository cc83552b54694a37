//! Response of a single call execution.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

/// Immutable result of one call execution.
///
/// A response is successful when its status is 2xx. Successful responses carry a
/// decoded body; unsuccessful ones carry the raw error body instead.
#[derive(Debug, Clone)]
pub struct Response<T> {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<T>,
    error_body: Option<Bytes>,
}

impl<T> Response<T> {
    /// A `200 OK` response with the given body.
    pub fn success(body: T) -> Self {
        Self::success_with(StatusCode::OK, HeaderMap::new(), body)
    }

    /// A successful response with explicit status and headers.
    pub fn success_with(status: StatusCode, headers: HeaderMap, body: T) -> Self {
        Self {
            status,
            headers,
            body: Some(body),
            error_body: None,
        }
    }

    /// An unsuccessful response carrying the raw error body.
    pub fn error(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::error_with(status, HeaderMap::new(), body)
    }

    pub fn error_with(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: None,
            error_body: Some(body.into()),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status.is_success()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Numeric status code.
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Status reason phrase, empty for non-standard codes.
    pub fn message(&self) -> &str {
        self.status.canonical_reason().unwrap_or("")
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Decoded body. `None` for unsuccessful responses.
    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    /// Raw body of an unsuccessful response.
    pub fn error_body(&self) -> Option<&Bytes> {
        self.error_body.as_ref()
    }

    pub fn into_body(self) -> Option<T> {
        self.body
    }

    /// Take the body of a successful response, or give the response back.
    pub fn try_into_body(self) -> Result<T, Self> {
        if !self.is_successful() {
            return Err(self);
        }
        match self.body {
            Some(body) => Ok(body),
            None => Err(self),
        }
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Option<T>, Option<Bytes>) {
        (self.status, self.headers, self.body, self.error_body)
    }
}
