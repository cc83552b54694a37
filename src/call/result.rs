//! Result wrapper delivering failures as ordinary values.

use super::Response;
use crate::error::Error;

/// Either the response of a call or the error that prevented one.
///
/// Result-shaped streams emit exactly one `CallResult` and then complete, so a
/// network failure never terminates the stream with an error.
#[derive(Debug)]
pub enum CallResult<T> {
    /// The call produced a response, successful or not.
    Response(Response<T>),
    /// The call failed before producing a response.
    Error(Error),
}

impl<T> CallResult<T> {
    pub fn response(response: Response<T>) -> Self {
        Self::Response(response)
    }

    pub fn error(error: Error) -> Self {
        Self::Error(error)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn as_response(&self) -> Option<&Response<T>> {
        match self {
            Self::Response(r) => Some(r),
            Self::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&Error> {
        match self {
            Self::Response(_) => None,
            Self::Error(e) => Some(e),
        }
    }

    pub fn into_response(self) -> Option<Response<T>> {
        match self {
            Self::Response(r) => Some(r),
            Self::Error(_) => None,
        }
    }
}

impl<T> From<Response<T>> for CallResult<T> {
    fn from(response: Response<T>) -> Self {
        Self::Response(response)
    }
}
