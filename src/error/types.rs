//! Core error types.

use thiserror::Error as ThisError;

use super::HttpError;

/// Errors produced by calls, streams and adapters.
#[derive(ThisError, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The call could not be executed (connection refused, dropped mid-request, ...)
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// A non-2xx response delivered to a body-shaped stream
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A single-value stream completed without emitting anything
    #[error("Source was empty")]
    NoSuchElement,

    /// A single-value stream emitted a second item
    #[error("Source emitted more than one item")]
    TooManyElements,

    /// Adapter construction failed because the declared return type is malformed
    #[error("{0}")]
    Configuration(String),

    /// A downstream subscriber rejected an event
    #[error("Subscriber failed: {0}")]
    Subscriber(String),

    /// A terminal event arrived after the subscriber was already terminated
    #[error("{message}")]
    Protocol {
        message: String,
        #[source]
        cause: Option<Box<Error>>,
    },

    /// The call was canceled before it produced a response
    #[error("Call was canceled")]
    Canceled,

    /// `execute` or `enqueue` was invoked on a call that already ran
    #[error("Already executed")]
    AlreadyExecuted,

    /// The response body could not be converted into the requested type
    #[error("Failed to convert response body: {0}")]
    Conversion(String),
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a subscriber error, used when a consumer refuses an item.
    pub fn subscriber(message: impl Into<String>) -> Self {
        Self::Subscriber(message.into())
    }

    /// Create a protocol violation wrapping the event that could not be delivered.
    pub fn protocol(message: impl Into<String>, cause: Error) -> Self {
        Self::Protocol {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Wrap any transport error as an I/O failure.
    pub fn io<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Io(std::io::Error::other(error))
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// HTTP status code, when this error was synthesized from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => Some(e.code()),
            _ => None,
        }
    }
}

/// Result type for fluxcall operations
pub type Result<T> = std::result::Result<T, Error>;
