//! Error Handling Module
//!
//! Every failure that can reach a subscriber is a [`Error`]:
//! - transport failures from executing a call (`Io`, `Canceled`)
//! - non-2xx responses synthesized for body-shaped streams (`Http`)
//! - single-value coercion failures (`NoSuchElement`, `TooManyElements`)
//! - adapter configuration failures raised before any subscription exists
//!
//! # Example
//!
//! ```rust,ignore
//! use fluxcall::error::Error;
//!
//! let error = Error::configuration("Result must be parameterized as Result<Foo> or Result<? extends Foo>");
//! assert!(error.is_configuration());
//! ```

mod http;
mod types;

pub use http::HttpError;
pub use types::*;
