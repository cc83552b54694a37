//! HTTP Calls
//!
//! A [`Call`](crate::call::Call) implementation over `reqwest`, plus the
//! factory and body converters that produce it.

mod call;
mod converter;
mod factory;

pub use call::ReqwestCall;
pub use converter::{BodyConverter, BytesConverter, JsonConverter, StringConverter};
pub use factory::{HttpCallFactory, HttpCallFactoryBuilder, HttpConfig, build_http_client};
