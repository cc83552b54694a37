//! Response body converters.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Decodes a successful response body into `T`.
pub trait BodyConverter<T>: Send + Sync {
    fn convert(&self, body: Bytes) -> Result<T>;
}

/// Raw bytes, untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesConverter;

impl BodyConverter<Bytes> for BytesConverter {
    fn convert(&self, body: Bytes) -> Result<Bytes> {
        Ok(body)
    }
}

/// UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl BodyConverter<String> for StringConverter {
    fn convert(&self, body: Bytes) -> Result<String> {
        String::from_utf8(body.to_vec()).map_err(|e| Error::Conversion(e.to_string()))
    }
}

/// JSON via serde.
pub struct JsonConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonConverter<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonConverter<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonConverter")
            .field("target", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned> BodyConverter<T> for JsonConverter<T> {
    fn convert(&self, body: Bytes) -> Result<T> {
        serde_json::from_slice(&body).map_err(|e| Error::Conversion(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        name: String,
    }

    #[test]
    fn string_converter_rejects_invalid_utf8() {
        let err = StringConverter
            .convert(Bytes::from_static(&[0xff, 0xfe]))
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
        assert_eq!(
            StringConverter.convert(Bytes::from_static(b"hey")).unwrap(),
            "hey"
        );
    }

    #[test]
    fn json_converter_decodes_struct() {
        let user = JsonConverter::<User>::new()
            .convert(Bytes::from_static(br#"{"name":"ada"}"#))
            .unwrap();
        assert_eq!(user, User { name: "ada".into() });

        let err = JsonConverter::<User>::new()
            .convert(Bytes::from_static(b"not json"))
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to convert response body"));
    }
}
