//! JSON wire codec
//!
//! Everything the gateway sends is the JSON encoding of a structured value,
//! with raw byte sequences rendered as lowercase hex strings. A value the
//! serializer cannot handle is an internal defect: the response is aborted
//! with a 500 instead of leaking a malformed body to the client.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Codec errors
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A byte sequence that crosses the wire as a lowercase hex string
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map(HexBytes).map_err(D::Error::custom)
    }
}

/// Encode a value into its wire representation
pub fn to_wire<T: Serialize>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

/// Build a JSON response from a value
///
/// A serialization failure aborts the response with 500; it is not a
/// user-correctable condition.
pub fn json_response<T: Serialize>(value: &T) -> Response {
    match to_wire(value) {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap_or_else(|_| internal_error()),
        Err(e) => {
            log::error!("Failed to encode response: {}", e);
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
