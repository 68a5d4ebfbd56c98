//! JSON codec helpers.
//!
//! Thin wrappers around `serde_json` for encoding and decoding wire
//! messages. The protocol ships JSON text frames over WebSocket.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::NetError;

/// Encode a value to a JSON string.
///
/// # Errors
///
/// Returns [`NetError::Encode`] if serialisation fails.
pub fn encode<T: Serialize>(value: &T) -> Result<String, NetError> {
    serde_json::to_string(value).map_err(NetError::Encode)
}

/// Decode a value from a JSON string.
///
/// # Errors
///
/// Returns [`NetError::Decode`] if deserialisation fails.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, NetError> {
    serde_json::from_str(text).map_err(NetError::Decode)
}
