//! Opaque value encoding for the wire.
//!
//! Dynamically-typed values (configuration entries, instance metadata, diff
//! extras) travel as self-describing JSON documents. Maps whose absence is
//! meaningful are wrapped in a [`ValueMap`] message so that "absent" and
//! "present but empty" survive the trip: encoding `None` yields no message at
//! all, encoding an empty map yields an empty message.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::model::ConfigMap;
use crate::proto::ValueMap;

/// Errors raised while translating values and records to or from the wire.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// A value could not be represented as JSON.
    #[error("failed to encode value{}: {source}", key_suffix(.key.as_deref()))]
    Encode {
        /// Map key of the offending entry, when encoding a map.
        key: Option<String>,
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// Bytes received from the peer were not a valid JSON document.
    #[error("failed to decode value{}: {source}", key_suffix(.key.as_deref()))]
    Decode {
        /// Map key of the offending entry, when decoding a map.
        key: Option<String>,
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// An attribute diff carried a type code outside the known table.
    #[error("unknown attribute diff type code {code}")]
    UnknownDiffType {
        /// Code received from the peer.
        code: i32,
    },

    /// A message arrived without a field the operation cannot do without.
    #[error("required field '{field}' is missing")]
    MissingField {
        /// Wire name of the field.
        field: &'static str,
    },
}

fn key_suffix(key: Option<&str>) -> String {
    key.map(|key| format!(" for key '{key}'")).unwrap_or_default()
}

/// Encodes a single opaque value.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if the value cannot be serialised.
pub fn encode_value(value: &Value) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(|source| CodecError::Encode {
        key: None,
        source: Arc::new(source),
    })
}

/// Decodes a single opaque value. An empty byte string is `null`.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the bytes are not valid JSON.
pub fn decode_value(bytes: &[u8]) -> Result<Value, CodecError> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|source| CodecError::Decode {
        key: None,
        source: Arc::new(source),
    })
}

/// Encodes each entry of a map independently.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] naming the first entry that fails.
pub fn encode_map(map: Option<&ConfigMap>) -> Result<Option<ValueMap>, CodecError> {
    let Some(map) = map else {
        return Ok(None);
    };

    let entries = map
        .iter()
        .map(|(key, value)| {
            serde_json::to_vec(value)
                .map(|bytes| (key.clone(), bytes))
                .map_err(|source| CodecError::Encode {
                    key: Some(key.clone()),
                    source: Arc::new(source),
                })
        })
        .collect::<Result<_, _>>()?;

    Ok(Some(ValueMap { entries }))
}

/// Decodes a map produced by [`encode_map`]. Entries follow
/// [`decode_value`], so an empty byte string is `null`.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] naming the first entry that fails.
pub fn decode_map(map: Option<ValueMap>) -> Result<Option<ConfigMap>, CodecError> {
    let Some(map) = map else {
        return Ok(None);
    };

    let entries = map
        .entries
        .into_iter()
        .map(|(key, bytes)| match decode_value(&bytes) {
            Ok(value) => Ok((key, value)),
            Err(CodecError::Decode { source, .. }) => Err(CodecError::Decode {
                key: Some(key),
                source,
            }),
            Err(other) => Err(other),
        })
        .collect::<Result<_, _>>()?;

    Ok(Some(entries))
}
