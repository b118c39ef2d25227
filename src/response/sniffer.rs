//! Response format sniffing
//!
//! The registration-options endpoint answers with raw CBOR, plain JSON or
//! gzip-compressed JSON regardless of its content type. Decoding is tried in
//! that order against the same borrowed buffer and the first success wins.

use std::fmt;
use std::io::Read;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ciborium::value::Value as CborValue;
use flate2::read::GzDecoder;
use log::debug;
use serde_json::{Map, Number, Value};

use super::errors::UndecodableResponseError;
use crate::utils::logging::LoggingHelper;

/// Bytes shown in the hex preview of an undecodable response
const PREVIEW_LEN: usize = 50;

/// Largest decompressed body accepted from a gzip response
pub const MAX_DECOMPRESSED_LEN: usize = 8 * 1024 * 1024;

/// Decoding strategy that produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Cbor,
    Json,
    GzipJson,
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseFormat::Cbor => write!(f, "CBOR"),
            ResponseFormat::Json => write!(f, "JSON"),
            ResponseFormat::GzipJson => write!(f, "GZIP+JSON"),
        }
    }
}

/// A decoded response tagged with the strategy that succeeded
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    Cbor(Value),
    Json(Value),
    GzipJson(Value),
}

impl DecodedResponse {
    #[must_use]
    pub fn format(&self) -> ResponseFormat {
        match self {
            DecodedResponse::Cbor(_) => ResponseFormat::Cbor,
            DecodedResponse::Json(_) => ResponseFormat::Json,
            DecodedResponse::GzipJson(_) => ResponseFormat::GzipJson,
        }
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        match self {
            DecodedResponse::Cbor(value)
            | DecodedResponse::Json(value)
            | DecodedResponse::GzipJson(value) => value,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            DecodedResponse::Cbor(value)
            | DecodedResponse::Json(value)
            | DecodedResponse::GzipJson(value) => value,
        }
    }
}

/// Decode a response body of unknown format
///
/// CBOR byte strings become unpadded base64url text and integer map keys
/// become their decimal text, so all three formats yield the same JSON
/// value model.
///
/// # Errors
///
/// Returns `UndecodableResponseError` with the failure of every strategy if
/// none of them succeeds.
pub fn decode_response(bytes: &[u8]) -> Result<DecodedResponse, UndecodableResponseError> {
    let cbor = match decode_cbor(bytes) {
        Ok(value) => return Ok(found(DecodedResponse::Cbor(value), bytes.len())),
        Err(e) => e,
    };
    debug!("CBOR decode failed ({cbor}), trying JSON");

    let json = match decode_json(bytes) {
        Ok(value) => return Ok(found(DecodedResponse::Json(value), bytes.len())),
        Err(e) => e,
    };
    debug!("JSON decode failed ({json}), trying GZIP+JSON");

    let gzip = match decode_gzip_json(bytes) {
        Ok(value) => return Ok(found(DecodedResponse::GzipJson(value), bytes.len())),
        Err(e) => e,
    };

    let error = UndecodableResponseError {
        length: bytes.len(),
        preview: hex_preview(bytes),
        cbor,
        json,
        gzip,
    };
    LoggingHelper::log_undecodable_response(&error);
    Err(error)
}

fn found(decoded: DecodedResponse, length: usize) -> DecodedResponse {
    LoggingHelper::log_decoded_response(decoded.format(), length);
    decoded
}

fn decode_cbor(bytes: &[u8]) -> Result<Value, String> {
    let mut remaining = bytes;
    let value: CborValue =
        ciborium::de::from_reader(&mut remaining).map_err(|e| e.to_string())?;

    // A JSON or gzip body can occasionally parse as a short CBOR item; only a
    // complete, structured document counts.
    if !remaining.is_empty() {
        return Err(format!("{} trailing bytes after CBOR item", remaining.len()));
    }
    if !(value.is_map() || value.is_array()) {
        return Err("top-level CBOR item is not a map or array".to_string());
    }
    cbor_to_json(value)
}

fn decode_json(bytes: &[u8]) -> Result<Value, String> {
    let text = std::str::from_utf8(bytes).map_err(|e| format!("invalid UTF-8: {e}"))?;
    serde_json::from_str(text).map_err(|e| e.to_string())
}

fn decode_gzip_json(bytes: &[u8]) -> Result<Value, String> {
    let mut decompressed = Vec::new();
    GzDecoder::new(bytes)
        .take(MAX_DECOMPRESSED_LEN as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| format!("gunzip failed: {e}"))?;
    if decompressed.len() > MAX_DECOMPRESSED_LEN {
        return Err(format!("gunzip output exceeds {MAX_DECOMPRESSED_LEN} bytes"));
    }
    decode_json(&decompressed)
}

fn cbor_to_json(value: CborValue) -> Result<Value, String> {
    Ok(match value {
        CborValue::Null => Value::Null,
        CborValue::Bool(flag) => Value::Bool(flag),
        CborValue::Integer(integer) => Value::Number(integer_to_number(i128::from(integer))?),
        CborValue::Float(float) => Number::from_f64(float).map_or(Value::Null, Value::Number),
        CborValue::Text(text) => Value::String(text),
        CborValue::Bytes(bytes) => Value::String(URL_SAFE_NO_PAD.encode(bytes)),
        CborValue::Tag(_, inner) => cbor_to_json(*inner)?,
        CborValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(cbor_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        CborValue::Map(entries) => {
            let mut object = Map::with_capacity(entries.len());
            for (key, value) in entries {
                object.insert(map_key(key)?, cbor_to_json(value)?);
            }
            Value::Object(object)
        }
        #[allow(unreachable_patterns)]
        other => return Err(format!("unsupported CBOR item: {other:?}")),
    })
}

fn integer_to_number(integer: i128) -> Result<Number, String> {
    if let Ok(signed) = i64::try_from(integer) {
        Ok(Number::from(signed))
    } else if let Ok(unsigned) = u64::try_from(integer) {
        Ok(Number::from(unsigned))
    } else {
        Err(format!("CBOR integer {integer} out of range"))
    }
}

fn map_key(key: CborValue) -> Result<String, String> {
    match key {
        CborValue::Text(text) => Ok(text),
        CborValue::Integer(integer) => Ok(i128::from(integer).to_string()),
        CborValue::Bool(flag) => Ok(flag.to_string()),
        CborValue::Bytes(bytes) => Ok(URL_SAFE_NO_PAD.encode(bytes)),
        other => Err(format!("unsupported CBOR map key: {other:?}")),
    }
}

fn hex_preview(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(PREVIEW_LEN)
        .map(|b| format!("{b:02x}"))
        .collect()
}
