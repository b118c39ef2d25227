//! Server response envelope
//!
//! Responses are wrapped as `{"code": 0, "data": ...}`; any other code is a
//! server-side failure.

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use super::errors::ResponseError;
use super::sniffer::{decode_response, ResponseFormat};
use crate::attestation::RegistrationOptions;

/// Status code of a successful response
pub const SUCCESS_CODE: i64 = 0;

/// `{code, data, msg}` wrapper around every response
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEnvelope {
    pub code: i64,
    #[serde(default)]
    pub data: Value,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
    #[serde(skip)]
    raw: Value,
}

impl ServerEnvelope {
    /// Read the envelope fields out of a decoded document
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::Shape` if `code` is missing or not an integer.
    pub fn from_value(value: Value) -> Result<Self, ResponseError> {
        let mut envelope: Self = serde_json::from_value(value.clone())
            .map_err(|e| ResponseError::Shape(format!("invalid envelope: {e}")))?;
        envelope.raw = value;
        Ok(envelope)
    }

    /// `data` of a successful response
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::Server` carrying the server message, or the
    /// whole document when there is none, if `code` is not zero.
    pub fn into_data(self) -> Result<Value, ResponseError> {
        if self.code == SUCCESS_CODE {
            return Ok(self.data);
        }
        let message = self.msg.unwrap_or_else(|| self.raw.to_string());
        warn!("Server returned code {}: {}", self.code, message);
        Err(ResponseError::Server {
            code: self.code,
            message,
        })
    }
}

/// Decode a registration-options response body of any supported format
///
/// # Errors
///
/// Returns `ResponseError::Undecodable` if no decoding strategy succeeds,
/// `ResponseError::Server` for a non-zero code, or `ResponseError::Shape` if
/// the options are missing their challenge or relying party id.
pub fn registration_options_from_bytes(
    bytes: &[u8],
) -> Result<(RegistrationOptions, ResponseFormat), ResponseError> {
    let decoded = decode_response(bytes)?;
    let format = decoded.format();
    let data = ServerEnvelope::from_value(decoded.into_value())?.into_data()?;
    let options = serde_json::from_value(data)
        .map_err(|e| ResponseError::Shape(format!("invalid registration options: {e}")))?;
    Ok((options, format))
}
