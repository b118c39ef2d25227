//! Client data construction
//!
//! The field order and the text encoding of `clientDataJSON` are a contract
//! with the verifying server, so both are fixed here and the encoding is
//! selectable through settings.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::errors::AttestationError;
use super::types::ChallengeContext;

/// Ceremony type for registration
pub const WEBAUTHN_CREATE: &str = "webauthn.create";

/// Base64 alphabet and padding used for a binary field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryEncoding {
    /// RFC 4648 base64 with padding
    #[default]
    Standard,
    StandardNoPad,
    UrlSafe,
    UrlSafeNoPad,
}

impl BinaryEncoding {
    #[must_use]
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Standard => STANDARD.encode(bytes),
            Self::StandardNoPad => STANDARD_NO_PAD.encode(bytes),
            Self::UrlSafe => URL_SAFE.encode(bytes),
            Self::UrlSafeNoPad => URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    /// Parse a settings value such as `"url_safe_no_pad"`
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "standard_no_pad" => Some(Self::StandardNoPad),
            "url_safe" => Some(Self::UrlSafe),
            "url_safe_no_pad" => Some(Self::UrlSafeNoPad),
            _ => None,
        }
    }
}

// Serialized in declaration order: type, challenge, origin, crossOrigin.
#[derive(Serialize)]
struct CollectedClientData<'a> {
    #[serde(rename = "type")]
    ceremony: &'a str,
    challenge: &'a str,
    origin: &'a str,
    #[serde(rename = "crossOrigin")]
    cross_origin: bool,
}

/// Client data JSON and its transmitted form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedClientData {
    pub json: String,
    pub encoded: String,
}

/// Builds `clientDataJSON` for registration ceremonies
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientDataBuilder {
    encoding: BinaryEncoding,
    cross_origin: bool,
}

impl ClientDataBuilder {
    #[must_use]
    pub fn new(encoding: BinaryEncoding, cross_origin: bool) -> Self {
        Self {
            encoding,
            cross_origin,
        }
    }

    /// Serialize and encode client data for `context`
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::Encoding` if JSON serialization fails.
    pub fn build(&self, context: &ChallengeContext) -> Result<EncodedClientData, AttestationError> {
        let client_data = CollectedClientData {
            ceremony: WEBAUTHN_CREATE,
            challenge: &context.challenge,
            origin: &context.origin,
            cross_origin: self.cross_origin,
        };
        let json = serde_json::to_string(&client_data)
            .map_err(|e| AttestationError::Encoding(format!("client data: {e}")))?;
        let encoded = self.encoding.encode(json.as_bytes());
        Ok(EncodedClientData { json, encoded })
    }
}
