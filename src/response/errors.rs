//! Response decoding errors

use thiserror::Error;

/// None of the CBOR, JSON and gzip+JSON strategies accepted the bytes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "Unable to decode {length}-byte response (first bytes: {preview}): \
     CBOR: {cbor}; JSON: {json}; GZIP+JSON: {gzip}"
)]
pub struct UndecodableResponseError {
    /// Length of the rejected buffer
    pub length: usize,
    /// Hex of the first bytes, for diagnostics
    pub preview: String,
    pub cbor: String,
    pub json: String,
    pub gzip: String,
}

/// Errors raised while turning a server response into typed data
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error(transparent)]
    Undecodable(#[from] UndecodableResponseError),

    /// The server answered with a non-zero status code
    #[error("Server error {code}: {message}")]
    Server { code: i64, message: String },

    /// The document decoded but does not have the expected fields
    #[error("Unexpected response shape: {0}")]
    Shape(String),
}
