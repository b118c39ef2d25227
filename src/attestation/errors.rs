//! Attestation error types
//!
//! This module defines the errors raised while synthesizing a credential.

use thiserror::Error;

/// Errors that can occur while building a self-attested credential
#[derive(Debug, Error)]
pub enum AttestationError {
    /// The random source or key provider could not produce key material
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// The exported public key did not have the expected P-256 SPKI shape
    #[error("Malformed public key: {detail}")]
    MalformedKey { detail: String },

    /// Authenticator data could not be read back
    #[error("Malformed authenticator data: {0}")]
    MalformedAuthenticatorData(String),

    /// CBOR or JSON serialization failed
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl AttestationError {
    pub(crate) fn malformed_key(detail: impl Into<String>) -> Self {
        Self::MalformedKey {
            detail: detail.into(),
        }
    }
}
