//! Self-attested `WebAuthn` credential synthesis
//!
//! This module produces registration credentials with the "none" attestation
//! format: a fresh P-256 key, its COSE encoding, authenticator data, the CBOR
//! attestation object, client data, and the final credential record.

pub mod authenticator_data;
pub mod cbor;
pub mod client_data;
pub mod cose;
pub mod credential;
mod errors;
pub mod keys;
mod service;
mod settings;
mod types;

// Re-exports for public use
pub use authenticator_data::{CredentialId, ParsedAuthenticatorData};
pub use client_data::{BinaryEncoding, ClientDataBuilder, EncodedClientData};
pub use errors::AttestationError;
pub use service::{CredentialGenerator, GeneratedCredential};
pub use settings::AttestationSettings;
pub use types::*;
