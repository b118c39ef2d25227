//! Attestation data types
//!
//! Input and output shapes of a registration attempt. Field names follow the
//! JSON the registration endpoint sends and expects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inputs of one registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeContext {
    pub challenge: String, // Server-issued, already base64url-encoded
    pub rp_id: String,     // Relying party id, hashed into authenticator data
    pub origin: String,    // Origin reported in client data
}

impl ChallengeContext {
    #[must_use]
    pub fn new(
        challenge: impl Into<String>,
        rp_id: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            challenge: challenge.into(),
            rp_id: rp_id.into(),
            origin: origin.into(),
        }
    }
}

/// Relying party as announced in the creation options
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RelyingParty {
    pub id: String, // Domain name (e.g., "example.com")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>, // Display name
}

/// Public key creation options issued by the server
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreationOptions {
    pub challenge: String, // Base64URL-encoded challenge
    pub rp: RelyingParty,
}

/// `data` member of a successful registration-options response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RegistrationOptions {
    pub options: CreationOptions,
    #[serde(default)]
    pub user_id: Value, // Opaque, echoed back on submission
}

/// Attestation part of a credential record
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AttestationResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String, // Encoded client data JSON
    #[serde(rename = "attestationObject")]
    pub attestation_object: String, // Base64-encoded CBOR attestation object
}

/// Credential record handed to the registration submitter
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: String, // Base64URL (no padding) credential id
    #[serde(rename = "type")]
    pub r#type: String, // Always "public-key"
    #[serde(rename = "rawId")]
    pub raw_id: String, // Base64 credential id
    pub response: AttestationResponse,
}

/// Document posted to the registration endpoint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RegistrationPayload {
    pub credential_json: CredentialRecord,
    pub user_id: Value,
    #[serde(flatten)]
    pub metadata: Map<String, Value>, // Caller-supplied account fields
}
