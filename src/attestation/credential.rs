//! Credential record assembly

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

use super::authenticator_data::CredentialId;
use super::client_data::EncodedClientData;
use super::types::{AttestationResponse, CredentialRecord};

/// Credential type of every WebAuthn public key credential
pub const PUBLIC_KEY_TYPE: &str = "public-key";

/// Combine the credential id, client data and attestation object
///
/// `id` is base64url without padding, `rawId` and `attestationObject` are
/// standard base64, `clientDataJSON` is taken as already encoded.
#[must_use]
pub fn assemble_credential(
    credential_id: &CredentialId,
    client_data: &EncodedClientData,
    attestation_object: &[u8],
) -> CredentialRecord {
    CredentialRecord {
        id: URL_SAFE_NO_PAD.encode(credential_id.as_bytes()),
        r#type: PUBLIC_KEY_TYPE.to_string(),
        raw_id: STANDARD.encode(credential_id.as_bytes()),
        response: AttestationResponse {
            client_data_json: client_data.encoded.clone(),
            attestation_object: STANDARD.encode(attestation_object),
        },
    }
}
