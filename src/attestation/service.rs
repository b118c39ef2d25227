//! Credential generation service
//!
//! Runs the whole synthesis pipeline for one registration attempt: client
//! data, key pair, coordinates, COSE key, authenticator data, attestation
//! object, credential record.

use log::{debug, warn};
use serde_json::{Map, Value};

use super::authenticator_data::{build_authenticator_data, CredentialId};
use super::cbor::encode_attestation_object;
use super::client_data::ClientDataBuilder;
use super::cose::encode_cose_key;
use super::credential::assemble_credential;
use super::errors::AttestationError;
use super::keys::{extract_coordinates, generate_key_material};
use super::settings::AttestationSettings;
use super::types::{ChallengeContext, CredentialRecord, RegistrationOptions, RegistrationPayload};
use crate::utils::logging::LoggingHelper;

/// Payload fields that caller metadata may not shadow
const RESERVED_PAYLOAD_KEYS: [&str; 2] = ["credential_json", "user_id"];

/// Output of one generation call
#[derive(Debug, Clone)]
pub struct GeneratedCredential {
    pub record: CredentialRecord,
    pub credential_id: CredentialId,
    pub authenticator_data: Vec<u8>,
    pub attestation_object: Vec<u8>,
}

/// Synthesizes self-attested registration credentials
#[derive(Debug, Clone, Default)]
pub struct CredentialGenerator {
    settings: AttestationSettings,
}

impl CredentialGenerator {
    /// Create a new `CredentialGenerator` with the given settings
    #[must_use]
    pub fn new(settings: AttestationSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &AttestationSettings {
        &self.settings
    }

    /// Bind server options to the configured origin
    #[must_use]
    pub fn context_for(&self, options: &RegistrationOptions) -> ChallengeContext {
        ChallengeContext::new(
            options.options.challenge.clone(),
            options.options.rp.id.clone(),
            self.settings.origin.clone(),
        )
    }

    /// Generate a fresh credential for `context`
    ///
    /// Every call uses a new key pair and a new credential id. The private key
    /// is dropped before returning.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::KeyGeneration` if randomness or key
    /// generation fails, `AttestationError::MalformedKey` if the exported key
    /// has an unexpected shape, or `AttestationError::Encoding` on
    /// serialization failure.
    pub fn generate(&self, context: &ChallengeContext) -> Result<GeneratedCredential, AttestationError> {
        let client_data =
            ClientDataBuilder::new(self.settings.client_data_encoding, self.settings.cross_origin)
                .build(context)?;

        let key_material = generate_key_material()?;
        let point = extract_coordinates(key_material.public_key_der())?;
        drop(key_material);

        let cose_key = encode_cose_key(&point)?;
        let credential_id = CredentialId::generate()?;
        let authenticator_data = build_authenticator_data(
            &context.rp_id,
            &self.settings.aaguid,
            &credential_id,
            &cose_key,
        )?;
        debug!(
            "Built authenticator data: {} bytes ({} byte COSE key)",
            authenticator_data.len(),
            cose_key.len()
        );

        let attestation_object = encode_attestation_object(&authenticator_data)?;
        let record = assemble_credential(&credential_id, &client_data, &attestation_object);
        LoggingHelper::log_credential_generated(&context.rp_id, &record.id);

        Ok(GeneratedCredential {
            record,
            credential_id,
            authenticator_data,
            attestation_object,
        })
    }

    /// Generate a credential straight from server options
    ///
    /// # Errors
    ///
    /// Same as [`CredentialGenerator::generate`].
    pub fn generate_for_options(
        &self,
        options: &RegistrationOptions,
    ) -> Result<GeneratedCredential, AttestationError> {
        self.generate(&self.context_for(options))
    }

    /// Build the document posted to the registration endpoint
    ///
    /// Metadata entries named like a payload field are dropped so every key
    /// appears once in the serialized document.
    #[must_use]
    pub fn registration_payload(
        options: &RegistrationOptions,
        record: CredentialRecord,
        mut metadata: Map<String, Value>,
    ) -> RegistrationPayload {
        for key in RESERVED_PAYLOAD_KEYS {
            if metadata.remove(key).is_some() {
                warn!("Ignoring metadata entry {key}: reserved payload field");
            }
        }

        RegistrationPayload {
            credential_json: record,
            user_id: options.user_id.clone(),
            metadata,
        }
    }
}
