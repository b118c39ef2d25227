#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the passkey-synth library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod attestation;
pub mod response;
pub mod settings;
pub mod utils;

/// Re-export commonly used items
pub use attestation::{
    AttestationError, AttestationSettings, ChallengeContext, CredentialGenerator, CredentialRecord,
    RegistrationOptions, RegistrationPayload,
};
pub use response::{decode_response, DecodedResponse, ResponseError, UndecodableResponseError};
pub use settings::Settings;
