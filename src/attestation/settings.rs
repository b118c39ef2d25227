//! Attestation settings
//!
//! Caller-owned configuration passed into every credential generation call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::client_data::BinaryEncoding;

/// Settings for synthesized credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttestationSettings {
    /// Origin reported in client data (e.g., <https://example.com>)
    pub origin: String,
    /// AAGUID written into authenticator data; the nil UUID marks an
    /// unidentified software authenticator
    pub aaguid: Uuid,
    /// Value of `crossOrigin` in client data
    pub cross_origin: bool,
    /// Encoding of the `clientDataJSON` field
    pub client_data_encoding: BinaryEncoding,
}

impl Default for AttestationSettings {
    fn default() -> Self {
        Self {
            origin: "https://localhost".to_string(),
            aaguid: Uuid::nil(),
            cross_origin: false,
            client_data_encoding: BinaryEncoding::Standard,
        }
    }
}
