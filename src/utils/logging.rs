// Centralized logging utilities to reduce verbose logging patterns
use log::{debug, info, warn};

use crate::response::{ResponseFormat, UndecodableResponseError};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log which decoding strategy accepted a response
    pub fn log_decoded_response(format: ResponseFormat, length: usize) {
        info!("Decoded {length}-byte response as {format}");
    }

    /// Log every strategy failure of an undecodable response
    pub fn log_undecodable_response(error: &UndecodableResponseError) {
        warn!(
            "Failed to parse {}-byte response as CBOR, JSON, or GZIP+JSON",
            error.length
        );
        debug!("First bytes (hex): {}", error.preview);
        debug!("CBOR error: {}", error.cbor);
        debug!("JSON error: {}", error.json);
        debug!("GZIP error: {}", error.gzip);
    }

    /// Log a generated credential without any key material
    pub fn log_credential_generated(rp_id: &str, credential_id: &str) {
        info!("Generated credential {credential_id} for relying party {rp_id}");
    }

    /// Log where settings were loaded from
    pub fn log_settings_source(source: &std::path::Path) {
        info!("Loaded settings from {}", source.display());
    }

    /// Log an environment override that could not be applied
    pub fn log_invalid_override(variable: &str, value: &str) {
        warn!("Ignoring {variable}={value}: not a valid value");
    }
}
