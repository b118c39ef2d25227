//! CBOR processing for attestation objects
//!
//! Encodes the "none"-format attestation object and reads one back for
//! self-checks.

use ciborium::de::from_reader;
use ciborium::value::Value;

use super::errors::AttestationError;

/// Attestation statement format with no signature or certificate
pub const ATTESTATION_FORMAT_NONE: &str = "none";

/// Encode authenticator data into a "none" attestation object
///
/// The map keys are written in the order `fmt`, `attStmt`, `authData`.
///
/// # Errors
///
/// Returns `AttestationError::Encoding` if CBOR serialization fails.
pub fn encode_attestation_object(auth_data: &[u8]) -> Result<Vec<u8>, AttestationError> {
    let attestation = Value::Map(vec![
        (
            Value::Text("fmt".to_string()),
            Value::Text(ATTESTATION_FORMAT_NONE.to_string()),
        ),
        (Value::Text("attStmt".to_string()), Value::Map(Vec::new())),
        (
            Value::Text("authData".to_string()),
            Value::Bytes(auth_data.to_vec()),
        ),
    ]);

    let mut encoded = Vec::with_capacity(auth_data.len() + 32);
    ciborium::ser::into_writer(&attestation, &mut encoded)
        .map_err(|e| AttestationError::Encoding(format!("attestation object: {e}")))?;
    Ok(encoded)
}

/// Fields of a decoded attestation object
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAttestationObject {
    pub fmt: String,
    pub att_stmt: Vec<(Value, Value)>,
    pub auth_data: Vec<u8>,
}

/// Decode an attestation object
///
/// # Errors
///
/// Returns `AttestationError::Encoding` if the bytes are not a CBOR map or
/// one of `fmt`, `attStmt`, `authData` is missing or mistyped.
pub fn decode_attestation_object(bytes: &[u8]) -> Result<DecodedAttestationObject, AttestationError> {
    let attestation: Value = from_reader(bytes)
        .map_err(|_| AttestationError::Encoding("Invalid CBOR attestation format".to_string()))?;

    let Some(map) = attestation.as_map() else {
        return Err(AttestationError::Encoding(
            "Attestation object is not a map".to_string(),
        ));
    };

    let Some(fmt) = field(map, "fmt")?.as_text() else {
        return Err(AttestationError::Encoding("fmt is not text".to_string()));
    };
    let Some(att_stmt) = field(map, "attStmt")?.as_map() else {
        return Err(AttestationError::Encoding("attStmt is not a map".to_string()));
    };
    let Some(auth_data) = field(map, "authData")?.as_bytes() else {
        return Err(AttestationError::Encoding("authData is not bytes".to_string()));
    };

    Ok(DecodedAttestationObject {
        fmt: fmt.to_string(),
        att_stmt: att_stmt.clone(),
        auth_data: auth_data.clone(),
    })
}

fn field<'a>(map: &'a [(Value, Value)], name: &str) -> Result<&'a Value, AttestationError> {
    map.iter()
        .find(|(k, _)| k.as_text() == Some(name))
        .map(|(_, v)| v)
        .ok_or_else(|| AttestationError::Encoding(format!("Missing {name} in attestation")))
}
