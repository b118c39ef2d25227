//! COSE key encoding
//!
//! Builds the `COSE_Key` map (RFC 8152) for an ES256 public key. Entries are
//! written in a fixed label order so the output is byte-for-byte stable.

use ciborium::value::{Integer, Value};

use super::errors::AttestationError;
use super::keys::PublicPoint;

/// COSE key type label
pub const LABEL_KTY: i64 = 1;
/// COSE algorithm label
pub const LABEL_ALG: i64 = 3;
/// EC2 curve label
pub const LABEL_CRV: i64 = -1;
/// EC2 x-coordinate label
pub const LABEL_X: i64 = -2;
/// EC2 y-coordinate label
pub const LABEL_Y: i64 = -3;

/// kty = EC2
pub const KTY_EC2: i64 = 2;
/// alg = ES256 (ECDSA with SHA-256)
pub const ALG_ES256: i64 = -7;
/// crv = P-256
pub const CRV_P256: i64 = 1;

fn int(value: i64) -> Value {
    Value::Integer(Integer::from(value))
}

/// Encode an uncompressed P-256 point as a CBOR `COSE_Key`
///
/// # Errors
///
/// Returns `AttestationError::Encoding` if CBOR serialization fails.
pub fn encode_cose_key(point: &PublicPoint) -> Result<Vec<u8>, AttestationError> {
    let cose_key = Value::Map(vec![
        (int(LABEL_KTY), int(KTY_EC2)),
        (int(LABEL_ALG), int(ALG_ES256)),
        (int(LABEL_CRV), int(CRV_P256)),
        (int(LABEL_X), Value::Bytes(point.x.to_vec())),
        (int(LABEL_Y), Value::Bytes(point.y.to_vec())),
    ]);

    let mut encoded = Vec::with_capacity(77);
    ciborium::ser::into_writer(&cose_key, &mut encoded)
        .map_err(|e| AttestationError::Encoding(format!("COSE key: {e}")))?;
    Ok(encoded)
}
