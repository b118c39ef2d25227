//! Key generation and public key coordinate extraction
//!
//! Generates ephemeral P-256 key pairs and recovers the raw affine
//! coordinates of the public key from its SPKI DER encoding.

use p256::pkcs8::spki::{ObjectIdentifier, SubjectPublicKeyInfoRef};
use p256::pkcs8::EncodePublicKey;
use p256::{FieldBytes, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;

use super::errors::AttestationError;

/// id-ecPublicKey (RFC 5480)
pub const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// secp256r1 / prime256v1 (RFC 5480)
pub const SECP256R1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

/// Length of one P-256 affine coordinate in bytes
pub const COORDINATE_LEN: usize = 32;

/// SEC1 marker byte for an uncompressed point
const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// Marker byte followed by X and Y
const UNCOMPRESSED_POINT_LEN: usize = 1 + 2 * COORDINATE_LEN;

/// Scalars outside `[1, n)` are rejected; the chance of needing a retry is about 2^-32.
const MAX_SCALAR_ATTEMPTS: usize = 8;

/// Ephemeral key pair owned by a single credential generation call
pub struct KeyMaterial {
    // Kept only so the key pair exists as a unit; the "none" attestation
    // format never signs anything with it.
    #[allow(dead_code)]
    private_key: SecretKey,
    public_key_der: Vec<u8>,
}

impl KeyMaterial {
    /// SPKI DER encoding of the public key
    #[must_use]
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_key", &"<redacted>")
            .field("public_key_der_len", &self.public_key_der.len())
            .finish()
    }
}

/// Raw uncompressed public point, big-endian coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPoint {
    pub x: [u8; COORDINATE_LEN],
    pub y: [u8; COORDINATE_LEN],
}

/// Generate a fresh P-256 key pair from the operating system's random source
///
/// # Errors
///
/// Returns `AttestationError::KeyGeneration` if the random source fails, no
/// valid scalar is drawn, or the public key cannot be exported as SPKI DER.
pub fn generate_key_material() -> Result<KeyMaterial, AttestationError> {
    let private_key = random_secret_key()?;
    let public_key_der = private_key
        .public_key()
        .to_public_key_der()
        .map_err(|e| AttestationError::KeyGeneration(format!("SPKI export failed: {e}")))?
        .as_bytes()
        .to_vec();

    Ok(KeyMaterial {
        private_key,
        public_key_der,
    })
}

fn random_secret_key() -> Result<SecretKey, AttestationError> {
    let mut rng = OsRng;
    for _ in 0..MAX_SCALAR_ATTEMPTS {
        let mut candidate = FieldBytes::default();
        rng.try_fill_bytes(&mut candidate[..]).map_err(|e| {
            AttestationError::KeyGeneration(format!("OS random source unavailable: {e}"))
        })?;
        if let Ok(secret) = SecretKey::from_bytes(&candidate) {
            return Ok(secret);
        }
    }
    Err(AttestationError::KeyGeneration(format!(
        "no valid P-256 scalar after {MAX_SCALAR_ATTEMPTS} attempts"
    )))
}

/// Recover the X and Y coordinates from a P-256 SPKI DER public key
///
/// The ASN.1 structure is parsed rather than sliced at a fixed offset, so a
/// differently padded encoding fails loudly instead of yielding wrong bytes.
///
/// # Errors
///
/// Returns `AttestationError::MalformedKey` if the DER does not parse, the
/// algorithm is not id-ecPublicKey on secp256r1, or the key is not a
/// 65-byte uncompressed point.
pub fn extract_coordinates(spki_der: &[u8]) -> Result<PublicPoint, AttestationError> {
    let spki = SubjectPublicKeyInfoRef::try_from(spki_der).map_err(|e| {
        AttestationError::malformed_key(format!(
            "invalid SPKI DER ({} bytes): {e}",
            spki_der.len()
        ))
    })?;

    spki.algorithm
        .assert_oids(EC_PUBLIC_KEY_OID, SECP256R1_OID)
        .map_err(|e| AttestationError::malformed_key(format!("not a P-256 EC key: {e}")))?;

    let point = spki.subject_public_key.as_bytes().ok_or_else(|| {
        AttestationError::malformed_key("public key bit string has unused bits")
    })?;

    if point.len() != UNCOMPRESSED_POINT_LEN {
        return Err(AttestationError::malformed_key(format!(
            "expected {UNCOMPRESSED_POINT_LEN} point bytes, got {}",
            point.len()
        )));
    }
    if point[0] != UNCOMPRESSED_POINT_TAG {
        return Err(AttestationError::malformed_key(format!(
            "expected uncompressed point tag 0x04, got {:#04x}",
            point[0]
        )));
    }

    let mut x = [0u8; COORDINATE_LEN];
    let mut y = [0u8; COORDINATE_LEN];
    x.copy_from_slice(&point[1..=COORDINATE_LEN]);
    y.copy_from_slice(&point[1 + COORDINATE_LEN..]);

    Ok(PublicPoint { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::elliptic_curve::sec1::ToEncodedPoint;
    use p256::pkcs8::DecodePublicKey;
    use p256::PublicKey;

    // Byte offsets inside a 91-byte P-256 SPKI encoding
    const OUTER_LEN_OFFSET: usize = 1;
    const CURVE_OID_LAST_BYTE: usize = 22;
    const BIT_STRING_LEN_OFFSET: usize = 24;
    const POINT_TAG_OFFSET: usize = 26;

    /// Well-formed SPKI whose point is `delta` bytes longer or shorter than 65
    fn resized_point_spki(delta: i8) -> Vec<u8> {
        let material = generate_key_material().unwrap();
        let mut der = material.public_key_der().to_vec();
        let new_len = der.len().wrapping_add_signed(isize::from(delta));
        der.resize(new_len, 0xaa);
        der[OUTER_LEN_OFFSET] = der[OUTER_LEN_OFFSET].wrapping_add_signed(delta);
        der[BIT_STRING_LEN_OFFSET] = der[BIT_STRING_LEN_OFFSET].wrapping_add_signed(delta);
        der
    }

    #[test]
    fn test_generated_key_is_p256_spki() {
        let material = generate_key_material().expect("key generation");
        assert_eq!(material.public_key_der().len(), 91);
        assert!(PublicKey::from_public_key_der(material.public_key_der()).is_ok());
    }

    #[test]
    fn test_coordinates_match_encoded_point() {
        let material = generate_key_material().expect("key generation");
        let point = extract_coordinates(material.public_key_der()).expect("coordinates");

        let public_key = PublicKey::from_public_key_der(material.public_key_der()).unwrap();
        let encoded = public_key.to_encoded_point(false);
        assert_eq!(encoded.x().unwrap().as_slice(), point.x.as_slice());
        assert_eq!(encoded.y().unwrap().as_slice(), point.y.as_slice());
    }

    #[test]
    fn test_each_call_yields_a_new_key() {
        let first = generate_key_material().unwrap();
        let second = generate_key_material().unwrap();
        assert_ne!(first.public_key_der(), second.public_key_der());
    }

    #[test]
    fn test_debug_output_redacts_private_key() {
        let material = generate_key_material().unwrap();
        let debug = format!("{material:?}");
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("public_key_der_len: 91"));
    }

    #[test]
    fn test_truncated_der_is_rejected() {
        let material = generate_key_material().unwrap();
        let der = material.public_key_der();
        let result = extract_coordinates(&der[..der.len() - 1]);
        assert!(matches!(result, Err(AttestationError::MalformedKey { .. })));
    }

    #[test]
    fn test_wrong_curve_is_rejected() {
        let material = generate_key_material().unwrap();
        let mut der = material.public_key_der().to_vec();
        der[CURVE_OID_LAST_BYTE] = 0x08;
        let err = extract_coordinates(&der).unwrap_err();
        assert!(err.to_string().contains("not a P-256 EC key"));
    }

    #[test]
    fn test_compressed_point_tag_is_rejected() {
        let material = generate_key_material().unwrap();
        let mut der = material.public_key_der().to_vec();
        der[POINT_TAG_OFFSET] = 0x02;
        let err = extract_coordinates(&der).unwrap_err();
        assert!(err.to_string().contains("uncompressed point tag"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = extract_coordinates(&[0x04; 65]);
        assert!(matches!(result, Err(AttestationError::MalformedKey { .. })));
    }

    #[test]
    fn test_oversized_point_is_rejected() {
        let err = extract_coordinates(&resized_point_spki(1)).unwrap_err();
        match err {
            AttestationError::MalformedKey { detail } => {
                assert_eq!(detail, "expected 65 point bytes, got 66");
            }
            other => panic!("expected MalformedKey, got {other:?}"),
        }
    }

    #[test]
    fn test_short_point_is_rejected() {
        let err = extract_coordinates(&resized_point_spki(-1)).unwrap_err();
        assert!(err.to_string().contains("expected 65 point bytes, got 64"));
    }
}
