//! Authenticator data layout
//!
//! Builds and parses the binary authenticator data of a registration:
//!
//! ```text
//! rpIdHash (32) | flags (1) | signCount (4, BE) | aaguid (16)
//!   | credIdLen (2, BE) | credentialId (credIdLen) | COSE public key
//! ```
//!
//! The AAGUID and the credential id are independent fields; the AAGUID comes
//! from configuration and the credential id is freshly random per call.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::errors::AttestationError;

/// User Present
pub const FLAG_USER_PRESENT: u8 = 0x01;
/// Attested credential data included
pub const FLAG_ATTESTED_CREDENTIAL_DATA: u8 = 0x40;
/// Flags written for every synthesized registration
pub const REGISTRATION_FLAGS: u8 = FLAG_USER_PRESENT | FLAG_ATTESTED_CREDENTIAL_DATA;

/// Length of the credential identifier in bytes
pub const CREDENTIAL_ID_LEN: usize = 16;

const RP_ID_HASH_LEN: usize = 32;
const SIGN_COUNT_LEN: usize = 4;
const AAGUID_LEN: usize = 16;
const CRED_ID_LEN_FIELD: usize = 2;

/// Offset of the flags byte
pub const FLAGS_OFFSET: usize = RP_ID_HASH_LEN;
const SIGN_COUNT_OFFSET: usize = FLAGS_OFFSET + 1;
const AAGUID_OFFSET: usize = SIGN_COUNT_OFFSET + SIGN_COUNT_LEN;
const CRED_ID_LEN_OFFSET: usize = AAGUID_OFFSET + AAGUID_LEN;
/// Length of everything before the credential id
pub const FIXED_PREFIX_LEN: usize = CRED_ID_LEN_OFFSET + CRED_ID_LEN_FIELD;

/// Random credential identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialId([u8; CREDENTIAL_ID_LEN]);

impl CredentialId {
    /// Draw a new identifier from the operating system's random source
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::KeyGeneration` if the random source fails.
    pub fn generate() -> Result<Self, AttestationError> {
        let mut bytes = [0u8; CREDENTIAL_ID_LEN];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            AttestationError::KeyGeneration(format!("OS random source unavailable: {e}"))
        })?;
        Ok(Self(bytes))
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; CREDENTIAL_ID_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; CREDENTIAL_ID_LEN] {
        &self.0
    }
}

/// SHA-256 of the relying party id
#[must_use]
pub fn rp_id_hash(rp_id: &str) -> [u8; RP_ID_HASH_LEN] {
    Sha256::digest(rp_id.as_bytes()).into()
}

/// Build authenticator data for a new credential
///
/// # Errors
///
/// Returns `AttestationError::Encoding` if the credential id length does not
/// fit the two-byte length field.
pub fn build_authenticator_data(
    rp_id: &str,
    aaguid: &Uuid,
    credential_id: &CredentialId,
    cose_public_key: &[u8],
) -> Result<Vec<u8>, AttestationError> {
    let id = credential_id.as_bytes();
    let id_len = u16::try_from(id.len())
        .map_err(|_| AttestationError::Encoding("credential id too long".to_string()))?;

    let mut data = Vec::with_capacity(FIXED_PREFIX_LEN + id.len() + cose_public_key.len());
    data.extend_from_slice(&rp_id_hash(rp_id));
    data.push(REGISTRATION_FLAGS);
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(aaguid.as_bytes());
    data.extend_from_slice(&id_len.to_be_bytes());
    data.extend_from_slice(id);
    data.extend_from_slice(cose_public_key);
    Ok(data)
}

/// Authenticator data read back into its fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuthenticatorData {
    pub rp_id_hash: [u8; RP_ID_HASH_LEN],
    pub flags: u8,
    pub sign_count: u32,
    pub aaguid: Uuid,
    pub credential_id: Vec<u8>,
    pub cose_public_key: Vec<u8>,
}

impl ParsedAuthenticatorData {
    /// Parse registration authenticator data
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::MalformedAuthenticatorData` if the buffer is
    /// truncated, the attested-credential-data flag is clear, or no public
    /// key follows the credential id.
    pub fn parse(auth_data: &[u8]) -> Result<Self, AttestationError> {
        let malformed = |msg: String| AttestationError::MalformedAuthenticatorData(msg);

        if auth_data.len() < FIXED_PREFIX_LEN {
            return Err(malformed(format!(
                "expected at least {FIXED_PREFIX_LEN} bytes, got {}",
                auth_data.len()
            )));
        }

        let flags = auth_data[FLAGS_OFFSET];
        if flags & FLAG_ATTESTED_CREDENTIAL_DATA == 0 {
            return Err(malformed("no attested credential data".to_string()));
        }

        let mut rp_id_hash = [0u8; RP_ID_HASH_LEN];
        rp_id_hash.copy_from_slice(&auth_data[..RP_ID_HASH_LEN]);
        let mut counter = [0u8; SIGN_COUNT_LEN];
        counter.copy_from_slice(&auth_data[SIGN_COUNT_OFFSET..AAGUID_OFFSET]);
        let aaguid = Uuid::from_slice(&auth_data[AAGUID_OFFSET..CRED_ID_LEN_OFFSET])
            .map_err(|e| malformed(format!("invalid AAGUID: {e}")))?;
        let id_len = usize::from(u16::from_be_bytes([
            auth_data[CRED_ID_LEN_OFFSET],
            auth_data[CRED_ID_LEN_OFFSET + 1],
        ]));

        let id_end = FIXED_PREFIX_LEN + id_len;
        if auth_data.len() <= id_end {
            return Err(malformed(format!(
                "credential id of {id_len} bytes leaves no room for a public key"
            )));
        }

        Ok(Self {
            rp_id_hash,
            flags,
            sign_count: u32::from_be_bytes(counter),
            aaguid,
            credential_id: auth_data[FIXED_PREFIX_LEN..id_end].to_vec(),
            cose_public_key: auth_data[id_end..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const COSE_STUB: [u8; 5] = [0xa1, 0x01, 0x02, 0x03, 0x26];

    fn sample_id() -> CredentialId {
        CredentialId::from_bytes([0xab; CREDENTIAL_ID_LEN])
    }

    #[test]
    fn test_layout_length_and_flags() {
        let id = sample_id();
        let data = build_authenticator_data("example.com", &Uuid::nil(), &id, &COSE_STUB).unwrap();

        assert_eq!(
            data.len(),
            32 + 1 + 4 + 16 + 2 + CREDENTIAL_ID_LEN + COSE_STUB.len()
        );
        assert_eq!(data[32], 0x41);
        assert_eq!(&data[33..37], &[0, 0, 0, 0]);
        assert_eq!(&data[53..55], &[0x00, 0x10]);
        assert_eq!(&data[55..71], id.as_bytes());
        assert_eq!(&data[71..], &COSE_STUB);
    }

    #[test]
    fn test_rp_id_hash_is_sha256() {
        let data =
            build_authenticator_data("example.com", &Uuid::nil(), &sample_id(), &COSE_STUB).unwrap();
        let expected: [u8; 32] = Sha256::digest(b"example.com").into();
        assert_eq!(&data[..32], &expected);
        assert_ne!(rp_id_hash("example.com"), rp_id_hash("example.org"));
    }

    #[test]
    fn test_aaguid_and_credential_id_are_separate_fields() {
        let aaguid = Uuid::from_bytes([0x5a; 16]);
        let id = sample_id();
        let data = build_authenticator_data("example.com", &aaguid, &id, &COSE_STUB).unwrap();

        let parsed = ParsedAuthenticatorData::parse(&data).unwrap();
        assert_eq!(parsed.aaguid, aaguid);
        assert_eq!(parsed.credential_id, id.as_bytes().to_vec());
        assert_eq!(parsed.cose_public_key, COSE_STUB.to_vec());
        assert_eq!(parsed.flags, REGISTRATION_FLAGS);
        assert_eq!(parsed.sign_count, 0);
        assert_eq!(parsed.rp_id_hash, rp_id_hash("example.com"));
    }

    #[test]
    fn test_default_aaguid_is_zero() {
        let data =
            build_authenticator_data("example.com", &Uuid::nil(), &sample_id(), &COSE_STUB).unwrap();
        assert_eq!(&data[37..53], &[0u8; 16]);
    }

    #[test]
    fn test_parse_rejects_truncated_data() {
        let data =
            build_authenticator_data("example.com", &Uuid::nil(), &sample_id(), &COSE_STUB).unwrap();
        assert!(ParsedAuthenticatorData::parse(&data[..40]).is_err());
        // Credential id present but no public key
        assert!(ParsedAuthenticatorData::parse(&data[..71]).is_err());
    }

    #[test]
    fn test_parse_requires_attested_data_flag() {
        let mut data =
            build_authenticator_data("example.com", &Uuid::nil(), &sample_id(), &COSE_STUB).unwrap();
        data[FLAGS_OFFSET] = FLAG_USER_PRESENT;
        let err = ParsedAuthenticatorData::parse(&data).unwrap_err();
        assert!(err.to_string().contains("no attested credential data"));
    }

    #[test]
    fn test_credential_ids_do_not_collide() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(CredentialId::generate().unwrap()));
        }
    }
}
