//! Password hashing and verification.
//!
//! A hashed password is stored as a self-describing binary envelope:
//!
//! ```text
//! [ format marker (1 byte) ]
//! [ PRF identifier (u32, network byte order) ]
//! [ iteration count (u32, network byte order) ]
//! [ salt length (u32, network byte order) ]
//! [ salt ]
//! [ derived sub-key ]
//! ```
//!
//! The whole envelope is base64-encoded before it reaches the database, so
//! previously stored credentials remain verifiable as long as this layout is
//! preserved.

use base64ct::{Base64, Encoding};
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

use crate::profile::models::Credential;

const FORMAT_MARKER: u8 = 0x01;

/// Pseudorandom function used inside the key-derivation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prf {
    HmacSha1,
    HmacSha256,
    HmacSha512,
}

impl Prf {
    const fn id(self) -> u32 {
        match self {
            Self::HmacSha1 => 0,
            Self::HmacSha256 => 1,
            Self::HmacSha512 => 2,
        }
    }

    // Unknown identifiers fall back to HMAC-SHA256; verification still
    // rejects them unless the configured PRF agrees.
    const fn from_id(id: u32) -> Self {
        match id {
            0 => Self::HmacSha1,
            2 => Self::HmacSha512,
            _ => Self::HmacSha256,
        }
    }
}

/// Turns plaintext passwords into storable credentials and verifies
/// plaintext candidates against stored envelopes.
#[derive(Debug, Clone)]
pub struct PasswordCodec {
    format_marker: u8,
    prf: Prf,
    include_header_info: bool,
    salt_length: usize,
    requested_length: usize,
    iter_count: u32,
}

impl Default for PasswordCodec {
    fn default() -> Self {
        Self {
            format_marker: FORMAT_MARKER,
            prf: Prf::HmacSha256,
            include_header_info: true,
            salt_length: 128 / 8,
            requested_length: 256 / 8,
            iter_count: 10_000,
        }
    }
}

impl PasswordCodec {
    const fn header_length(&self) -> usize {
        // Format marker only, unless the header fields are included
        if self.include_header_info {
            13
        } else {
            1
        }
    }

    /// Hash `password` into a [`Credential`] holding the base64-encoded
    /// envelope and the base64-encoded raw salt.
    ///
    /// The salt column is redundant with the salt embedded in the envelope;
    /// it is kept for compatibility and is not reparsed on verification.
    ///
    /// # Panics
    ///
    /// Panics if `password` is empty. Callers validate blank passwords before
    /// reaching the codec, so an empty input is a contract violation rather
    /// than a recoverable condition.
    #[must_use]
    pub fn hash(&self, password: &str) -> Credential {
        assert!(!password.is_empty(), "password must not be empty");

        let mut salt = vec![0u8; self.salt_length];
        OsRng.fill_bytes(&mut salt);

        let subkey = self.derive(password, &salt, self.requested_length);

        let header_length = self.header_length();
        let mut output = vec![0u8; header_length + salt.len() + subkey.len()];

        output[0] = self.format_marker;

        if self.include_header_info {
            output[1..5].copy_from_slice(&self.prf.id().to_be_bytes());
            output[5..9].copy_from_slice(&self.iter_count.to_be_bytes());
            output[9..13].copy_from_slice(&(self.salt_length as u32).to_be_bytes());
        }

        output[header_length..header_length + salt.len()].copy_from_slice(&salt);
        output[header_length + salt.len()..].copy_from_slice(&subkey);

        Credential::new(Base64::encode_string(&salt), Base64::encode_string(&output))
    }

    /// Verify `entered_password` against a stored base64-encoded envelope.
    ///
    /// Never fails: any malformed, truncated, or mismatching envelope yields
    /// `false`.
    #[must_use]
    pub fn verify(&self, hashed_password: &str, entered_password: &str) -> bool {
        if entered_password.is_empty() || hashed_password.is_empty() {
            return false;
        }

        let Ok(decoded) = Base64::decode_vec(hashed_password) else {
            return false;
        };

        if decoded.is_empty() {
            return false;
        }

        if decoded[0] != self.format_marker {
            return false;
        }

        let header_length = self.header_length();

        if decoded.len() < header_length {
            return false;
        }

        if self.include_header_info {
            let Some(prf_id) = read_network_order(&decoded, 1) else {
                return false;
            };
            if Prf::from_id(prf_id) != self.prf {
                return false;
            }

            let Some(iter_count) = read_network_order(&decoded, 5) else {
                return false;
            };
            if iter_count != self.iter_count {
                return false;
            }

            let Some(salt_length) = read_network_order(&decoded, 9) else {
                return false;
            };
            if salt_length as usize != self.salt_length {
                return false;
            }
        }

        let Some(salt) = decoded.get(header_length..header_length + self.salt_length) else {
            return false;
        };

        let expected_subkey = &decoded[header_length + self.salt_length..];
        if expected_subkey.len() != self.requested_length {
            return false;
        }

        let actual_subkey = self.derive(entered_password, salt, expected_subkey.len());

        fixed_time_eq(&actual_subkey, expected_subkey)
    }

    fn derive(&self, password: &str, salt: &[u8], length: usize) -> Vec<u8> {
        let mut subkey = vec![0u8; length];

        match self.prf {
            Prf::HmacSha1 => {
                pbkdf2_hmac::<Sha1>(password.as_bytes(), salt, self.iter_count, &mut subkey);
            }
            Prf::HmacSha256 => {
                pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, self.iter_count, &mut subkey);
            }
            Prf::HmacSha512 => {
                pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, self.iter_count, &mut subkey);
            }
        }

        subkey
    }
}

// Every byte pair is compared regardless of earlier mismatches.
fn fixed_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

fn read_network_order(buffer: &[u8], offset: usize) -> Option<u32> {
    let bytes = buffer.get(offset..offset + 4)?;
    Some(u32::from_be_bytes(bytes.try_into().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_LENGTH: usize = 13;
    const SALT_LENGTH: usize = 16;
    const SUBKEY_LENGTH: usize = 32;

    #[test]
    fn test_hash_verify_round_trip() {
        let codec = PasswordCodec::default();
        let credential = codec.hash("correct horse battery staple");

        assert!(codec.verify(&credential.password_hash, "correct horse battery staple"));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let codec = PasswordCodec::default();
        let credential = codec.hash("correct horse battery staple");

        assert!(!codec.verify(&credential.password_hash, "correct horse battery stample"));
        assert!(!codec.verify(&credential.password_hash, "hunter2"));
    }

    #[test]
    fn test_envelope_layout() {
        let codec = PasswordCodec::default();
        let credential = codec.hash("p4ssw0rd");

        let envelope = Base64::decode_vec(&credential.password_hash).unwrap();

        assert_eq!(envelope.len(), HEADER_LENGTH + SALT_LENGTH + SUBKEY_LENGTH);
        assert_eq!(envelope[0], 0x01);
        assert_eq!(read_network_order(&envelope, 1), Some(1));
        assert_eq!(read_network_order(&envelope, 5), Some(10_000));
        assert_eq!(read_network_order(&envelope, 9), Some(16));

        // The salt column mirrors the salt embedded in the envelope
        let embedded_salt = &envelope[HEADER_LENGTH..HEADER_LENGTH + SALT_LENGTH];
        assert_eq!(
            Base64::decode_vec(&credential.password_salt).unwrap(),
            embedded_salt
        );
    }

    #[test]
    fn test_salts_are_random() {
        let codec = PasswordCodec::default();

        let first = codec.hash("p4ssw0rd");
        let second = codec.hash("p4ssw0rd");

        assert_ne!(first.password_salt, second.password_salt);
        assert_ne!(first.password_hash, second.password_hash);
    }

    #[test]
    fn test_verify_rejects_malformed_input() {
        let codec = PasswordCodec::default();
        let credential = codec.hash("p4ssw0rd");

        assert!(!codec.verify("", "p4ssw0rd"));
        assert!(!codec.verify(&credential.password_hash, ""));
        assert!(!codec.verify("not base64 at all!!", "p4ssw0rd"));
        assert!(!codec.verify(&Base64::encode_string(&[]), "p4ssw0rd"));

        // Right marker, truncated before the header ends
        assert!(!codec.verify(&Base64::encode_string(&[0x01, 0, 0, 0]), "p4ssw0rd"));

        // Wrong format marker
        let mut envelope = Base64::decode_vec(&credential.password_hash).unwrap();
        envelope[0] = 0x00;
        assert!(!codec.verify(&Base64::encode_string(&envelope), "p4ssw0rd"));
    }

    #[test]
    fn test_verify_rejects_header_mismatch() {
        let codec = PasswordCodec::default();
        let credential = codec.hash("p4ssw0rd");
        let envelope = Base64::decode_vec(&credential.password_hash).unwrap();

        // PRF identifier 0 maps to HMAC-SHA1, which the codec does not accept
        let mut tampered = envelope.clone();
        tampered[1..5].copy_from_slice(&0u32.to_be_bytes());
        assert!(!codec.verify(&Base64::encode_string(&tampered), "p4ssw0rd"));

        // Unknown identifiers fall back to HMAC-SHA256 and still verify
        let mut fallback = envelope.clone();
        fallback[1..5].copy_from_slice(&7u32.to_be_bytes());
        assert!(codec.verify(&Base64::encode_string(&fallback), "p4ssw0rd"));

        let mut tampered = envelope.clone();
        tampered[5..9].copy_from_slice(&20_000u32.to_be_bytes());
        assert!(!codec.verify(&Base64::encode_string(&tampered), "p4ssw0rd"));

        let mut tampered = envelope;
        tampered[9..13].copy_from_slice(&32u32.to_be_bytes());
        assert!(!codec.verify(&Base64::encode_string(&tampered), "p4ssw0rd"));
    }

    #[test]
    fn test_verify_rejects_tampered_subkey() {
        let codec = PasswordCodec::default();
        let credential = codec.hash("p4ssw0rd");
        let envelope = Base64::decode_vec(&credential.password_hash).unwrap();

        for index in HEADER_LENGTH + SALT_LENGTH..envelope.len() {
            let mut tampered = envelope.clone();
            tampered[index] ^= 0x01;
            assert!(
                !codec.verify(&Base64::encode_string(&tampered), "p4ssw0rd"),
                "flipping byte {index} should fail verification"
            );
        }
    }

    #[test]
    fn test_verify_rejects_subkey_length_mismatch() {
        let codec = PasswordCodec::default();
        let credential = codec.hash("p4ssw0rd");
        let envelope = Base64::decode_vec(&credential.password_hash).unwrap();

        let truncated = &envelope[..envelope.len() - 1];
        assert!(!codec.verify(&Base64::encode_string(truncated), "p4ssw0rd"));

        let mut extended = envelope;
        extended.push(0x00);
        assert!(!codec.verify(&Base64::encode_string(&extended), "p4ssw0rd"));
    }

    #[test]
    #[should_panic(expected = "password must not be empty")]
    fn test_hash_empty_password_panics() {
        PasswordCodec::default().hash("");
    }

    #[test]
    fn test_prf_identifier_mapping() {
        assert_eq!(Prf::from_id(0), Prf::HmacSha1);
        assert_eq!(Prf::from_id(1), Prf::HmacSha256);
        assert_eq!(Prf::from_id(2), Prf::HmacSha512);
        assert_eq!(Prf::from_id(42), Prf::HmacSha256);

        assert_eq!(Prf::HmacSha1.id(), 0);
        assert_eq!(Prf::HmacSha256.id(), 1);
        assert_eq!(Prf::HmacSha512.id(), 2);
    }

    #[test]
    fn test_alternate_prf_round_trip() {
        let codec = PasswordCodec {
            prf: Prf::HmacSha512,
            ..PasswordCodec::default()
        };
        let credential = codec.hash("p4ssw0rd");

        assert!(codec.verify(&credential.password_hash, "p4ssw0rd"));

        // The default codec refuses an envelope derived with another PRF
        let default_codec = PasswordCodec::default();
        assert!(!default_codec.verify(&credential.password_hash, "p4ssw0rd"));
    }
}
