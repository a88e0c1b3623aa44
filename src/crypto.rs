//! Cryptographic primitives for OTP generation.
//!
//! HMAC is delegated to the audited `hmac`/`sha1`/`sha2` crates; this module
//! only selects the digest by algorithm. SHA-1 is the default (required for
//! Google Authenticator compatibility), SHA-256/512 are optional extensions.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

/// Hash algorithm used for the HMAC inside HOTP/TOTP.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum HashAlgorithm {
  #[serde(rename = "sha1")]
  Sha1,
  #[serde(rename = "sha256")]
  Sha256,
  #[serde(rename = "sha512")]
  Sha512,
}

impl std::fmt::Display for HashAlgorithm {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", match self {
      HashAlgorithm::Sha1 => "sha1",
      HashAlgorithm::Sha256 => "sha256",
      HashAlgorithm::Sha512 => "sha512",
    })
  }
}

/// Computes an HMAC digest over `message` with the given key.
///
/// Keys of any length are accepted, including empty keys produced by
/// tolerant-decoding a malformed Base32 secret; HMAC is defined for those and
/// the result is deterministic.
pub fn hmac_digest(hash: &HashAlgorithm, key: &[u8], message: &[u8]) -> Vec<u8> {
  match hash {
    HashAlgorithm::Sha1 => {
      let mut mac = <Hmac<Sha1> as Mac>::new_from_slice(key).unwrap();
      mac.update(message);
      mac.finalize().into_bytes().to_vec()
    },
    HashAlgorithm::Sha256 => {
      let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key).unwrap();
      mac.update(message);
      mac.finalize().into_bytes().to_vec()
    },
    HashAlgorithm::Sha512 => {
      let mut mac = <Hmac<Sha512> as Mac>::new_from_slice(key).unwrap();
      mac.update(message);
      mac.finalize().into_bytes().to_vec()
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hmac_sha1_known_answer() {
    // RFC 2202 test case 2.
    let digest = hmac_digest(&HashAlgorithm::Sha1, b"Jefe", b"what do ya want for nothing?");
    assert_eq!(hex::encode(digest), "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");
  }

  #[test]
  fn digest_lengths() {
    assert_eq!(hmac_digest(&HashAlgorithm::Sha1, b"k", b"m").len(), 20);
    assert_eq!(hmac_digest(&HashAlgorithm::Sha256, b"k", b"m").len(), 32);
    assert_eq!(hmac_digest(&HashAlgorithm::Sha512, b"k", b"m").len(), 64);
  }

  #[test]
  fn empty_key_is_deterministic() {
    let a = hmac_digest(&HashAlgorithm::Sha1, b"", b"msg");
    let b = hmac_digest(&HashAlgorithm::Sha1, b"", b"msg");
    assert_eq!(a, b);
  }

  #[test]
  fn display_is_lowercase() {
    assert_eq!(HashAlgorithm::Sha1.to_string(), "sha1");
    assert_eq!(HashAlgorithm::Sha512.to_string(), "sha512");
  }
}
