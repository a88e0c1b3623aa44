//! Secret-at-rest obfuscation.
//!
//! Stored secrets are XOR-streamed against a repeating passphrase and framed
//! as Base64 before hitting the document store. This is obfuscation, not
//! encryption: the default key ships in the source. Deployments that want
//! real confidentiality supply a per-deployment key via [`SecretCipher::new`]
//! (and should still treat at-rest encryption of a TOTP secret as
//! defense-in-depth, not a substitute for store ACLs).
//!
//! Decryption is loud by default: malformed ciphertext raises
//! [`MfaError::MalformedCiphertext`]. Stores migrated from a version that
//! kept plaintext secrets can opt into fail-open behavior with
//! [`SecretCipher::with_legacy_plaintext`], which returns the input unchanged
//! when it does not decode.

use base64::{Engine, prelude::BASE64_STANDARD};

use crate::{
  defaults,
  error::{MfaError, MfaResult},
};

/// Symmetric XOR/Base64 cipher for secrets at rest.
#[derive(Clone, Debug)]
pub struct SecretCipher {
  key:              Vec<u8>,
  legacy_plaintext: bool,
}

impl Default for SecretCipher {
  fn default() -> Self {
    Self { key: defaults::vault::OBFUSCATION_KEY.to_vec(), legacy_plaintext: false }
  }
}

fn xor_stream(data: &[u8], key: &[u8]) -> Vec<u8> {
  data.iter().enumerate().map(|(i, b)| b ^ key[i % key.len()]).collect()
}

impl SecretCipher {
  /// Creates a cipher with a per-deployment key.
  pub fn new(key: impl Into<Vec<u8>>) -> Self {
    let key = key.into();
    debug_assert!(!key.is_empty(), "cipher key must not be empty");
    Self { key, legacy_plaintext: false }
  }

  /// Enables fail-open decryption for stores holding legacy plaintext
  /// secrets: input that does not decode is returned unchanged instead of
  /// raising.
  pub fn with_legacy_plaintext(mut self, legacy: bool) -> Self {
    self.legacy_plaintext = legacy;
    self
  }

  /// Encrypts a secret for storage. Infallible.
  pub fn encrypt(&self, plain: &str) -> String {
    BASE64_STANDARD.encode(xor_stream(plain.as_bytes(), &self.key))
  }

  /// Decrypts a stored payload.
  pub fn decrypt(&self, payload: &str) -> MfaResult<String> {
    let decoded = match BASE64_STANDARD.decode(payload) {
      Ok(bytes) => bytes,
      Err(_) if self.legacy_plaintext => return Ok(payload.to_string()),
      Err(_) => return Err(MfaError::MalformedCiphertext),
    };

    match String::from_utf8(xor_stream(&decoded, &self.key)) {
      Ok(plain) => Ok(plain),
      Err(_) if self.legacy_plaintext => Ok(payload.to_string()),
      Err(_) => Err(MfaError::MalformedCiphertext),
    }
  }

  /// Heuristic for whether a stored value went through [`Self::encrypt`]:
  /// Base64-alphabet-only and longer than 20 characters. Drives plaintext
  /// migration for records written before at-rest encryption existed.
  pub fn looks_encrypted(value: &str) -> bool {
    value.len() > defaults::vault::MIN_CIPHERTEXT_LEN
      && value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encrypt_decrypt_round_trip() {
    let cipher = SecretCipher::default();
    for plain in ["JBSWY3DPEHPK3PXP", "a", "secret with spaces", "ünïcode-secret"] {
      let encrypted = cipher.encrypt(plain);
      assert_ne!(encrypted, plain);
      assert_eq!(cipher.decrypt(&encrypted).unwrap(), plain);
    }
  }

  #[test]
  fn per_deployment_key_round_trip() {
    let cipher = SecretCipher::new(b"deployment-key-1".to_vec());
    let encrypted = cipher.encrypt("JBSWY3DPEHPK3PXP");
    assert_eq!(cipher.decrypt(&encrypted).unwrap(), "JBSWY3DPEHPK3PXP");

    // A different key decodes to different (or invalid) plaintext.
    let other = SecretCipher::new(b"deployment-key-2".to_vec());
    assert_ne!(other.decrypt(&encrypted).ok(), Some("JBSWY3DPEHPK3PXP".to_string()));
  }

  #[test]
  fn ciphertext_looks_encrypted() {
    let cipher = SecretCipher::default();
    let encrypted = cipher.encrypt("JBSWY3DPEHPK3PXP2222");
    assert!(SecretCipher::looks_encrypted(&encrypted));
  }

  #[test]
  fn plaintext_does_not_look_encrypted() {
    assert!(!SecretCipher::looks_encrypted("short"));
    assert!(!SecretCipher::looks_encrypted("has spaces so not base64 alphabet"));
  }

  #[test]
  fn malformed_input_is_loud_by_default() {
    let cipher = SecretCipher::default();
    assert!(matches!(cipher.decrypt("!!not base64!!"), Err(MfaError::MalformedCiphertext)));
  }

  #[test]
  fn legacy_mode_fails_open() {
    let cipher = SecretCipher::default().with_legacy_plaintext(true);
    assert_eq!(cipher.decrypt("!!not base64!!").unwrap(), "!!not base64!!");
  }
}
