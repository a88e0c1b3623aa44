//! RFC 4226 HMAC-based one-time passwords.
//!
//! The counter is caller-supplied state; [`crate::totp`] derives it from wall
//! clock time instead. Tokens are fixed-length decimal strings produced by the
//! RFC's dynamic truncation of the HMAC digest.

use crate::{base32, crypto, crypto::HashAlgorithm};

/// HOTP engine configuration.
#[derive(Clone, Debug)]
pub struct HotpConfig {
  /// Hash algorithm for the inner HMAC (default: SHA-1).
  pub algorithm: HashAlgorithm,
  /// Number of digits in a token, 6-8 in practice (default: 6).
  pub digits:    u32,
}

impl Default for HotpConfig {
  fn default() -> Self {
    Self { algorithm: crate::defaults::authenticator::HASH, digits: crate::defaults::authenticator::DIGITS }
  }
}

impl HotpConfig {
  /// Generates the token for a given counter value.
  ///
  /// The secret is tolerant-decoded from Base32 (non-alphabet characters are
  /// skipped), so a malformed secret yields a short or empty key and a
  /// deterministic but useless token rather than an error.
  pub fn generate(&self, secret: &str, counter: u64) -> String {
    let key = base32::decode(secret);
    let digest = crypto::hmac_digest(&self.algorithm, &key, &counter.to_be_bytes());

    // Dynamic truncation as per RFC 4226, Section 5.3.
    let offset = (digest[digest.len() - 1] & 0xf) as usize;
    let code = (u32::from(digest[offset] & 0x7f) << 24)
      | (u32::from(digest[offset + 1]) << 16)
      | (u32::from(digest[offset + 2]) << 8)
      | u32::from(digest[offset + 3]);

    let code = code % 10_u32.pow(self.digits);
    format!("{code:0width$}", width = self.digits as usize)
  }

  /// Verifies a token against counters `[counter, counter + window]`.
  ///
  /// The look-ahead is forward-only: an HOTP client whose counter drifted can
  /// only be ahead of the server, never behind. Returns true on the first
  /// exact string match; a non-numeric or wrong-length token never matches.
  pub fn verify(&self, token: &str, secret: &str, counter: u64, window: u32) -> bool {
    (counter..=counter.saturating_add(u64::from(window)))
      .any(|c| self.generate(secret, c) == token)
  }
}
