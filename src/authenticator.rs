//! Google-Authenticator-compatible TOTP profile.
//!
//! Fixes the configuration every mainstream authenticator app understands:
//! SHA-1, 6 digits, 30-second step, and a verification window of one step in
//! either direction (±30s total clock-skew tolerance).

use crate::{
  base32, defaults,
  error::{MfaError, MfaResult},
  otpauth::{self, TotpUriOptions},
  rng,
  totp::TotpConfig,
};

/// The authenticator profile: secret generation, URI provisioning, and TOTP
/// generate/verify against "now".
#[derive(Clone, Debug)]
pub struct Authenticator {
  config: TotpConfig,
}

impl Default for Authenticator {
  fn default() -> Self {
    Self {
      config: TotpConfig {
        algorithm: defaults::authenticator::HASH,
        digits:    defaults::authenticator::DIGITS,
        step:      defaults::authenticator::STEP,
        window:    defaults::authenticator::WINDOW,
      },
    }
  }
}

impl Authenticator {
  /// The underlying TOTP configuration.
  pub fn config(&self) -> &TotpConfig { &self.config }

  /// Generates a fresh Base32 secret from 20 bytes of CSPRNG output.
  ///
  /// This is the fail-loud write path: if the random source is unavailable
  /// the error is raised, never papered over with weak entropy.
  pub fn generate_secret(&self) -> MfaResult<String> {
    self.generate_secret_bytes(defaults::authenticator::SECRET_BYTES)
  }

  /// Generates a Base32 secret from `len` random bytes.
  pub fn generate_secret_bytes(&self, len: usize) -> MfaResult<String> {
    let mut bytes = vec![0u8; len];
    rng::try_fill_bytes(&mut bytes).map_err(|e| MfaError::RandomSource(e.to_string()))?;
    Ok(base32::encode(&bytes))
  }

  /// Builds the `otpauth://` provisioning URI for this profile.
  pub fn provisioning_uri(&self, account: &str, service: &str, secret: &str) -> MfaResult<String> {
    otpauth::totp_uri(&TotpUriOptions {
      secret:    secret.to_string(),
      account:   account.to_string(),
      service:   service.to_string(),
      algorithm: self.config.algorithm.clone(),
      digits:    self.config.digits,
      period:    self.config.step,
    })
  }

  /// Generates the current token for a secret.
  pub fn generate(&self, secret: &str) -> String { self.config.generate(secret) }

  /// Generates the token at an explicit timestamp.
  pub fn generate_at(&self, secret: &str, time_ms: u64) -> String {
    self.config.generate_at(secret, time_ms)
  }

  /// Verifies a token against the current time, window ±1 step.
  pub fn verify(&self, token: &str, secret: &str) -> bool { self.config.verify(token, secret) }

  /// Verifies a token at an explicit timestamp, window ±1 step.
  pub fn verify_at(&self, token: &str, secret: &str, time_ms: u64) -> bool {
    self.config.verify_at(token, secret, time_ms)
  }

  /// Seconds until the current token rotates.
  pub fn time_remaining(&self) -> u64 { self.config.time_remaining() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn profile_matches_google_authenticator() {
    let auth = Authenticator::default();
    assert_eq!(auth.config().digits, 6);
    assert_eq!(auth.config().step, 30);
    assert_eq!(auth.config().window, 1);
  }

  #[test]
  fn generated_secret_is_base32_of_20_bytes() {
    let auth = Authenticator::default();
    let secret = auth.generate_secret().unwrap();
    // 20 bytes -> 160 bits -> 32 Base32 symbols, no padding.
    assert_eq!(secret.len(), 32);
    assert_eq!(base32::decode(&secret).len(), 20);
  }

  #[test]
  fn secrets_are_unique() {
    let auth = Authenticator::default();
    let a = auth.generate_secret().unwrap();
    let b = auth.generate_secret().unwrap();
    assert_ne!(a, b);
  }

  #[test]
  fn generate_then_verify_round_trip() {
    let auth = Authenticator::default();
    let secret = auth.generate_secret().unwrap();
    let t = 1_700_000_000_000;
    let token = auth.generate_at(&secret, t);
    assert!(auth.verify_at(&token, &secret, t));
    assert!(auth.verify_at(&token, &secret, t + 29_000));
    assert!(!auth.verify_at(&token, &secret, t + 91_000));
  }

  #[test]
  fn provisioning_uri_uses_profile_parameters() {
    let auth = Authenticator::default();
    let uri = auth.provisioning_uri("bob@example.com", "Cropify", "JBSWY3DPEHPK3PXP").unwrap();
    assert!(uri.starts_with("otpauth://totp/Cropify:bob%40example.com?secret=JBSWY3DPEHPK3PXP"));
    assert!(uri.contains("&algorithm=SHA1&digits=6&period=30&issuer=Cropify"));
  }
}
