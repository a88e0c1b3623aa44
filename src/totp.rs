//! RFC 6238 time-based one-time passwords.
//!
//! TOTP is HOTP with a moving counter derived from Unix time:
//! `counter = floor(unix_millis / 1000 / step)`. Every operation has an `_at`
//! variant taking an explicit timestamp so tests and callers with their own
//! clock never race the wall clock.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::{crypto::HashAlgorithm, hotp::HotpConfig};

/// TOTP engine configuration.
#[derive(Clone, Debug)]
pub struct TotpConfig {
  /// Hash algorithm for the inner HMAC (default: SHA-1).
  pub algorithm: HashAlgorithm,
  /// Number of digits in a token, 6-8 in practice (default: 6).
  pub digits:    u32,
  /// Step size in seconds (the TOTP "period", default: 30).
  pub step:      u64,
  /// Verification window in steps, symmetric around "now" (default: 0).
  pub window:    u32,
}

impl Default for TotpConfig {
  fn default() -> Self {
    Self {
      algorithm: crate::defaults::authenticator::HASH,
      digits:    crate::defaults::authenticator::DIGITS,
      step:      crate::defaults::authenticator::STEP,
      window:    0,
    }
  }
}

/// Current Unix time in milliseconds.
pub(crate) fn now_ms() -> u64 {
  SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

impl TotpConfig {
  fn hotp(&self) -> HotpConfig {
    HotpConfig { algorithm: self.algorithm.clone(), digits: self.digits }
  }

  fn step_ms(&self) -> u64 { self.step * 1000 }

  /// Generates the token for an explicit timestamp (Unix milliseconds).
  pub fn generate_at(&self, secret: &str, time_ms: u64) -> String {
    let counter = time_ms / 1000 / self.step;
    self.hotp().generate(secret, counter)
  }

  /// Generates the token for the current time.
  pub fn generate(&self, secret: &str) -> String { self.generate_at(secret, now_ms()) }

  /// Verifies a token at an explicit timestamp.
  ///
  /// Offsets `[-window, +window]` are tried symmetrically, unlike the
  /// forward-only HOTP window: wall clocks drift in both directions while an
  /// HOTP counter only runs ahead. Timestamps that would underflow the epoch
  /// are skipped.
  pub fn verify_at(&self, token: &str, secret: &str, time_ms: u64) -> bool {
    let window = i64::from(self.window);
    for i in -window..=window {
      let offset = i * self.step_ms() as i64;
      let Some(test_time) = time_ms.checked_add_signed(offset) else {
        continue;
      };
      if self.generate_at(secret, test_time) == token {
        return true;
      }
    }
    false
  }

  /// Verifies a token against the current time.
  pub fn verify(&self, token: &str, secret: &str) -> bool {
    self.verify_at(token, secret, now_ms())
  }

  /// Seconds until the current token rotates, at an explicit timestamp.
  pub fn time_remaining_at(&self, time_ms: u64) -> u64 {
    (self.step_ms() - time_ms % self.step_ms()).div_ceil(1000)
  }

  /// Seconds until the current token rotates.
  pub fn time_remaining(&self) -> u64 { self.time_remaining_at(now_ms()) }

  /// Seconds the current token has been live, at an explicit timestamp.
  pub fn time_used_at(&self, time_ms: u64) -> u64 { (time_ms % self.step_ms()) / 1000 }

  /// Seconds the current token has been live.
  pub fn time_used(&self) -> u64 { self.time_used_at(now_ms()) }
}
