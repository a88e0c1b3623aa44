//! Default values for OTP and lifecycle configuration.
//!
//! This module provides a single source of truth for all defaults used across
//! the crate. This eliminates duplication and ensures consistency.

use crate::crypto::HashAlgorithm;

/// Defaults for the Google-Authenticator-compatible profile.
pub(crate) mod authenticator {
  use super::*;

  /// Default hash algorithm (Google Authenticator only supports SHA-1).
  pub(crate) const HASH: HashAlgorithm = HashAlgorithm::Sha1;

  /// Default number of digits in a token (6-8 are valid).
  pub(crate) const DIGITS: u32 = 6;

  /// Default step size in seconds (the TOTP "period").
  pub(crate) const STEP: u64 = 30;

  /// Default verification window in steps (previous, current, next).
  pub(crate) const WINDOW: u32 = 1;

  /// Default secret length in bytes (160 bits).
  pub(crate) const SECRET_BYTES: usize = 20;
}

/// Defaults for backup-code generation.
pub(crate) mod backup {
  /// Default number of codes issued per enrollment.
  pub(crate) const COUNT: usize = 10;

  /// Smallest 8-digit code.
  pub(crate) const CODE_MIN: u64 = 10_000_000;

  /// Largest 8-digit code.
  pub(crate) const CODE_MAX: u64 = 99_999_999;

  /// Code length in decimal digits.
  pub(crate) const CODE_LEN: usize = 8;
}

/// Defaults for the secret-at-rest cipher.
pub(crate) mod vault {
  /// Fixed obfuscation passphrase used when no per-deployment key is
  /// configured. Provides no confidentiality against source access; see
  /// DESIGN.md.
  pub(crate) const OBFUSCATION_KEY: &[u8] = b"cropify-hydroponics-2fa-at-rest";

  /// Minimum ciphertext length for the `looks_encrypted` heuristic.
  pub(crate) const MIN_CIPHERTEXT_LEN: usize = 20;
}

/// Defaults for the verification lockout policy.
pub(crate) mod lockout {
  /// Consecutive failures before an identity is locked out.
  pub(crate) const MAX_FAILURES: u32 = 5;

  /// First lockout duration in seconds; doubles per additional failure.
  pub(crate) const BASE_SECS: u64 = 30;

  /// Lockout duration cap in seconds (15 minutes).
  pub(crate) const MAX_SECS: u64 = 900;
}

/// Defaults for persistence retry.
pub(crate) mod retry {
  /// Total attempts per store call (1 initial + 2 retries).
  pub(crate) const MAX_ATTEMPTS: u32 = 3;

  /// Base backoff delay in milliseconds; doubles per retry.
  pub(crate) const BASE_DELAY_MS: u64 = 50;
}
