//! Two-factor authentication core for the Cropify admin dashboard.
//!
//! Implements RFC 4226 (HOTP) and RFC 6238 (TOTP) one-time passwords with a
//! Google-Authenticator-compatible provisioning profile, secret-at-rest
//! obfuscation, single-use backup codes, and the full enrollment /
//! verification / disable lifecycle over a pluggable document-store port.

pub mod authenticator;
pub mod backup;
pub mod base32;
pub mod crypto;
pub(crate) mod defaults;
pub mod error;
pub mod hotp;
pub mod lockout;
pub mod manager;
pub mod otpauth;
pub mod qr;
pub mod record;
pub mod rng;
pub mod store;
pub mod totp;
pub mod vault;

pub use crate::{
  authenticator::Authenticator,
  crypto::HashAlgorithm,
  error::{MfaError, MfaResult},
  hotp::HotpConfig,
  lockout::{LockoutPolicy, LockoutTable},
  manager::{MfaManager, Provisioning, RetryPolicy},
  record::{MfaRecord, MfaState},
  store::{MemoryStore, MfaStore, StoreError},
  totp::TotpConfig,
  vault::SecretCipher,
};
