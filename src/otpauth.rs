//! `otpauth://` provisioning URI construction.
//!
//! The format is bit-exact for Google Authenticator and other RFC 6238
//! clients: label is `service:account` (both URL-encoded), the algorithm is
//! upper-cased, and the issuer is duplicated as a query parameter.

use std::fmt::Write;

use crate::{
  crypto::HashAlgorithm,
  error::{MfaError, MfaResult},
};

/// Options for building a TOTP provisioning URI.
#[derive(Debug, Clone)]
pub struct TotpUriOptions {
  /// Base32 shared secret.
  pub secret:    String,
  /// Account the credential belongs to (usually an email).
  pub account:   String,
  /// Issuing service; used as the label prefix and the `issuer` parameter.
  pub service:   String,
  /// Hash algorithm (upper-cased in the URI).
  pub algorithm: HashAlgorithm,
  /// Token digits.
  pub digits:    u32,
  /// Step size in seconds (the `period` parameter).
  pub period:    u64,
}

/// Builds an `otpauth://totp/...` URI from the given options.
pub fn totp_uri(options: &TotpUriOptions) -> MfaResult<String> {
  if options.secret.is_empty() {
    return Err(MfaError::EmptySecret);
  }

  let service = urlencoding::encode(&options.service);
  let account = urlencoding::encode(&options.account);
  let algorithm = options.algorithm.to_string().to_ascii_uppercase();

  let mut url = format!("otpauth://totp/{service}:{account}?secret={}", options.secret);
  write!(&mut url, "&algorithm={algorithm}&digits={}", options.digits)?;
  write!(&mut url, "&period={}", options.period)?;
  write!(&mut url, "&issuer={service}")?;

  Ok(url)
}
