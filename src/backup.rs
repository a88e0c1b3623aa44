//! Single-use backup codes.
//!
//! Backup codes substitute for a TOTP token when the authenticator device is
//! unavailable: 8-digit decimal strings, drawn uniformly from the CSPRNG,
//! consumed exactly once.

use crate::{defaults, rng};

/// Generates `count` backup codes, each uniform in `[10_000_000, 99_999_999]`.
pub fn generate_codes(count: usize) -> Vec<String> {
  (0..count)
    .map(|_| rng::gen_range_u64(defaults::backup::CODE_MIN, defaults::backup::CODE_MAX).to_string())
    .collect()
}

/// Checks that a code is exactly 8 ASCII decimal digits.
pub fn is_valid_format(code: &str) -> bool {
  code.len() == defaults::backup::CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

/// Consumes a code from the list: removes the first exact match and returns
/// true; returns false (list untouched) when the code is not present.
pub fn consume(codes: &mut Vec<String>, code: &str) -> bool {
  match codes.iter().position(|c| c == code) {
    Some(index) => {
      codes.remove(index);
      true
    },
    None => false,
  }
}
