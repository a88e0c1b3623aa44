//! RFC 4648 Base32 codec for OTP secrets.
//!
//! Encoding is canonical (alphabet `A-Z2-7`, no padding). Decoding is
//! deliberately tolerant, matching what authenticator apps accept: input is
//! case-insensitive and any character outside the alphabet (spaces, dashes,
//! `=` padding) is skipped rather than rejected. A malformed secret therefore
//! decodes to a short or empty key instead of raising an error.

use data_encoding::BASE32_NOPAD;

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Encodes bytes as unpadded RFC 4648 Base32.
pub fn encode(bytes: &[u8]) -> String { BASE32_NOPAD.encode(bytes) }

/// Decodes Base32 text into bytes, skipping non-alphabet characters.
///
/// Accumulates 5-bit groups MSB-first into a bit buffer and emits a byte for
/// every 8 buffered bits; leftover bits (the encoder's final left-shifted
/// remainder) are dropped. `decode(encode(b)) == b` for all `b`.
pub fn decode(input: &str) -> Vec<u8> {
  let mut out = Vec::with_capacity(input.len() * 5 / 8);
  let mut buffer: u32 = 0;
  let mut bits: u32 = 0;

  for c in input.bytes() {
    let c = c.to_ascii_uppercase();
    let Some(value) = ALPHABET.iter().position(|&a| a == c) else {
      continue;
    };
    buffer = (buffer << 5) | value as u32;
    bits += 5;
    if bits >= 8 {
      bits -= 8;
      out.push((buffer >> bits) as u8);
    }
  }

  out
}
