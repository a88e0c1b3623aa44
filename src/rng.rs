//! CSPRNG capability module.
//!
//! All randomness in the crate (secrets, backup codes) flows through this
//! module. The implementation is selected at build time: the OS entropy source
//! by default, or a seeded ChaCha20 stream under the `deterministic-rng`
//! feature for reproducible differential tests.

#[cfg(feature = "deterministic-rng")]
mod rng_impl {
  use std::cell::RefCell;

  use rand::{CryptoRng, Rng, RngCore, SeedableRng};
  use rand_chacha::ChaCha20Rng;

  const DEFAULT_SEED: [u8; 32] = [10u8; 32];
  thread_local! {
    static RNG: RefCell<ChaCha20Rng> = RefCell::new(ChaCha20Rng::from_seed(DEFAULT_SEED));
  }

  pub struct GlobalRng;

  impl RngCore for GlobalRng {
    fn next_u32(&mut self) -> u32 { RNG.with(|rng| rng.borrow_mut().next_u32()) }

    fn next_u64(&mut self) -> u64 { RNG.with(|rng| rng.borrow_mut().next_u64()) }

    fn fill_bytes(&mut self, dest: &mut [u8]) { RNG.with(|rng| rng.borrow_mut().fill_bytes(dest)) }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
      RNG.with(|rng| rng.borrow_mut().try_fill_bytes(dest))
    }
  }
  impl CryptoRng for GlobalRng {}

  pub fn fill_bytes(dst: &mut [u8]) { GlobalRng.fill_bytes(dst); }
  pub fn try_fill_bytes(dst: &mut [u8]) -> Result<(), rand::Error> {
    GlobalRng.try_fill_bytes(dst)
  }
  pub fn gen_range_u64(lo: u64, hi: u64) -> u64 { GlobalRng.gen_range(lo..=hi) }
}

#[cfg(not(feature = "deterministic-rng"))]
mod rng_impl {
  use rand::{CryptoRng, Rng, RngCore, rngs::OsRng};

  pub struct GlobalRng;

  impl RngCore for GlobalRng {
    fn next_u32(&mut self) -> u32 { OsRng.next_u32() }

    fn next_u64(&mut self) -> u64 { OsRng.next_u64() }

    fn fill_bytes(&mut self, dest: &mut [u8]) { OsRng.fill_bytes(dest) }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
      OsRng.try_fill_bytes(dest)
    }
  }
  impl CryptoRng for GlobalRng {}

  pub fn fill_bytes(dst: &mut [u8]) { OsRng.fill_bytes(dst); }
  pub fn try_fill_bytes(dst: &mut [u8]) -> Result<(), rand::Error> { OsRng.try_fill_bytes(dst) }
  pub fn gen_range_u64(lo: u64, hi: u64) -> u64 { OsRng.gen_range(lo..=hi) }
}

pub use rng_impl::*;
