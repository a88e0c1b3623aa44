//! Per-identity verification throttle.
//!
//! A 6-digit token has a million-element search space; unthrottled
//! verification makes brute force practical. Five consecutive failures lock
//! the identity out for 30 seconds, doubling per additional failure and
//! capped at 15 minutes. A successful verification clears the slate.

use std::{
  collections::HashMap,
  sync::Mutex,
  time::{Duration, Instant},
};

use crate::{
  defaults,
  error::{MfaError, MfaResult},
};

/// Lockout policy knobs.
#[derive(Clone, Debug)]
pub struct LockoutPolicy {
  /// Consecutive failures before lockout begins.
  pub max_failures: u32,
  /// First lockout duration; doubles per additional failure.
  pub base_lockout: Duration,
  /// Lockout duration cap.
  pub max_lockout:  Duration,
}

impl Default for LockoutPolicy {
  fn default() -> Self {
    Self {
      max_failures: defaults::lockout::MAX_FAILURES,
      base_lockout: Duration::from_secs(defaults::lockout::BASE_SECS),
      max_lockout:  Duration::from_secs(defaults::lockout::MAX_SECS),
    }
  }
}

impl LockoutPolicy {
  fn lockout_for(&self, failures: u32) -> Duration {
    let exponent = failures.saturating_sub(self.max_failures).min(31);
    self.base_lockout.saturating_mul(1u32 << exponent).min(self.max_lockout)
  }
}

#[derive(Debug, Default)]
struct Entry {
  failures:     u32,
  locked_until: Option<Instant>,
}

/// Tracks failed verification attempts per identity.
#[derive(Debug, Default)]
pub struct LockoutTable {
  policy:  LockoutPolicy,
  entries: Mutex<HashMap<String, Entry>>,
}

impl LockoutTable {
  pub fn new(policy: LockoutPolicy) -> Self { Self { policy, entries: Mutex::new(HashMap::new()) } }

  /// Errors with [`MfaError::RateLimited`] while the identity is locked out.
  pub fn check(&self, identity: &str) -> MfaResult<()> {
    let entries = self.entries.lock().unwrap();
    if let Some(entry) = entries.get(identity)
      && let Some(until) = entry.locked_until
    {
      let now = Instant::now();
      if until > now {
        let retry_after_secs = (until - now).as_secs().max(1);
        return Err(MfaError::RateLimited { retry_after_secs });
      }
    }
    Ok(())
  }

  /// Records a failed attempt, extending the lockout once the threshold is
  /// crossed.
  pub fn record_failure(&self, identity: &str) {
    let mut entries = self.entries.lock().unwrap();
    let entry = entries.entry(identity.to_string()).or_default();
    entry.failures += 1;
    if entry.failures >= self.policy.max_failures {
      let lockout = self.policy.lockout_for(entry.failures);
      entry.locked_until = Some(Instant::now() + lockout);
      log::warn!("identity {identity} locked out for {}s after {} failures", lockout.as_secs(), entry.failures);
    }
  }

  /// Clears the failure count after a successful verification.
  pub fn record_success(&self, identity: &str) {
    self.entries.lock().unwrap().remove(identity);
  }
}
