#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use cropify_mfa::{MemoryStore, MfaManager, MfaRecord, MfaStore, StoreError};
use serde_json::Value;

pub const ACCOUNT: &str = "alice@example.com";
pub const SERVICE: &str = "Cropify Admin";
pub const IDENTITY: &str = "admin-1";

/// Enrolls `IDENTITY` up to the awaiting-first-verification state and returns
/// the plaintext secret and backup codes.
pub async fn enroll(manager: &MfaManager) -> (String, Vec<String>) {
  let bundle = manager.initialize(ACCOUNT, SERVICE).unwrap();
  manager
    .enable(IDENTITY, &bundle.secret, bundle.backup_codes.clone(), ACCOUNT, SERVICE)
    .await
    .unwrap();
  (bundle.secret, bundle.backup_codes)
}

/// A store that fails its first `failures` calls with a fixed error, then
/// delegates to an in-memory store. Exercises the manager's retry path.
pub struct FlakyStore {
  inner:         MemoryStore,
  failures_left: AtomicU32,
  error:         StoreError,
}

impl FlakyStore {
  pub fn new(failures: u32, error: StoreError) -> Self {
    Self { inner: MemoryStore::new(), failures_left: AtomicU32::new(failures), error }
  }

  fn maybe_fail(&self) -> Result<(), StoreError> {
    let failing = self
      .failures_left
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
      .is_ok();
    if failing { Err(self.error.clone()) } else { Ok(()) }
  }
}

#[async_trait]
impl MfaStore for FlakyStore {
  async fn get(&self, identity: &str) -> Result<Option<MfaRecord>, StoreError> {
    self.maybe_fail()?;
    self.inner.get(identity).await
  }

  async fn set(&self, identity: &str, record: &MfaRecord, merge: bool) -> Result<(), StoreError> {
    self.maybe_fail()?;
    self.inner.set(identity, record, merge).await
  }

  async fn update(&self, identity: &str, patch: Value) -> Result<(), StoreError> {
    self.maybe_fail()?;
    self.inner.update(identity, patch).await
  }

  async fn delete(&self, identity: &str) -> Result<(), StoreError> {
    self.maybe_fail()?;
    self.inner.delete(identity).await
  }
}
