//! MFA session manager.
//!
//! Orchestrates the enrollment, verification, and disable lifecycle over the
//! persistence port. The manager is stateless between calls: `initialize`
//! returns the provisioning bundle instead of caching it, and the lifecycle
//! state is always derived from the stored record. Per-identity async locks
//! guard the enroll/complete/disable writes against concurrent enrollment
//! races, and every store call is retried with exponential backoff on
//! transient failures.

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::{
  authenticator::Authenticator,
  backup, defaults,
  error::{MfaError, MfaResult},
  lockout::{LockoutPolicy, LockoutTable},
  qr,
  record::{MfaRecord, MfaState, state_of},
  store::{MfaStore, StoreError},
  totp,
  vault::SecretCipher,
};

/// Retry policy for store calls.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
  /// Total attempts per call (1 initial + retries).
  pub max_attempts: u32,
  /// First backoff delay; doubles per retry.
  pub base_delay:   Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: defaults::retry::MAX_ATTEMPTS,
      base_delay:   Duration::from_millis(defaults::retry::BASE_DELAY_MS),
    }
  }
}

/// Everything a freshly-enrolling admin needs: the secret for manual entry,
/// the provisioning URI, a QR image URL for it, and the backup codes (shown
/// once, never again).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provisioning {
  pub secret:       String,
  pub totp_uri:     String,
  pub qr_code_url:  String,
  pub backup_codes: Vec<String>,
  pub account_name: String,
  pub service_name: String,
}

/// Orchestrates MFA enrollment, verification, and teardown for admin
/// identities.
pub struct MfaManager {
  store:         Arc<dyn MfaStore>,
  cipher:        SecretCipher,
  authenticator: Authenticator,
  lockout:       LockoutTable,
  retry:         RetryPolicy,
  locks:         Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MfaManager {
  pub fn new(store: Arc<dyn MfaStore>) -> Self {
    Self {
      store,
      cipher: SecretCipher::default(),
      authenticator: Authenticator::default(),
      lockout: LockoutTable::default(),
      retry: RetryPolicy::default(),
      locks: Mutex::new(HashMap::new()),
    }
  }

  /// Replaces the default secret-at-rest cipher (e.g. with a per-deployment
  /// key or legacy plaintext migration enabled).
  pub fn with_cipher(mut self, cipher: SecretCipher) -> Self {
    self.cipher = cipher;
    self
  }

  /// Replaces the default lockout policy.
  pub fn with_lockout(mut self, policy: LockoutPolicy) -> Self {
    self.lockout = LockoutTable::new(policy);
    self
  }

  /// Replaces the default store retry policy.
  pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }

  /// Starts enrollment: a fresh secret, its provisioning URI, a QR image URL,
  /// and ten backup codes. Purely in-memory; nothing is persisted until
  /// [`Self::enable`].
  pub fn initialize(&self, account: &str, service: &str) -> MfaResult<Provisioning> {
    if account.is_empty() {
      return Err(MfaError::EmptyAccountName);
    }

    let secret = self.authenticator.generate_secret()?;
    let totp_uri = self.authenticator.provisioning_uri(account, service, &secret)?;
    let qr_code_url = qr::image_url(&totp_uri);
    let backup_codes = backup::generate_codes(defaults::backup::COUNT);

    Ok(Provisioning {
      secret,
      totp_uri,
      qr_code_url,
      backup_codes,
      account_name: account.to_string(),
      service_name: service.to_string(),
    })
  }

  /// One-shot enrollment: [`Self::initialize`] followed by [`Self::enable`].
  /// Returns the provisioning bundle the caller shows the admin exactly once.
  pub async fn setup(&self, identity: &str, account: &str, service: &str) -> MfaResult<Provisioning> {
    let bundle = self.initialize(account, service)?;
    self.enable(identity, &bundle.secret, bundle.backup_codes.clone(), account, service).await?;
    Ok(bundle)
  }

  /// Persists the enrollment record with `setup_completed: false`. The
  /// identity stays "awaiting first verification" (and
  /// [`Self::is_enabled`] stays false) until [`Self::complete_setup`]
  /// succeeds.
  pub async fn enable(
    &self,
    identity: &str,
    secret: &str,
    backup_codes: Vec<String>,
    account: &str,
    service: &str,
  ) -> MfaResult<()> {
    if secret.is_empty() {
      return Err(MfaError::EmptySecret);
    }

    let lock = self.identity_lock(identity).await;
    let _guard = lock.lock().await;

    let record = MfaRecord {
      enabled:          true,
      secret:           self.cipher.encrypt(secret),
      backup_codes,
      account_name:     account.to_string(),
      service_name:     service.to_string(),
      created_at:       totp::now_ms(),
      last_verified_at: None,
      setup_completed:  false,
    };

    self.with_retry(|| self.store.set(identity, &record, false)).await?;
    log::debug!("MFA enrollment persisted for {identity}");
    Ok(())
  }

  /// Verifies a token for the identity.
  ///
  /// Missing record, disabled record, or a wrong token are all `Ok(false)` —
  /// never an error. A successful verification bumps `lastVerifiedAt`; this
  /// call never flips `setupCompleted`.
  pub async fn verify(&self, identity: &str, token: &str) -> MfaResult<bool> {
    let ok = self.check_token(identity, token).await?;
    if ok {
      self
        .with_retry(|| self.store.update(identity, json!({ "lastVerifiedAt": totp::now_ms() })))
        .await?;
    }
    Ok(ok)
  }

  /// Re-verifies the token and, on success, marks setup as completed. Called
  /// on an already-active identity it acts as a plain re-verification.
  pub async fn complete_setup(&self, identity: &str, token: &str) -> MfaResult<bool> {
    let lock = self.identity_lock(identity).await;
    let _guard = lock.lock().await;

    let ok = self.check_token(identity, token).await?;
    if ok {
      self
        .with_retry(|| {
          self
            .store
            .update(identity, json!({ "setupCompleted": true, "lastVerifiedAt": totp::now_ms() }))
        })
        .await?;
      log::debug!("MFA setup completed for {identity}");
    }
    Ok(ok)
  }

  /// Redeems a single-use backup code: on success the code is removed from
  /// the stored record and `lastVerifiedAt` is bumped.
  pub async fn redeem_backup_code(&self, identity: &str, code: &str) -> MfaResult<bool> {
    if !backup::is_valid_format(code) {
      return Ok(false);
    }
    self.lockout.check(identity)?;

    let lock = self.identity_lock(identity).await;
    let _guard = lock.lock().await;

    let Some(record) = self.fetch(identity).await? else {
      return Ok(false);
    };
    if !record.enabled {
      return Ok(false);
    }

    let mut codes = record.backup_codes;
    if !backup::consume(&mut codes, code) {
      self.lockout.record_failure(identity);
      return Ok(false);
    }
    self.lockout.record_success(identity);

    self
      .with_retry(|| {
        self.store.update(
          identity,
          json!({ "backupCodes": codes.clone(), "lastVerifiedAt": totp::now_ms() }),
        )
      })
      .await?;
    log::debug!("backup code redeemed for {identity}, {} remaining", codes.len());
    Ok(true)
  }

  /// Tears down MFA for the identity by deleting the whole record. The admin
  /// must re-enroll from scratch; there is no soft-disable.
  pub async fn disable(&self, identity: &str) -> MfaResult<()> {
    let lock = self.identity_lock(identity).await;
    let _guard = lock.lock().await;

    self.with_retry(|| self.store.delete(identity)).await?;
    self.lockout.record_success(identity);
    log::debug!("MFA disabled for {identity}");
    Ok(())
  }

  /// True iff a record exists, is enabled, and setup has been completed. An
  /// identity awaiting its first verification reports false.
  pub async fn is_enabled(&self, identity: &str) -> MfaResult<bool> {
    Ok(self.fetch(identity).await?.is_some_and(|r| r.is_active()))
  }

  /// The lifecycle state derived from the stored record.
  pub async fn state(&self, identity: &str) -> MfaResult<MfaState> {
    Ok(state_of(self.fetch(identity).await?.as_ref()))
  }

  /// The raw stored record, if any.
  pub async fn mfa_data(&self, identity: &str) -> MfaResult<Option<MfaRecord>> {
    self.fetch(identity).await.map_err(MfaError::from)
  }

  /// Generates the current token for a secret (provisioning preview).
  pub fn generate_current_token(&self, secret: &str) -> String {
    self.authenticator.generate(secret)
  }

  /// Seconds until the current token rotates.
  pub fn time_remaining(&self) -> u64 { self.authenticator.time_remaining() }

  async fn check_token(&self, identity: &str, token: &str) -> MfaResult<bool> {
    self.lockout.check(identity)?;

    let Some(record) = self.fetch(identity).await? else {
      log::debug!("token check for {identity}: no MFA record");
      return Ok(false);
    };
    if !record.enabled {
      return Ok(false);
    }

    let secret = self.stored_secret(&record.secret)?;
    let ok = self.authenticator.verify(token, &secret);
    if ok {
      self.lockout.record_success(identity);
    } else {
      self.lockout.record_failure(identity);
    }
    Ok(ok)
  }

  fn stored_secret(&self, stored: &str) -> MfaResult<String> {
    if SecretCipher::looks_encrypted(stored) {
      self.cipher.decrypt(stored)
    } else {
      // Legacy record written before at-rest encryption.
      Ok(stored.to_string())
    }
  }

  async fn fetch(&self, identity: &str) -> Result<Option<MfaRecord>, StoreError> {
    self.with_retry(|| self.store.get(identity)).await
  }

  async fn identity_lock(&self, identity: &str) -> Arc<Mutex<()>> {
    let mut locks = self.locks.lock().await;
    locks.entry(identity.to_string()).or_default().clone()
  }

  async fn with_retry<T, F, Fut>(&self, mut op: F) -> Result<T, StoreError>
  where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
  {
    let mut attempt = 0u32;
    let mut delay = self.retry.base_delay;
    loop {
      match op().await {
        Ok(value) => return Ok(value),
        Err(e) if e.is_transient() && attempt + 1 < self.retry.max_attempts => {
          attempt += 1;
          log::warn!("transient store failure (attempt {attempt}): {e}");
          tokio::time::sleep(delay).await;
          delay *= 2;
        },
        Err(e) => return Err(e),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryStore;

  fn manager() -> MfaManager { MfaManager::new(Arc::new(MemoryStore::new())) }

  #[test]
  fn initialize_returns_complete_bundle() {
    let manager = manager();
    let bundle = manager.initialize("alice@example.com", "Cropify Admin").unwrap();

    assert_eq!(bundle.secret.len(), 32);
    assert!(bundle.totp_uri.starts_with("otpauth://totp/Cropify%20Admin:alice%40example.com?"));
    assert!(bundle.qr_code_url.contains("data=otpauth%3A%2F%2Ftotp"));
    assert_eq!(bundle.backup_codes.len(), 10);
  }

  #[test]
  fn initialize_rejects_empty_account() {
    let manager = manager();
    assert!(matches!(
      manager.initialize("", "Cropify Admin"),
      Err(MfaError::EmptyAccountName)
    ));
  }

  #[tokio::test]
  async fn verify_without_record_is_false() {
    let manager = manager();
    assert!(!manager.verify("nobody", "000000").await.unwrap());
  }

  #[tokio::test]
  async fn enable_rejects_empty_secret() {
    let manager = manager();
    let result = manager.enable("admin-1", "", vec![], "a", "s").await;
    assert!(matches!(result, Err(MfaError::EmptySecret)));
  }

  #[tokio::test]
  async fn enabled_record_is_awaiting_first_verification() {
    let manager = manager();
    let bundle = manager.initialize("alice@example.com", "Cropify Admin").unwrap();
    manager
      .enable("admin-1", &bundle.secret, bundle.backup_codes, "alice@example.com", "Cropify Admin")
      .await
      .unwrap();

    assert_eq!(manager.state("admin-1").await.unwrap(), MfaState::AwaitingFirstVerification);
    assert!(!manager.is_enabled("admin-1").await.unwrap());

    let record = manager.mfa_data("admin-1").await.unwrap().unwrap();
    // Secret is stored encrypted, not as the Base32 plaintext.
    assert_ne!(record.secret, bundle.secret);
  }

  #[tokio::test]
  async fn wrong_token_is_false_not_error() {
    let manager = manager();
    let bundle = manager.initialize("alice@example.com", "Cropify Admin").unwrap();
    manager
      .enable("admin-1", &bundle.secret, bundle.backup_codes, "alice@example.com", "Cropify Admin")
      .await
      .unwrap();

    assert!(!manager.verify("admin-1", "not-a-token").await.unwrap());
  }
}
