//! Persistence port for MFA records.
//!
//! The core never talks to a concrete document store; it consumes this trait.
//! Errors carry the taxonomy the caller's store distinguishes (gRPC-style
//! categories), and [`StoreError::is_transient`] drives the manager's retry
//! policy. [`MemoryStore`] is both the shipped implementation and the test
//! double: a `HashMap` of JSON documents with top-level field merge, the same
//! merge semantics a Firestore-style `set(..., merge: true)` provides.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::record::MfaRecord;

/// Persistence failure taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
  #[error("store unavailable: {0}")]
  Unavailable(String),

  #[error("permission denied: {0}")]
  PermissionDenied(String),

  #[error("deadline exceeded: {0}")]
  DeadlineExceeded(String),

  #[error("resource exhausted: {0}")]
  ResourceExhausted(String),

  #[error("store error: {0}")]
  Unknown(String),
}

impl StoreError {
  /// Whether retrying the operation can plausibly succeed.
  pub fn is_transient(&self) -> bool {
    matches!(
      self,
      StoreError::Unavailable(_) | StoreError::DeadlineExceeded(_) | StoreError::ResourceExhausted(_)
    )
  }
}

/// Document-store port holding one MFA record per identity.
#[async_trait]
pub trait MfaStore: Send + Sync {
  /// Fetches the record for an identity, `None` if it has never enrolled.
  async fn get(&self, identity: &str) -> Result<Option<MfaRecord>, StoreError>;

  /// Writes a record. With `merge` set, present fields are merged over the
  /// existing document; otherwise the document is replaced.
  async fn set(&self, identity: &str, record: &MfaRecord, merge: bool) -> Result<(), StoreError>;

  /// Merges a partial JSON patch into an existing document.
  async fn update(&self, identity: &str, patch: Value) -> Result<(), StoreError>;

  /// Deletes the record. Deleting a missing record is not an error.
  async fn delete(&self, identity: &str) -> Result<(), StoreError>;
}

/// In-memory document store.
#[derive(Default)]
pub struct MemoryStore {
  documents: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Number of stored documents.
  pub async fn len(&self) -> usize { self.documents.read().await.len() }

  pub async fn is_empty(&self) -> bool { self.documents.read().await.is_empty() }
}

fn merge_fields(existing: &mut Value, patch: Value) {
  if let (Value::Object(existing), Value::Object(patch)) = (existing, patch) {
    for (key, value) in patch {
      existing.insert(key, value);
    }
  }
}

#[async_trait]
impl MfaStore for MemoryStore {
  async fn get(&self, identity: &str) -> Result<Option<MfaRecord>, StoreError> {
    let documents = self.documents.read().await;
    match documents.get(identity) {
      Some(doc) => serde_json::from_value(doc.clone())
        .map(Some)
        .map_err(|e| StoreError::Unknown(format!("malformed document: {e}"))),
      None => Ok(None),
    }
  }

  async fn set(&self, identity: &str, record: &MfaRecord, merge: bool) -> Result<(), StoreError> {
    let doc = serde_json::to_value(record)
      .map_err(|e| StoreError::Unknown(format!("unserializable record: {e}")))?;
    let mut documents = self.documents.write().await;
    match documents.get_mut(identity) {
      Some(existing) if merge => merge_fields(existing, doc),
      _ => {
        documents.insert(identity.to_string(), doc);
      },
    }
    Ok(())
  }

  async fn update(&self, identity: &str, patch: Value) -> Result<(), StoreError> {
    let mut documents = self.documents.write().await;
    let existing = documents
      .get_mut(identity)
      .ok_or_else(|| StoreError::Unknown(format!("no document for {identity}")))?;
    merge_fields(existing, patch);
    Ok(())
  }

  async fn delete(&self, identity: &str) -> Result<(), StoreError> {
    self.documents.write().await.remove(identity);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn record() -> MfaRecord {
    MfaRecord {
      enabled:          true,
      secret:           "ciphertext".to_string(),
      backup_codes:     vec!["11111111".to_string(), "22222222".to_string()],
      account_name:     "alice@example.com".to_string(),
      service_name:     "Cropify Admin".to_string(),
      created_at:       1_700_000_000_000,
      last_verified_at: None,
      setup_completed:  false,
    }
  }

  #[tokio::test]
  async fn set_get_delete_round_trip() {
    let store = MemoryStore::new();
    store.set("admin-1", &record(), false).await.unwrap();
    assert_eq!(store.get("admin-1").await.unwrap(), Some(record()));

    store.delete("admin-1").await.unwrap();
    assert_eq!(store.get("admin-1").await.unwrap(), None);
    // Deleting again is not an error.
    store.delete("admin-1").await.unwrap();
  }

  #[tokio::test]
  async fn get_missing_is_none() {
    let store = MemoryStore::new();
    assert_eq!(store.get("nobody").await.unwrap(), None);
  }

  #[tokio::test]
  async fn update_merges_top_level_fields() {
    let store = MemoryStore::new();
    store.set("admin-1", &record(), false).await.unwrap();
    store
      .update("admin-1", json!({ "setupCompleted": true, "lastVerifiedAt": 123 }))
      .await
      .unwrap();

    let stored = store.get("admin-1").await.unwrap().unwrap();
    assert!(stored.setup_completed);
    assert_eq!(stored.last_verified_at, Some(123));
    assert_eq!(stored.secret, "ciphertext");
  }

  #[tokio::test]
  async fn update_missing_document_errors() {
    let store = MemoryStore::new();
    let result = store.update("nobody", json!({ "enabled": false })).await;
    assert!(matches!(result, Err(StoreError::Unknown(_))));
  }

  #[test]
  fn transient_classification() {
    assert!(StoreError::Unavailable("net".into()).is_transient());
    assert!(StoreError::DeadlineExceeded("slow".into()).is_transient());
    assert!(StoreError::ResourceExhausted("quota".into()).is_transient());
    assert!(!StoreError::PermissionDenied("rules".into()).is_transient());
    assert!(!StoreError::Unknown("?".into()).is_transient());
  }
}
