//! The persisted MFA record and its derived lifecycle state.

use serde::{Deserialize, Serialize};

/// Per-identity MFA record, exactly one per admin identity.
///
/// Field names serialize camelCase to match the document-store schema.
/// `backupCodes` deserializes from either an array or a legacy
/// comma-delimited string.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MfaRecord {
  /// Whether MFA is switched on for the identity.
  pub enabled:          bool,
  /// The shared secret, encrypted at rest.
  pub secret:           String,
  /// Remaining single-use backup codes.
  #[serde(default, deserialize_with = "backup_codes_wire")]
  pub backup_codes:     Vec<String>,
  /// Account the credential belongs to (usually an email).
  pub account_name:     String,
  /// Issuing service name.
  pub service_name:     String,
  /// Enrollment time, Unix milliseconds.
  pub created_at:       u64,
  /// Last successful verification, Unix milliseconds.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_verified_at: Option<u64>,
  /// Whether the first verification after enrollment has succeeded.
  pub setup_completed:  bool,
}

/// Lifecycle state derived from the stored record.
///
/// There is no hidden in-memory state machine: the record is the single
/// source of truth and the state is recomputed from it on every read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MfaState {
  /// No record exists; the identity has never enrolled (or was disabled).
  Uninitialized,
  /// Enrolled but the first verification has not happened yet.
  AwaitingFirstVerification,
  /// Fully enrolled and verified at least once.
  Active,
}

impl MfaRecord {
  /// The lifecycle state this record represents.
  pub fn state(&self) -> MfaState {
    if self.enabled && self.setup_completed {
      MfaState::Active
    } else {
      MfaState::AwaitingFirstVerification
    }
  }

  /// True iff the identity should be challenged for a token at login.
  pub fn is_active(&self) -> bool { self.state() == MfaState::Active }
}

/// Derives the state for a possibly-missing record.
pub fn state_of(record: Option<&MfaRecord>) -> MfaState {
  record.map_or(MfaState::Uninitialized, MfaRecord::state)
}

fn backup_codes_wire<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where D: serde::Deserializer<'de> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Wire {
    List(Vec<String>),
    Joined(String),
  }

  Ok(match Wire::deserialize(deserializer)? {
    Wire::List(codes) => codes,
    Wire::Joined(s) if s.is_empty() => Vec::new(),
    Wire::Joined(s) => s.split(',').map(|c| c.trim().to_string()).collect(),
  })
}
