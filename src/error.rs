use thiserror::Error;

use crate::store::StoreError;

pub type MfaResult<T> = Result<T, MfaError>;

#[derive(Error, Debug)]
pub enum MfaError {
  #[error("secret cannot be empty!")]
  EmptySecret,

  #[error("account name cannot be empty!")]
  EmptyAccountName,

  #[error("failed to generate secret: {0}")]
  RandomSource(String),

  #[error("stored secret is not valid ciphertext!")]
  MalformedCiphertext,

  #[error("too many failed attempts! retry in {retry_after_secs}s")]
  RateLimited { retry_after_secs: u64 },

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  DecodeError(#[from] base64::DecodeError),

  #[cfg(feature = "qr")]
  #[error("failed to render QR code: {0}")]
  QrRender(String),

  #[error(transparent)]
  FmtError(#[from] std::fmt::Error),
}
