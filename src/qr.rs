//! QR provisioning for `otpauth://` URIs.
//!
//! Two paths: a remote image-service URL the dashboard can drop into an
//! `<img>` tag, and (behind the `qr` feature) a local PNG render for callers
//! that must not leak the provisioning URI to a third party.

#[cfg(feature = "qr")]
use std::io::Cursor;

#[cfg(feature = "qr")]
use image::{ImageFormat, Luma};
#[cfg(feature = "qr")]
use qrcode::QrCode;

#[cfg(feature = "qr")]
use crate::error::{MfaError, MfaResult};

const IMAGE_SERVICE: &str = "https://api.qrserver.com/v1/create-qr-code/";
const IMAGE_SIZE: &str = "200x200";

/// Builds a remote QR image URL for the given data.
pub fn image_url(data: &str) -> String {
  format!("{IMAGE_SERVICE}?size={IMAGE_SIZE}&data={}", urlencoding::encode(data))
}

/// Renders the given data as a PNG QR code.
#[cfg(feature = "qr")]
pub fn render_png(data: &str) -> MfaResult<Vec<u8>> {
  let code = QrCode::new(data.as_bytes()).map_err(|e| MfaError::QrRender(e.to_string()))?;
  let img = code.render::<Luma<u8>>().min_dimensions(200, 200).build();

  let mut cursor = Cursor::new(Vec::<u8>::new());
  image::DynamicImage::ImageLuma8(img)
    .write_to(&mut cursor, ImageFormat::Png)
    .map_err(|e| MfaError::QrRender(e.to_string()))?;
  Ok(cursor.into_inner())
}
