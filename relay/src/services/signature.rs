// pod-relay/src/services/signature.rs

//! Storefront webhook signatures: base64 HMAC-SHA256 of the raw request body.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, instrument};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the storefront's signature.
pub const SIGNATURE_HEADER: &str = "X-Shopify-Hmac-Sha256";

/// Checks `supplied_signature_base64` against the HMAC-SHA256 of `raw_body` under `secret`.
///
/// Must be called with the body bytes exactly as received, before any JSON decoding.
/// Returns `false` for an empty secret, an empty or non-base64 signature, or a mismatch.
/// The digest comparison is constant-time.
#[instrument(name = "signature::verify", skip_all, fields(body_len = raw_body.len()))]
pub fn verify(raw_body: &[u8], supplied_signature_base64: &str, secret: &[u8]) -> bool {
  if secret.is_empty() {
    debug!("Webhook secret is not configured.");
    return false;
  }
  if supplied_signature_base64.is_empty() {
    debug!("No signature supplied.");
    return false;
  }
  let Ok(supplied) = STANDARD.decode(supplied_signature_base64) else {
    debug!("Supplied signature is not valid base64.");
    return false;
  };
  let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
    return false;
  };
  mac.update(raw_body);
  mac.verify_slice(&supplied).is_ok()
}

/// Base64 HMAC-SHA256 of `raw_body`, in the form the storefront sends it.
pub fn compute_signature(raw_body: &[u8], secret: &[u8]) -> String {
  let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
  mac.update(raw_body);
  STANDARD.encode(mac.finalize().into_bytes())
}
