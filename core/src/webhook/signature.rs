//! Webhook signature computation and verification (`X-Hub-Signature`)

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

use crate::error::{ApiError, Result};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_PREFIX: &str = "sha1=";

/// Compute `sha1=<hex>` over the raw body, keyed with the repository secret
pub fn compute_signature(secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|_| ApiError::internal("failed to create HMAC"))?;
    mac.update(body);
    Ok(format!(
        "{}{}",
        SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Compare a claimed signature against a computed one in constant time
pub fn signatures_match(computed: &str, claimed: &str) -> bool {
    // ct_eq on slices of differing length returns false without comparing.
    computed.as_bytes().ct_eq(claimed.as_bytes()).into()
}

/// Check that `claimed` is the signature of `body` under `secret`
pub fn verify(secret: &str, body: &[u8], claimed: &str) -> Result<bool> {
    let computed = compute_signature(secret, body)?;
    Ok(signatures_match(&computed, claimed))
}
