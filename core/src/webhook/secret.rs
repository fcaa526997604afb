//! Per-repository webhook secrets
//!
//! Each repository gets its own webhook secret, derived from a single root
//! secret so that nothing per-repository needs to be stored.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::config::WEBHOOK_SECRET_KEY;
use crate::error::{ApiError, Result};
use crate::platform::Environment;

type HmacSha1 = Hmac<Sha1>;

/// Derives webhook secrets from the root secret held by the environment
pub struct SecretDeriver<'a> {
    env: &'a dyn Environment,
}

impl<'a> SecretDeriver<'a> {
    pub fn new(env: &'a dyn Environment) -> Self {
        Self { env }
    }

    /// Derive the webhook secret for `owner/name`
    ///
    /// Fails with a configuration error if the root secret is unset or empty.
    /// The error message never contains secret material.
    pub fn derive(&self, owner: &str, name: &str) -> Result<String> {
        let root_secret = self
            .env
            .get_secret(WEBHOOK_SECRET_KEY)
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::configuration("GitHub webhook secret not configured"))?;

        derive_webhook_secret(&root_secret, owner, name)
    }
}

/// HMAC-SHA1 of `owner` then `name` keyed with the root secret, hex-encoded
pub fn derive_webhook_secret(root_secret: &str, owner: &str, name: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(root_secret.as_bytes())
        .map_err(|_| ApiError::internal("failed to create HMAC"))?;
    mac.update(owner.as_bytes());
    mac.update(name.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
