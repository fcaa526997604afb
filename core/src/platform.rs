//! Platform abstraction traits
//!
//! These traits define the boundary between the platform-agnostic webhook
//! logic and its collaborators: the cache, the configuration source, outbound
//! HTTP, and the snap registry / build queue.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, Result};
use crate::launchpad::Snap;

/// Key-value cache with TTL support (uses raw bytes to be dyn-compatible)
///
/// Write-only from this crate: entries are populated on refresh and
/// invalidated on push.
#[async_trait(?Send)]
pub trait Cache {
    async fn put_bytes(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<()>;
    /// Remove an entry; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}

/// HTTP client for outbound requests (Launchpad API, GitHub contents API)
#[async_trait(?Send)]
pub trait HttpClient {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;
    async fn post(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse>;
}

/// HTTP response from an outbound request
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Parse body as UTF-8 string
    pub fn text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Clock for current time (enables testing with deterministic timestamps)
pub trait Clock {
    fn now_secs(&self) -> u64;
}

/// Environment/secrets access
pub trait Environment {
    fn get_var(&self, name: &str) -> Result<String>;
    fn get_secret(&self, name: &str) -> Result<String>;
}

/// Registry of snaps built from GitHub repositories
#[async_trait(?Send)]
pub trait ProjectRegistry {
    /// Find the snap built from `repository_url`; fails if none matches
    async fn find_project(&self, repository_url: &str) -> Result<Snap>;

    /// Re-read the repository's snapcraft.yaml, repopulating the name cache
    async fn refresh_build_manifest(&self, owner: &str, name: &str) -> Result<()>;
}

/// Queue that accepts build requests for a snap
#[async_trait(?Send)]
pub trait BuildQueue {
    async fn request_builds(&self, snap: &Snap, owner: &str) -> Result<()>;
}

/// Typed cache put: serialize to bytes
pub async fn cache_put<T: Serialize>(
    cache: &dyn Cache,
    key: &str,
    value: &T,
    ttl_secs: u64,
) -> Result<()> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| ApiError::internal(format!("cache serialization error: {}", e)))?;
    cache.put_bytes(key, &bytes, ttl_secs).await
}
