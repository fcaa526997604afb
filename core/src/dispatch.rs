//! Build dispatch for verified push notifications
//!
//! Invalidates the cached snapcraft.yaml lookup for the repository, then asks
//! the registry to build the snap if it is registered.

use tracing::{error, info};

use crate::error::{ApiError, Result};
use crate::github::url::{repository_url, snapcraft_cache_key};
use crate::platform::{BuildQueue, Cache, ProjectRegistry};

/// Invalidate the repository's cache entry and request builds of its snap
///
/// The cache entry is deleted before anything else, whatever the outcome of
/// the build request. Any failure after that point is logged with detail and
/// reported as a single generic dispatch error.
pub async fn dispatch(
    owner: &str,
    name: &str,
    cache: &dyn Cache,
    registry: &dyn ProjectRegistry,
    builds: &dyn BuildQueue,
) -> Result<()> {
    let repository_url = repository_url(owner, name);
    let cache_key = snapcraft_cache_key(&repository_url);

    // Invalidate before any lookup, whatever the outcome.
    if let Err(e) = cache.delete(&cache_key).await {
        error!("Failed to clear cache for {}: {}.", repository_url, e);
        return Err(ApiError::dispatch(format!(
            "failed to request builds of {}",
            repository_url
        )));
    }

    match request_builds(owner, name, &repository_url, registry, builds).await {
        Ok(()) => {
            info!("Requested builds of {}.", repository_url);
            Ok(())
        }
        Err(e) => {
            error!("Failed to request builds of {}: {}.", repository_url, e);
            Err(ApiError::dispatch(format!(
                "failed to request builds of {}",
                repository_url
            )))
        }
    }
}

async fn request_builds(
    owner: &str,
    name: &str,
    repository_url: &str,
    registry: &dyn ProjectRegistry,
    builds: &dyn BuildQueue,
) -> Result<()> {
    let snap = registry.find_project(repository_url).await?;
    if snap.store_name.is_none() {
        return Err(ApiError::not_registered(
            "Cannot build snap until name is registered",
        ));
    }
    if !snap.auto_build {
        registry.refresh_build_manifest(owner, name).await?;
    }
    builds.request_builds(&snap, owner).await
}
