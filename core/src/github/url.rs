//! Repository URL and cache key helpers

const GITHUB_BASE_URL: &str = "https://github.com";
const SNAPCRAFT_CACHE_PREFIX: &str = "snapcraft-data:";

/// Canonical GitHub URL for a repository, as registered with Launchpad
pub fn repository_url(owner: &str, name: &str) -> String {
    format!("{}/{}/{}", GITHUB_BASE_URL, owner, name)
}

/// Cache key under which a repository's snapcraft.yaml lookup is stored
pub fn snapcraft_cache_key(repository_url: &str) -> String {
    format!("{}{}", SNAPCRAFT_CACHE_PREFIX, repository_url)
}
