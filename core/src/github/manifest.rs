//! snapcraft.yaml retrieval
//!
//! Fetches a repository's snapcraft.yaml through the GitHub contents API and
//! caches the snap name it declares.

use serde::{Deserialize, Serialize};

use crate::config::{Config, SNAPCRAFT_CACHE_TTL_SECS};
use crate::error::{ApiError, Result};
use crate::platform::{cache_put, Cache, HttpClient};

use super::url::{repository_url, snapcraft_cache_key};

/// Locations snapcraft looks at, in order of precedence
const SNAPCRAFT_YAML_PATHS: [&str; 3] = ["snap/snapcraft.yaml", "snapcraft.yaml", ".snapcraft.yaml"];

/// Cached result of a snapcraft.yaml lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapcraftData {
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct SnapcraftYaml {
    name: Option<String>,
}

/// Fetch and parse snapcraft.yaml, storing the declared name in the cache
pub async fn refresh_snapcraft_yaml(
    owner: &str,
    name: &str,
    config: &Config,
    http: &dyn HttpClient,
    cache: &dyn Cache,
) -> Result<SnapcraftData> {
    let content = fetch_snapcraft_yaml(owner, name, config, http).await?;

    let parsed: SnapcraftYaml = serde_yaml::from_str(&content)
        .map_err(|e| ApiError::upstream_error(format!("invalid snapcraft.yaml: {}", e)))?;
    let data = SnapcraftData { name: parsed.name };

    let cache_key = snapcraft_cache_key(&repository_url(owner, name));
    cache_put(cache, &cache_key, &data, SNAPCRAFT_CACHE_TTL_SECS).await?;

    Ok(data)
}

async fn fetch_snapcraft_yaml(
    owner: &str,
    name: &str,
    config: &Config,
    http: &dyn HttpClient,
) -> Result<String> {
    let auth_header = config.github_token.as_ref().map(|t| format!("Bearer {}", t));
    let mut headers = vec![
        ("Accept", "application/vnd.github.raw+json"),
        ("User-Agent", "snaphook"),
        ("X-GitHub-Api-Version", "2022-11-28"),
    ];
    if let Some(value) = auth_header.as_deref() {
        headers.push(("Authorization", value));
    }

    for path in SNAPCRAFT_YAML_PATHS {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            config.github_api_url, owner, name, path
        );

        let response = http
            .get(&url, &headers)
            .await
            .map_err(|e| ApiError::upstream_error(format!("failed to call GitHub API: {}", e)))?;

        match response.status {
            200 => {
                return response
                    .text()
                    .map_err(|e| ApiError::upstream_error(format!("failed to read response: {}", e)))
            }
            404 => continue,
            status => {
                return Err(ApiError::upstream_error(format!(
                    "GitHub API error: {}",
                    status
                )))
            }
        }
    }

    Err(ApiError::upstream_error(format!(
        "snapcraft.yaml not found in {}/{}",
        owner, name
    )))
}
