//! Launchpad snap registry and build queue client
//!
//! Looks up snaps by their GitHub repository URL and requests automatic
//! builds for them through the Launchpad web service API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::github::manifest;
use crate::platform::{BuildQueue, Cache, Clock, HttpClient, ProjectRegistry};

const OAUTH_REALM: &str = "https://api.launchpad.net/";

/// Snap record as returned by the Launchpad API
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snap {
    /// Registered store name; absent until the name is registered
    pub store_name: Option<String>,
    /// Whether pushes build automatically
    #[serde(default)]
    pub auto_build: bool,
    /// API URL of this snap
    pub self_link: String,
}

#[derive(Deserialize)]
struct SnapCollection {
    entries: Vec<Snap>,
}

/// Registry backed by Launchpad for snaps and GitHub for snapcraft.yaml
pub struct LaunchpadRegistry<'a> {
    config: &'a Config,
    http: &'a dyn HttpClient,
    cache: &'a dyn Cache,
    clock: &'a dyn Clock,
}

impl<'a> LaunchpadRegistry<'a> {
    pub fn new(
        config: &'a Config,
        http: &'a dyn HttpClient,
        cache: &'a dyn Cache,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            config,
            http,
            cache,
            clock,
        }
    }

    fn authorization_header(&self) -> Option<String> {
        let creds = self.config.launchpad_credentials.as_ref()?;
        let timestamp = self.clock.now_secs();
        let nonce = format!("{:016x}", rand::random::<u64>());
        // PLAINTEXT signature with an empty consumer secret
        let signature = format!("&{}", oauth_encode(&creds.access_token_secret));
        Some(format!(
            "OAuth realm=\"{}\", oauth_consumer_key=\"{}\", oauth_token=\"{}\", \
             oauth_signature_method=\"PLAINTEXT\", oauth_signature=\"{}\", \
             oauth_timestamp=\"{}\", oauth_nonce=\"{}\", oauth_version=\"1.0\"",
            OAUTH_REALM,
            oauth_encode(&creds.consumer_key),
            oauth_encode(&creds.access_token),
            oauth_encode(&signature),
            timestamp,
            nonce
        ))
    }
}

/// RFC 3986 percent-encoding as OAuth 1.0 requires: only ALPHA, DIGIT and
/// `-._~` pass through
fn oauth_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

#[async_trait(?Send)]
impl ProjectRegistry for LaunchpadRegistry<'_> {
    async fn find_project(&self, repository_url: &str) -> Result<Snap> {
        let owner_link = format!(
            "{}/~{}",
            self.config.launchpad_api_url, self.config.launchpad_snap_owner
        );
        let url = url::Url::parse_with_params(
            &format!("{}/+snaps", self.config.launchpad_api_url),
            &[
                ("ws.op", "findByURL"),
                ("url", repository_url),
                ("owner", owner_link.as_str()),
            ],
        )
        .map_err(|e| ApiError::configuration(format!("invalid Launchpad API URL: {}", e)))?;

        let auth_header = self.authorization_header();
        let mut headers = vec![("Accept", "application/json"), ("User-Agent", "snaphook")];
        if let Some(value) = auth_header.as_deref() {
            headers.push(("Authorization", value));
        }

        let response = self
            .http
            .get(url.as_str(), &headers)
            .await
            .map_err(|e| ApiError::upstream_error(format!("failed to call Launchpad API: {}", e)))?;

        if response.status != 200 {
            return Err(ApiError::upstream_error(format!(
                "Launchpad API error: {}",
                response.status
            )));
        }

        let collection: SnapCollection = response
            .json()
            .map_err(|e| ApiError::upstream_error(format!("invalid Launchpad response: {}", e)))?;

        collection
            .entries
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::upstream_error(format!("no snap found for {}", repository_url)))
    }

    async fn refresh_build_manifest(&self, owner: &str, name: &str) -> Result<()> {
        let data =
            manifest::refresh_snapcraft_yaml(owner, name, self.config, self.http, self.cache).await?;
        debug!(owner, name, snap_name = ?data.name, "refreshed snapcraft.yaml");
        Ok(())
    }
}

#[async_trait(?Send)]
impl BuildQueue for LaunchpadRegistry<'_> {
    async fn request_builds(&self, snap: &Snap, owner: &str) -> Result<()> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("ws.op", "requestAutoBuilds")
            .finish();

        let auth_header = self.authorization_header();
        let mut headers = vec![
            ("Accept", "application/json"),
            ("Content-Type", "application/x-www-form-urlencoded"),
            ("User-Agent", "snaphook"),
        ];
        if let Some(value) = auth_header.as_deref() {
            headers.push(("Authorization", value));
        }

        let response = self
            .http
            .post(&snap.self_link, &headers, body.as_bytes())
            .await
            .map_err(|e| ApiError::upstream_error(format!("failed to call Launchpad API: {}", e)))?;

        match response.status {
            200 | 201 => {
                debug!(snap = %snap.self_link, requested_by = owner, "build request accepted");
                Ok(())
            }
            status => Err(ApiError::upstream_error(format!(
                "failed to request builds: {}",
                status
            ))),
        }
    }
}
