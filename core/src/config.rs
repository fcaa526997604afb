//! Configuration and secrets management

use crate::error::{ApiError, Result};
use crate::platform::Environment;

/// Secret holding the root key from which per-repository webhook secrets are
/// derived. Read per request, never at startup.
pub const WEBHOOK_SECRET_KEY: &str = "GITHUB_WEBHOOK_SECRET";

const DEFAULT_LAUNCHPAD_API_URL: &str = "https://api.launchpad.net/devel";
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Cache TTL for snapcraft.yaml lookups (1 hour)
pub const SNAPCRAFT_CACHE_TTL_SECS: u64 = 3600;

/// Launchpad OAuth credentials (PLAINTEXT signature method)
#[derive(Clone)]
pub struct LaunchpadCredentials {
    pub consumer_key: String,
    pub access_token: String,
    pub access_token_secret: String,
}

/// Application configuration loaded from environment
#[derive(Clone)]
pub struct Config {
    /// Launchpad API root (e.g., "https://api.launchpad.net/devel")
    pub launchpad_api_url: String,
    /// Launchpad person or team owning the snaps
    pub launchpad_snap_owner: String,
    /// Credentials for authenticated Launchpad calls, if configured
    pub launchpad_credentials: Option<LaunchpadCredentials>,
    /// GitHub API root
    pub github_api_url: String,
    /// Token for GitHub contents API calls, if configured
    pub github_token: Option<String>,
}

impl Config {
    /// Load configuration from platform environment
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        let launchpad_credentials = match (
            env.get_secret("LAUNCHPAD_CONSUMER_KEY"),
            env.get_secret("LAUNCHPAD_ACCESS_TOKEN"),
            env.get_secret("LAUNCHPAD_ACCESS_TOKEN_SECRET"),
        ) {
            (Ok(consumer_key), Ok(access_token), Ok(access_token_secret)) => {
                Some(LaunchpadCredentials {
                    consumer_key,
                    access_token,
                    access_token_secret,
                })
            }
            _ => None,
        };

        Ok(Self {
            launchpad_api_url: env
                .get_var("LAUNCHPAD_API_URL")
                .unwrap_or_else(|_| DEFAULT_LAUNCHPAD_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            launchpad_snap_owner: env
                .get_var("LAUNCHPAD_SNAP_OWNER")
                .map_err(|_| ApiError::configuration("LAUNCHPAD_SNAP_OWNER not configured"))?,
            launchpad_credentials,
            github_api_url: env
                .get_var("GITHUB_API_URL")
                .unwrap_or_else(|_| DEFAULT_GITHUB_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            github_token: env.get_secret("GITHUB_TOKEN").ok(),
        })
    }
}
