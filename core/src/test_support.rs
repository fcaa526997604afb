//! Mock implementations of platform traits for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::launchpad::Snap;
use crate::platform::{
    BuildQueue, Cache, Clock, Environment, HttpClient, HttpResponse, ProjectRegistry,
};

/// Config pointing at test hosts
pub fn test_config() -> Config {
    Config {
        launchpad_api_url: "http://lp.test/devel".to_string(),
        launchpad_snap_owner: "build-owner".to_string(),
        launchpad_credentials: None,
        github_api_url: "http://github.test".to_string(),
        github_token: None,
    }
}

pub fn test_snap(store_name: Option<&str>, auto_build: bool) -> Snap {
    Snap {
        store_name: store_name.map(str::to_string),
        auto_build,
        self_link: "http://lp.test/devel/~build-owner/+snap/test".to_string(),
    }
}

/// Mock cache backed by an in-memory HashMap
pub struct MockCache {
    store: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockCache {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Raw stored value, for assertions
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.store.lock().unwrap().get(key).cloned()
    }
}

#[async_trait(?Send)]
impl Cache for MockCache {
    async fn put_bytes(&self, key: &str, value: &[u8], _ttl_secs: u64) -> Result<()> {
        self.store.lock().unwrap().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Mock HTTP client with pre-configured responses, matched by URL substring
pub struct MockHttp {
    responses: Vec<(String, u16, String)>,
    requests: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MockHttp {
    pub fn new(responses: Vec<(&str, u16, &str)>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(pattern, status, body)| (pattern.to_string(), status, body.to_string()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far, in order
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Body of the most recent request, as text
    pub fn last_body(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|(_, body)| String::from_utf8_lossy(body).to_string())
    }

    fn respond(&self, method: &str, url: &str, body: &[u8]) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), body.to_vec()));

        for (pattern, status, response_body) in &self.responses {
            if url.contains(pattern.as_str()) {
                return Ok(HttpResponse {
                    status: *status,
                    body: response_body.as_bytes().to_vec(),
                });
            }
        }
        Err(ApiError::upstream_error(format!("no mock response for {} {}", method, url)))
    }
}

#[async_trait(?Send)]
impl HttpClient for MockHttp {
    async fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.respond("GET", url, &[])
    }

    async fn post(&self, url: &str, _headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse> {
        self.respond("POST", url, body)
    }
}

/// Mock clock with a fixed timestamp
pub struct MockClock(pub u64);

impl Clock for MockClock {
    fn now_secs(&self) -> u64 {
        self.0
    }
}

/// Mock environment backed by in-memory maps
pub struct MockEnv {
    vars: HashMap<String, String>,
    secrets: HashMap<String, String>,
}

impl MockEnv {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
            secrets: HashMap::new(),
        }
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_secret(mut self, name: &str, value: &str) -> Self {
        self.secrets.insert(name.to_string(), value.to_string());
        self
    }
}

impl Environment for MockEnv {
    fn get_var(&self, name: &str) -> Result<String> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::internal(format!("variable '{}' not found", name)))
    }

    fn get_secret(&self, name: &str) -> Result<String> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::internal(format!("secret '{}' not found", name)))
    }
}

/// Cache, registry, and build queue that record every call in order
///
/// Without a configured snap, `find_project` fails.
pub struct MockCollaborators {
    pub cache: MockCache,
    snap: Option<Snap>,
    fail_cache: bool,
    fail_refresh: bool,
    fail_builds: bool,
    calls: Mutex<Vec<String>>,
}

impl MockCollaborators {
    pub fn new() -> Self {
        Self {
            cache: MockCache::new(),
            snap: None,
            fail_cache: false,
            fail_refresh: false,
            fail_builds: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_snap(mut self, snap: Snap) -> Self {
        self.snap = Some(snap);
        self
    }

    pub fn failing_cache(mut self) -> Self {
        self.fail_cache = true;
        self
    }

    pub fn failing_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    pub fn failing_builds(mut self) -> Self {
        self.fail_builds = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait(?Send)]
impl Cache for MockCollaborators {
    async fn put_bytes(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<()> {
        self.record(format!("cache.put_bytes {}", key));
        self.cache.put_bytes(key, value, ttl_secs).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.record(format!("cache.delete {}", key));
        if self.fail_cache {
            return Err(ApiError::upstream_error("cache unavailable"));
        }
        self.cache.delete(key).await
    }
}

#[async_trait(?Send)]
impl ProjectRegistry for MockCollaborators {
    async fn find_project(&self, repository_url: &str) -> Result<Snap> {
        self.record(format!("registry.find_project {}", repository_url));
        self.snap
            .clone()
            .ok_or_else(|| ApiError::upstream_error(format!("no snap found for {}", repository_url)))
    }

    async fn refresh_build_manifest(&self, owner: &str, name: &str) -> Result<()> {
        self.record(format!("registry.refresh_build_manifest {}/{}", owner, name));
        if self.fail_refresh {
            return Err(ApiError::upstream_error("snapcraft.yaml not found"));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl BuildQueue for MockCollaborators {
    async fn request_builds(&self, snap: &Snap, owner: &str) -> Result<()> {
        self.record(format!(
            "builds.request_builds {} {}",
            snap.store_name.as_deref().unwrap_or("-"),
            owner
        ));
        if self.fail_builds {
            return Err(ApiError::upstream_error("failed to request builds: 503"));
        }
        Ok(())
    }
}
