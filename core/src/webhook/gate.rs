//! Webhook request authentication and event routing
//!
//! Checks run cheapest first: signature header presence, body shape, secret
//! derivation, signature comparison. Only then is the event acted on.

use tracing::{debug, error, info};

use crate::dispatch;
use crate::error::{ApiError, Result};
use crate::platform::{BuildQueue, Cache, Environment, ProjectRegistry};

use super::secret::SecretDeriver;
use super::signature::{compute_signature, signatures_match};

/// Event sent by GitHub to check that the endpoint is reachable
pub const PING_EVENT: &str = "ping";

/// Platform-neutral webhook request
///
/// Header values are extracted by the platform adapter, which is responsible
/// for case-insensitive header lookup. `body` is the exact bytes received.
pub struct WebhookRequest {
    pub owner: String,
    pub name: String,
    /// `X-Hub-Signature` header
    pub signature: Option<String>,
    /// `X-GitHub-Event` header
    pub event: Option<String>,
    pub body: Vec<u8>,
}

/// Handle a webhook delivery for `request.owner/request.name`
///
/// `Ok` maps to 200; errors carry their own status code. Ping events are
/// acknowledged once authenticated; anything else is dispatched as a build.
pub async fn handle(
    request: &WebhookRequest,
    env: &dyn Environment,
    cache: &dyn Cache,
    registry: &dyn ProjectRegistry,
    builds: &dyn BuildQueue,
) -> Result<()> {
    authenticate(request, env)?;

    if request.event.as_deref() == Some(PING_EVENT) {
        debug!(owner = %request.owner, name = %request.name, "acknowledged ping");
        return Ok(());
    }

    dispatch::dispatch(&request.owner, &request.name, cache, registry, builds).await
}

/// HTTP status for the outcome of [`handle`]
pub fn status_code(result: &Result<()>) -> u16 {
    match result {
        Ok(()) => 200,
        Err(e) => e.status_code(),
    }
}

fn authenticate(request: &WebhookRequest, env: &dyn Environment) -> Result<()> {
    let Some(signature) = request.signature.as_deref().filter(|s| !s.is_empty()) else {
        info!("Rejecting unsigned webhook");
        return Err(ApiError::malformed_request("missing X-Hub-Signature header"));
    };

    check_body_shape(&request.body)?;
    debug!(body = %String::from_utf8_lossy(&request.body), "Received webhook");

    let secret = SecretDeriver::new(env)
        .derive(&request.owner, &request.name)
        .inspect_err(|e| error!("{}", e))?;

    let computed = compute_signature(&secret, &request.body)?;
    if !signatures_match(&computed, signature) {
        info!(
            "Webhook signature mismatch: received {} != computed {}",
            signature, computed
        );
        return Err(ApiError::authentication("webhook signature mismatch"));
    }

    Ok(())
}

/// The body must look like a JSON object; it is not parsed here
fn check_body_shape(body: &[u8]) -> Result<()> {
    let text = std::str::from_utf8(body).map_err(|_| {
        info!("Rejecting webhook with non-UTF-8 body");
        ApiError::malformed_request("body is not valid UTF-8")
    })?;

    // A leading byte order mark counts as whitespace.
    match text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}').chars().next() {
        Some('{') => Ok(()),
        Some(c) => {
            info!("Unexpected token {}", c);
            Err(ApiError::malformed_request(format!("unexpected token {}", c)))
        }
        None => {
            info!("Rejecting webhook with empty body");
            Err(ApiError::malformed_request("empty body"))
        }
    }
}
