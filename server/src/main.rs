//! snaphook: GitHub webhook receiver that triggers Launchpad snap builds
//!
//! Lightweight HTTP server using hyper. Uses a single-threaded tokio runtime
//! (compatible with core's !Send async traits); each connection runs as its own
//! local task.

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use snaphook_core::config::Config;
use snaphook_core::launchpad::LaunchpadRegistry;
use snaphook_core::webhook::{self, WebhookRequest};

mod platform;

use platform::{MokaCache, ProcessEnv, ReqwestHttpClient, SystemClock};

/// Back-off after a failed accept (e.g. file descriptor exhaustion)
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Shared application state
struct AppState {
    config: Config,
    cache: MokaCache,
    http: ReqwestHttpClient,
    clock: SystemClock,
    env: ProcessEnv,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .expect("PORT must be a number");

    let env = ProcessEnv;
    let config = match Config::from_env(&env) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState {
        config,
        cache: MokaCache::new(),
        http: ReqwestHttpClient::new(),
        clock: SystemClock,
        env,
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("failed to bind");

    info!("snaphook listening on port {}", port);

    let local = tokio::task::LocalSet::new();
    local
        .run_until(async move {
            loop {
                let Some((stream, _)) = accepted(listener.accept().await).await else {
                    continue;
                };
                let state = state.clone();

                tokio::task::spawn_local(async move {
                    let io = hyper_util::rt::TokioIo::new(stream);
                    let service = service_fn(move |req| {
                        let state = state.clone();
                        async move { handle_request(req, &state).await }
                    });

                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        warn!("connection error: {}", e);
                    }
                });
            }
        })
        .await;
}

/// Pass through an accepted connection, or log and back off on failure
async fn accepted<T>(result: std::io::Result<T>) -> Option<T> {
    match result {
        Ok(conn) => Some(conn),
        Err(e) => {
            warn!("accept failed: {}", e);
            tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
            None
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

type HyperResponse = Response<Full<Bytes>>;

async fn handle_request(
    req: Request<Incoming>,
    state: &AppState,
) -> Result<HyperResponse, std::convert::Infallible> {
    let result = route_request(req, state).await;
    Ok(result)
}

async fn route_request(req: Request<Incoming>, state: &AppState) -> HyperResponse {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::GET, "/") => handle_health(),
        (Method::POST, _) => match parse_notify_path(&path) {
            Some((owner, name)) => handle_notify(req, owner, name, state).await,
            None => empty_response(StatusCode::NOT_FOUND),
        },
        _ => empty_response(StatusCode::NOT_FOUND),
    }
}

fn handle_health() -> HyperResponse {
    let json = serde_json::to_vec(&serde_json::json!({ "name": "snaphook" })).unwrap_or_default();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

/// Match `/{owner}/{name}/webhook/notify`
fn parse_notify_path(path: &str) -> Option<(&str, &str)> {
    let mut segments = path.strip_prefix('/')?.split('/');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(owner), Some(name), Some("webhook"), Some("notify"), None)
            if !owner.is_empty() && !name.is_empty() =>
        {
            Some((owner, name))
        }
        _ => None,
    }
}

async fn handle_notify(
    req: Request<Incoming>,
    owner: &str,
    name: &str,
    state: &AppState,
) -> HyperResponse {
    let signature = header_value(req.headers(), "X-Hub-Signature");
    let event = header_value(req.headers(), "X-GitHub-Event");

    let body = match req.collect().await {
        Ok(b) => b.to_bytes().to_vec(),
        Err(e) => {
            info!("failed to read webhook body: {}", e);
            return empty_response(StatusCode::BAD_REQUEST);
        }
    };

    let request = WebhookRequest {
        owner: owner.to_string(),
        name: name.to_string(),
        signature,
        event,
        body,
    };

    let registry = LaunchpadRegistry::new(&state.config, &state.http, &state.cache, &state.clock);
    let result = webhook::handle(&request, &state.env, &state.cache, &registry, &registry).await;

    let status = StatusCode::from_u16(webhook::gate::status_code(&result))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    empty_response(status)
}

/// Header lookup is case-insensitive; non-ASCII values are treated as absent
fn header_value(headers: &hyper::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn empty_response(status: StatusCode) -> HyperResponse {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))
        .unwrap()
}
