//! HTTP server for the Verbandbuch.
//!
//! Wraps the JSON API in the server-level concerns: status and health
//! endpoints, a JSON 404 fallback, CORS for the browser frontend, a request
//! body limit and request tracing.

pub mod seed;

use std::{path::Path, sync::Arc, time::Instant};

use axum::{
  Json, Router,
  extract::{DefaultBodyLimit, State},
  http::{HeaderValue, Method, StatusCode, Uri, header::InvalidHeaderValue},
  response::IntoResponse,
  routing::get,
};
use chrono::{SecondsFormat, Utc};
use config::ConfigError;
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use verbandbuch_api::api_router;
use verbandbuch_core::{service::AccidentService, store::AccidentStore};
use verbandbuch_store_sqlite::StoreConfig;

/// Largest accepted request body.
pub const BODY_LIMIT: usize = 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `VERBANDBUCH_*` environment.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  /// Origin allowed to call the API from a browser.
  #[serde(default = "default_frontend_url")]
  pub frontend_url: String,
  #[serde(default)]
  pub store:        StoreConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         default_host(),
      port:         default_port(),
      frontend_url: default_frontend_url(),
      store:        StoreConfig::default(),
    }
  }
}

/// Environment prefix for configuration overrides.
pub const ENV_PREFIX: &str = "VERBANDBUCH";

impl ServerConfig {
  /// Read the TOML file at `path` (optional) overlaid by the process
  /// environment: `VERBANDBUCH_PORT`, `VERBANDBUCH_STORE__PATH`, ...
  pub fn load(path: &Path) -> Result<Self, ConfigError> { Self::load_with_env(path, None) }

  /// Like [`ServerConfig::load`], but reads variables from `vars` instead of
  /// the process environment when given.
  pub fn load_with_env(
    path: &Path,
    vars: Option<config::Map<String, String>>,
  ) -> Result<Self, ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true)
          .source(vars),
      )
      .build()?
      .try_deserialize()
  }
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3001 }

fn default_frontend_url() -> String { "http://localhost:3000".to_string() }

// ─── Router ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct Status {
  started: Instant,
}

/// Build the complete application router.
///
/// Fails only if `config.frontend_url` is not a valid header value.
pub fn app<S>(
  service: AccidentService<S>,
  config: &ServerConfig,
) -> Result<Router, InvalidHeaderValue>
where
  S: AccidentStore + 'static,
{
  let cors = CorsLayer::new()
    .allow_origin(HeaderValue::from_str(&config.frontend_url)?)
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers([axum::http::header::CONTENT_TYPE])
    .allow_credentials(true);

  let status = Arc::new(Status { started: Instant::now() });

  Ok(
    Router::new()
      .route("/", get(root))
      .route("/health", get(health))
      .with_state(status)
      .nest("/api", api_router(service))
      .fallback(not_found)
      .layer(DefaultBodyLimit::max(BODY_LIMIT))
      .layer(cors)
      .layer(TraceLayer::new_for_http()),
  )
}

// ─── Handlers ────────────────────────────────────────────────────────────────

fn now() -> String { Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true) }

/// `GET /`
async fn root() -> impl IntoResponse {
  Json(json!({
    "success":   true,
    "message":   "Verbandbuch-API läuft erfolgreich",
    "timestamp": now(),
    "version":   env!("CARGO_PKG_VERSION"),
  }))
}

/// `GET /health`
async fn health(State(status): State<Arc<Status>>) -> impl IntoResponse {
  Json(json!({
    "status":         "healthy",
    "uptime_seconds": status.started.elapsed().as_secs_f64(),
    "timestamp":      now(),
  }))
}

async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
  (
    StatusCode::NOT_FOUND,
    Json(json!({
      "success":            false,
      "error":              "Route nicht gefunden",
      "path":               uri.path(),
      "method":             method.as_str(),
      "availableEndpoints": ["/", "/health", "/api/accidents"],
    })),
  )
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, header},
  };
  use serde_json::Value;
  use tower::ServiceExt as _;
  use verbandbuch_store_sqlite::SqliteStore;

  use super::*;

  async fn make_app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    app(AccidentService::new(Arc::new(store)), &ServerConfig::default()).unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
  }

  #[tokio::test]
  async fn root_reports_status() {
    let resp = make_app().await.oneshot(get_req("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
  }

  #[tokio::test]
  async fn health_reports_uptime() {
    let resp = make_app().await.oneshot(get_req("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_f64().unwrap() >= 0.0);
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let resp = make_app().await.oneshot(get_req("/api/accidents")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(body["data"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unknown_route_is_json_404() {
    let req = Request::builder()
      .method("DELETE")
      .uri("/nowhere")
      .body(Body::empty())
      .unwrap();
    let resp = make_app().await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Route nicht gefunden");
    assert_eq!(body["path"], "/nowhere");
    assert_eq!(body["method"], "DELETE");
  }

  #[tokio::test]
  async fn cors_allows_the_frontend_origin() {
    let req = Request::builder()
      .method("OPTIONS")
      .uri("/api/accidents")
      .header(header::ORIGIN, "http://localhost:3000")
      .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
      .body(Body::empty())
      .unwrap();
    let resp = make_app().await.oneshot(req).await.unwrap();
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
      "http://localhost:3000"
    );
  }

  #[tokio::test]
  async fn oversized_body_is_rejected() {
    let req = Request::builder()
      .method("POST")
      .uri("/api/accidents")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(format!(r#"{{"hergang":"{}"}}"#, "x".repeat(BODY_LIMIT))))
      .unwrap();
    let resp = make_app().await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
  }

  fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
  }

  #[test]
  fn config_defaults_apply_without_file_or_env() {
    let cfg = ServerConfig::load_with_env(Path::new("/nonexistent/config.toml"), Some(vars(&[])))
      .unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 3001);
    assert_eq!(cfg.store.path, Path::new("verbandbuch.db"));
  }

  #[test]
  fn env_overrides_file_with_single_underscore_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
      &path,
      "port = 4000\nfrontend_url = \"http://example.test\"\n[store]\npath = \"file.db\"\n",
    )
    .unwrap();

    let cfg = ServerConfig::load_with_env(
      &path,
      Some(vars(&[
        ("VERBANDBUCH_PORT", "8080"),
        ("VERBANDBUCH_STORE__PATH", "/tmp/env.db"),
        ("VERBANDBUCH_STORE__MAX_CONNECTIONS", "2"),
      ])),
    )
    .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.frontend_url, "http://example.test");
    assert_eq!(cfg.store.path, Path::new("/tmp/env.db"));
    assert_eq!(cfg.store.max_connections, 2);
  }

  #[test]
  fn unrelated_variables_are_ignored() {
    let cfg = ServerConfig::load_with_env(
      Path::new("/nonexistent/config.toml"),
      Some(vars(&[("VERBANDBUCHX_PORT", "9"), ("PORT", "9")])),
    )
    .unwrap();
    assert_eq!(cfg.port, 3001);
  }

  #[test]
  fn invalid_frontend_url_is_an_error() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = rt.block_on(SqliteStore::open_in_memory()).unwrap();
    let config = ServerConfig { frontend_url: "bad\nurl".into(), ..ServerConfig::default() };
    assert!(app(AccidentService::new(Arc::new(store)), &config).is_err());
  }
}
