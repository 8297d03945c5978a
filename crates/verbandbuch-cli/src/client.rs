//! Async HTTP client wrapping the Verbandbuch JSON API.

use std::{collections::BTreeMap, time::Duration};

use anyhow::Context as _;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use verbandbuch_core::{
  query::Page,
  record::{AccidentCandidate, AccidentRecord, CreatedAccident, DeletedAccident, UpdatedAccident},
  service::Listing,
  validate::Field,
};

pub const MSG_LOAD_FAILED: &str = "Fehler beim Laden der Unfälle";
pub const MSG_SAVE_FAILED: &str = "Fehler beim Speichern";
pub const MSG_DELETE_FAILED: &str = "Fehler beim Löschen";

const TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for the Verbandbuch API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// A failed API call. `Display` is the message meant for the user.
#[derive(Debug, Error)]
pub enum ClientError {
  /// No response: connection refused, timeout, DNS.
  #[error("{message}")]
  Unreachable {
    message: &'static str,
    #[source]
    source:  reqwest::Error,
  },

  /// The server answered with a failure envelope or an unusable body.
  #[error("{message}")]
  Rejected {
    status:  StatusCode,
    message: String,
    /// Per-field messages keyed by wire name; only set for validation
    /// failures.
    fields:  BTreeMap<String, String>,
  },
}

impl ClientError {
  /// Per-field messages with their German labels, in form order.
  pub fn field_messages(&self) -> Vec<(&'static str, &str)> {
    let ClientError::Rejected { fields, .. } = self else {
      return Vec::new();
    };
    Field::ALL
      .iter()
      .filter_map(|f| fields.get(f.as_str()).map(|m| (f.label(), m.as_str())))
      .collect()
  }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// The response envelope as sent by the server.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
  #[serde(default)]
  success:    bool,
  data:       Option<T>,
  #[serde(default)]
  message:    Option<String>,
  #[serde(default)]
  error:      Option<String>,
  #[serde(default)]
  fields:     BTreeMap<String, String>,
  #[serde(default)]
  pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
  current_page:     u32,
  records_per_page: u32,
}

/// A successful reply: the payload plus the server's confirmation text.
#[derive(Debug)]
pub struct Reply<T> {
  pub data:    T,
  pub message: Option<String>,
}

/// Async HTTP client for the Verbandbuch JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(TIMEOUT)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  pub fn base_url(&self) -> &str { &self.config.base_url }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  // ── Accidents ─────────────────────────────────────────────────────────────

  /// `GET /api/accidents?page=<n>&limit=<n>[&search_name=<text>]`
  pub async fn list(&self, page: Page, search: Option<&str>) -> Result<Listing> {
    let mut query = vec![
      ("page", page.number.to_string()),
      ("limit", page.size.to_string()),
    ];
    if let Some(name) = search.map(str::trim).filter(|s| !s.is_empty()) {
      query.push(("search_name", name.to_owned()));
    }

    let req = self.client.get(self.url("/accidents")).query(&query);
    let env: Envelope<Vec<AccidentRecord>> = self.send(req, MSG_LOAD_FAILED).await?;
    let page = env
      .pagination
      .map(|p| Page::new(p.current_page, p.records_per_page))
      .unwrap_or(page);
    Ok(Listing { records: env.data.unwrap_or_default(), page })
  }

  /// `GET /api/accidents/{id}`
  pub async fn get(&self, id: i64) -> Result<AccidentRecord> {
    let req = self.client.get(self.url(&format!("/accidents/{id}")));
    let reply = self.send_data(req, MSG_LOAD_FAILED).await?;
    Ok(reply.data)
  }

  /// `POST /api/accidents`
  pub async fn create(&self, candidate: &AccidentCandidate) -> Result<Reply<CreatedAccident>> {
    let req = self.client.post(self.url("/accidents")).json(candidate);
    self.send_data(req, MSG_SAVE_FAILED).await
  }

  /// `PUT /api/accidents/{id}`
  pub async fn update(
    &self,
    id: i64,
    candidate: &AccidentCandidate,
  ) -> Result<Reply<UpdatedAccident>> {
    let req = self
      .client
      .put(self.url(&format!("/accidents/{id}")))
      .json(candidate);
    self.send_data(req, MSG_SAVE_FAILED).await
  }

  /// `DELETE /api/accidents/{id}`
  pub async fn delete(&self, id: i64) -> Result<Reply<DeletedAccident>> {
    let req = self.client.delete(self.url(&format!("/accidents/{id}")));
    self.send_data(req, MSG_DELETE_FAILED).await
  }

  // ── Plumbing ──────────────────────────────────────────────────────────────

  async fn send_data<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
    fallback: &'static str,
  ) -> Result<Reply<T>> {
    let env: Envelope<T> = self.send(req, fallback).await?;
    match env.data {
      Some(data) => Ok(Reply { data, message: env.message }),
      None => Err(ClientError::Rejected {
        status:  StatusCode::OK,
        message: fallback.to_owned(),
        fields:  BTreeMap::new(),
      }),
    }
  }

  async fn send<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
    fallback: &'static str,
  ) -> Result<Envelope<T>> {
    let resp = req
      .send()
      .await
      .map_err(|source| ClientError::Unreachable { message: fallback, source })?;
    let status = resp.status();
    let bytes = resp
      .bytes()
      .await
      .map_err(|source| ClientError::Unreachable { message: fallback, source })?;

    let env = serde_json::from_slice::<Envelope<T>>(&bytes);
    tracing::debug!(%status, ok = env.is_ok(), "api response");

    match env {
      Ok(env) if status.is_success() && env.success => Ok(env),
      Ok(env) => Err(ClientError::Rejected {
        status,
        message: env.error.unwrap_or_else(|| fallback.to_owned()),
        fields: env.fields,
      }),
      Err(_) => Err(ClientError::Rejected {
        status,
        message: fallback.to_owned(),
        fields: BTreeMap::new(),
      }),
    }
  }
}
