//! Handlers for `/accidents` endpoints.
//!
//! | Method   | Path              | Notes |
//! |----------|-------------------|-------|
//! | `GET`    | `/accidents`      | `?page=&limit=&search_name=`, newest first |
//! | `POST`   | `/accidents`      | Body: an accident candidate; 201 on success |
//! | `GET`    | `/accidents/{id}` | 400 on a malformed id, 404 if absent |
//! | `PUT`    | `/accidents/{id}` | Full replacement, validated like a create |
//! | `DELETE` | `/accidents/{id}` | Permanent |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use verbandbuch_core::{
  query::Page,
  record::{AccidentCandidate, AccidentRecord, DeletedAccident, UpdatedAccident},
  service::{AccidentService, parse_id},
  store::AccidentStore,
};

use crate::{envelope::Envelope, error::ApiError};

pub const MSG_CREATED: &str = "Unfall erfolgreich gemeldet";
pub const MSG_UPDATED: &str = "Unfall erfolgreich aktualisiert";
pub const MSG_DELETED: &str = "Unfall erfolgreich gelöscht";

// ─── List ─────────────────────────────────────────────────────────────────────

/// Raw query string values. Kept as text so that junk falls back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub page:        Option<String>,
  pub limit:       Option<String>,
  pub search_name: Option<String>,
}

/// `GET /accidents[?page=<n>&limit=<n>&search_name=<text>]`
pub async fn list<S>(
  State(service): State<AccidentService<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Vec<AccidentRecord>>>, ApiError>
where
  S: AccidentStore + 'static,
{
  let page = Page::from_params(params.page.as_deref(), params.limit.as_deref());
  let listing = service
    .list(page, params.search_name.as_deref())
    .await
    .map_err(ApiError::service("list"))?;
  Ok(Json(Envelope::data(listing.records).with_page(listing.page)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /accidents`
pub async fn create<S>(
  State(service): State<AccidentService<S>>,
  body: Result<Json<AccidentCandidate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AccidentStore + 'static,
{
  let Json(candidate) = body?;
  let created = service
    .create(&candidate)
    .await
    .map_err(ApiError::service("create"))?;
  tracing::info!(id = created.id, "accident reported");
  Ok((StatusCode::CREATED, Json(Envelope::data(created).with_message(MSG_CREATED))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /accidents/{id}`
pub async fn get_one<S>(
  State(service): State<AccidentService<S>>,
  Path(id): Path<String>,
) -> Result<Json<Envelope<AccidentRecord>>, ApiError>
where
  S: AccidentStore + 'static,
{
  let record = service.get(&id).await.map_err(ApiError::service("get"))?;
  Ok(Json(Envelope::data(record)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /accidents/{id}`
pub async fn update<S>(
  State(service): State<AccidentService<S>>,
  Path(id): Path<String>,
  body: Result<Json<AccidentCandidate>, JsonRejection>,
) -> Result<Json<Envelope<UpdatedAccident>>, ApiError>
where
  S: AccidentStore + 'static,
{
  // A bad id outranks a bad body.
  parse_id(&id).map_err(ApiError::service("update"))?;
  let Json(candidate) = body?;
  let updated = service
    .update(&id, &candidate)
    .await
    .map_err(ApiError::service("update"))?;
  tracing::info!(id = updated.id, "accident updated");
  Ok(Json(Envelope::data(updated).with_message(MSG_UPDATED)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /accidents/{id}`
pub async fn delete<S>(
  State(service): State<AccidentService<S>>,
  Path(id): Path<String>,
) -> Result<Json<Envelope<DeletedAccident>>, ApiError>
where
  S: AccidentStore + 'static,
{
  let deleted = service
    .delete(&id)
    .await
    .map_err(ApiError::service("delete"))?;
  tracing::info!(id = deleted.id, "accident deleted");
  Ok(Json(Envelope::data(deleted).with_message(MSG_DELETED)))
}
