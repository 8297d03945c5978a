//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is answered with `{"success": false, "error": "<message>"}`.
//! Messages are fixed German strings; storage failures are logged here with
//! their full cause and reach the client only as "Datenbankfehler".

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use verbandbuch_core::Error as ServiceError;

pub const MSG_INVALID_ID: &str = "Ungültige ID";
pub const MSG_NOT_FOUND: &str = "Unfall nicht gefunden";
pub const MSG_DATABASE: &str = "Datenbankfehler";
pub const MSG_INVALID_INPUT: &str = "Ungültige Eingabe";
pub const MSG_MALFORMED_BODY: &str = "Ungültiger JSON-Body";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// A record service operation failed.
  #[error("{op}: {source}")]
  Service {
    op:     &'static str,
    #[source]
    source: ServiceError,
  },

  #[error("malformed request body: {0}")]
  Body(#[from] JsonRejection),
}

impl ApiError {
  /// Attach the name of the failing operation, used in server logs.
  pub fn service(op: &'static str) -> impl FnOnce(ServiceError) -> Self {
    move |source| Self::Service { op, source }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Service { op, source } => match source {
        ServiceError::InvalidId(raw) => {
          tracing::debug!(op, id = %raw, "rejected invalid id");
          failure(StatusCode::BAD_REQUEST, MSG_INVALID_ID)
        }
        ServiceError::NotFound(id) => {
          tracing::debug!(op, id, "accident not found");
          failure(StatusCode::NOT_FOUND, MSG_NOT_FOUND)
        }
        ServiceError::Validation(fields) => {
          tracing::debug!(op, %fields, "validation failed");
          (
            StatusCode::BAD_REQUEST,
            Json(json!({
              "success": false,
              "error":   MSG_INVALID_INPUT,
              "fields":  fields,
            })),
          )
            .into_response()
        }
        ServiceError::Storage(e) => {
          tracing::error!(op, error = %e, "storage failure");
          failure(StatusCode::INTERNAL_SERVER_ERROR, MSG_DATABASE)
        }
      },
      ApiError::Body(rejection) => {
        tracing::debug!(detail = %rejection.body_text(), "rejected request body");
        let status = match rejection.status() {
          StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
          _ => StatusCode::BAD_REQUEST,
        };
        failure(status, MSG_MALFORMED_BODY)
      }
    }
  }
}

fn failure(status: StatusCode, message: &str) -> Response {
  (status, Json(json!({ "success": false, "error": message }))).into_response()
}
