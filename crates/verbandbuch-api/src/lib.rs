//! JSON REST API for the Verbandbuch.
//!
//! Exposes an axum [`Router`] over an [`AccidentService`] backed by any
//! [`verbandbuch_core::store::AccidentStore`]. CORS, body limits and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", verbandbuch_api::api_router(service.clone()))
//! ```
//!
//! # Envelopes
//!
//! Successful responses carry `{"success": true, "data": ..}` plus an optional
//! `message` and, for listings, `pagination`. Failures carry
//! `{"success": false, "error": ".."}`; validation failures add a `fields`
//! map from field name to message.

pub mod accidents;
pub mod envelope;
pub mod error;

use axum::{Router, routing::get};
use verbandbuch_core::{service::AccidentService, store::AccidentStore};

pub use envelope::{Envelope, Pagination};
pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: AccidentService<S>) -> Router<()>
where
  S: AccidentStore + 'static,
{
  Router::new()
    .route("/accidents", get(accidents::list::<S>).post(accidents::create::<S>))
    .route(
      "/accidents/{id}",
      get(accidents::get_one::<S>)
        .put(accidents::update::<S>)
        .delete(accidents::delete::<S>),
    )
    .with_state(service)
}
