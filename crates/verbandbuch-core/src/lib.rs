//! Core types and the record contract for the Verbandbuch accident log.
//!
//! This crate has no HTTP or database dependencies. The validation rules live
//! here once and are shared by the server and the terminal client.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod query;
pub mod record;
pub mod service;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
