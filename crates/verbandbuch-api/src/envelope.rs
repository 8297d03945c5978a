//! Success envelopes wrapped around every 2xx response body.

use serde::{Deserialize, Serialize};
use verbandbuch_core::query::Page;

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
  pub success:    bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message:    Option<&'static str>,
  pub data:       T,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
  pub fn data(data: T) -> Self {
    Self { success: true, message: None, data, pagination: None }
  }

  pub fn with_message(mut self, message: &'static str) -> Self {
    self.message = Some(message);
    self
  }

  pub fn with_page(mut self, page: Page) -> Self {
    self.pagination = Some(Pagination::from(page));
    self
  }
}

/// The effective paging parameters of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub current_page:     u32,
  pub records_per_page: u32,
}

impl From<Page> for Pagination {
  fn from(page: Page) -> Self {
    Self { current_page: page.number, records_per_page: page.size }
  }
}
