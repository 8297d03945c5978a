//! List queries and offset pagination.

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not supply a usable one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on the page size; larger requests are capped.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-based page of a listing.
///
/// No total count is tracked. Callers infer "has more" from whether a full
/// page came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
  pub number: u32,
  pub size:   u32,
}

impl Default for Page {
  fn default() -> Self { Self { number: 1, size: DEFAULT_PAGE_SIZE } }
}

impl Page {
  /// Build a page, clamping `number` to at least 1 and `size` to
  /// `1..=MAX_PAGE_SIZE`.
  pub fn new(number: u32, size: u32) -> Self {
    Self {
      number: number.max(1),
      size:   size.clamp(1, MAX_PAGE_SIZE),
    }
  }

  /// Build a page from raw query-string values.
  ///
  /// Absent, non-numeric and non-positive values fall back to page 1 and
  /// [`DEFAULT_PAGE_SIZE`]; oversized limits are capped.
  pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
    let number = page.and_then(positive).unwrap_or(1);
    let size = limit.and_then(positive).unwrap_or(DEFAULT_PAGE_SIZE);
    Self::new(number, size)
  }

  /// Number of rows to skip.
  pub fn offset(&self) -> u64 { u64::from(self.number - 1) * u64::from(self.size) }

  pub fn next(&self) -> Self { Self { number: self.number.saturating_add(1), ..*self } }

  pub fn prev(&self) -> Self { Self::new(self.number.saturating_sub(1), self.size) }
}

fn positive(raw: &str) -> Option<u32> {
  raw
    .trim()
    .parse::<i64>()
    .ok()
    .filter(|n| *n > 0)
    .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}

/// Parameters for [`crate::store::AccidentStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccidentQuery {
  /// Case-insensitive substring filter on `name_verletzte_person`.
  pub name_filter: Option<String>,
  pub page:        Page,
}

impl AccidentQuery {
  pub fn new(page: Page, name_filter: Option<&str>) -> Self {
    let name_filter = name_filter
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_owned);
    Self { name_filter, page }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_to_missing_and_garbage_params() {
    assert_eq!(Page::from_params(None, None), Page { number: 1, size: 10 });
    assert_eq!(Page::from_params(Some("abc"), Some("")), Page { number: 1, size: 10 });
    assert_eq!(Page::from_params(Some("0"), Some("-5")), Page { number: 1, size: 10 });
  }

  #[test]
  fn limit_is_capped() {
    assert_eq!(Page::from_params(Some("2"), Some("100000")).size, MAX_PAGE_SIZE);
    assert_eq!(Page::new(1, 0).size, 1);
  }

  #[test]
  fn offset_is_positional() {
    assert_eq!(Page::new(1, 10).offset(), 0);
    assert_eq!(Page::new(3, 10).offset(), 20);
    assert_eq!(Page::from_params(Some("4"), Some("25")).offset(), 75);
  }

  #[test]
  fn prev_never_goes_below_first_page() {
    assert_eq!(Page::new(1, 10).prev().number, 1);
    assert_eq!(Page::new(2, 10).prev().number, 1);
    assert_eq!(Page::new(2, 10).next().number, 3);
  }

  #[test]
  fn blank_name_filter_is_ignored() {
    assert_eq!(AccidentQuery::new(Page::default(), Some("   ")).name_filter, None);
    assert_eq!(
      AccidentQuery::new(Page::default(), Some(" anna ")).name_filter.as_deref(),
      Some("anna")
    );
  }
}
