use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope returned by every paginated list endpoint.
///
/// `has_next_page` is true whenever the page came back full, so an exactly
/// full last page still reports a next page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub has_next_page: bool,
    /// Number of rows matching the filters, across all pages
    pub total: u64,
}

impl<T> Paginated<T> {
    /// Converts the page items while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            has_next_page: self.has_next_page,
            total: self.total,
        }
    }
}
