use common::Paginated;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QuerySelect, Select};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
/// Upper bound applied to any requested page size.
pub const MAX_LIMIT: u64 = 50;
/// Highest page number honoured; larger requests land on this page.
pub const MAX_PAGE: u64 = 10_000_000;

/// A validated page window: 1-based page, limit clamped to `1..=MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Wraps one fetched page. `has_next_page` only looks at whether the page is full.
    pub fn wrap<T>(&self, data: Vec<T>, total: u64) -> Paginated<T> {
        let has_next_page = data.len() as u64 == self.limit;
        Paginated {
            data,
            has_next_page,
            total,
        }
    }

    /// Slices an already materialized, ordered list.
    pub fn slice<T>(&self, items: Vec<T>) -> Paginated<T> {
        let total = items.len() as u64;
        let data: Vec<T> = items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect();
        self.wrap(data, total)
    }
}

/// Counts the filtered rows, then fetches one window of them.
pub async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    page: &PageRequest,
) -> Result<(Vec<E::Model>, u64), DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let total = select.clone().count(db).await?;
    let rows = select
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await?;
    Ok((rows, total))
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}
