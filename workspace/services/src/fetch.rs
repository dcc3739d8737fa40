//! Batched lookups backing the per-query fetch plans.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Select};

/// Case folding for every lookup that ignores case. SQLite's `LOWER` only
/// folds ASCII, so both sides are folded here instead of in SQL.
pub(crate) fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

/// True when `stored` folds to `wanted`, which must already be folded.
pub(crate) fn folds_to(wanted: Option<&str>, stored: Option<&str>) -> bool {
    match (wanted, stored) {
        (Some(wanted), Some(stored)) => fold(stored) == wanted,
        _ => false,
    }
}

/// First row of `select` accepted by `matches`.
pub(crate) async fn find_first<E, C, F>(
    db: &C,
    select: Select<E>,
    matches: F,
) -> Result<Option<E::Model>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
    F: Fn(&E::Model) -> bool,
{
    let rows = select.all(db).await?;
    Ok(rows.into_iter().find(|row| matches(row)))
}

/// Loads the rows of `E` whose `column` is one of `ids` in a single query,
/// keyed by `key`. No query is issued for an empty id set.
pub(crate) async fn by_ids<E, C, K>(
    db: &C,
    column: E::Column,
    ids: impl IntoIterator<Item = i32>,
    key: K,
) -> Result<HashMap<i32, E::Model>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
    K: Fn(&E::Model) -> i32,
{
    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = E::find().filter(column.is_in(ids)).all(db).await?;
    Ok(rows.into_iter().map(|row| (key(&row), row)).collect())
}
