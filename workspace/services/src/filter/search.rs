use sea_orm::sea_query::{Alias, Expr, Func};
use sea_orm::Condition;

use super::descriptor::SearchField;

/// Whitespace tokenized search: every token must match at least one field.
///
/// Returns `None` for a missing or blank search string.
pub fn search_condition(search: Option<&str>, fields: &[SearchField]) -> Option<Condition> {
    let tokens: Vec<String> = search?
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    if tokens.is_empty() || fields.is_empty() {
        return None;
    }

    let condition = tokens.iter().fold(Condition::all(), |all, token| {
        let pattern = format!("%{}%", token);
        let any = fields.iter().fold(Condition::any(), |any, field| {
            let col = Expr::col((Alias::new(field.table), Alias::new(field.column)));
            any.add(Expr::expr(Func::lower(col)).like(pattern.clone()))
        });
        all.add(any)
    });
    Some(condition)
}
