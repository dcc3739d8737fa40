use model::PersonType;
use sea_orm::sea_query::{Alias, Expr, Func, Query, SimpleExpr};
use sea_orm::{Condition, Value};
use tracing::{debug, trace};

use super::descriptor::{FieldDescriptor, FieldGate, FieldKind, ValueKind};
use super::value::{FilterMap, FilterValue};

/// Whether substring fields match fuzzily or exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Substring fields use case-insensitive `LIKE %v%`
    #[default]
    Fuzzy,
    /// Every field compares with `=`, used by structured filter bodies
    Exact,
}

/// Translates a [`FilterMap`] into predicates over one resource's descriptor table.
#[derive(Debug, Clone)]
pub struct FilterBuilder {
    fields: &'static [FieldDescriptor],
    mode: MatchMode,
    active_types: Vec<PersonType>,
}

impl FilterBuilder {
    pub fn new(fields: &'static [FieldDescriptor]) -> Self {
        Self {
            fields,
            mode: MatchMode::Fuzzy,
            active_types: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Person types selected by the query. Gated fields only apply when
    /// their type is among them.
    pub fn with_active_types(mut self, types: impl IntoIterator<Item = PersonType>) -> Self {
        self.active_types = types.into_iter().collect();
        self
    }

    pub fn descriptor(&self, key: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// One AND term per usable filter key.
    pub fn build(&self, filters: &FilterMap) -> Condition {
        let mut condition = Condition::all();

        for (key, value) in filters.iter() {
            let Some(field) = self.descriptor(key) else {
                debug!("Ignoring unknown filter key '{}'", key);
                continue;
            };

            if !self.gate_open(field.gate) {
                debug!(
                    "Filter '{}' does not apply to person types {:?}, skipping",
                    key, self.active_types
                );
                continue;
            }

            match predicate(field, value, self.mode) {
                Some(expr) => {
                    trace!("Applying filter '{}' = {:?}", key, value);
                    condition = condition.add(expr);
                }
                None => debug!("Filter '{}' has no usable value in {:?}, skipping", key, value),
            }
        }

        condition
    }

    fn gate_open(&self, gate: FieldGate) -> bool {
        match gate {
            FieldGate::Always => true,
            FieldGate::DoctorOnly => self.active_types.contains(&PersonType::Doctor),
            FieldGate::PharmacienOnly => self.active_types.contains(&PersonType::Pharmacien),
        }
    }
}

fn column(table: &'static str, column: &'static str) -> Expr {
    Expr::col((Alias::new(table), Alias::new(column)))
}

fn parsed(kind: ValueKind, value: &FilterValue) -> Vec<Value> {
    value
        .values()
        .into_iter()
        .filter_map(|raw| kind.parse(raw))
        .collect()
}

/// Equality for scalars, membership for lists. `None` when nothing parsed.
fn compare(field: &FieldDescriptor, value: &FilterValue) -> Option<SimpleExpr> {
    let mut values = parsed(field.value, value);
    if values.is_empty() {
        return None;
    }

    let col = column(field.table, field.column);
    if value.is_list() {
        Some(col.is_in(values))
    } else {
        values.pop().map(|v| col.eq(v))
    }
}

/// Builds the predicate of a single field, `None` when the value is unusable.
pub(crate) fn predicate(
    field: &FieldDescriptor,
    value: &FilterValue,
    mode: MatchMode,
) -> Option<SimpleExpr> {
    match field.kind {
        FieldKind::Equality | FieldKind::RelationId => compare(field, value),
        FieldKind::Substring => match (value, mode) {
            (FilterValue::Scalar(raw), MatchMode::Fuzzy) => {
                let pattern = format!("%{}%", raw.trim().to_lowercase());
                Some(Expr::expr(Func::lower(column(field.table, field.column))).like(pattern))
            }
            _ => compare(field, value),
        },
        FieldKind::Membership(via) => {
            let ids = parsed(ValueKind::Int, value);
            if ids.is_empty() {
                return None;
            }
            let owners = Query::select()
                .column(Alias::new(via.owner_column))
                .from(Alias::new(via.join_table))
                .and_where(Expr::col(Alias::new(via.target_column)).is_in(ids))
                .to_owned();
            Some(column(field.table, field.column).in_subquery(owners))
        }
        FieldKind::DateInterval => {
            let bounds = parsed(field.value, value);
            match <[Value; 2]>::try_from(bounds) {
                Ok([from, to]) => Some(column(field.table, field.column).between(from, to)),
                Err(_) => None,
            }
        }
    }
}
