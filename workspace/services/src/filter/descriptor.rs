use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::Value;

/// How a filter key is turned into a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `col = v`, a list becomes `col IN (..)`
    Equality,
    /// `lower(col) LIKE %v%`, a list becomes `col IN (..)`
    Substring,
    /// Foreign key compared against related ids. Non numeric ids are dropped.
    RelationId,
    /// Ownership through a join table: `id IN (SELECT owner FROM join WHERE target IN (..))`
    Membership(Membership),
    /// Two element list `[from, to]` compared with `BETWEEN`
    DateInterval,
}

/// Join table used by a [`FieldKind::Membership`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    pub join_table: &'static str,
    /// Column of the join table pointing at the filtered row
    pub owner_column: &'static str,
    /// Column of the join table compared with the filter values
    pub target_column: &'static str,
}

/// Type raw values are parsed into before they are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Decimal,
    Date,
    Text,
}

impl ValueKind {
    /// Parses one raw value, `None` when it does not fit the kind.
    pub fn parse(self, raw: &str) -> Option<Value> {
        let raw = raw.trim();
        match self {
            ValueKind::Int => raw.parse::<i32>().ok().map(Value::from),
            ValueKind::Decimal => raw
                .replacen(',', ".", 1)
                .parse::<Decimal>()
                .ok()
                .map(Value::from),
            ValueKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(Value::from),
            ValueKind::Text => Some(Value::from(raw.to_string())),
        }
    }
}

/// Restricts a field to queries whose person type selector includes a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGate {
    Always,
    DoctorOnly,
    PharmacienOnly,
}

/// One accepted filter key of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub table: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    pub value: ValueKind,
    pub gate: FieldGate,
}

impl FieldDescriptor {
    pub const fn equality(
        key: &'static str,
        table: &'static str,
        column: &'static str,
        value: ValueKind,
    ) -> Self {
        Self {
            key,
            table,
            column,
            kind: FieldKind::Equality,
            value,
            gate: FieldGate::Always,
        }
    }

    pub const fn substring(key: &'static str, table: &'static str, column: &'static str) -> Self {
        Self {
            key,
            table,
            column,
            kind: FieldKind::Substring,
            value: ValueKind::Text,
            gate: FieldGate::Always,
        }
    }

    pub const fn relation(key: &'static str, table: &'static str, column: &'static str) -> Self {
        Self {
            key,
            table,
            column,
            kind: FieldKind::RelationId,
            value: ValueKind::Int,
            gate: FieldGate::Always,
        }
    }

    /// `table.id` filtered through `via`.
    pub const fn membership(key: &'static str, table: &'static str, via: Membership) -> Self {
        Self {
            key,
            table,
            column: "id",
            kind: FieldKind::Membership(via),
            value: ValueKind::Int,
            gate: FieldGate::Always,
        }
    }

    pub const fn date_interval(key: &'static str, table: &'static str, column: &'static str) -> Self {
        Self {
            key,
            table,
            column,
            kind: FieldKind::DateInterval,
            value: ValueKind::Date,
            gate: FieldGate::Always,
        }
    }

    pub const fn gated(self, gate: FieldGate) -> Self {
        Self { gate, ..self }
    }
}

/// Column matched by free-text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchField {
    pub table: &'static str,
    pub column: &'static str,
}

impl SearchField {
    pub const fn new(table: &'static str, column: &'static str) -> Self {
        Self { table, column }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_parsing_drops_garbage() {
        assert_eq!(ValueKind::Int.parse(" 12 "), Some(Value::from(12)));
        assert_eq!(ValueKind::Int.parse("abc"), None);
        assert_eq!(ValueKind::Int.parse("1.5"), None);
        assert_eq!(
            ValueKind::Decimal.parse("4,50"),
            Some(Value::from(Decimal::new(450, 2)))
        );
        assert_eq!(ValueKind::Date.parse("2025-13-01"), None);
        assert!(ValueKind::Date.parse("2025-01-31").is_some());
    }
}
