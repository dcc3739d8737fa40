//! Dynamic filtering of list queries.
//!
//! Raw query parameters become a [`FilterMap`]; each resource declares a
//! static table of [`FieldDescriptor`]s saying what every accepted key means.
//! [`FilterBuilder`] turns the map into one AND-combined `Condition`, keys
//! missing from the table never reach SQL.

mod builder;
mod descriptor;
pub mod fields;
mod search;
mod value;

pub use builder::{FilterBuilder, MatchMode};
pub use descriptor::{FieldDescriptor, FieldGate, FieldKind, Membership, SearchField, ValueKind};
pub use search::search_condition;
pub use value::{FilterMap, FilterValue};
