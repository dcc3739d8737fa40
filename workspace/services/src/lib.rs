//! Business logic of the field operations backend.
//!
//! Every resource module exposes free async functions taking the database
//! connection; they return transport types from `common` and fail with
//! [`error::ServiceError`].

pub mod delegates;
pub mod error;
pub mod export;
mod fetch;
pub mod filter;
pub mod governments;
pub mod import;
pub mod notifier;
pub mod pagination;
pub mod persons;
pub mod products;
pub mod regions;
pub mod reports;
pub mod samples;
pub mod specialties;

#[cfg(test)]
mod testing;

pub use error::{Result, ServiceError};
pub use filter::{FilterMap, FilterValue};
pub use import::{ImportFormat, PersonImportMode};
pub use notifier::{ImportBroadcaster, ImportEvent, ImportNotifier, TracingNotifier};
pub use pagination::PageRequest;
