pub mod entities;

pub use entities::person::PersonType;
