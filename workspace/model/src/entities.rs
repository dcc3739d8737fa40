//! Root of all SeaORM entity modules of the field operations schema.
//! Persons carry their doctor/pharmacist/wholesaler detail through
//! nullable foreign keys; delegates and persons are linked many-to-many.

pub mod delegate;
pub mod delegate_person;
pub mod doctor;
pub mod government;
pub mod person;
pub mod pharmacien;
pub mod product;
pub mod region;
pub mod report;
pub mod report_product;
pub mod report_sample;
pub mod sample;
pub mod specialty;
pub mod user;
pub mod wholesaler;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::delegate::Entity as Delegate;
    pub use super::delegate_person::Entity as DelegatePerson;
    pub use super::doctor::Entity as Doctor;
    pub use super::government::Entity as Government;
    pub use super::person::Entity as Person;
    pub use super::pharmacien::Entity as Pharmacien;
    pub use super::product::Entity as Product;
    pub use super::region::Entity as Region;
    pub use super::report::Entity as Report;
    pub use super::report_product::Entity as ReportProduct;
    pub use super::report_sample::Entity as ReportSample;
    pub use super::sample::Entity as Sample;
    pub use super::specialty::Entity as Specialty;
    pub use super::user::Entity as User;
    pub use super::wholesaler::Entity as Wholesaler;
}
