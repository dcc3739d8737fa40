//! Filter and search tables of every resource.
//!
//! Table and column names are the physical ones; list queries join the
//! tables a descriptor points at (doctors and pharmaciens for persons,
//! persons and doctors for reports).

use super::descriptor::{FieldDescriptor as F, FieldGate, Membership, SearchField, ValueKind};

const DELEGATES_OF_PERSON: Membership = Membership {
    join_table: "delegates_persons",
    owner_column: "person_id",
    target_column: "delegate_id",
};

const PERSONS_OF_DELEGATE: Membership = Membership {
    join_table: "delegates_persons",
    owner_column: "delegate_id",
    target_column: "person_id",
};

const REPORTS_WITH_SAMPLE: Membership = Membership {
    join_table: "report_samples",
    owner_column: "report_id",
    target_column: "sample_id",
};

const REPORTS_WITH_PRODUCT: Membership = Membership {
    join_table: "report_products",
    owner_column: "report_id",
    target_column: "product_id",
};

pub static GOVERNMENT_FIELDS: &[F] = &[
    F::equality("id", "governments", "id", ValueKind::Int),
    F::substring("name", "governments", "name"),
];

pub static REGION_FIELDS: &[F] = &[
    F::equality("id", "regions", "id", ValueKind::Int),
    F::substring("name", "regions", "name"),
    F::relation("government", "regions", "government_id"),
];

pub static SPECIALTY_FIELDS: &[F] = &[
    F::equality("id", "specialties", "id", ValueKind::Int),
    F::substring("name", "specialties", "name"),
    F::substring("abbreviation", "specialties", "abbreviation"),
];

pub static PERSON_FIELDS: &[F] = &[
    F::equality("id", "persons", "id", ValueKind::Int),
    F::equality("type", "persons", "type", ValueKind::Int),
    F::substring("firstname", "persons", "firstname"),
    F::substring("lastname", "persons", "lastname"),
    F::substring("address", "persons", "address"),
    F::substring("phoneNumber", "persons", "phone_number"),
    F::substring("email", "persons", "email"),
    F::substring("code", "persons", "code"),
    F::substring("potential", "persons", "potential"),
    F::relation("government", "persons", "government_id"),
    F::relation("region", "persons", "region_id"),
    F::membership("delegate", "persons", DELEGATES_OF_PERSON),
    F::relation("specialty", "doctors", "specialty_id").gated(FieldGate::DoctorOnly),
    F::equality("doctorType", "doctors", "doctor_type", ValueKind::Int).gated(FieldGate::DoctorOnly),
    F::equality("pharmacyType", "pharmaciens", "pharmacy_type", ValueKind::Int)
        .gated(FieldGate::PharmacienOnly),
];

pub static DELEGATE_FIELDS: &[F] = &[
    F::equality("id", "delegates", "id", ValueKind::Int),
    F::substring("firstname", "delegates", "firstname"),
    F::substring("lastname", "delegates", "lastname"),
    F::substring("phoneNumber", "delegates", "phone_number"),
    F::substring("address", "delegates", "address"),
    F::membership("person", "delegates", PERSONS_OF_DELEGATE),
];

pub static PRODUCT_FIELDS: &[F] = &[
    F::equality("id", "products", "id", ValueKind::Int),
    F::substring("name", "products", "name"),
    F::equality("price", "products", "price", ValueKind::Decimal),
    F::equality("family", "products", "family", ValueKind::Text),
    F::equality("productCreationDate", "products", "product_creation_date", ValueKind::Text),
    F::equality("productCode", "products", "product_code", ValueKind::Text),
    F::equality("barCode", "products", "bar_code", ValueKind::Text),
];

pub static SAMPLE_FIELDS: &[F] = &[
    F::equality("id", "samples", "id", ValueKind::Int),
    F::substring("name", "samples", "name"),
    F::substring("sampleCode", "samples", "sample_code"),
];

pub static REPORT_FIELDS: &[F] = &[
    F::equality("id", "reports", "id", ValueKind::Int),
    F::equality("type", "persons", "type", ValueKind::Int),
    F::date_interval("dateInterval", "reports", "date"),
    F::equality("date", "reports", "date", ValueKind::Date),
    F::relation("government", "reports", "government_id"),
    F::relation("region", "reports", "region_id"),
    F::relation("delegateId", "reports", "delegate_id"),
    F::relation("personId", "reports", "person_id"),
    F::relation("specialtyId", "doctors", "specialty_id"),
    F::membership("sampleId", "reports", REPORTS_WITH_SAMPLE),
    F::membership("productId", "reports", REPORTS_WITH_PRODUCT),
    F::substring("name", "reports", "name"),
    F::substring("note", "reports", "note"),
    F::substring("duration", "reports", "duration"),
    F::substring("specialty", "reports", "specialty"),
    F::substring("status", "reports", "status"),
];

pub static PERSON_SEARCH: &[SearchField] = &[
    SearchField::new("persons", "firstname"),
    SearchField::new("persons", "lastname"),
    SearchField::new("persons", "address"),
    SearchField::new("persons", "email"),
    SearchField::new("persons", "phone_number"),
];

pub static DELEGATE_SEARCH: &[SearchField] = &[
    SearchField::new("delegates", "firstname"),
    SearchField::new("delegates", "lastname"),
    SearchField::new("delegates", "phone_number"),
    SearchField::new("delegates", "address"),
];

pub static REPORT_SEARCH: &[SearchField] = &[
    SearchField::new("reports", "name"),
    SearchField::new("reports", "note"),
];

pub static REGION_SEARCH: &[SearchField] = &[
    SearchField::new("regions", "name"),
    SearchField::new("governments", "name"),
];

pub static GOVERNMENT_SEARCH: &[SearchField] = &[SearchField::new("governments", "name")];

pub static SPECIALTY_SEARCH: &[SearchField] = &[
    SearchField::new("specialties", "name"),
    SearchField::new("specialties", "abbreviation"),
];

pub static PRODUCT_SEARCH: &[SearchField] = &[
    SearchField::new("products", "name"),
    SearchField::new("products", "family"),
];

pub static SAMPLE_SEARCH: &[SearchField] = &[SearchField::new("samples", "name")];
