//! Transport-layer types shared between the HTTP handlers and the services crate.
//! Wire names are camelCase; person `type` is the numeric discriminator
//! (1 = doctor, 2 = pharmacist, 3 = wholesaler).

mod pagination;

pub use pagination::Paginated;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===================== Geography =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CreateGovernmentRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct UpdateGovernmentRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GovernmentDto {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegionRequest {
    pub name: String,
    pub government_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRegionRequest {
    pub name: Option<String>,
    pub government_id: Option<i32>,
}

/// Region response model, with its government when the fetch plan asked for it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegionDto {
    pub id: i32,
    pub name: String,
    pub government_id: i32,
    pub government: Option<GovernmentDto>,
}

// ===================== Catalog =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CreateSpecialtyRequest {
    pub name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct UpdateSpecialtyRequest {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SpecialtyDto {
    pub id: i32,
    pub name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    /// Defaults to zero
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub family: Option<String>,
    pub product_creation_date: Option<String>,
    pub product_code: Option<String>,
    pub bar_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub family: Option<String>,
    pub product_creation_date: Option<String>,
    pub product_code: Option<String>,
    pub bar_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub family: Option<String>,
    pub product_creation_date: Option<String>,
    pub product_code: Option<String>,
    pub bar_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSampleRequest {
    pub name: String,
    pub sample_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSampleRequest {
    pub name: Option<String>,
    pub sample_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampleDto {
    pub id: i32,
    pub name: String,
    pub sample_code: Option<String>,
}

// ===================== Persons =====================

/// Doctor detail carried by person create/update payloads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDetail {
    pub doctor_type: Option<i32>,
    pub specialty_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PharmacienDetail {
    pub contact: Option<String>,
    pub pharmacy_type: Option<i32>,
    pub pharmacy_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WholesalerDetail {
    pub company_name: String,
}

/// Request body for creating a person.
///
/// Exactly one of `doctor`, `pharmacien` and `wholesaler` must be present,
/// it decides the person's type.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonRequest {
    pub firstname: String,
    pub lastname: String,
    pub address: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub code: Option<String>,
    pub potential: Option<String>,
    pub government_id: i32,
    pub region_id: i32,
    pub doctor: Option<DoctorDetail>,
    pub pharmacien: Option<PharmacienDetail>,
    pub wholesaler: Option<WholesalerDetail>,
}

/// Request body for updating a person. Absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub code: Option<String>,
    pub potential: Option<String>,
    pub government_id: Option<i32>,
    pub region_id: Option<i32>,
    pub doctor: Option<DoctorDetail>,
    pub pharmacien: Option<PharmacienDetail>,
    pub wholesaler: Option<WholesalerDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDto {
    pub id: i32,
    pub doctor_type: Option<i32>,
    pub specialty: Option<SpecialtyDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PharmacienDto {
    pub id: i32,
    pub contact: Option<String>,
    pub pharmacy_type: Option<i32>,
    pub pharmacy_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WholesalerDto {
    pub id: i32,
    pub company_name: String,
}

/// Person response model. Nested relations are only filled when the
/// query's fetch plan loaded them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonDto {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub address: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub code: Option<String>,
    pub potential: Option<String>,
    #[serde(rename = "type")]
    pub person_type: i32,
    pub government_id: i32,
    pub region_id: i32,
    pub government: Option<GovernmentDto>,
    pub region: Option<RegionDto>,
    pub doctor: Option<DoctorDto>,
    pub pharmacien: Option<PharmacienDto>,
    pub wholesaler: Option<WholesalerDto>,
}

// ===================== Delegates =====================

/// Request body for creating a delegate and its user account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDelegateRequest {
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
    pub address: String,
    /// Required, becomes the login of the created user
    pub email: Option<String>,
    /// Required
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDelegateRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DelegateDto {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
    pub address: String,
    /// Ids of the persons assigned to this delegate
    pub person_ids: Vec<i32>,
}

/// Body of `POST /delegates/{id}/assign-persons`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AssignPersonsRequest {
    pub person: Vec<i32>,
}

// ===================== Reports =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSampleLine {
    pub sample_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportProductLine {
    pub product_id: i32,
    pub potential: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub name: String,
    pub date: NaiveDate,
    pub duration: String,
    pub specialty: String,
    pub note: String,
    pub status: String,
    pub government_id: i32,
    pub region_id: i32,
    pub person_id: i32,
    pub delegate_id: i32,
    #[serde(default)]
    pub samples: Vec<ReportSampleLine>,
    #[serde(default)]
    pub products: Vec<ReportProductLine>,
}

/// Request body for updating a report's own fields. Lines are not touched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportRequest {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub duration: Option<String>,
    pub specialty: Option<String>,
    pub note: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSampleDto {
    pub id: i32,
    pub quantity: i32,
    pub sample_id: i32,
    pub sample: Option<SampleDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportProductDto {
    pub id: i32,
    pub potential: String,
    pub product_id: i32,
    pub product: Option<ProductDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportDto {
    pub id: i32,
    pub name: String,
    pub date: NaiveDate,
    pub duration: String,
    pub specialty: String,
    pub note: String,
    pub status: String,
    pub government_id: i32,
    pub region_id: i32,
    pub person_id: i32,
    pub delegate_id: i32,
    pub government: Option<GovernmentDto>,
    pub region: Option<RegionDto>,
    pub person: Option<PersonDto>,
    pub delegate: Option<DelegateDto>,
    pub report_samples: Vec<ReportSampleDto>,
    pub report_products: Vec<ReportProductDto>,
}

// ===================== Imports =====================

/// Outcome counters of one bulk import run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Data rows found in the payload
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    /// Rows matching an existing record that were left as is
    pub skipped: usize,
    /// Rows whose upsert failed; the run carried on
    pub failed: usize,
}
