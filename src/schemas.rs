use std::time::Duration;

use common::{
    AssignPersonsRequest, CreateDelegateRequest, CreateGovernmentRequest, CreatePersonRequest,
    CreateProductRequest, CreateRegionRequest, CreateReportRequest, CreateSampleRequest,
    CreateSpecialtyRequest, DelegateDto, DoctorDetail, DoctorDto, GovernmentDto, ImportSummary,
    PersonDto, PharmacienDetail, PharmacienDto, ProductDto, RegionDto, ReportDto, ReportProductDto,
    ReportProductLine, ReportSampleDto, ReportSampleLine, SampleDto, SpecialtyDto,
    UpdateDelegateRequest, UpdateGovernmentRequest, UpdatePersonRequest, UpdateProductRequest,
    UpdateRegionRequest, UpdateReportRequest, UpdateSampleRequest, UpdateSpecialtyRequest,
    WholesalerDetail, WholesalerDto,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use services::{ImportBroadcaster, PageRequest};
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Import progress and log fan-out. Delivering events to clients is left
    /// to an external transport subscribing here; without one they are dropped.
    pub notifier: ImportBroadcaster,
    /// Applied to every request by the router
    pub request_timeout: Duration,
}

/// Paging and free-text search shared by every list endpoint.
///
/// Any other query parameter is treated as a filter.
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ListQuery {
    /// Page number, 1-based (default: 1, at most 10 000 000)
    #[validate(range(min = 1, max = 10_000_000))]
    pub page: Option<u64>,
    /// Page size (default: 10, capped at 50)
    #[validate(range(min = 1))]
    pub limit: Option<u64>,
    /// Whitespace separated terms, every term must match some searchable field
    pub search: Option<String>,
}

impl ListQuery {
    /// Query keys that never become filters
    pub const RESERVED: [&'static str; 3] = ["page", "limit", "search"];

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Query for persons assigned to a delegate
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DelegatePersonsQuery {
    #[validate(range(min = 1, max = 10_000_000))]
    pub page: Option<u64>,
    #[validate(range(min = 1))]
    pub limit: Option<u64>,
    pub search: Option<String>,
    /// Comma separated person types, e.g. `1,2`
    pub type_ids: Option<String>,
}

impl DelegatePersonsQuery {
    /// Query keys that never become filters
    pub const RESERVED: [&'static str; 4] = ["page", "limit", "search", "typeIds"];
}

/// Query for removing delegate links from a person
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DelegateIdsQuery {
    /// Comma separated delegate ids
    pub delegate_ids: Option<String>,
}

/// Payload format selector for imports and exports
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct FormatQuery {
    /// Only `csv` is supported (default: csv)
    pub format: Option<String>,
}

impl FormatQuery {
    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or("csv")
    }
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: &str) -> Self {
        Self {
            data,
            message: message.to_string(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::governments::create_government,
        crate::handlers::governments::get_governments,
        crate::handlers::governments::filter_governments,
        crate::handlers::governments::get_government,
        crate::handlers::governments::update_government,
        crate::handlers::governments::delete_government,
        crate::handlers::regions::create_region,
        crate::handlers::regions::get_regions,
        crate::handlers::regions::filter_regions,
        crate::handlers::regions::get_region,
        crate::handlers::regions::update_region,
        crate::handlers::regions::delete_region,
        crate::handlers::specialties::create_specialty,
        crate::handlers::specialties::get_specialties,
        crate::handlers::specialties::get_specialty,
        crate::handlers::specialties::update_specialty,
        crate::handlers::specialties::delete_specialty,
        crate::handlers::persons::create_person,
        crate::handlers::persons::get_persons,
        crate::handlers::persons::filter_persons,
        crate::handlers::persons::get_persons_by_type,
        crate::handlers::persons::get_persons_by_delegate,
        crate::handlers::persons::get_persons_not_assigned,
        crate::handlers::persons::get_person,
        crate::handlers::persons::update_person,
        crate::handlers::persons::delete_person,
        crate::handlers::persons::disassociate_delegates,
        crate::handlers::persons::import_doctors,
        crate::handlers::persons::import_others,
        crate::handlers::persons::export_persons,
        crate::handlers::delegates::create_delegate,
        crate::handlers::delegates::get_delegates,
        crate::handlers::delegates::get_delegate,
        crate::handlers::delegates::update_delegate,
        crate::handlers::delegates::assign_persons,
        crate::handlers::delegates::delete_delegate,
        crate::handlers::products::create_product,
        crate::handlers::products::get_products,
        crate::handlers::products::filter_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::import_products,
        crate::handlers::samples::create_sample,
        crate::handlers::samples::get_samples,
        crate::handlers::samples::filter_samples,
        crate::handlers::samples::get_sample,
        crate::handlers::samples::update_sample,
        crate::handlers::samples::delete_sample,
        crate::handlers::samples::import_samples,
        crate::handlers::reports::create_report,
        crate::handlers::reports::get_reports,
        crate::handlers::reports::filter_reports,
        crate::handlers::reports::get_report,
        crate::handlers::reports::update_report,
        crate::handlers::reports::delete_report,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            ListQuery,
            DelegatePersonsQuery,
            DelegateIdsQuery,
            FormatQuery,
            ImportSummary,
            CreateGovernmentRequest,
            UpdateGovernmentRequest,
            GovernmentDto,
            CreateRegionRequest,
            UpdateRegionRequest,
            RegionDto,
            CreateSpecialtyRequest,
            UpdateSpecialtyRequest,
            SpecialtyDto,
            CreatePersonRequest,
            UpdatePersonRequest,
            DoctorDetail,
            PharmacienDetail,
            WholesalerDetail,
            PersonDto,
            DoctorDto,
            PharmacienDto,
            WholesalerDto,
            CreateDelegateRequest,
            UpdateDelegateRequest,
            AssignPersonsRequest,
            DelegateDto,
            CreateProductRequest,
            UpdateProductRequest,
            ProductDto,
            CreateSampleRequest,
            UpdateSampleRequest,
            SampleDto,
            CreateReportRequest,
            UpdateReportRequest,
            ReportSampleLine,
            ReportProductLine,
            ReportDto,
            ReportSampleDto,
            ReportProductDto,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "governments", description = "Government management"),
        (name = "regions", description = "Region management"),
        (name = "specialties", description = "Doctor specialty management"),
        (name = "persons", description = "Doctors, pharmacists and wholesalers, with CSV import and export"),
        (name = "delegates", description = "Field delegates and their assigned persons"),
        (name = "products", description = "Product catalog, with CSV import"),
        (name = "samples", description = "Sample catalog, with CSV import"),
        (name = "reports", description = "Visit reports"),
    ),
    info(
        title = "FieldOps API",
        description = "Field operations backend: delegates, persons, catalog and visit reports",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
