use crate::handlers::{ApiError, api_error, query_filters};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{CreateReportRequest, Paginated, ReportDto, UpdateReportRequest};
use serde_json::{Map, Value};
use services::{FilterMap, reports};
use tracing::{debug, info, instrument};

/// Record a visit report with its sample and product lines
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    tag = "reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report created successfully", body = ApiResponse<ReportDto>),
        (status = 404, description = "A referenced row does not exist", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_report(
    State(state): State<AppState>,
    Json(request): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReportDto>>), ApiError> {
    let report = reports::create(&state.db, request).await.map_err(api_error)?;
    info!(
        "Report created with ID: {} ({} samples, {} products)",
        report.id,
        report.report_samples.len(),
        report.report_products.len()
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(report, "Report created successfully")),
    ))
}

/// List reports, newest first
///
/// Filters: `type`, `dateInterval=from,to`, `government`, `region`,
/// `delegateId`, `specialtyId`, `sampleId`, `productId` and the text fields.
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "reports",
    params(ListQuery),
    responses(
        (status = 200, description = "Reports retrieved successfully", body = Paginated<ReportDto>)
    )
)]
#[instrument(skip(state))]
pub async fn get_reports(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ListQuery>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<ReportDto>>, ApiError> {
    let filters = query_filters(pairs);
    debug!("Listing reports with {} filters", filters.len());
    let page = reports::list(
        &state.db,
        &filters,
        query.search.as_deref(),
        query.page_request(),
    )
    .await
    .map_err(api_error)?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/reports/filter",
    tag = "reports",
    responses(
        (status = 200, description = "Matching reports", body = Vec<ReportDto>)
    )
)]
#[instrument(skip(state))]
pub async fn filter_reports(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Vec<ReportDto>>, ApiError> {
    let rows = reports::filter(&state.db, &FilterMap::from_json(&body))
        .await
        .map_err(api_error)?;
    Ok(Json(rows))
}

/// Get a report with its lines
#[utoipa::path(
    get,
    path = "/api/v1/reports/{report_id}",
    tag = "reports",
    params(
        ("report_id" = i32, Path, description = "Report ID"),
    ),
    responses(
        (status = 200, description = "Report retrieved successfully", body = ApiResponse<ReportDto>),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_report(
    Path(report_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReportDto>>, ApiError> {
    let report = reports::get(&state.db, report_id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::ok(report, "Report retrieved successfully")))
}

#[utoipa::path(
    put,
    path = "/api/v1/reports/{report_id}",
    tag = "reports",
    params(
        ("report_id" = i32, Path, description = "Report ID"),
    ),
    request_body = UpdateReportRequest,
    responses(
        (status = 200, description = "Report updated successfully", body = ApiResponse<ReportDto>),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_report(
    Path(report_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateReportRequest>,
) -> Result<Json<ApiResponse<ReportDto>>, ApiError> {
    let report = reports::update(&state.db, report_id, request)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(report, "Report updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reports/{report_id}",
    tag = "reports",
    params(
        ("report_id" = i32, Path, description = "Report ID"),
    ),
    responses(
        (status = 200, description = "Report deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_report(
    Path(report_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    reports::delete(&state.db, report_id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        format!("Report {} deleted", report_id),
        "Report deleted successfully",
    )))
}
