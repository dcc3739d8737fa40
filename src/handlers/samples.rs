use crate::handlers::{ApiError, api_error, query_filters, read_upload};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, FormatQuery, ListQuery};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{CreateSampleRequest, ImportSummary, Paginated, SampleDto, UpdateSampleRequest};
use serde_json::{Map, Value};
use services::import::{self, ImportFormat};
use services::{FilterMap, samples};
use tracing::{debug, info, instrument};

#[utoipa::path(
    post,
    path = "/api/v1/samples",
    tag = "samples",
    request_body = CreateSampleRequest,
    responses(
        (status = 201, description = "Sample created successfully", body = ApiResponse<SampleDto>),
        (status = 409, description = "Name or sample code already used", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_sample(
    State(state): State<AppState>,
    Json(request): Json<CreateSampleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SampleDto>>), ApiError> {
    let sample = samples::create(&state.db, request).await.map_err(api_error)?;
    info!("Sample created with ID: {}", sample.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(sample, "Sample created successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/samples",
    tag = "samples",
    params(ListQuery),
    responses(
        (status = 200, description = "Samples retrieved successfully", body = Paginated<SampleDto>)
    )
)]
#[instrument(skip(state))]
pub async fn get_samples(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ListQuery>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<SampleDto>>, ApiError> {
    let page = samples::list(
        &state.db,
        &query_filters(pairs),
        query.search.as_deref(),
        query.page_request(),
    )
    .await
    .map_err(api_error)?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/samples/filter",
    tag = "samples",
    responses(
        (status = 200, description = "Matching samples", body = Vec<SampleDto>)
    )
)]
#[instrument(skip(state))]
pub async fn filter_samples(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Vec<SampleDto>>, ApiError> {
    let rows = samples::filter(&state.db, &FilterMap::from_json(&body))
        .await
        .map_err(api_error)?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/samples/{sample_id}",
    tag = "samples",
    params(
        ("sample_id" = i32, Path, description = "Sample ID"),
    ),
    responses(
        (status = 200, description = "Sample retrieved successfully", body = ApiResponse<SampleDto>),
        (status = 404, description = "Sample not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sample(
    Path(sample_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SampleDto>>, ApiError> {
    let sample = samples::get(&state.db, sample_id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::ok(sample, "Sample retrieved successfully")))
}

#[utoipa::path(
    put,
    path = "/api/v1/samples/{sample_id}",
    tag = "samples",
    params(
        ("sample_id" = i32, Path, description = "Sample ID"),
    ),
    request_body = UpdateSampleRequest,
    responses(
        (status = 200, description = "Sample updated successfully", body = ApiResponse<SampleDto>),
        (status = 404, description = "Sample not found", body = ErrorResponse),
        (status = 409, description = "Name or sample code already used", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_sample(
    Path(sample_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateSampleRequest>,
) -> Result<Json<ApiResponse<SampleDto>>, ApiError> {
    let sample = samples::update(&state.db, sample_id, request)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(sample, "Sample updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/samples/{sample_id}",
    tag = "samples",
    params(
        ("sample_id" = i32, Path, description = "Sample ID"),
    ),
    responses(
        (status = 200, description = "Sample deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Sample not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_sample(
    Path(sample_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    samples::delete(&state.db, sample_id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        format!("Sample {} deleted", sample_id),
        "Sample deleted successfully",
    )))
}

/// Import samples from a CSV upload (multipart field `file`)
#[utoipa::path(
    post,
    path = "/api/v1/samples/import",
    tag = "samples",
    params(FormatQuery),
    responses(
        (status = 200, description = "Import finished", body = ApiResponse<ImportSummary>),
        (status = 400, description = "Unsupported format or malformed payload", body = ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn import_samples(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImportSummary>>, ApiError> {
    let format: ImportFormat = query.format().parse().map_err(api_error)?;
    let data = read_upload(multipart).await?;
    debug!("Received {} bytes for sample import", data.len());

    let summary = import::import_samples(&state.db, &data, format, &state.notifier)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(summary, "Samples imported successfully")))
}
