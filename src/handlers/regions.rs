use crate::handlers::{ApiError, api_error, query_filters};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{CreateRegionRequest, Paginated, RegionDto, UpdateRegionRequest};
use serde_json::{Map, Value};
use services::{FilterMap, regions};
use tracing::{info, instrument};

/// Create a region under an existing government
#[utoipa::path(
    post,
    path = "/api/v1/regions",
    tag = "regions",
    request_body = CreateRegionRequest,
    responses(
        (status = 201, description = "Region created successfully", body = ApiResponse<RegionDto>),
        (status = 404, description = "Government not found", body = ErrorResponse),
        (status = 409, description = "Region already exists in this government", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_region(
    State(state): State<AppState>,
    Json(request): Json<CreateRegionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegionDto>>), ApiError> {
    let region = regions::create(&state.db, request).await.map_err(api_error)?;
    info!("Region created with ID: {}", region.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(region, "Region created successfully")),
    ))
}

/// List regions, filterable by `government` ids
#[utoipa::path(
    get,
    path = "/api/v1/regions",
    tag = "regions",
    params(ListQuery),
    responses(
        (status = 200, description = "Regions retrieved successfully", body = Paginated<RegionDto>),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_regions(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ListQuery>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<RegionDto>>, ApiError> {
    let filters = query_filters(pairs);
    let page = regions::list(
        &state.db,
        &filters,
        query.search.as_deref(),
        query.page_request(),
    )
    .await
    .map_err(api_error)?;
    Ok(Json(page))
}

/// Exact-match filter over regions
#[utoipa::path(
    post,
    path = "/api/v1/regions/filter",
    tag = "regions",
    responses(
        (status = 200, description = "Matching regions", body = Vec<RegionDto>)
    )
)]
#[instrument(skip(state))]
pub async fn filter_regions(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Vec<RegionDto>>, ApiError> {
    let rows = regions::filter(&state.db, &FilterMap::from_json(&body))
        .await
        .map_err(api_error)?;
    Ok(Json(rows))
}

/// Get a region with its government
#[utoipa::path(
    get,
    path = "/api/v1/regions/{region_id}",
    tag = "regions",
    params(
        ("region_id" = i32, Path, description = "Region ID"),
    ),
    responses(
        (status = 200, description = "Region retrieved successfully", body = ApiResponse<RegionDto>),
        (status = 404, description = "Region not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_region(
    Path(region_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RegionDto>>, ApiError> {
    let region = regions::get(&state.db, region_id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::ok(region, "Region retrieved successfully")))
}

/// Update a region
#[utoipa::path(
    put,
    path = "/api/v1/regions/{region_id}",
    tag = "regions",
    params(
        ("region_id" = i32, Path, description = "Region ID"),
    ),
    request_body = UpdateRegionRequest,
    responses(
        (status = 200, description = "Region updated successfully", body = ApiResponse<RegionDto>),
        (status = 404, description = "Region or government not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_region(
    Path(region_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateRegionRequest>,
) -> Result<Json<ApiResponse<RegionDto>>, ApiError> {
    let region = regions::update(&state.db, region_id, request)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(region, "Region updated successfully")))
}

/// Delete a region
#[utoipa::path(
    delete,
    path = "/api/v1/regions/{region_id}",
    tag = "regions",
    params(
        ("region_id" = i32, Path, description = "Region ID"),
    ),
    responses(
        (status = 200, description = "Region deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Region not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_region(
    Path(region_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    regions::delete(&state.db, region_id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        format!("Region {} deleted", region_id),
        "Region deleted successfully",
    )))
}
