use crate::handlers::{ApiError, api_error, query_filters};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{CreateGovernmentRequest, GovernmentDto, Paginated, UpdateGovernmentRequest};
use serde_json::{Map, Value};
use services::{FilterMap, governments};
use tracing::{debug, info, instrument, trace};

/// Create a new government
#[utoipa::path(
    post,
    path = "/api/v1/governments",
    tag = "governments",
    request_body = CreateGovernmentRequest,
    responses(
        (status = 201, description = "Government created successfully", body = ApiResponse<GovernmentDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Government already exists", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_government(
    State(state): State<AppState>,
    Json(request): Json<CreateGovernmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GovernmentDto>>), ApiError> {
    trace!("Entering create_government function");
    let government = governments::create(&state.db, request)
        .await
        .map_err(api_error)?;
    info!("Government created with ID: {}", government.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(government, "Government created successfully")),
    ))
}

/// List governments by name
#[utoipa::path(
    get,
    path = "/api/v1/governments",
    tag = "governments",
    params(ListQuery),
    responses(
        (status = 200, description = "Governments retrieved successfully", body = Paginated<GovernmentDto>),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_governments(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ListQuery>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<GovernmentDto>>, ApiError> {
    let filters = query_filters(pairs);
    debug!("Listing governments with {} filters", filters.len());
    let page = governments::list(
        &state.db,
        &filters,
        query.search.as_deref(),
        query.page_request(),
    )
    .await
    .map_err(api_error)?;
    Ok(Json(page))
}

/// Exact-match filter over governments
#[utoipa::path(
    post,
    path = "/api/v1/governments/filter",
    tag = "governments",
    responses(
        (status = 200, description = "Matching governments", body = Vec<GovernmentDto>)
    )
)]
#[instrument(skip(state))]
pub async fn filter_governments(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Vec<GovernmentDto>>, ApiError> {
    let filters = FilterMap::from_json(&body);
    let rows = governments::filter(&state.db, &filters)
        .await
        .map_err(api_error)?;
    Ok(Json(rows))
}

/// Get a specific government by ID
#[utoipa::path(
    get,
    path = "/api/v1/governments/{government_id}",
    tag = "governments",
    params(
        ("government_id" = i32, Path, description = "Government ID"),
    ),
    responses(
        (status = 200, description = "Government retrieved successfully", body = ApiResponse<GovernmentDto>),
        (status = 404, description = "Government not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_government(
    Path(government_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<GovernmentDto>>, ApiError> {
    let government = governments::get(&state.db, government_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        government,
        "Government retrieved successfully",
    )))
}

/// Update a government
#[utoipa::path(
    put,
    path = "/api/v1/governments/{government_id}",
    tag = "governments",
    params(
        ("government_id" = i32, Path, description = "Government ID"),
    ),
    request_body = UpdateGovernmentRequest,
    responses(
        (status = 200, description = "Government updated successfully", body = ApiResponse<GovernmentDto>),
        (status = 404, description = "Government not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_government(
    Path(government_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateGovernmentRequest>,
) -> Result<Json<ApiResponse<GovernmentDto>>, ApiError> {
    let government = governments::update(&state.db, government_id, request)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        government,
        "Government updated successfully",
    )))
}

/// Delete a government
#[utoipa::path(
    delete,
    path = "/api/v1/governments/{government_id}",
    tag = "governments",
    params(
        ("government_id" = i32, Path, description = "Government ID"),
    ),
    responses(
        (status = 200, description = "Government deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Government not found", body = ErrorResponse),
        (status = 409, description = "Government is still referenced", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_government(
    Path(government_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    governments::delete(&state.db, government_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        format!("Government {} deleted", government_id),
        "Government deleted successfully",
    )))
}
