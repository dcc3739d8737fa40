use crate::handlers::{ApiError, api_error, query_filters};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{CreateSpecialtyRequest, Paginated, SpecialtyDto, UpdateSpecialtyRequest};
use services::specialties;
use tracing::{info, instrument};

/// Create a doctor specialty
#[utoipa::path(
    post,
    path = "/api/v1/specialties",
    tag = "specialties",
    request_body = CreateSpecialtyRequest,
    responses(
        (status = 201, description = "Specialty created successfully", body = ApiResponse<SpecialtyDto>),
        (status = 409, description = "Name or abbreviation already used", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_specialty(
    State(state): State<AppState>,
    Json(request): Json<CreateSpecialtyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SpecialtyDto>>), ApiError> {
    let specialty = specialties::create(&state.db, request)
        .await
        .map_err(api_error)?;
    info!("Specialty created with ID: {}", specialty.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(specialty, "Specialty created successfully")),
    ))
}

/// List specialties by name
#[utoipa::path(
    get,
    path = "/api/v1/specialties",
    tag = "specialties",
    params(ListQuery),
    responses(
        (status = 200, description = "Specialties retrieved successfully", body = Paginated<SpecialtyDto>)
    )
)]
#[instrument(skip(state))]
pub async fn get_specialties(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ListQuery>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<SpecialtyDto>>, ApiError> {
    let page = specialties::list(
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
    get,
    path = "/api/v1/specialties/{specialty_id}",
    tag = "specialties",
    params(
        ("specialty_id" = i32, Path, description = "Specialty ID"),
    ),
    responses(
        (status = 200, description = "Specialty retrieved successfully", body = ApiResponse<SpecialtyDto>),
        (status = 404, description = "Specialty not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_specialty(
    Path(specialty_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SpecialtyDto>>, ApiError> {
    let specialty = specialties::get(&state.db, specialty_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        specialty,
        "Specialty retrieved successfully",
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/specialties/{specialty_id}",
    tag = "specialties",
    params(
        ("specialty_id" = i32, Path, description = "Specialty ID"),
    ),
    request_body = UpdateSpecialtyRequest,
    responses(
        (status = 200, description = "Specialty updated successfully", body = ApiResponse<SpecialtyDto>),
        (status = 404, description = "Specialty not found", body = ErrorResponse),
        (status = 409, description = "Name or abbreviation already used", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_specialty(
    Path(specialty_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateSpecialtyRequest>,
) -> Result<Json<ApiResponse<SpecialtyDto>>, ApiError> {
    let specialty = specialties::update(&state.db, specialty_id, request)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        specialty,
        "Specialty updated successfully",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/specialties/{specialty_id}",
    tag = "specialties",
    params(
        ("specialty_id" = i32, Path, description = "Specialty ID"),
    ),
    responses(
        (status = 200, description = "Specialty deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Specialty not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_specialty(
    Path(specialty_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    specialties::delete(&state.db, specialty_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        format!("Specialty {} deleted", specialty_id),
        "Specialty deleted successfully",
    )))
}
