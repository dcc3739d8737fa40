use crate::handlers::{ApiError, api_error, query_filters};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{
    AssignPersonsRequest, CreateDelegateRequest, DelegateDto, Paginated, UpdateDelegateRequest,
};
use services::delegates;
use tracing::{info, instrument};

/// Create a delegate and the user account it logs in with
#[utoipa::path(
    post,
    path = "/api/v1/delegates",
    tag = "delegates",
    request_body = CreateDelegateRequest,
    responses(
        (status = 201, description = "Delegate created successfully", body = ApiResponse<DelegateDto>),
        (status = 400, description = "Email or password missing", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_delegate(
    State(state): State<AppState>,
    Json(request): Json<CreateDelegateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DelegateDto>>), ApiError> {
    let delegate = delegates::create(&state.db, request)
        .await
        .map_err(api_error)?;
    info!("Delegate created with ID: {}", delegate.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(delegate, "Delegate created successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/delegates",
    tag = "delegates",
    params(ListQuery),
    responses(
        (status = 200, description = "Delegates retrieved successfully", body = Paginated<DelegateDto>)
    )
)]
#[instrument(skip(state))]
pub async fn get_delegates(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ListQuery>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<DelegateDto>>, ApiError> {
    let page = delegates::list(
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
    path = "/api/v1/delegates/{delegate_id}",
    tag = "delegates",
    params(
        ("delegate_id" = i32, Path, description = "Delegate ID"),
    ),
    responses(
        (status = 200, description = "Delegate retrieved successfully", body = ApiResponse<DelegateDto>),
        (status = 404, description = "Delegate not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_delegate(
    Path(delegate_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DelegateDto>>, ApiError> {
    let delegate = delegates::get(&state.db, delegate_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(delegate, "Delegate retrieved successfully")))
}

#[utoipa::path(
    put,
    path = "/api/v1/delegates/{delegate_id}",
    tag = "delegates",
    params(
        ("delegate_id" = i32, Path, description = "Delegate ID"),
    ),
    request_body = UpdateDelegateRequest,
    responses(
        (status = 200, description = "Delegate updated successfully", body = ApiResponse<DelegateDto>),
        (status = 404, description = "Delegate not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_delegate(
    Path(delegate_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateDelegateRequest>,
) -> Result<Json<ApiResponse<DelegateDto>>, ApiError> {
    let delegate = delegates::update(&state.db, delegate_id, request)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(delegate, "Delegate updated successfully")))
}

/// Add persons to a delegate's assignments
///
/// The new ids are merged with the existing ones.
#[utoipa::path(
    post,
    path = "/api/v1/delegates/{delegate_id}/assign-persons",
    tag = "delegates",
    params(
        ("delegate_id" = i32, Path, description = "Delegate ID"),
    ),
    request_body = AssignPersonsRequest,
    responses(
        (status = 200, description = "Persons assigned", body = ApiResponse<DelegateDto>),
        (status = 404, description = "Delegate or persons not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn assign_persons(
    Path(delegate_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<AssignPersonsRequest>,
) -> Result<Json<ApiResponse<DelegateDto>>, ApiError> {
    let delegate = delegates::assign_persons(&state.db, delegate_id, request)
        .await
        .map_err(api_error)?;
    info!(
        "Delegate {} now has {} persons",
        delegate.id,
        delegate.person_ids.len()
    );
    Ok(Json(ApiResponse::ok(delegate, "Persons assigned successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/delegates/{delegate_id}",
    tag = "delegates",
    params(
        ("delegate_id" = i32, Path, description = "Delegate ID"),
    ),
    responses(
        (status = 200, description = "Delegate deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Delegate not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_delegate(
    Path(delegate_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    delegates::delete(&state.db, delegate_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        format!("Delegate {} deleted", delegate_id),
        "Delegate deleted successfully",
    )))
}
