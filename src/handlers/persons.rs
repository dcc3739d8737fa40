use crate::handlers::{ApiError, api_error, query_filters, read_upload};
use crate::schemas::{
    ApiResponse, AppState, DelegateIdsQuery, DelegatePersonsQuery, ErrorResponse, FormatQuery,
    ListQuery,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json},
};
use axum_valid::Valid;
use common::{CreatePersonRequest, ImportSummary, Paginated, PersonDto, UpdatePersonRequest};
use serde_json::{Map, Value};
use services::import::{self, ImportFormat, PersonImportMode};
use services::{FilterMap, PageRequest, export, persons};
use tracing::{debug, info, instrument, trace};

/// Create a person together with its doctor, pharmacist or wholesaler detail
#[utoipa::path(
    post,
    path = "/api/v1/persons",
    tag = "persons",
    request_body = CreatePersonRequest,
    responses(
        (status = 201, description = "Person created successfully", body = ApiResponse<PersonDto>),
        (status = 400, description = "Zero or several type details", body = ErrorResponse),
        (status = 404, description = "Government, region or specialty not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_person(
    State(state): State<AppState>,
    Json(request): Json<CreatePersonRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PersonDto>>), ApiError> {
    trace!("Entering create_person function");
    let person = persons::create(&state.db, request).await.map_err(api_error)?;
    info!("Person created with ID: {}, type: {}", person.id, person.person_type);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(person, "Person created successfully")),
    ))
}

/// List persons with dynamic filters
///
/// Any query key besides `page`, `limit` and `search` is a filter, e.g.
/// `type=1&specialty=2,3&government=1`. Doctor-only keys are ignored unless
/// `type` selects doctors.
#[utoipa::path(
    get,
    path = "/api/v1/persons",
    tag = "persons",
    params(ListQuery),
    responses(
        (status = 200, description = "Persons retrieved successfully", body = Paginated<PersonDto>),
        (status = 400, description = "Invalid paging parameters or person type", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_persons(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ListQuery>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<PersonDto>>, ApiError> {
    let filters = query_filters(pairs);
    debug!("Listing persons with {} filters", filters.len());
    let page = persons::list(
        &state.db,
        &filters,
        query.search.as_deref(),
        query.page_request(),
    )
    .await
    .map_err(api_error)?;
    Ok(Json(page))
}

/// Exact-match filter over persons
#[utoipa::path(
    post,
    path = "/api/v1/persons/filter",
    tag = "persons",
    responses(
        (status = 200, description = "Matching persons", body = Vec<PersonDto>),
        (status = 400, description = "Invalid person type", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn filter_persons(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Vec<PersonDto>>, ApiError> {
    let rows = persons::filter(&state.db, &FilterMap::from_json(&body))
        .await
        .map_err(api_error)?;
    Ok(Json(rows))
}

/// List persons of one type
#[utoipa::path(
    get,
    path = "/api/v1/persons/type/{type_id}",
    tag = "persons",
    params(
        ("type_id" = i32, Path, description = "1 = doctor, 2 = pharmacist, 3 = wholesaler"),
        ListQuery,
    ),
    responses(
        (status = 200, description = "Persons retrieved successfully", body = Paginated<PersonDto>),
        (status = 400, description = "Invalid person type", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_persons_by_type(
    Path(type_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ListQuery>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<PersonDto>>, ApiError> {
    let page = persons::list_by_type(
        &state.db,
        type_id,
        &query_filters(pairs),
        query.search.as_deref(),
        query.page_request(),
    )
    .await
    .map_err(api_error)?;
    Ok(Json(page))
}

/// List the persons assigned to a delegate
#[utoipa::path(
    get,
    path = "/api/v1/persons/delegate/{delegate_id}",
    tag = "persons",
    params(
        ("delegate_id" = i32, Path, description = "Delegate ID"),
        DelegatePersonsQuery,
    ),
    responses(
        (status = 200, description = "Persons retrieved successfully", body = Paginated<PersonDto>),
        (status = 400, description = "Missing or invalid typeIds", body = ErrorResponse),
        (status = 404, description = "Delegate not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_persons_by_delegate(
    Path(delegate_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<DelegatePersonsQuery>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<PersonDto>>, ApiError> {
    let filters = FilterMap::from_query_pairs(pairs, &DelegatePersonsQuery::RESERVED);
    let page = persons::list_by_delegate(
        &state.db,
        delegate_id,
        query.type_ids.as_deref(),
        &filters,
        query.search.as_deref(),
        PageRequest::new(query.page, query.limit),
    )
    .await
    .map_err(api_error)?;
    Ok(Json(page))
}

/// List persons of a type that are not assigned to a delegate
#[utoipa::path(
    get,
    path = "/api/v1/persons/not-delegate/{delegate_id}/{type_id}",
    tag = "persons",
    params(
        ("delegate_id" = i32, Path, description = "Delegate ID"),
        ("type_id" = i32, Path, description = "1 = doctor, 2 = pharmacist, 3 = wholesaler"),
        ListQuery,
    ),
    responses(
        (status = 200, description = "Persons retrieved successfully", body = Paginated<PersonDto>),
        (status = 400, description = "Invalid person type", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_persons_not_assigned(
    Path((delegate_id, type_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ListQuery>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<PersonDto>>, ApiError> {
    let page = persons::list_not_assigned(
        &state.db,
        delegate_id,
        type_id,
        &query_filters(pairs),
        query.search.as_deref(),
        query.page_request(),
    )
    .await
    .map_err(api_error)?;
    Ok(Json(page))
}

/// Get a person with its geography and type detail
#[utoipa::path(
    get,
    path = "/api/v1/persons/{person_id}",
    tag = "persons",
    params(
        ("person_id" = i32, Path, description = "Person ID"),
    ),
    responses(
        (status = 200, description = "Person retrieved successfully", body = ApiResponse<PersonDto>),
        (status = 404, description = "Person not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_person(
    Path(person_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PersonDto>>, ApiError> {
    let person = persons::get(&state.db, person_id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::ok(person, "Person retrieved successfully")))
}

/// Update a person and its type detail
#[utoipa::path(
    put,
    path = "/api/v1/persons/{person_id}",
    tag = "persons",
    params(
        ("person_id" = i32, Path, description = "Person ID"),
    ),
    request_body = UpdatePersonRequest,
    responses(
        (status = 200, description = "Person updated successfully", body = ApiResponse<PersonDto>),
        (status = 400, description = "Detail does not match the person type", body = ErrorResponse),
        (status = 404, description = "Person or reference not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_person(
    Path(person_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdatePersonRequest>,
) -> Result<Json<ApiResponse<PersonDto>>, ApiError> {
    let person = persons::update(&state.db, person_id, request)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(person, "Person updated successfully")))
}

/// Delete a person and its type detail
#[utoipa::path(
    delete,
    path = "/api/v1/persons/{person_id}",
    tag = "persons",
    params(
        ("person_id" = i32, Path, description = "Person ID"),
    ),
    responses(
        (status = 200, description = "Person deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Person not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_person(
    Path(person_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    persons::delete(&state.db, person_id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        format!("Person {} deleted", person_id),
        "Person deleted successfully",
    )))
}

/// Remove delegate assignments from a person
///
/// Pairs that are not linked are ignored, so repeating the call is harmless.
#[utoipa::path(
    delete,
    path = "/api/v1/persons/{person_id}/delegates",
    tag = "persons",
    params(
        ("person_id" = i32, Path, description = "Person ID"),
        DelegateIdsQuery,
    ),
    responses(
        (status = 200, description = "Number of links removed", body = ApiResponse<u64>),
        (status = 400, description = "Missing or invalid delegateIds", body = ErrorResponse),
        (status = 404, description = "Person not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn disassociate_delegates(
    Path(person_id): Path<i32>,
    State(state): State<AppState>,
    Query(query): Query<DelegateIdsQuery>,
) -> Result<Json<ApiResponse<u64>>, ApiError> {
    let removed = persons::disassociate_delegates(&state.db, person_id, query.delegate_ids.as_deref())
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(removed, "Delegates disassociated successfully")))
}

async fn run_person_import(
    state: &AppState,
    query: &FormatQuery,
    multipart: Multipart,
    mode: PersonImportMode,
) -> Result<ImportSummary, ApiError> {
    let format: ImportFormat = query.format().parse().map_err(api_error)?;
    let data = read_upload(multipart).await?;
    debug!("Received {} bytes for {:?} person import", data.len(), mode);

    let summary = import::import_persons(&state.db, &data, format, mode, &state.notifier)
        .await
        .map_err(api_error)?;
    info!(?summary, "Person import completed");
    Ok(summary)
}

/// Import doctors from a CSV upload (multipart field `file`)
#[utoipa::path(
    post,
    path = "/api/v1/persons/import/doctors",
    tag = "persons",
    params(FormatQuery),
    responses(
        (status = 200, description = "Import finished", body = ApiResponse<ImportSummary>),
        (status = 400, description = "Unsupported format or malformed payload", body = ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn import_doctors(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImportSummary>>, ApiError> {
    let summary = run_person_import(&state, &query, multipart, PersonImportMode::Doctor).await?;
    Ok(Json(ApiResponse::ok(summary, "Doctors imported successfully")))
}

/// Import pharmacists and wholesalers from a CSV upload (multipart field `file`)
#[utoipa::path(
    post,
    path = "/api/v1/persons/import/others",
    tag = "persons",
    params(FormatQuery),
    responses(
        (status = 200, description = "Import finished", body = ApiResponse<ImportSummary>),
        (status = 400, description = "Unsupported format or malformed payload", body = ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn import_others(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImportSummary>>, ApiError> {
    let summary = run_person_import(&state, &query, multipart, PersonImportMode::Mixed).await?;
    Ok(Json(ApiResponse::ok(summary, "Persons imported successfully")))
}

/// Export every person of a type
#[utoipa::path(
    get,
    path = "/api/v1/persons/export/type/{type_id}",
    tag = "persons",
    params(
        ("type_id" = i32, Path, description = "1 = doctor, 2 = pharmacist, 3 = wholesaler"),
        FormatQuery,
    ),
    responses(
        (status = 200, description = "CSV document", body = String, content_type = "text/csv"),
        (status = 400, description = "Unsupported format or invalid type", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn export_persons(
    Path(type_id): Path<i32>,
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let body = export::export_persons(&state.db, type_id, query.format())
        .await
        .map_err(api_error)?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"persons-type-{}.csv\"", type_id),
        ),
    ];
    Ok((headers, body))
}
