use crate::handlers::{ApiError, api_error, query_filters, read_upload};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, FormatQuery, ListQuery};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{CreateProductRequest, ImportSummary, Paginated, ProductDto, UpdateProductRequest};
use serde_json::{Map, Value};
use services::import::{self, ImportFormat};
use services::{FilterMap, products};
use tracing::{debug, info, instrument};

/// Create a product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created successfully", body = ApiResponse<ProductDto>),
        (status = 409, description = "Name, product code or bar code already used", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductDto>>), ApiError> {
    let product = products::create(&state.db, request)
        .await
        .map_err(api_error)?;
    info!("Product created with ID: {}", product.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(product, "Product created successfully")),
    ))
}

/// List products with dynamic filters
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    params(ListQuery),
    responses(
        (status = 200, description = "Products retrieved successfully", body = Paginated<ProductDto>)
    )
)]
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ListQuery>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<ProductDto>>, ApiError> {
    let page = products::list(
        &state.db,
        &query_filters(pairs),
        query.search.as_deref(),
        query.page_request(),
    )
    .await
    .map_err(api_error)?;
    Ok(Json(page))
}

/// Exact-match filter over products
#[utoipa::path(
    post,
    path = "/api/v1/products/filter",
    tag = "products",
    responses(
        (status = 200, description = "Matching products", body = Vec<ProductDto>)
    )
)]
#[instrument(skip(state))]
pub async fn filter_products(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let rows = products::filter(&state.db, &FilterMap::from_json(&body))
        .await
        .map_err(api_error)?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product retrieved successfully", body = ApiResponse<ProductDto>),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let product = products::get(&state.db, product_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(product, "Product retrieved successfully")))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated successfully", body = ApiResponse<ProductDto>),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Name, product code or bar code already used", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let product = products::update(&state.db, product_id, request)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(product, "Product updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    products::delete(&state.db, product_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        format!("Product {} deleted", product_id),
        "Product deleted successfully",
    )))
}

/// Import products from a CSV upload (multipart field `file`)
///
/// Rows matching an existing product by name or code are skipped.
#[utoipa::path(
    post,
    path = "/api/v1/products/import",
    tag = "products",
    params(FormatQuery),
    responses(
        (status = 200, description = "Import finished", body = ApiResponse<ImportSummary>),
        (status = 400, description = "Unsupported format or malformed payload", body = ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn import_products(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImportSummary>>, ApiError> {
    let format: ImportFormat = query.format().parse().map_err(api_error)?;
    let data = read_upload(multipart).await?;
    debug!("Received {} bytes for product import", data.len());

    let summary = import::import_products(&state.db, &data, format, &state.notifier)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::ok(summary, "Products imported successfully")))
}
