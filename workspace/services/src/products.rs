use common::{CreateProductRequest, Paginated, ProductDto, UpdateProductRequest};
use model::entities::product;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::fetch;
use crate::filter::fields::{PRODUCT_FIELDS, PRODUCT_SEARCH};
use crate::filter::{FilterBuilder, FilterMap, MatchMode, search_condition};
use crate::pagination::{PageRequest, fetch_page};

pub(crate) fn to_dto(model: product::Model) -> ProductDto {
    ProductDto {
        id: model.id,
        name: model.name,
        price: model.price,
        family: model.family,
        product_creation_date: model.product_creation_date,
        product_code: model.product_code,
        bar_code: model.bar_code,
    }
}

/// Parses a price written with either a decimal comma or point. Zero when unparseable.
pub fn parse_price(raw: &str) -> Decimal {
    raw.trim()
        .replacen(',', ".", 1)
        .parse::<Decimal>()
        .unwrap_or(Decimal::ZERO)
}

/// An existing product matching any of the given unique values, ignoring case.
pub(crate) async fn find_duplicate<C: ConnectionTrait>(
    db: &C,
    name: Option<&str>,
    product_code: Option<&str>,
    bar_code: Option<&str>,
    exclude_id: Option<i32>,
) -> Result<Option<product::Model>> {
    let name = name.map(fetch::fold);
    let product_code = product_code.map(fetch::fold);
    let bar_code = bar_code.map(fetch::fold);
    if name.is_none() && product_code.is_none() && bar_code.is_none() {
        return Ok(None);
    }

    let mut select = product::Entity::find().order_by_asc(product::Column::Id);
    if let Some(id) = exclude_id {
        select = select.filter(product::Column::Id.ne(id));
    }
    let found = fetch::find_first(db, select, |p| {
        fetch::folds_to(name.as_deref(), Some(&p.name))
            || fetch::folds_to(product_code.as_deref(), p.product_code.as_deref())
            || fetch::folds_to(bar_code.as_deref(), p.bar_code.as_deref())
    })
    .await?;
    Ok(found)
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, request: CreateProductRequest) -> Result<ProductDto> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::Validation("Product name is required".to_string()));
    }
    if let Some(existing) = find_duplicate(
        db,
        Some(&name),
        request.product_code.as_deref(),
        request.bar_code.as_deref(),
        None,
    )
    .await?
    {
        warn!("Product conflicts with existing ID: {}", existing.id);
        return Err(ServiceError::Conflict(
            "Product with the same name, product code or bar code already exists".to_string(),
        ));
    }

    let model = product::ActiveModel {
        name: Set(name),
        price: Set(request.price.unwrap_or(Decimal::ZERO)),
        family: Set(request.family),
        product_creation_date: Set(request.product_creation_date),
        product_code: Set(request.product_code),
        bar_code: Set(request.bar_code),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(ServiceError::from_write)?;

    info!("Product created with ID: {}, name: {}", model.id, model.name);
    Ok(to_dto(model))
}

#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filters: &FilterMap,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Paginated<ProductDto>> {
    let mut select = product::Entity::find()
        .filter(FilterBuilder::new(PRODUCT_FIELDS).build(filters))
        .order_by_asc(product::Column::Id);
    if let Some(condition) = search_condition(search, PRODUCT_SEARCH) {
        select = select.filter(condition);
    }

    let (rows, total) = fetch_page(db, select, &page).await?;
    debug!("Retrieved {} of {} products", rows.len(), total);
    Ok(page.wrap(rows.into_iter().map(to_dto).collect(), total))
}

#[instrument(skip(db))]
pub async fn filter(db: &DatabaseConnection, filters: &FilterMap) -> Result<Vec<ProductDto>> {
    let rows = product::Entity::find()
        .filter(
            FilterBuilder::new(PRODUCT_FIELDS)
                .with_mode(MatchMode::Exact)
                .build(filters),
        )
        .order_by_asc(product::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(to_dto).collect())
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<ProductDto> {
    product::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(to_dto)
        .ok_or_else(|| ServiceError::not_found("Product", id))
}

pub fn apply_product_update(
    existing: product::Model,
    request: UpdateProductRequest,
) -> product::ActiveModel {
    let mut active: product::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(price) = request.price {
        active.price = Set(price);
    }
    if let Some(family) = request.family {
        active.family = Set(Some(family));
    }
    if let Some(date) = request.product_creation_date {
        active.product_creation_date = Set(Some(date));
    }
    if let Some(code) = request.product_code {
        active.product_code = Set(Some(code));
    }
    if let Some(bar_code) = request.bar_code {
        active.bar_code = Set(Some(bar_code));
    }
    active
}

#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateProductRequest,
) -> Result<ProductDto> {
    let existing = product::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product", id))?;
    if find_duplicate(
        db,
        request.name.as_deref().map(str::trim),
        request.product_code.as_deref(),
        request.bar_code.as_deref(),
        Some(id),
    )
    .await?
    .is_some()
    {
        return Err(ServiceError::Conflict(
            "Product with the same name, product code or bar code already exists".to_string(),
        ));
    }

    let active = apply_product_update(existing.clone(), request);
    if !active.is_changed() {
        debug!("No fields to update for product ID: {}", id);
        return Ok(to_dto(existing));
    }
    let updated = active.update(db).await.map_err(ServiceError::from_write)?;
    info!("Product with ID {} updated", id);
    Ok(to_dto(updated))
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
    let result = product::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        warn!("Product with ID {} not found for deletion", id);
        return Err(ServiceError::not_found("Product", id));
    }
    info!("Product with ID {} deleted", id);
    Ok(())
}
