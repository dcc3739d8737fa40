use common::{CreateGovernmentRequest, GovernmentDto, Paginated, UpdateGovernmentRequest};
use model::entities::government;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::fetch;
use crate::filter::fields::{GOVERNMENT_FIELDS, GOVERNMENT_SEARCH};
use crate::filter::{FilterBuilder, FilterMap, MatchMode, search_condition};
use crate::pagination::{PageRequest, fetch_page};

pub(crate) fn to_dto(model: government::Model) -> GovernmentDto {
    GovernmentDto {
        id: model.id,
        name: model.name,
    }
}

/// Case-insensitive lookup by name.
pub(crate) async fn find_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<government::Model>> {
    let wanted = fetch::fold(name);
    let select = government::Entity::find().order_by_asc(government::Column::Id);
    let found = fetch::find_first(db, select, |g| fetch::fold(&g.name) == wanted).await?;
    Ok(found)
}

pub(crate) async fn require<C: ConnectionTrait>(db: &C, id: i32) -> Result<government::Model> {
    government::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Government", id))
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, request: CreateGovernmentRequest) -> Result<GovernmentDto> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::Validation("Government name is required".to_string()));
    }

    let model = government::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(ServiceError::from_write)?;

    info!("Government created with ID: {}, name: {}", model.id, model.name);
    Ok(to_dto(model))
}

#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filters: &FilterMap,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Paginated<GovernmentDto>> {
    let mut select = government::Entity::find()
        .filter(FilterBuilder::new(GOVERNMENT_FIELDS).build(filters))
        .order_by_asc(government::Column::Name);
    if let Some(condition) = search_condition(search, GOVERNMENT_SEARCH) {
        select = select.filter(condition);
    }

    let (rows, total) = fetch_page(db, select, &page).await?;
    debug!("Retrieved {} of {} governments", rows.len(), total);
    Ok(page.wrap(rows.into_iter().map(to_dto).collect(), total))
}

#[instrument(skip(db))]
pub async fn filter(db: &DatabaseConnection, filters: &FilterMap) -> Result<Vec<GovernmentDto>> {
    let rows = government::Entity::find()
        .filter(
            FilterBuilder::new(GOVERNMENT_FIELDS)
                .with_mode(MatchMode::Exact)
                .build(filters),
        )
        .order_by_asc(government::Column::Name)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(to_dto).collect())
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<GovernmentDto> {
    require(db, id).await.map(to_dto)
}

/// Applies the present fields of `request` onto `existing`.
pub fn apply_government_update(existing: government::Model, request: UpdateGovernmentRequest) -> government::ActiveModel {
    let mut active: government::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name.trim().to_string());
    }
    active
}

#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateGovernmentRequest,
) -> Result<GovernmentDto> {
    let existing = require(db, id).await?;
    let active = apply_government_update(existing.clone(), request);
    if !active.is_changed() {
        debug!("No fields to update for government ID: {}", id);
        return Ok(to_dto(existing));
    }

    let updated = active.update(db).await.map_err(ServiceError::from_write)?;
    info!("Government with ID {} updated", id);
    Ok(to_dto(updated))
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
    let result = government::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(ServiceError::from_write)?;
    if result.rows_affected == 0 {
        warn!("Government with ID {} not found for deletion", id);
        return Err(ServiceError::not_found("Government", id));
    }
    info!("Government with ID {} deleted", id);
    Ok(())
}
