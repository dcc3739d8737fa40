use common::{CreateSampleRequest, Paginated, SampleDto, UpdateSampleRequest};
use model::entities::sample;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::fetch;
use crate::filter::fields::{SAMPLE_FIELDS, SAMPLE_SEARCH};
use crate::filter::{FilterBuilder, FilterMap, MatchMode, search_condition};
use crate::pagination::{PageRequest, fetch_page};

pub(crate) fn to_dto(model: sample::Model) -> SampleDto {
    SampleDto {
        id: model.id,
        name: model.name,
        sample_code: model.sample_code,
    }
}

/// An existing sample with the same name or code, ignoring case.
pub(crate) async fn find_duplicate<C: ConnectionTrait>(
    db: &C,
    name: Option<&str>,
    sample_code: Option<&str>,
    exclude_id: Option<i32>,
) -> Result<Option<sample::Model>> {
    let name = name.map(fetch::fold);
    let sample_code = sample_code.map(fetch::fold);
    if name.is_none() && sample_code.is_none() {
        return Ok(None);
    }

    let mut select = sample::Entity::find().order_by_asc(sample::Column::Id);
    if let Some(id) = exclude_id {
        select = select.filter(sample::Column::Id.ne(id));
    }
    let found = fetch::find_first(db, select, |s| {
        fetch::folds_to(name.as_deref(), Some(&s.name))
            || fetch::folds_to(sample_code.as_deref(), s.sample_code.as_deref())
    })
    .await?;
    Ok(found)
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, request: CreateSampleRequest) -> Result<SampleDto> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::Validation("Sample name is required".to_string()));
    }
    if let Some(existing) = find_duplicate(db, Some(&name), request.sample_code.as_deref(), None).await? {
        warn!("Sample conflicts with existing ID: {}", existing.id);
        return Err(ServiceError::Conflict(
            "Sample with the same name or code already exists".to_string(),
        ));
    }

    let model = sample::ActiveModel {
        name: Set(name),
        sample_code: Set(request.sample_code),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(ServiceError::from_write)?;

    info!("Sample created with ID: {}, name: {}", model.id, model.name);
    Ok(to_dto(model))
}

#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filters: &FilterMap,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Paginated<SampleDto>> {
    let mut select = sample::Entity::find()
        .filter(FilterBuilder::new(SAMPLE_FIELDS).build(filters))
        .order_by_asc(sample::Column::Id);
    if let Some(condition) = search_condition(search, SAMPLE_SEARCH) {
        select = select.filter(condition);
    }

    let (rows, total) = fetch_page(db, select, &page).await?;
    debug!("Retrieved {} of {} samples", rows.len(), total);
    Ok(page.wrap(rows.into_iter().map(to_dto).collect(), total))
}

#[instrument(skip(db))]
pub async fn filter(db: &DatabaseConnection, filters: &FilterMap) -> Result<Vec<SampleDto>> {
    let rows = sample::Entity::find()
        .filter(
            FilterBuilder::new(SAMPLE_FIELDS)
                .with_mode(MatchMode::Exact)
                .build(filters),
        )
        .order_by_asc(sample::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(to_dto).collect())
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<SampleDto> {
    sample::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(to_dto)
        .ok_or_else(|| ServiceError::not_found("Sample", id))
}

pub fn apply_sample_update(existing: sample::Model, request: UpdateSampleRequest) -> sample::ActiveModel {
    let mut active: sample::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(code) = request.sample_code {
        active.sample_code = Set(Some(code));
    }
    active
}

#[instrument(skip(db))]
pub async fn update(db: &DatabaseConnection, id: i32, request: UpdateSampleRequest) -> Result<SampleDto> {
    let existing = sample::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Sample", id))?;
    if find_duplicate(
        db,
        request.name.as_deref().map(str::trim),
        request.sample_code.as_deref(),
        Some(id),
    )
    .await?
    .is_some()
    {
        return Err(ServiceError::Conflict(
            "Sample with the same name or code already exists".to_string(),
        ));
    }

    let active = apply_sample_update(existing.clone(), request);
    if !active.is_changed() {
        debug!("No fields to update for sample ID: {}", id);
        return Ok(to_dto(existing));
    }
    let updated = active.update(db).await.map_err(ServiceError::from_write)?;
    info!("Sample with ID {} updated", id);
    Ok(to_dto(updated))
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
    let result = sample::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        warn!("Sample with ID {} not found for deletion", id);
        return Err(ServiceError::not_found("Sample", id));
    }
    info!("Sample with ID {} deleted", id);
    Ok(())
}
