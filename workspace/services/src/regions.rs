use common::{CreateRegionRequest, Paginated, RegionDto, UpdateRegionRequest};
use model::entities::{government, region};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::fetch;
use crate::filter::fields::{REGION_FIELDS, REGION_SEARCH};
use crate::filter::{FilterBuilder, FilterMap, MatchMode, search_condition};
use crate::governments;
use crate::pagination::{PageRequest, fetch_page};

pub(crate) fn to_dto(model: region::Model, government: Option<government::Model>) -> RegionDto {
    RegionDto {
        id: model.id,
        name: model.name,
        government_id: model.government_id,
        government: government.map(governments::to_dto),
    }
}

/// Loads the governments of `regions` in one query and attaches them.
pub(crate) async fn hydrate<C: ConnectionTrait>(
    db: &C,
    regions: Vec<region::Model>,
) -> Result<Vec<RegionDto>> {
    let by_id = fetch::by_ids::<government::Entity, _, _>(
        db,
        government::Column::Id,
        regions.iter().map(|r| r.government_id),
        |g| g.id,
    )
    .await?;

    Ok(regions
        .into_iter()
        .map(|r| {
            let government = by_id.get(&r.government_id).cloned();
            to_dto(r, government)
        })
        .collect())
}

/// Case-insensitive lookup of a region by name within one government.
pub(crate) async fn find_by_name<C: ConnectionTrait>(
    db: &C,
    government_id: i32,
    name: &str,
) -> Result<Option<region::Model>> {
    let wanted = fetch::fold(name);
    let select = region::Entity::find()
        .filter(region::Column::GovernmentId.eq(government_id))
        .order_by_asc(region::Column::Id);
    let found = fetch::find_first(db, select, |r| fetch::fold(&r.name) == wanted).await?;
    Ok(found)
}

pub(crate) async fn require<C: ConnectionTrait>(db: &C, id: i32) -> Result<region::Model> {
    region::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Region", id))
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, request: CreateRegionRequest) -> Result<RegionDto> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::Validation("Region name is required".to_string()));
    }
    let government = governments::require(db, request.government_id).await?;

    let model = region::ActiveModel {
        name: Set(name),
        government_id: Set(government.id),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(ServiceError::from_write)?;

    info!(
        "Region created with ID: {}, name: {}, government: {}",
        model.id, model.name, government.id
    );
    Ok(to_dto(model, Some(government)))
}

#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filters: &FilterMap,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Paginated<RegionDto>> {
    let mut select = region::Entity::find()
        .join(JoinType::LeftJoin, region::Relation::Government.def())
        .filter(FilterBuilder::new(REGION_FIELDS).build(filters))
        .order_by_asc(region::Column::Name);
    if let Some(condition) = search_condition(search, REGION_SEARCH) {
        select = select.filter(condition);
    }

    let (rows, total) = fetch_page(db, select, &page).await?;
    debug!("Retrieved {} of {} regions", rows.len(), total);
    let data = hydrate(db, rows).await?;
    Ok(page.wrap(data, total))
}

#[instrument(skip(db))]
pub async fn filter(db: &DatabaseConnection, filters: &FilterMap) -> Result<Vec<RegionDto>> {
    let rows = region::Entity::find()
        .filter(
            FilterBuilder::new(REGION_FIELDS)
                .with_mode(MatchMode::Exact)
                .build(filters),
        )
        .order_by_asc(region::Column::Name)
        .all(db)
        .await?;
    hydrate(db, rows).await
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<RegionDto> {
    let (model, government) = region::Entity::find_by_id(id)
        .find_also_related(government::Entity)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Region", id))?;
    Ok(to_dto(model, government))
}

pub fn apply_region_update(existing: region::Model, request: UpdateRegionRequest) -> region::ActiveModel {
    let mut active: region::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(government_id) = request.government_id {
        active.government_id = Set(government_id);
    }
    active
}

#[instrument(skip(db))]
pub async fn update(db: &DatabaseConnection, id: i32, request: UpdateRegionRequest) -> Result<RegionDto> {
    let existing = require(db, id).await?;
    if let Some(government_id) = request.government_id {
        governments::require(db, government_id).await?;
    }

    let active = apply_region_update(existing.clone(), request);
    let model = if active.is_changed() {
        let updated = active.update(db).await.map_err(ServiceError::from_write)?;
        info!("Region with ID {} updated", id);
        updated
    } else {
        debug!("No fields to update for region ID: {}", id);
        existing
    };

    let mut hydrated = hydrate(db, vec![model]).await?;
    hydrated
        .pop()
        .ok_or_else(|| ServiceError::not_found("Region", id))
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
    let result = region::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(ServiceError::from_write)?;
    if result.rows_affected == 0 {
        warn!("Region with ID {} not found for deletion", id);
        return Err(ServiceError::not_found("Region", id));
    }
    info!("Region with ID {} deleted", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use crate::testing::{insert_government, insert_region, setup_db};

    #[tokio::test]
    async fn test_create_requires_existing_government() {
        let db = setup_db().await;
        let result = create(
            &db,
            CreateRegionRequest {
                name: "Bardo".to_string(),
                government_id: 42,
            },
        )
        .await;
        assert!(matches!(
            result,
            Err(ServiceError::NotFound {
                entity: "Government",
                id: 42
            })
        ));
    }

    #[tokio::test]
    async fn test_list_hydrates_government_and_searches_its_name() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let sfax = insert_government(&db, "Sfax").await;
        insert_region(&db, "Bardo", tunis.id).await;
        insert_region(&db, "Sakiet Ezzit", sfax.id).await;

        let page = list(&db, &FilterMap::new(), Some("sfax"), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        let region = &page.data[0];
        assert_eq!(region.name, "Sakiet Ezzit");
        assert_eq!(region.government.as_ref().map(|g| g.name.as_str()), Some("Sfax"));
    }

    #[tokio::test]
    async fn test_filter_by_government_id() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let sfax = insert_government(&db, "Sfax").await;
        insert_region(&db, "Bardo", tunis.id).await;
        insert_region(&db, "Marsa", tunis.id).await;
        insert_region(&db, "Sakiet Ezzit", sfax.id).await;

        let mut filters = FilterMap::new();
        filters.insert("government", FilterValue::Scalar(tunis.id.to_string()));
        let regions = filter(&db, &filters).await.unwrap();

        let names: Vec<&str> = regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Bardo", "Marsa"]);
    }

    #[tokio::test]
    async fn test_same_name_allowed_in_different_governments() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let sfax = insert_government(&db, "Sfax").await;
        insert_region(&db, "Centre", tunis.id).await;
        insert_region(&db, "Centre", sfax.id).await;

        let duplicate = create(
            &db,
            CreateRegionRequest {
                name: "Centre".to_string(),
                government_id: tunis.id,
            },
        )
        .await;
        assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

        let found = find_by_name(&db, sfax.id, "centre").await.unwrap();
        assert_eq!(found.map(|r| r.government_id), Some(sfax.id));
    }
}
