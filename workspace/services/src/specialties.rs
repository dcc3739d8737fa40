use common::{CreateSpecialtyRequest, Paginated, SpecialtyDto, UpdateSpecialtyRequest};
use model::entities::specialty;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::fetch;
use crate::filter::fields::{SPECIALTY_FIELDS, SPECIALTY_SEARCH};
use crate::filter::{FilterBuilder, FilterMap, search_condition};
use crate::pagination::{PageRequest, fetch_page};

const UNKNOWN_ABBREVIATION: &str = "UNK";

pub(crate) fn to_dto(model: specialty::Model) -> SpecialtyDto {
    SpecialtyDto {
        id: model.id,
        name: model.name,
        abbreviation: model.abbreviation,
    }
}

/// First three characters of `name`, upper-cased. `UNK` for a blank name.
pub fn abbreviate(name: &str) -> String {
    let abbreviation: String = name.trim().chars().take(3).collect::<String>().to_uppercase();
    if abbreviation.is_empty() {
        UNKNOWN_ABBREVIATION.to_string()
    } else {
        abbreviation
    }
}

pub(crate) async fn find_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<specialty::Model>> {
    let wanted = fetch::fold(name);
    let select = specialty::Entity::find().order_by_asc(specialty::Column::Id);
    let found = fetch::find_first(db, select, |s| fetch::fold(&s.name) == wanted).await?;
    Ok(found)
}

async fn ensure_unique<C: ConnectionTrait>(
    db: &C,
    name: Option<&str>,
    abbreviation: Option<&str>,
    exclude_id: Option<i32>,
) -> Result<()> {
    let mut any = Condition::any();
    if let Some(name) = name {
        any = any.add(specialty::Column::Name.eq(name));
    }
    if let Some(abbreviation) = abbreviation {
        any = any.add(specialty::Column::Abbreviation.eq(abbreviation));
    }
    if any.is_empty() {
        return Ok(());
    }

    let mut select = specialty::Entity::find().filter(any);
    if let Some(id) = exclude_id {
        select = select.filter(specialty::Column::Id.ne(id));
    }
    if let Some(existing) = select.one(db).await? {
        warn!("Specialty conflicts with existing ID: {}", existing.id);
        return Err(ServiceError::Conflict(
            "Specialty with the same name or abbreviation already exists".to_string(),
        ));
    }
    Ok(())
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, request: CreateSpecialtyRequest) -> Result<SpecialtyDto> {
    let name = request.name.trim().to_string();
    let abbreviation = request.abbreviation.trim().to_string();
    if name.is_empty() || abbreviation.is_empty() {
        return Err(ServiceError::Validation(
            "Specialty name and abbreviation are required".to_string(),
        ));
    }
    ensure_unique(db, Some(&name), Some(&abbreviation), None).await?;

    let model = specialty::ActiveModel {
        name: Set(name),
        abbreviation: Set(abbreviation),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(ServiceError::from_write)?;

    info!("Specialty created with ID: {}, name: {}", model.id, model.name);
    Ok(to_dto(model))
}

#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filters: &FilterMap,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Paginated<SpecialtyDto>> {
    let mut select = specialty::Entity::find()
        .filter(FilterBuilder::new(SPECIALTY_FIELDS).build(filters))
        .order_by_asc(specialty::Column::Name);
    if let Some(condition) = search_condition(search, SPECIALTY_SEARCH) {
        select = select.filter(condition);
    }

    let (rows, total) = fetch_page(db, select, &page).await?;
    debug!("Retrieved {} of {} specialties", rows.len(), total);
    Ok(page.wrap(rows.into_iter().map(to_dto).collect(), total))
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<SpecialtyDto> {
    specialty::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(to_dto)
        .ok_or_else(|| ServiceError::not_found("Specialty", id))
}

pub fn apply_specialty_update(
    existing: specialty::Model,
    request: UpdateSpecialtyRequest,
) -> specialty::ActiveModel {
    let mut active: specialty::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(abbreviation) = request.abbreviation {
        active.abbreviation = Set(abbreviation.trim().to_string());
    }
    active
}

#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateSpecialtyRequest,
) -> Result<SpecialtyDto> {
    let existing = specialty::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Specialty", id))?;
    ensure_unique(
        db,
        request.name.as_deref().map(str::trim),
        request.abbreviation.as_deref().map(str::trim),
        Some(id),
    )
    .await?;

    let active = apply_specialty_update(existing.clone(), request);
    if !active.is_changed() {
        debug!("No fields to update for specialty ID: {}", id);
        return Ok(to_dto(existing));
    }
    let updated = active.update(db).await.map_err(ServiceError::from_write)?;
    info!("Specialty with ID {} updated", id);
    Ok(to_dto(updated))
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
    let result = specialty::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        warn!("Specialty with ID {} not found for deletion", id);
        return Err(ServiceError::not_found("Specialty", id));
    }
    info!("Specialty with ID {} deleted", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{insert_specialty, setup_db};

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("cardiologie"), "CAR");
        assert_eq!(abbreviate("  orl "), "ORL");
        assert_eq!(abbreviate("gé"), "GÉ");
        assert_eq!(abbreviate(""), "UNK");
        assert_eq!(abbreviate("   "), "UNK");
    }

    #[tokio::test]
    async fn test_create_conflicts_on_name_or_abbreviation() {
        let db = setup_db().await;
        insert_specialty(&db, "Cardiologie", "CAR").await;

        let same_name = create(
            &db,
            CreateSpecialtyRequest {
                name: "Cardiologie".to_string(),
                abbreviation: "CRD".to_string(),
            },
        )
        .await;
        assert!(matches!(same_name, Err(ServiceError::Conflict(_))));

        let same_abbreviation = create(
            &db,
            CreateSpecialtyRequest {
                name: "Carcinologie".to_string(),
                abbreviation: "CAR".to_string(),
            },
        )
        .await;
        assert!(matches!(same_abbreviation, Err(ServiceError::Conflict(_))));

        let created = create(
            &db,
            CreateSpecialtyRequest {
                name: "Pédiatrie".to_string(),
                abbreviation: "PED".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.abbreviation, "PED");
    }

    #[tokio::test]
    async fn test_update_to_own_values_is_not_a_conflict() {
        let db = setup_db().await;
        let cardio = insert_specialty(&db, "Cardiologie", "CAR").await;

        let updated = update(
            &db,
            cardio.id,
            UpdateSpecialtyRequest {
                name: Some("Cardiologie".to_string()),
                abbreviation: Some("CAR".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.id, cardio.id);

        let found = find_by_name(&db, "CARDIOLOGIE").await.unwrap();
        assert_eq!(found.map(|s| s.id), Some(cardio.id));
    }
}
