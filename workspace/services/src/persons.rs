use common::{
    CreatePersonRequest, DoctorDetail, DoctorDto, Paginated, PersonDto, PharmacienDetail,
    PharmacienDto, UpdatePersonRequest, WholesalerDetail, WholesalerDto,
};
use model::PersonType;
use model::entities::{
    delegate, delegate_person, doctor, government, person, pharmacien, region, specialty,
    wholesaler,
};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{Result, ServiceError};
use crate::fetch;
use crate::filter::fields::{PERSON_FIELDS, PERSON_SEARCH};
use crate::filter::{FilterBuilder, FilterMap, MatchMode, search_condition};
use crate::pagination::{PageRequest, fetch_page};
use crate::{governments, regions, specialties};

/// Relations loaded alongside persons. Nothing is joined implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonFetchPlan {
    pub government: bool,
    pub region: bool,
    /// Doctor (with specialty), pharmacien or wholesaler detail
    pub detail: bool,
}

impl PersonFetchPlan {
    pub const BARE: Self = Self {
        government: false,
        region: false,
        detail: false,
    };

    pub const FULL: Self = Self {
        government: true,
        region: true,
        detail: true,
    };

    /// Used when persons are nested in another resource.
    pub const DETAIL_ONLY: Self = Self {
        government: false,
        region: false,
        detail: true,
    };
}

/// Subtype detail of a person being written.
#[derive(Debug, Clone, PartialEq)]
pub enum PersonDetail {
    Doctor(DoctorDetail),
    Pharmacien(PharmacienDetail),
    Wholesaler(WholesalerDetail),
}

impl PersonDetail {
    pub fn person_type(&self) -> PersonType {
        match self {
            PersonDetail::Doctor(_) => PersonType::Doctor,
            PersonDetail::Pharmacien(_) => PersonType::Pharmacien,
            PersonDetail::Wholesaler(_) => PersonType::Wholesaler,
        }
    }

    /// The single detail carried by a create payload.
    fn from_request(request: &CreatePersonRequest) -> Result<Self> {
        let mut details = Vec::with_capacity(1);
        if let Some(doctor) = &request.doctor {
            details.push(PersonDetail::Doctor(doctor.clone()));
        }
        if let Some(pharmacien) = &request.pharmacien {
            details.push(PersonDetail::Pharmacien(pharmacien.clone()));
        }
        if let Some(wholesaler) = &request.wholesaler {
            details.push(PersonDetail::Wholesaler(wholesaler.clone()));
        }

        match details.len() {
            1 => Ok(details.remove(0)),
            0 => Err(ServiceError::Validation(
                "One of doctor, pharmacien or wholesaler is required".to_string(),
            )),
            _ => Err(ServiceError::Validation(
                "Only one of doctor, pharmacien or wholesaler may be given".to_string(),
            )),
        }
    }
}

/// Maps a numeric type discriminator, rejecting anything outside 1..=3.
pub fn parse_person_type(code: i32) -> Result<PersonType> {
    PersonType::from_code(code)
        .ok_or_else(|| ServiceError::InvalidArgument(format!("Unknown person type: {}", code)))
}

/// Parses a comma separated id list. Blank or non-numeric entries fail the whole list.
pub fn parse_id_list(raw: Option<&str>, name: &str) -> Result<Vec<i32>> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", name)));
    }

    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| ServiceError::Validation(format!("Invalid id '{}' in {}", part, name)))
        })
        .collect()
}

/// Person types named by the `type` filter key, if any.
fn selected_types(filters: &FilterMap) -> Result<Vec<PersonType>> {
    let Some(value) = filters.get("type") else {
        return Ok(Vec::new());
    };
    value
        .values()
        .into_iter()
        .map(|raw| {
            raw.parse::<i32>()
                .map_err(|_| ServiceError::InvalidArgument(format!("Unknown person type: {}", raw)))
                .and_then(parse_person_type)
        })
        .collect()
}

/// Persons joined with the detail tables the gated filters read.
fn joined_select() -> Select<person::Entity> {
    person::Entity::find()
        .join(JoinType::LeftJoin, person::Relation::Doctor.def())
        .join(JoinType::LeftJoin, person::Relation::Pharmacien.def())
}

/// Filters for a listing whose person types come from the route. A `type`
/// key in the query is dropped so it cannot widen or contradict them.
fn scoped_condition(filters: &FilterMap, types: &[PersonType]) -> Condition {
    let mut scoped = filters.clone();
    if scoped.remove("type").is_some() {
        debug!("Ignoring 'type' filter, the route fixes person types to {:?}", types);
    }
    FilterBuilder::new(PERSON_FIELDS)
        .with_active_types(types.iter().copied())
        .build(&scoped)
}

fn assigned_to(delegate_id: i32) -> sea_orm::sea_query::SelectStatement {
    Query::select()
        .column(delegate_person::Column::PersonId)
        .from(delegate_person::Entity)
        .and_where(delegate_person::Column::DelegateId.eq(delegate_id))
        .to_owned()
}

pub(crate) fn to_dto(model: person::Model) -> PersonDto {
    PersonDto {
        id: model.id,
        firstname: model.firstname,
        lastname: model.lastname,
        address: model.address,
        phone_number: model.phone_number,
        email: model.email,
        code: model.code,
        potential: model.potential,
        person_type: model.person_type.code(),
        government_id: model.government_id,
        region_id: model.region_id,
        government: None,
        region: None,
        doctor: None,
        pharmacien: None,
        wholesaler: None,
    }
}

/// Converts persons to DTOs, loading what `plan` asks for with one query per relation.
pub(crate) async fn hydrate<C: ConnectionTrait>(
    db: &C,
    persons: Vec<person::Model>,
    plan: PersonFetchPlan,
) -> Result<Vec<PersonDto>> {
    if persons.is_empty() {
        return Ok(Vec::new());
    }
    trace!("Hydrating {} persons with {:?}", persons.len(), plan);

    let governments_by_id = if plan.government {
        fetch::by_ids::<government::Entity, _, _>(
            db,
            government::Column::Id,
            persons.iter().map(|p| p.government_id),
            |g| g.id,
        )
        .await?
    } else {
        Default::default()
    };

    let regions_by_id = if plan.region {
        fetch::by_ids::<region::Entity, _, _>(
            db,
            region::Column::Id,
            persons.iter().map(|p| p.region_id),
            |r| r.id,
        )
        .await?
    } else {
        Default::default()
    };

    let (doctors, specialties_by_id, pharmaciens, wholesalers) = if plan.detail {
        let doctors = fetch::by_ids::<doctor::Entity, _, _>(
            db,
            doctor::Column::Id,
            persons.iter().filter_map(|p| p.doctor_id),
            |d| d.id,
        )
        .await?;
        let specialty_rows = fetch::by_ids::<specialty::Entity, _, _>(
            db,
            specialty::Column::Id,
            doctors.values().filter_map(|d| d.specialty_id),
            |s| s.id,
        )
        .await?;
        let pharmaciens = fetch::by_ids::<pharmacien::Entity, _, _>(
            db,
            pharmacien::Column::Id,
            persons.iter().filter_map(|p| p.pharmacien_id),
            |p| p.id,
        )
        .await?;
        let wholesalers = fetch::by_ids::<wholesaler::Entity, _, _>(
            db,
            wholesaler::Column::Id,
            persons.iter().filter_map(|p| p.wholesaler_id),
            |w| w.id,
        )
        .await?;
        (doctors, specialty_rows, pharmaciens, wholesalers)
    } else {
        Default::default()
    };

    Ok(persons
        .into_iter()
        .map(|model| {
            let government = governments_by_id.get(&model.government_id).cloned();
            let region = regions_by_id.get(&model.region_id).cloned();
            let doctor = model.doctor_id.and_then(|id| doctors.get(&id)).map(|d| DoctorDto {
                id: d.id,
                doctor_type: d.doctor_type,
                specialty: d
                    .specialty_id
                    .and_then(|id| specialties_by_id.get(&id))
                    .cloned()
                    .map(specialties::to_dto),
            });
            let pharmacien = model
                .pharmacien_id
                .and_then(|id| pharmaciens.get(&id))
                .map(|p| PharmacienDto {
                    id: p.id,
                    contact: p.contact.clone(),
                    pharmacy_type: p.pharmacy_type,
                    pharmacy_name: p.pharmacy_name.clone(),
                });
            let wholesaler = model
                .wholesaler_id
                .and_then(|id| wholesalers.get(&id))
                .map(|w| WholesalerDto {
                    id: w.id,
                    company_name: w.company_name.clone(),
                });

            let mut dto = to_dto(model);
            dto.government = government.map(governments::to_dto);
            dto.region = region.map(|r| regions::to_dto(r, None));
            dto.doctor = doctor;
            dto.pharmacien = pharmacien;
            dto.wholesaler = wholesaler;
            dto
        })
        .collect())
}

async fn paginate(
    db: &DatabaseConnection,
    select: Select<person::Entity>,
    page: PageRequest,
) -> Result<Paginated<PersonDto>> {
    let (rows, total) = fetch_page(db, select, &page).await?;
    debug!("Retrieved {} of {} persons", rows.len(), total);
    let data = hydrate(db, rows, PersonFetchPlan::FULL).await?;
    Ok(page.wrap(data, total))
}

/// Inserts the detail row of `detail`, then the person pointing at it.
///
/// `person` must carry every column but the detail ids and the type.
pub(crate) async fn insert_with_detail<C: ConnectionTrait>(
    db: &C,
    mut person: person::ActiveModel,
    detail: PersonDetail,
) -> Result<person::Model> {
    person.person_type = Set(detail.person_type());
    person.doctor_id = Set(None);
    person.pharmacien_id = Set(None);
    person.wholesaler_id = Set(None);

    match detail {
        PersonDetail::Doctor(detail) => {
            let row = doctor::ActiveModel {
                doctor_type: Set(detail.doctor_type),
                specialty_id: Set(detail.specialty_id),
                ..Default::default()
            }
            .insert(db)
            .await
            .map_err(ServiceError::from_write)?;
            person.doctor_id = Set(Some(row.id));
        }
        PersonDetail::Pharmacien(detail) => {
            let row = pharmacien::ActiveModel {
                contact: Set(detail.contact),
                pharmacy_type: Set(detail.pharmacy_type),
                pharmacy_name: Set(detail.pharmacy_name),
                ..Default::default()
            }
            .insert(db)
            .await
            .map_err(ServiceError::from_write)?;
            person.pharmacien_id = Set(Some(row.id));
        }
        PersonDetail::Wholesaler(detail) => {
            let row = wholesaler::ActiveModel {
                company_name: Set(detail.company_name),
                ..Default::default()
            }
            .insert(db)
            .await
            .map_err(ServiceError::from_write)?;
            person.wholesaler_id = Set(Some(row.id));
        }
    }

    person.insert(db).await.map_err(ServiceError::from_write)
}

pub(crate) async fn require<C: ConnectionTrait>(db: &C, id: i32) -> Result<person::Model> {
    person::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Person", id))
}

async fn require_specialty<C: ConnectionTrait>(db: &C, detail: &PersonDetail) -> Result<()> {
    if let PersonDetail::Doctor(DoctorDetail {
        specialty_id: Some(id),
        ..
    }) = detail
    {
        specialty::Entity::find_by_id(*id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Specialty", *id))?;
    }
    Ok(())
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, request: CreatePersonRequest) -> Result<PersonDto> {
    let detail = PersonDetail::from_request(&request)?;
    if request.firstname.trim().is_empty() || request.lastname.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Person firstname and lastname are required".to_string(),
        ));
    }
    governments::require(db, request.government_id).await?;
    regions::require(db, request.region_id).await?;
    require_specialty(db, &detail).await?;

    let active = person::ActiveModel {
        firstname: Set(request.firstname.trim().to_string()),
        lastname: Set(request.lastname.trim().to_string()),
        address: Set(request.address),
        phone_number: Set(request.phone_number),
        email: Set(request.email),
        code: Set(request.code),
        potential: Set(request.potential),
        government_id: Set(request.government_id),
        region_id: Set(request.region_id),
        ..Default::default()
    };

    let txn = db.begin().await?;
    let created = insert_with_detail(&txn, active, detail).await?;
    txn.commit().await?;

    info!(
        "Person created with ID: {}, type: {:?}",
        created.id, created.person_type
    );
    let mut hydrated = hydrate(db, vec![created], PersonFetchPlan::FULL).await?;
    hydrated
        .pop()
        .ok_or_else(|| ServiceError::Validation("Created person could not be loaded".to_string()))
}

/// Paginated listing with the dynamic filter map and free-text search.
///
/// Gated filters (specialty, doctorType, pharmacyType) only apply when the
/// `type` key selects their person type.
#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filters: &FilterMap,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Paginated<PersonDto>> {
    let types = selected_types(filters)?;
    let condition = FilterBuilder::new(PERSON_FIELDS)
        .with_active_types(types)
        .build(filters);

    let mut select = joined_select()
        .filter(condition)
        .order_by_asc(person::Column::Id);
    if let Some(condition) = search_condition(search, PERSON_SEARCH) {
        select = select.filter(condition);
    }
    paginate(db, select, page).await
}

/// Structured filter: every key compares exactly, the whole result is returned.
#[instrument(skip(db))]
pub async fn filter(db: &DatabaseConnection, filters: &FilterMap) -> Result<Vec<PersonDto>> {
    let types = selected_types(filters)?;
    let condition = FilterBuilder::new(PERSON_FIELDS)
        .with_mode(MatchMode::Exact)
        .with_active_types(types)
        .build(filters);

    let rows = joined_select()
        .filter(condition)
        .order_by_asc(person::Column::Id)
        .all(db)
        .await?;
    debug!("Filter matched {} persons", rows.len());
    hydrate(db, rows, PersonFetchPlan::FULL).await
}

/// Persons of one type with the dynamic filters; the route's type opens the gated keys.
#[instrument(skip(db))]
pub async fn list_by_type(
    db: &DatabaseConnection,
    type_id: i32,
    filters: &FilterMap,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Paginated<PersonDto>> {
    let person_type = parse_person_type(type_id)?;
    let mut select = joined_select()
        .filter(person::Column::PersonType.eq(person_type))
        .filter(scoped_condition(filters, &[person_type]))
        .order_by_asc(person::Column::Id);
    if let Some(condition) = search_condition(search, PERSON_SEARCH) {
        select = select.filter(condition);
    }
    paginate(db, select, page).await
}

/// Persons assigned to a delegate, restricted to the comma separated `type_ids`.
#[instrument(skip(db))]
pub async fn list_by_delegate(
    db: &DatabaseConnection,
    delegate_id: i32,
    type_ids: Option<&str>,
    filters: &FilterMap,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Paginated<PersonDto>> {
    let types = parse_id_list(type_ids, "typeIds")?
        .into_iter()
        .map(parse_person_type)
        .collect::<Result<Vec<_>>>()?;
    delegate::Entity::find_by_id(delegate_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Delegate", delegate_id))?;

    let condition = scoped_condition(filters, &types);
    let mut select = joined_select()
        .filter(person::Column::Id.in_subquery(assigned_to(delegate_id)))
        .filter(person::Column::PersonType.is_in(types))
        .filter(condition)
        .order_by_asc(person::Column::Id);
    if let Some(condition) = search_condition(search, PERSON_SEARCH) {
        select = select.filter(condition);
    }
    paginate(db, select, page).await
}

/// Persons of one type not yet assigned to the delegate, newest first.
#[instrument(skip(db))]
pub async fn list_not_assigned(
    db: &DatabaseConnection,
    delegate_id: i32,
    type_id: i32,
    filters: &FilterMap,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Paginated<PersonDto>> {
    let person_type = parse_person_type(type_id)?;
    let mut select = joined_select()
        .filter(person::Column::PersonType.eq(person_type))
        .filter(person::Column::Id.not_in_subquery(assigned_to(delegate_id)))
        .filter(scoped_condition(filters, &[person_type]))
        .order_by_desc(person::Column::Id);
    if let Some(condition) = search_condition(search, PERSON_SEARCH) {
        select = select.filter(condition);
    }

    let rows = select.all(db).await?;
    debug!(
        "{} persons of type {} not assigned to delegate {}",
        rows.len(),
        type_id,
        delegate_id
    );
    let window = page.slice(rows);
    let data = hydrate(db, window.data, PersonFetchPlan::FULL).await?;
    Ok(Paginated {
        data,
        has_next_page: window.has_next_page,
        total: window.total,
    })
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<PersonDto> {
    let person = require(db, id).await?;
    let mut hydrated = hydrate(db, vec![person], PersonFetchPlan::FULL).await?;
    hydrated
        .pop()
        .ok_or_else(|| ServiceError::not_found("Person", id))
}

/// Applies the present scalar fields of `request` onto `existing`.
pub fn apply_person_update(
    existing: person::Model,
    request: &UpdatePersonRequest,
) -> person::ActiveModel {
    let mut active: person::ActiveModel = existing.into();
    if let Some(firstname) = &request.firstname {
        active.firstname = Set(firstname.trim().to_string());
    }
    if let Some(lastname) = &request.lastname {
        active.lastname = Set(lastname.trim().to_string());
    }
    if let Some(address) = &request.address {
        active.address = Set(address.clone());
    }
    if let Some(phone_number) = &request.phone_number {
        active.phone_number = Set(phone_number.clone());
    }
    if let Some(email) = &request.email {
        active.email = Set(Some(email.clone()));
    }
    if let Some(code) = &request.code {
        active.code = Set(Some(code.clone()));
    }
    if let Some(potential) = &request.potential {
        active.potential = Set(Some(potential.clone()));
    }
    if let Some(government_id) = request.government_id {
        active.government_id = Set(government_id);
    }
    if let Some(region_id) = request.region_id {
        active.region_id = Set(region_id);
    }
    active
}

/// Updates the existing detail row of `person` from the matching payload detail.
async fn update_detail<C: ConnectionTrait>(
    db: &C,
    person: &person::Model,
    request: &UpdatePersonRequest,
) -> Result<()> {
    let mismatch = || {
        ServiceError::Validation(format!(
            "Person {} is a {:?}, its type cannot change",
            person.id, person.person_type
        ))
    };

    if let Some(detail) = &request.doctor {
        let id = person.doctor_id.ok_or_else(mismatch)?;
        let existing = doctor::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Doctor", id))?;
        let mut active: doctor::ActiveModel = existing.into();
        if detail.doctor_type.is_some() {
            active.doctor_type = Set(detail.doctor_type);
        }
        if detail.specialty_id.is_some() {
            require_specialty(db, &PersonDetail::Doctor(detail.clone())).await?;
            active.specialty_id = Set(detail.specialty_id);
        }
        if active.is_changed() {
            active.update(db).await.map_err(ServiceError::from_write)?;
        }
    }

    if let Some(detail) = &request.pharmacien {
        let id = person.pharmacien_id.ok_or_else(mismatch)?;
        let existing = pharmacien::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Pharmacien", id))?;
        let mut active: pharmacien::ActiveModel = existing.into();
        if detail.contact.is_some() {
            active.contact = Set(detail.contact.clone());
        }
        if detail.pharmacy_type.is_some() {
            active.pharmacy_type = Set(detail.pharmacy_type);
        }
        if !detail.pharmacy_name.is_empty() {
            active.pharmacy_name = Set(detail.pharmacy_name.clone());
        }
        if active.is_changed() {
            active.update(db).await.map_err(ServiceError::from_write)?;
        }
    }

    if let Some(detail) = &request.wholesaler {
        let id = person.wholesaler_id.ok_or_else(mismatch)?;
        let existing = wholesaler::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Wholesaler", id))?;
        let mut active: wholesaler::ActiveModel = existing.into();
        if !detail.company_name.is_empty() {
            active.company_name = Set(detail.company_name.clone());
        }
        if active.is_changed() {
            active.update(db).await.map_err(ServiceError::from_write)?;
        }
    }

    Ok(())
}

#[instrument(skip(db))]
pub async fn update(db: &DatabaseConnection, id: i32, request: UpdatePersonRequest) -> Result<PersonDto> {
    let existing = require(db, id).await?;
    if let Some(government_id) = request.government_id {
        governments::require(db, government_id).await?;
    }
    if let Some(region_id) = request.region_id {
        regions::require(db, region_id).await?;
    }

    let txn = db.begin().await?;
    update_detail(&txn, &existing, &request).await?;
    let active = apply_person_update(existing, &request);
    if active.is_changed() {
        active.update(&txn).await.map_err(ServiceError::from_write)?;
        info!("Person with ID {} updated", id);
    } else {
        debug!("No person fields to update for ID: {}", id);
    }
    txn.commit().await?;

    get(db, id).await
}

/// Removes the person, its detail row, assignments and reports.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
    let existing = require(db, id).await?;

    let txn = db.begin().await?;
    person::Entity::delete_by_id(id).exec(&txn).await?;
    if let Some(doctor_id) = existing.doctor_id {
        doctor::Entity::delete_by_id(doctor_id).exec(&txn).await?;
    }
    if let Some(pharmacien_id) = existing.pharmacien_id {
        pharmacien::Entity::delete_by_id(pharmacien_id).exec(&txn).await?;
    }
    if let Some(wholesaler_id) = existing.wholesaler_id {
        wholesaler::Entity::delete_by_id(wholesaler_id).exec(&txn).await?;
    }
    txn.commit().await?;

    info!("Person with ID {} deleted", id);
    Ok(())
}

/// Unlinks the person from the listed delegates. Pairs that are not linked are ignored.
#[instrument(skip(db))]
pub async fn disassociate_delegates(
    db: &DatabaseConnection,
    person_id: i32,
    delegate_ids: Option<&str>,
) -> Result<u64> {
    let delegate_ids = parse_id_list(delegate_ids, "delegateIds")?;
    require(db, person_id).await?;

    let result = delegate_person::Entity::delete_many()
        .filter(delegate_person::Column::PersonId.eq(person_id))
        .filter(delegate_person::Column::DelegateId.is_in(delegate_ids))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        warn!("Person {} had none of the given delegates", person_id);
    } else {
        info!(
            "Removed {} delegate links from person {}",
            result.rows_affected, person_id
        );
    }
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use crate::testing::{insert_government, insert_person, insert_region, insert_specialty, setup_db};

    fn create_request(region: &region::Model) -> CreatePersonRequest {
        CreatePersonRequest {
            firstname: "Amel".to_string(),
            lastname: "Ben Salah".to_string(),
            address: "12 rue de Marseille".to_string(),
            phone_number: "71000000".to_string(),
            email: Some("amel@example.com".to_string()),
            code: None,
            potential: Some("A".to_string()),
            government_id: region.government_id,
            region_id: region.id,
            doctor: None,
            pharmacien: None,
            wholesaler: None,
        }
    }

    async fn link(db: &DatabaseConnection, delegate_id: i32, person_id: i32) {
        delegate_person::ActiveModel {
            delegate_id: Set(delegate_id),
            person_id: Set(person_id),
        }
        .insert(db)
        .await
        .unwrap();
    }

    async fn insert_delegate(db: &DatabaseConnection) -> delegate::Model {
        delegate::ActiveModel {
            firstname: Set("Karim".to_string()),
            lastname: Set("Trabelsi".to_string()),
            phone_number: Set("22000000".to_string()),
            address: Set("Ariana".to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list(Some("1, 2,3"), "ids").unwrap(), vec![1, 2, 3]);
        assert!(matches!(parse_id_list(None, "ids"), Err(ServiceError::Validation(_))));
        assert!(matches!(parse_id_list(Some(" "), "ids"), Err(ServiceError::Validation(_))));
        assert!(matches!(parse_id_list(Some("1,x"), "ids"), Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_requires_exactly_one_subtype() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;

        let none = create(&db, create_request(&bardo)).await;
        assert!(matches!(none, Err(ServiceError::Validation(_))));

        let mut both = create_request(&bardo);
        both.doctor = Some(DoctorDetail::default());
        both.wholesaler = Some(WholesalerDetail {
            company_name: "Medis".to_string(),
        });
        assert!(matches!(create(&db, both).await, Err(ServiceError::Validation(_))));

        assert_eq!(person::Entity::find().all(&db).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_create_doctor_and_get_hydrates_detail() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;
        let cardio = insert_specialty(&db, "Cardiologie", "CAR").await;

        let mut request = create_request(&bardo);
        request.doctor = Some(DoctorDetail {
            doctor_type: Some(2),
            specialty_id: Some(cardio.id),
        });
        let created = create(&db, request).await.unwrap();
        assert_eq!(created.person_type, 1);

        let fetched = get(&db, created.id).await.unwrap();
        let doctor = fetched.doctor.expect("doctor detail loaded");
        assert_eq!(doctor.doctor_type, Some(2));
        assert_eq!(doctor.specialty.map(|s| s.abbreviation), Some("CAR".to_string()));
        assert_eq!(fetched.region.map(|r| r.name), Some("Bardo".to_string()));
        assert_eq!(fetched.government.map(|g| g.name), Some("Tunis".to_string()));
        assert!(fetched.pharmacien.is_none());
    }

    #[tokio::test]
    async fn test_create_with_unknown_region_is_not_found() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;

        let mut request = create_request(&bardo);
        request.region_id = 999;
        request.wholesaler = Some(WholesalerDetail {
            company_name: "Medis".to_string(),
        });
        let result = create(&db, request).await;
        assert!(matches!(
            result,
            Err(ServiceError::NotFound {
                entity: "Region",
                id: 999
            })
        ));
    }

    #[tokio::test]
    async fn test_search_matches_tokens_across_fields() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;
        insert_person(&db, "Jean-Paul", "Dupont", PersonType::Doctor, &bardo, None).await;
        insert_person(&db, "Jean", "Martin", PersonType::Doctor, &bardo, None).await;
        insert_person(&db, "Paul", "Dupont", PersonType::Doctor, &bardo, None).await;

        let page = list(&db, &FilterMap::new(), Some("jean dupont"), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].firstname, "Jean-Paul");
        assert_eq!(page.data[0].lastname, "Dupont");
    }

    #[tokio::test]
    async fn test_specialty_filter_ignored_for_pharmaciens() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;
        let cardio = insert_specialty(&db, "Cardiologie", "CAR").await;
        let pedia = insert_specialty(&db, "Pediatrie", "PED").await;
        insert_person(&db, "Sami", "Doctor", PersonType::Doctor, &bardo, Some(cardio.id)).await;
        insert_person(&db, "Rim", "Pharma", PersonType::Pharmacien, &bardo, None).await;
        insert_person(&db, "Ali", "Pharma", PersonType::Pharmacien, &bardo, None).await;

        let mut filters = FilterMap::new();
        filters.insert(
            "specialty",
            FilterValue::List(vec![cardio.id.to_string(), pedia.id.to_string()]),
        );
        filters.insert("type", FilterValue::Scalar("2".to_string()));
        let page = list(&db, &filters, None, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page.data.iter().all(|p| p.person_type == 2));

        filters.insert("type", FilterValue::Scalar("1".to_string()));
        let page = list(&db, &filters, None, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].firstname, "Sami");
    }

    #[tokio::test]
    async fn test_invalid_type_selector_is_rejected() {
        let db = setup_db().await;
        let mut filters = FilterMap::new();
        filters.insert("type", FilterValue::Scalar("7".to_string()));

        let result = list(&db, &filters, None, PageRequest::default()).await;
        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
        let result = list_by_type(&db, 0, &FilterMap::new(), None, PageRequest::default()).await;
        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_delegate_listings() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;
        let delegate = insert_delegate(&db).await;
        let doctor = insert_person(&db, "Sami", "Doc", PersonType::Doctor, &bardo, None).await;
        let pharma = insert_person(&db, "Rim", "Ph", PersonType::Pharmacien, &bardo, None).await;
        let older = insert_person(&db, "Omar", "Doc", PersonType::Doctor, &bardo, None).await;
        let newer = insert_person(&db, "Nour", "Doc", PersonType::Doctor, &bardo, None).await;
        link(&db, delegate.id, doctor.id).await;
        link(&db, delegate.id, pharma.id).await;

        let assigned = list_by_delegate(&db, delegate.id, Some("1"), &FilterMap::new(), None, PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<i32> = assigned.data.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![doctor.id]);

        let assigned = list_by_delegate(&db, delegate.id, Some("1,2"), &FilterMap::new(), None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(assigned.total, 2);

        let missing = list_by_delegate(&db, delegate.id, Some(""), &FilterMap::new(), None, PageRequest::default())
            .await;
        assert!(matches!(missing, Err(ServiceError::Validation(_))));

        let free = list_not_assigned(&db, delegate.id, 1, &FilterMap::new(), None, PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<i32> = free.data.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(free.total, 2);
    }

    #[tokio::test]
    async fn test_route_scoped_listings_apply_query_filters() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;
        let cardio = insert_specialty(&db, "Cardiologie", "CAR").await;
        let delegate = insert_delegate(&db).await;
        let cardiologist =
            insert_person(&db, "Sami", "Doc", PersonType::Doctor, &bardo, Some(cardio.id)).await;
        let generalist = insert_person(&db, "Omar", "Doc", PersonType::Doctor, &bardo, None).await;
        let pharma = insert_person(&db, "Rim", "Ph", PersonType::Pharmacien, &bardo, None).await;
        link(&db, delegate.id, cardiologist.id).await;
        link(&db, delegate.id, pharma.id).await;

        let mut filters = FilterMap::new();
        filters.insert("specialty", FilterValue::Scalar(cardio.id.to_string()));

        let by_type = list_by_type(&db, 1, &filters, None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(by_type.total, 1);
        assert_eq!(by_type.data[0].id, cardiologist.id);

        // a query `type` cannot override the route's type
        filters.insert("type", FilterValue::Scalar("2".to_string()));
        let by_type = list_by_type(&db, 1, &filters, None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(by_type.total, 1);

        // doctor-only keys stay closed when the route selects pharmaciens
        let pharmaciens = list_by_type(&db, 2, &filters, None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(pharmaciens.total, 1);
        assert_eq!(pharmaciens.data[0].id, pharma.id);

        let assigned =
            list_by_delegate(&db, delegate.id, Some("1,2"), &filters, None, PageRequest::default())
                .await
                .unwrap();
        let ids: Vec<i32> = assigned.data.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![cardiologist.id]);

        let mut by_name = FilterMap::new();
        by_name.insert("firstname", FilterValue::Scalar("oma".to_string()));
        let free = list_not_assigned(&db, delegate.id, 1, &by_name, None, PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<i32> = free.data.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![generalist.id]);
    }

    #[tokio::test]
    async fn test_disassociate_is_idempotent() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;
        let delegate = insert_delegate(&db).await;
        let person = insert_person(&db, "Sami", "Doc", PersonType::Doctor, &bardo, None).await;
        link(&db, delegate.id, person.id).await;

        let ids = delegate.id.to_string();
        assert_eq!(disassociate_delegates(&db, person.id, Some(&ids)).await.unwrap(), 1);
        assert_eq!(disassociate_delegates(&db, person.id, Some(&ids)).await.unwrap(), 0);

        let links = delegate_person::Entity::find().all(&db).await.unwrap();
        assert!(links.is_empty());

        let invalid = disassociate_delegates(&db, person.id, Some("abc")).await;
        assert!(matches!(invalid, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_applies_present_fields_and_detail() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;
        let person = insert_person(&db, "Rim", "Ph", PersonType::Pharmacien, &bardo, None).await;

        let updated = update(
            &db,
            person.id,
            UpdatePersonRequest {
                email: Some("rim@example.com".to_string()),
                pharmacien: Some(PharmacienDetail {
                    contact: Some("Rim".to_string()),
                    pharmacy_type: Some(3),
                    pharmacy_name: String::new(),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.firstname, "Rim");
        assert_eq!(updated.email.as_deref(), Some("rim@example.com"));
        let detail = updated.pharmacien.expect("pharmacien detail loaded");
        assert_eq!(detail.pharmacy_type, Some(3));
        assert_eq!(detail.pharmacy_name, "pharmacie Ph");

        let change_type = update(
            &db,
            person.id,
            UpdatePersonRequest {
                doctor: Some(DoctorDetail::default()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(change_type, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_detail_row() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;
        let person = insert_person(&db, "Sami", "Doc", PersonType::Doctor, &bardo, None).await;

        delete(&db, person.id).await.unwrap();
        assert!(person::Entity::find_by_id(person.id).one(&db).await.unwrap().is_none());
        assert!(doctor::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(matches!(
            delete(&db, person.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
