use std::collections::{BTreeSet, HashMap};

use common::{AssignPersonsRequest, CreateDelegateRequest, DelegateDto, Paginated, UpdateDelegateRequest};
use model::entities::{delegate, delegate_person, person, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::filter::fields::{DELEGATE_FIELDS, DELEGATE_SEARCH};
use crate::filter::{FilterBuilder, FilterMap, search_condition};
use crate::pagination::{PageRequest, fetch_page};

const DEFAULT_ROLE_ID: i32 = 1;
const ACTIVE_STATUS_ID: i32 = 1;

/// Salted bcrypt hash of the password.
pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

pub(crate) fn to_dto(model: delegate::Model, person_ids: Vec<i32>) -> DelegateDto {
    DelegateDto {
        id: model.id,
        firstname: model.firstname,
        lastname: model.lastname,
        phone_number: model.phone_number,
        address: model.address,
        person_ids,
    }
}

/// Assigned person ids per delegate, each list ascending.
async fn person_ids_of<C: ConnectionTrait>(
    db: &C,
    delegate_ids: Vec<i32>,
) -> Result<HashMap<i32, Vec<i32>>> {
    if delegate_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let links = delegate_person::Entity::find()
        .filter(delegate_person::Column::DelegateId.is_in(delegate_ids))
        .order_by_asc(delegate_person::Column::PersonId)
        .all(db)
        .await?;

    let mut by_delegate: HashMap<i32, Vec<i32>> = HashMap::new();
    for link in links {
        by_delegate.entry(link.delegate_id).or_default().push(link.person_id);
    }
    Ok(by_delegate)
}

pub(crate) async fn hydrate<C: ConnectionTrait>(
    db: &C,
    delegates: Vec<delegate::Model>,
) -> Result<Vec<DelegateDto>> {
    let mut person_ids = person_ids_of(db, delegates.iter().map(|d| d.id).collect()).await?;
    Ok(delegates
        .into_iter()
        .map(|d| {
            let ids = person_ids.remove(&d.id).unwrap_or_default();
            to_dto(d, ids)
        })
        .collect())
}

pub(crate) async fn require<C: ConnectionTrait>(db: &C, id: i32) -> Result<delegate::Model> {
    delegate::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Delegate", id))
}

async fn load(db: &DatabaseConnection, model: delegate::Model) -> Result<DelegateDto> {
    let id = model.id;
    hydrate(db, vec![model])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("Delegate", id))
}

/// Creates the delegate and the user account it logs in with.
#[instrument(skip(db, request), fields(firstname = %request.firstname, lastname = %request.lastname))]
pub async fn create(db: &DatabaseConnection, request: CreateDelegateRequest) -> Result<DelegateDto> {
    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ServiceError::Validation("Delegate email is required".to_string()))?
        .to_string();
    let password = request
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ServiceError::Validation("Delegate password is required".to_string()))?;

    if user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        warn!("A user with email {} already exists", email);
        return Err(ServiceError::Conflict(format!(
            "A user with email {} already exists",
            email
        )));
    }
    let password_hash = hash_password(password)?;

    let txn = db.begin().await?;
    let created = delegate::ActiveModel {
        firstname: Set(request.firstname.clone()),
        lastname: Set(request.lastname.clone()),
        phone_number: Set(request.phone_number),
        address: Set(request.address),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(ServiceError::from_write)?;

    let account = user::ActiveModel {
        email: Set(email),
        first_name: Set(request.firstname),
        last_name: Set(request.lastname),
        password_hash: Set(password_hash),
        role_id: Set(DEFAULT_ROLE_ID),
        status_id: Set(ACTIVE_STATUS_ID),
        delegate_id: Set(Some(created.id)),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(ServiceError::from_write)?;
    txn.commit().await?;

    info!(
        "Delegate created with ID: {}, user ID: {}",
        created.id, account.id
    );
    Ok(to_dto(created, Vec::new()))
}

#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filters: &FilterMap,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Paginated<DelegateDto>> {
    let mut select = delegate::Entity::find()
        .filter(FilterBuilder::new(DELEGATE_FIELDS).build(filters))
        .order_by_asc(delegate::Column::Id);
    if let Some(condition) = search_condition(search, DELEGATE_SEARCH) {
        select = select.filter(condition);
    }

    let (rows, total) = fetch_page(db, select, &page).await?;
    debug!("Retrieved {} of {} delegates", rows.len(), total);
    let data = hydrate(db, rows).await?;
    Ok(page.wrap(data, total))
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<DelegateDto> {
    let model = require(db, id).await?;
    load(db, model).await
}

pub fn apply_delegate_update(
    existing: delegate::Model,
    request: UpdateDelegateRequest,
) -> delegate::ActiveModel {
    let mut active: delegate::ActiveModel = existing.into();
    if let Some(firstname) = request.firstname {
        active.firstname = Set(firstname);
    }
    if let Some(lastname) = request.lastname {
        active.lastname = Set(lastname);
    }
    if let Some(phone_number) = request.phone_number {
        active.phone_number = Set(phone_number);
    }
    if let Some(address) = request.address {
        active.address = Set(address);
    }
    active
}

#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateDelegateRequest,
) -> Result<DelegateDto> {
    let existing = require(db, id).await?;
    let active = apply_delegate_update(existing.clone(), request);
    let model = if active.is_changed() {
        let updated = active.update(db).await.map_err(ServiceError::from_write)?;
        info!("Delegate with ID {} updated", id);
        updated
    } else {
        debug!("No fields to update for delegate ID: {}", id);
        existing
    };
    load(db, model).await
}

/// Adds the listed persons to the delegate's assignments, keeping existing ones.
#[instrument(skip(db))]
pub async fn assign_persons(
    db: &DatabaseConnection,
    id: i32,
    request: AssignPersonsRequest,
) -> Result<DelegateDto> {
    let delegate = require(db, id).await?;

    let requested: BTreeSet<i32> = request.person.into_iter().collect();
    let found: BTreeSet<i32> = if requested.is_empty() {
        BTreeSet::new()
    } else {
        person::Entity::find()
            .filter(person::Column::Id.is_in(requested.iter().copied()))
            .all(db)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect()
    };
    if found.is_empty() {
        let first = requested.iter().next().copied().unwrap_or_default();
        warn!("None of the persons {:?} exist", requested);
        return Err(ServiceError::not_found("Person", first));
    }
    if found.len() < requested.len() {
        debug!(
            "Skipping unknown persons {:?}",
            requested.difference(&found).collect::<Vec<_>>()
        );
    }

    let assigned: BTreeSet<i32> = person_ids_of(db, vec![id])
        .await?
        .remove(&id)
        .unwrap_or_default()
        .into_iter()
        .collect();
    let new_links: Vec<delegate_person::ActiveModel> = found
        .difference(&assigned)
        .map(|person_id| delegate_person::ActiveModel {
            delegate_id: Set(id),
            person_id: Set(*person_id),
        })
        .collect();

    if new_links.is_empty() {
        debug!("All persons already assigned to delegate {}", id);
    } else {
        let count = new_links.len();
        delegate_person::Entity::insert_many(new_links)
            .exec_without_returning(db)
            .await?;
        info!("Assigned {} persons to delegate {}", count, id);
    }

    load(db, delegate).await
}

/// Removes the delegate after clearing its assignments.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
    require(db, id).await?;

    let txn = db.begin().await?;
    let cleared = delegate_person::Entity::delete_many()
        .filter(delegate_person::Column::DelegateId.eq(id))
        .exec(&txn)
        .await?;
    delegate::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Delegate with ID {} deleted, {} assignments cleared",
        id, cleared.rows_affected
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{insert_government, insert_person, insert_region, setup_db};
    use model::PersonType;

    fn request(email: Option<&str>, password: Option<&str>) -> CreateDelegateRequest {
        CreateDelegateRequest {
            firstname: "Karim".to_string(),
            lastname: "Trabelsi".to_string(),
            phone_number: "22000000".to_string(),
            address: "Ariana".to_string(),
            email: email.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_hash_password_is_salted_bcrypt() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();

        assert!(first.starts_with("$2b$"));
        assert_ne!(first, second);
        assert!(bcrypt::verify("secret", &first).unwrap());
        assert!(!bcrypt::verify("other", &first).unwrap());
    }

    #[tokio::test]
    async fn test_create_requires_credentials_and_creates_user() {
        let db = setup_db().await;

        let missing = create(&db, request(None, Some("secret"))).await;
        assert!(matches!(missing, Err(ServiceError::Validation(_))));
        let missing = create(&db, request(Some("karim@example.com"), None)).await;
        assert!(matches!(missing, Err(ServiceError::Validation(_))));

        let created = create(&db, request(Some("karim@example.com"), Some("secret")))
            .await
            .unwrap();
        let account = user::Entity::find()
            .filter(user::Column::DelegateId.eq(created.id))
            .one(&db)
            .await
            .unwrap()
            .expect("user created");
        assert_eq!(account.email, "karim@example.com");
        assert_ne!(account.password_hash, "secret");
        assert!(bcrypt::verify("secret", &account.password_hash).unwrap());

        let duplicate = create(&db, request(Some("karim@example.com"), Some("other"))).await;
        assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_assign_persons_is_a_union() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;
        let first = insert_person(&db, "Sami", "Doc", PersonType::Doctor, &bardo, None).await;
        let second = insert_person(&db, "Rim", "Ph", PersonType::Pharmacien, &bardo, None).await;
        let delegate = create(&db, request(Some("k@example.com"), Some("pw"))).await.unwrap();

        let assigned = assign_persons(
            &db,
            delegate.id,
            AssignPersonsRequest {
                person: vec![first.id],
            },
        )
        .await
        .unwrap();
        assert_eq!(assigned.person_ids, vec![first.id]);

        let assigned = assign_persons(
            &db,
            delegate.id,
            AssignPersonsRequest {
                person: vec![first.id, second.id, 999],
            },
        )
        .await
        .unwrap();
        assert_eq!(assigned.person_ids, vec![first.id, second.id]);

        let none = assign_persons(
            &db,
            delegate.id,
            AssignPersonsRequest { person: vec![999] },
        )
        .await;
        assert!(matches!(none, Err(ServiceError::NotFound { entity: "Person", .. })));

        let missing = assign_persons(
            &db,
            404,
            AssignPersonsRequest {
                person: vec![first.id],
            },
        )
        .await;
        assert!(matches!(missing, Err(ServiceError::NotFound { entity: "Delegate", .. })));
    }

    #[tokio::test]
    async fn test_delete_clears_assignments() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;
        let person = insert_person(&db, "Sami", "Doc", PersonType::Doctor, &bardo, None).await;
        let delegate = create(&db, request(Some("k@example.com"), Some("pw"))).await.unwrap();
        assign_persons(
            &db,
            delegate.id,
            AssignPersonsRequest {
                person: vec![person.id],
            },
        )
        .await
        .unwrap();

        delete(&db, delegate.id).await.unwrap();
        assert!(delegate_person::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(person::Entity::find_by_id(person.id).one(&db).await.unwrap().is_some());
    }
}
