use std::collections::HashMap;

use common::{
    CreateReportRequest, Paginated, ReportDto, ReportProductDto, ReportSampleDto,
    UpdateReportRequest,
};
use model::entities::{
    delegate, government, person, product, region, report, report_product, report_sample, sample,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{Result, ServiceError};
use crate::fetch;
use crate::filter::fields::{REPORT_FIELDS, REPORT_SEARCH};
use crate::filter::{FilterBuilder, FilterMap, MatchMode, search_condition};
use crate::pagination::{PageRequest, fetch_page};
use crate::persons::PersonFetchPlan;
use crate::{delegates, governments, persons, products, regions, samples};

/// Relations loaded alongside reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFetchPlan {
    pub geography: bool,
    pub person: bool,
    pub delegate: bool,
    /// Sample and product lines, each with its sample or product
    pub lines: bool,
}

impl ReportFetchPlan {
    /// Listings skip the lines.
    pub const LISTING: Self = Self {
        geography: true,
        person: true,
        delegate: true,
        lines: false,
    };

    pub const FULL: Self = Self {
        geography: true,
        person: true,
        delegate: true,
        lines: true,
    };
}

/// Reports joined with the person and doctor tables the filters read.
fn joined_select() -> Select<report::Entity> {
    report::Entity::find()
        .join(JoinType::LeftJoin, report::Relation::Person.def())
        .join(JoinType::LeftJoin, person::Relation::Doctor.def())
}

fn to_dto(model: report::Model) -> ReportDto {
    ReportDto {
        id: model.id,
        name: model.name,
        date: model.date,
        duration: model.duration,
        specialty: model.specialty,
        note: model.note,
        status: model.status,
        government_id: model.government_id,
        region_id: model.region_id,
        person_id: model.person_id,
        delegate_id: model.delegate_id,
        government: None,
        region: None,
        person: None,
        delegate: None,
        report_samples: Vec::new(),
        report_products: Vec::new(),
    }
}

async fn load_lines<C: ConnectionTrait>(
    db: &C,
    report_ids: &[i32],
) -> Result<(HashMap<i32, Vec<ReportSampleDto>>, HashMap<i32, Vec<ReportProductDto>>)> {
    let sample_lines = report_sample::Entity::find()
        .filter(report_sample::Column::ReportId.is_in(report_ids.iter().copied()))
        .order_by_asc(report_sample::Column::Id)
        .all(db)
        .await?;
    let samples_by_id = fetch::by_ids::<sample::Entity, _, _>(
        db,
        sample::Column::Id,
        sample_lines.iter().map(|l| l.sample_id),
        |s| s.id,
    )
    .await?;

    let product_lines = report_product::Entity::find()
        .filter(report_product::Column::ReportId.is_in(report_ids.iter().copied()))
        .order_by_asc(report_product::Column::Id)
        .all(db)
        .await?;
    let products_by_id = fetch::by_ids::<product::Entity, _, _>(
        db,
        product::Column::Id,
        product_lines.iter().map(|l| l.product_id),
        |p| p.id,
    )
    .await?;

    let mut samples_of: HashMap<i32, Vec<ReportSampleDto>> = HashMap::new();
    for line in sample_lines {
        samples_of.entry(line.report_id).or_default().push(ReportSampleDto {
            id: line.id,
            quantity: line.quantity,
            sample_id: line.sample_id,
            sample: samples_by_id.get(&line.sample_id).cloned().map(samples::to_dto),
        });
    }

    let mut products_of: HashMap<i32, Vec<ReportProductDto>> = HashMap::new();
    for line in product_lines {
        products_of.entry(line.report_id).or_default().push(ReportProductDto {
            id: line.id,
            potential: line.potential,
            product_id: line.product_id,
            product: products_by_id.get(&line.product_id).cloned().map(products::to_dto),
        });
    }

    Ok((samples_of, products_of))
}

async fn hydrate<C: ConnectionTrait>(
    db: &C,
    reports: Vec<report::Model>,
    plan: ReportFetchPlan,
) -> Result<Vec<ReportDto>> {
    if reports.is_empty() {
        return Ok(Vec::new());
    }
    trace!("Hydrating {} reports with {:?}", reports.len(), plan);

    let (governments_by_id, regions_by_id) = if plan.geography {
        let governments_by_id = fetch::by_ids::<government::Entity, _, _>(
            db,
            government::Column::Id,
            reports.iter().map(|r| r.government_id),
            |g| g.id,
        )
        .await?;
        let regions_by_id = fetch::by_ids::<region::Entity, _, _>(
            db,
            region::Column::Id,
            reports.iter().map(|r| r.region_id),
            |r| r.id,
        )
        .await?;
        (governments_by_id, regions_by_id)
    } else {
        Default::default()
    };

    let mut persons_by_id = HashMap::new();
    if plan.person {
        let rows = fetch::by_ids::<person::Entity, _, _>(
            db,
            person::Column::Id,
            reports.iter().map(|r| r.person_id),
            |p| p.id,
        )
        .await?;
        for dto in persons::hydrate(db, rows.into_values().collect(), PersonFetchPlan::DETAIL_ONLY).await? {
            persons_by_id.insert(dto.id, dto);
        }
    }

    let mut delegates_by_id = HashMap::new();
    if plan.delegate {
        let rows = fetch::by_ids::<delegate::Entity, _, _>(
            db,
            delegate::Column::Id,
            reports.iter().map(|r| r.delegate_id),
            |d| d.id,
        )
        .await?;
        for dto in delegates::hydrate(db, rows.into_values().collect()).await? {
            delegates_by_id.insert(dto.id, dto);
        }
    }

    let (mut samples_of, mut products_of) = if plan.lines {
        let ids: Vec<i32> = reports.iter().map(|r| r.id).collect();
        load_lines(db, &ids).await?
    } else {
        Default::default()
    };

    Ok(reports
        .into_iter()
        .map(|model| {
            let government = governments_by_id.get(&model.government_id).cloned();
            let region = regions_by_id.get(&model.region_id).cloned();
            let person = persons_by_id.get(&model.person_id).cloned();
            let delegate = delegates_by_id.get(&model.delegate_id).cloned();
            let report_samples = samples_of.remove(&model.id).unwrap_or_default();
            let report_products = products_of.remove(&model.id).unwrap_or_default();

            let mut dto = to_dto(model);
            dto.government = government.map(governments::to_dto);
            dto.region = region.map(|r| regions::to_dto(r, None));
            dto.person = person;
            dto.delegate = delegate;
            dto.report_samples = report_samples;
            dto.report_products = report_products;
            dto
        })
        .collect())
}

/// Checks every id the report points at before anything is written.
async fn require_references(db: &DatabaseConnection, request: &CreateReportRequest) -> Result<()> {
    governments::require(db, request.government_id).await?;
    regions::require(db, request.region_id).await?;
    persons::require(db, request.person_id).await?;
    delegates::require(db, request.delegate_id).await?;

    let sample_ids: Vec<i32> = request.samples.iter().map(|l| l.sample_id).collect();
    let found = fetch::by_ids::<sample::Entity, _, _>(db, sample::Column::Id, sample_ids.clone(), |s| s.id).await?;
    if let Some(missing) = sample_ids.iter().find(|id| !found.contains_key(id)) {
        return Err(ServiceError::not_found("Sample", *missing));
    }

    let product_ids: Vec<i32> = request.products.iter().map(|l| l.product_id).collect();
    let found = fetch::by_ids::<product::Entity, _, _>(db, product::Column::Id, product_ids.clone(), |p| p.id).await?;
    if let Some(missing) = product_ids.iter().find(|id| !found.contains_key(id)) {
        return Err(ServiceError::not_found("Product", *missing));
    }
    Ok(())
}

/// Creates the report with its sample and product lines in one transaction.
#[instrument(skip(db, request), fields(name = %request.name, person_id = request.person_id))]
pub async fn create(db: &DatabaseConnection, request: CreateReportRequest) -> Result<ReportDto> {
    require_references(db, &request).await?;

    let txn = db.begin().await?;
    let created = report::ActiveModel {
        name: Set(request.name),
        date: Set(request.date),
        duration: Set(request.duration),
        specialty: Set(request.specialty),
        note: Set(request.note),
        status: Set(request.status),
        government_id: Set(request.government_id),
        region_id: Set(request.region_id),
        person_id: Set(request.person_id),
        delegate_id: Set(request.delegate_id),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(ServiceError::from_write)?;

    for line in request.samples {
        report_sample::ActiveModel {
            quantity: Set(line.quantity),
            report_id: Set(created.id),
            sample_id: Set(line.sample_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::from_write)?;
    }
    for line in request.products {
        report_product::ActiveModel {
            potential: Set(line.potential),
            report_id: Set(created.id),
            product_id: Set(line.product_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::from_write)?;
    }
    txn.commit().await?;

    info!("Report created with ID: {}", created.id);
    get(db, created.id).await
}

/// Newest first, with search over name and note and the report filter table.
#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filters: &FilterMap,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Paginated<ReportDto>> {
    let mut select = joined_select()
        .filter(FilterBuilder::new(REPORT_FIELDS).build(filters))
        .order_by_desc(report::Column::Id);
    if let Some(condition) = search_condition(search, REPORT_SEARCH) {
        select = select.filter(condition);
    }

    let (rows, total) = fetch_page(db, select, &page).await?;
    debug!("Retrieved {} of {} reports", rows.len(), total);
    let data = hydrate(db, rows, ReportFetchPlan::LISTING).await?;
    Ok(page.wrap(data, total))
}

#[instrument(skip(db))]
pub async fn filter(db: &DatabaseConnection, filters: &FilterMap) -> Result<Vec<ReportDto>> {
    let rows = joined_select()
        .filter(
            FilterBuilder::new(REPORT_FIELDS)
                .with_mode(MatchMode::Exact)
                .build(filters),
        )
        .order_by_desc(report::Column::Id)
        .all(db)
        .await?;
    hydrate(db, rows, ReportFetchPlan::LISTING).await
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<ReportDto> {
    let model = report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Report", id))?;
    hydrate(db, vec![model], ReportFetchPlan::FULL)
        .await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("Report", id))
}

pub fn apply_report_update(existing: report::Model, request: UpdateReportRequest) -> report::ActiveModel {
    let mut active: report::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(date) = request.date {
        active.date = Set(date);
    }
    if let Some(duration) = request.duration {
        active.duration = Set(duration);
    }
    if let Some(specialty) = request.specialty {
        active.specialty = Set(specialty);
    }
    if let Some(note) = request.note {
        active.note = Set(note);
    }
    if let Some(status) = request.status {
        active.status = Set(status);
    }
    active
}

#[instrument(skip(db))]
pub async fn update(db: &DatabaseConnection, id: i32, request: UpdateReportRequest) -> Result<ReportDto> {
    let existing = report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Report", id))?;
    let active = apply_report_update(existing, request);
    if active.is_changed() {
        active.update(db).await.map_err(ServiceError::from_write)?;
        info!("Report with ID {} updated", id);
    } else {
        debug!("No fields to update for report ID: {}", id);
    }
    get(db, id).await
}

/// Deletes the report; its lines go with it.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
    let result = report::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        warn!("Report with ID {} not found for deletion", id);
        return Err(ServiceError::not_found("Report", id));
    }
    info!("Report with ID {} deleted", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use crate::testing::{insert_government, insert_person, insert_region, insert_specialty, setup_db};
    use chrono::NaiveDate;
    use common::{ReportProductLine, ReportSampleLine};
    use model::PersonType;
    use rust_decimal::Decimal;

    struct Fixture {
        db: DatabaseConnection,
        region: region::Model,
        doctor: person::Model,
        pharmacien: person::Model,
        delegate: delegate::Model,
        sample: sample::Model,
        product: product::Model,
        cardio_id: i32,
    }

    async fn fixture() -> Fixture {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let region = insert_region(&db, "Bardo", tunis.id).await;
        let cardio = insert_specialty(&db, "Cardiologie", "CAR").await;
        let doctor = insert_person(&db, "Sami", "Doc", PersonType::Doctor, &region, Some(cardio.id)).await;
        let pharmacien = insert_person(&db, "Rim", "Ph", PersonType::Pharmacien, &region, None).await;
        let delegate = delegate::ActiveModel {
            firstname: Set("Karim".to_string()),
            lastname: Set("Trabelsi".to_string()),
            phone_number: Set("22000000".to_string()),
            address: Set("Ariana".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let sample = sample::ActiveModel {
            name: Set("Doliprane".to_string()),
            sample_code: Set(Some("S1".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let product = product::ActiveModel {
            name: Set("Aspirin".to_string()),
            price: Set(Decimal::new(1250, 2)),
            family: Set(None),
            product_creation_date: Set(None),
            product_code: Set(Some("P1".to_string())),
            bar_code: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        Fixture {
            db,
            region,
            doctor,
            pharmacien,
            delegate,
            sample,
            product,
            cardio_id: cardio.id,
        }
    }

    fn request(f: &Fixture, person: &person::Model, day: u32) -> CreateReportRequest {
        CreateReportRequest {
            name: format!("Visit {}", person.firstname),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            duration: "30min".to_string(),
            specialty: "general".to_string(),
            note: "follow up next month".to_string(),
            status: "done".to_string(),
            government_id: f.region.government_id,
            region_id: f.region.id,
            person_id: person.id,
            delegate_id: f.delegate.id,
            samples: vec![ReportSampleLine {
                sample_id: f.sample.id,
                quantity: 3,
            }],
            products: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_with_lines_and_get() {
        let f = fixture().await;
        let mut req = request(&f, &f.doctor, 10);
        req.products.push(ReportProductLine {
            product_id: f.product.id,
            potential: "high".to_string(),
        });

        let created = create(&f.db, req).await.unwrap();
        assert_eq!(created.report_samples.len(), 1);
        assert_eq!(created.report_samples[0].quantity, 3);
        assert_eq!(
            created.report_samples[0].sample.as_ref().map(|s| s.name.as_str()),
            Some("Doliprane")
        );
        assert_eq!(created.report_products[0].potential, "high");
        assert_eq!(created.person.as_ref().map(|p| p.person_type), Some(1));
        assert_eq!(created.delegate.as_ref().map(|d| d.id), Some(f.delegate.id));
    }

    #[tokio::test]
    async fn test_create_with_unknown_sample_writes_nothing() {
        let f = fixture().await;
        let mut req = request(&f, &f.doctor, 10);
        req.samples.push(ReportSampleLine {
            sample_id: 404,
            quantity: 1,
        });

        let result = create(&f.db, req).await;
        assert!(matches!(
            result,
            Err(ServiceError::NotFound {
                entity: "Sample",
                id: 404
            })
        ));
        assert!(report::Entity::find().all(&f.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_by_type_specialty_and_interval() {
        let f = fixture().await;
        create(&f.db, request(&f, &f.doctor, 5)).await.unwrap();
        create(&f.db, request(&f, &f.doctor, 20)).await.unwrap();
        let mut pharma = request(&f, &f.pharmacien, 12);
        pharma.samples.clear();
        create(&f.db, pharma).await.unwrap();

        let mut filters = FilterMap::new();
        filters.insert("type", FilterValue::Scalar("1".to_string()));
        let page = list(&f.db, &filters, None, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);

        let mut filters = FilterMap::new();
        filters.insert("specialtyId", FilterValue::Scalar(f.cardio_id.to_string()));
        filters.insert(
            "dateInterval",
            FilterValue::List(vec!["2025-03-01".to_string(), "2025-03-15".to_string()]),
        );
        let page = list(&f.db, &filters, None, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].date, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());

        let mut filters = FilterMap::new();
        filters.insert("sampleId", FilterValue::Scalar(f.sample.id.to_string()));
        let page = list(&f.db, &filters, Some("visit sami"), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert!(page.data[0].id > page.data[1].id);
    }

    #[tokio::test]
    async fn test_delete_cascades_lines() {
        let f = fixture().await;
        let created = create(&f.db, request(&f, &f.doctor, 10)).await.unwrap();

        delete(&f.db, created.id).await.unwrap();
        assert!(report_sample::Entity::find().all(&f.db).await.unwrap().is_empty());
        assert!(matches!(
            get(&f.db, created.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
