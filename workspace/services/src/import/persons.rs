use common::{DoctorDetail, ImportSummary, PharmacienDetail, WholesalerDetail};
use model::entities::{government, person, region, specialty};
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{debug, error, info, instrument, warn};

use super::{ImportFormat, ImportRow, ProgressTracker, parse_rows, report_completion};
use crate::error::{Result, ServiceError};
use crate::notifier::ImportNotifier;
use crate::persons::{PersonDetail, insert_with_detail};
use crate::{governments, regions, specialties};

const UNKNOWN: &str = "Unknown";
const UNKNOWN_GOVERNMENT: &str = "unknown";
const PHARMACY_PATTERN: &str = r"(?i)pharmacie|pharma|ph|para";

/// Which person import endpoint is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonImportMode {
    /// Every row is a doctor, with an optional specialty column
    Doctor,
    /// Pharmaciens and wholesalers, told apart by the name
    Mixed,
}

/// Splits a full name on whitespace: the last word is the lastname.
pub(crate) fn split_name(full_name: &str) -> (String, String) {
    let mut parts: Vec<&str> = full_name.split_whitespace().collect();
    let lastname = parts.pop().unwrap_or(UNKNOWN).to_string();
    let firstname = if parts.is_empty() {
        UNKNOWN.to_string()
    } else {
        parts.join(" ")
    };
    (firstname, lastname)
}

/// Values a person row resolves to, before deduplication.
struct PersonRow {
    full_name: String,
    firstname: String,
    lastname: String,
    government_name: String,
    region_name: String,
    address: Option<String>,
    phone_number: Option<String>,
    email: Option<String>,
    code: Option<String>,
    potential: Option<String>,
    specialty: Option<String>,
}

impl PersonRow {
    fn from_row(row: &ImportRow) -> Self {
        let government_name = row.get("government").unwrap_or(UNKNOWN).to_string();
        let region_name = row
            .get("region")
            .map(str::to_string)
            .unwrap_or_else(|| government_name.clone());
        let full_name = row
            .first_of(&["name", "firstname"])
            .unwrap_or("Unknown Unknown")
            .to_string();
        let (firstname, lastname) = split_name(&full_name);

        Self {
            full_name,
            firstname,
            lastname,
            government_name,
            region_name,
            address: row.get("address").map(|a| a.replace(['\r', '\n'], " ")),
            phone_number: row.first_of(&["phonenumber", "tel"]).map(str::to_string),
            email: row.get("email").map(str::to_string),
            code: row.get("code").map(str::to_string),
            potential: row.get("potential").map(str::to_string),
            specialty: row.get("specialty").map(str::to_string),
        }
    }
}

/// What happened to one row.
enum Outcome {
    Created,
    Updated,
    Unchanged,
}

struct PersonImporter<'a> {
    db: &'a DatabaseConnection,
    notifier: &'a dyn ImportNotifier,
    mode: PersonImportMode,
    pharmacy: Regex,
}

impl<'a> PersonImporter<'a> {
    async fn resolve_government(&self, name: &str) -> Result<government::Model> {
        if let Some(found) = governments::find_by_name(self.db, name).await? {
            return Ok(found);
        }
        self.notifier
            .send_log(&format!("Government not found: {}", name));

        if let Some(sentinel) = governments::find_by_name(self.db, UNKNOWN_GOVERNMENT).await? {
            return Ok(sentinel);
        }
        warn!("Sentinel government '{}' missing, creating it", UNKNOWN_GOVERNMENT);
        let created = government::ActiveModel {
            name: Set(UNKNOWN_GOVERNMENT.to_string()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(ServiceError::from_write)?;
        Ok(created)
    }

    async fn resolve_region(&self, government: &government::Model, name: &str) -> Result<region::Model> {
        if let Some(found) = regions::find_by_name(self.db, government.id, name).await? {
            return Ok(found);
        }
        let created = region::ActiveModel {
            name: Set(name.to_string()),
            government_id: Set(government.id),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(ServiceError::from_write)?;
        self.notifier.send_log(&format!(
            "Region created: {} under government {}",
            created.name, government.id
        ));
        Ok(created)
    }

    /// Finds or creates the specialty. A failed creation leaves the doctor without one.
    async fn resolve_specialty(&self, name: Option<&str>) -> Result<Option<specialty::Model>> {
        let Some(name) = name else {
            return Ok(None);
        };
        if let Some(found) = specialties::find_by_name(self.db, name).await? {
            return Ok(Some(found));
        }

        let created = specialty::ActiveModel {
            name: Set(name.to_string()),
            abbreviation: Set(specialties::abbreviate(name)),
            ..Default::default()
        }
        .insert(self.db)
        .await;
        match created {
            Ok(specialty) => {
                self.notifier
                    .send_log(&format!("Specialty created: {}", specialty.name));
                Ok(Some(specialty))
            }
            Err(err) => {
                warn!(error = %err, "Could not create specialty {}", name);
                self.notifier
                    .send_log(&format!("Error while creating specialty: {}", name));
                Ok(None)
            }
        }
    }

    fn detail_for(&self, row: &PersonRow, specialty: Option<&specialty::Model>) -> PersonDetail {
        match self.mode {
            PersonImportMode::Doctor => PersonDetail::Doctor(DoctorDetail {
                doctor_type: None,
                specialty_id: specialty.map(|s| s.id),
            }),
            PersonImportMode::Mixed if self.pharmacy.is_match(&row.full_name) => {
                PersonDetail::Pharmacien(PharmacienDetail {
                    contact: None,
                    pharmacy_type: None,
                    pharmacy_name: row.full_name.clone(),
                })
            }
            PersonImportMode::Mixed => PersonDetail::Wholesaler(WholesalerDetail {
                company_name: row.full_name.clone(),
            }),
        }
    }

    /// Copies the non-empty incoming values that differ onto the existing person.
    async fn merge_existing(&self, existing: person::Model, row: &PersonRow) -> Result<Outcome> {
        self.notifier.send_log(&format!(
            "Existing person: {}. Looking for outdated fields.",
            row.full_name
        ));

        let mut active: person::ActiveModel = existing.clone().into();
        if let Some(code) = row.code.as_ref().filter(|c| existing.code.as_ref() != Some(*c)) {
            active.code = Set(Some(code.clone()));
            self.notifier.send_log("Updated code");
        }
        if let Some(email) = row.email.as_ref().filter(|e| existing.email.as_ref() != Some(*e)) {
            active.email = Set(Some(email.clone()));
            self.notifier.send_log("Updated email");
        }
        if let Some(address) = row.address.as_ref().filter(|a| **a != existing.address) {
            active.address = Set(address.clone());
            self.notifier.send_log("Updated address");
        }
        if let Some(potential) = row
            .potential
            .as_ref()
            .filter(|p| existing.potential.as_ref() != Some(*p))
        {
            active.potential = Set(Some(potential.clone()));
            self.notifier.send_log("Updated potential");
        }

        if !active.is_changed() {
            return Ok(Outcome::Unchanged);
        }
        active.update(self.db).await.map_err(ServiceError::from_write)?;
        self.notifier
            .send_log(&format!("Person updated: {}", row.full_name));
        Ok(Outcome::Updated)
    }

    async fn import_row(&self, raw: &ImportRow, progress: &mut ProgressTracker) -> Result<Outcome> {
        let row = PersonRow::from_row(raw);
        self.notifier.send_log(&format!("Person: {}", row.full_name));

        let government = self.resolve_government(&row.government_name).await?;
        let region = self.resolve_region(&government, &row.region_name).await?;
        self.notifier.send_progress(progress.advance());

        let specialty = match self.mode {
            PersonImportMode::Doctor => self.resolve_specialty(row.specialty.as_deref()).await?,
            PersonImportMode::Mixed => None,
        };
        let detail = self.detail_for(&row, specialty.as_ref());

        let existing = person::Entity::find()
            .filter(person::Column::Firstname.eq(row.firstname.as_str()))
            .filter(person::Column::Lastname.eq(row.lastname.as_str()))
            .filter(person::Column::RegionId.eq(region.id))
            .one(self.db)
            .await?;
        if let Some(existing) = existing {
            return self.merge_existing(existing, &row).await;
        }

        let candidate = person::ActiveModel {
            firstname: Set(row.firstname.clone()),
            lastname: Set(row.lastname.clone()),
            address: Set(row.address.clone().unwrap_or_else(|| UNKNOWN.to_string())),
            phone_number: Set(row.phone_number.clone().unwrap_or_else(|| UNKNOWN.to_string())),
            email: Set(Some(row.email.clone().unwrap_or_else(|| UNKNOWN.to_string()))),
            code: Set(row.code.clone()),
            potential: Set(row.potential.clone()),
            government_id: Set(government.id),
            region_id: Set(region.id),
            ..Default::default()
        };

        let txn = self.db.begin().await?;
        let created = insert_with_detail(&txn, candidate, detail).await?;
        txn.commit().await?;
        debug!(
            "Imported person {} as {:?} with ID {}",
            row.full_name, created.person_type, created.id
        );
        Ok(Outcome::Created)
    }
}

/// Imports doctors, or pharmaciens and wholesalers, from a payload.
///
/// Rows are matched on (firstname, lastname, region); a match gets its
/// code, email, address and potential refreshed instead of a new row.
#[instrument(skip(db, data, notifier), fields(bytes = data.len()))]
pub async fn import_persons(
    db: &DatabaseConnection,
    data: &[u8],
    format: ImportFormat,
    mode: PersonImportMode,
    notifier: &dyn ImportNotifier,
) -> Result<ImportSummary> {
    notifier.send_log("Import started");
    let rows = parse_rows(data, format)?;
    let pharmacy = Regex::new(PHARMACY_PATTERN)
        .map_err(|e| ServiceError::Parse(format!("Invalid classification pattern: {}", e)))?;
    let importer = PersonImporter {
        db,
        notifier,
        mode,
        pharmacy,
    };

    let mut summary = ImportSummary {
        total: rows.len(),
        ..Default::default()
    };
    let mut progress = ProgressTracker::new(rows.len());

    for (index, row) in rows.iter().enumerate() {
        match importer.import_row(row, &mut progress).await {
            Ok(Outcome::Created) => summary.created += 1,
            Ok(Outcome::Updated) => summary.updated += 1,
            Ok(Outcome::Unchanged) => summary.skipped += 1,
            Err(err) => {
                error!(row = index + 1, error = %err, "Person row failed");
                notifier.send_log(&format!("Row {} failed: {}", index + 1, err));
                summary.failed += 1;
            }
        }
    }

    info!(?summary, ?mode, "Person import finished");
    report_completion(notifier, "Person", &summary);
    Ok(summary)
}
