//! Shared fixtures for the services tests.

use std::sync::Mutex;

use migration::{Migrator, MigratorTrait};
use model::entities::{doctor, government, person, pharmacien, region, specialty, wholesaler};
use model::PersonType;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

use crate::notifier::{ImportEvent, ImportNotifier};

/// Routes service logs to the test output. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("services=debug")
        .with_test_writer()
        .try_init();
}

/// Create an in-memory SQLite database with the schema applied
pub async fn setup_db() -> DatabaseConnection {
    init_tracing();
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Keeps every event it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ImportEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<ImportEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ImportEvent::Progress(p) => Some(p),
                ImportEvent::Log(_) => None,
            })
            .collect()
    }

    pub fn logs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ImportEvent::Log(line) => Some(line),
                ImportEvent::Progress(_) => None,
            })
            .collect()
    }
}

impl ImportNotifier for RecordingNotifier {
    fn send_log(&self, message: &str) {
        self.events.lock().unwrap().push(ImportEvent::Log(message.to_string()));
    }

    fn send_progress(&self, percent: u8) {
        self.events.lock().unwrap().push(ImportEvent::Progress(percent));
    }
}

pub async fn insert_government(db: &DatabaseConnection, name: &str) -> government::Model {
    government::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert government")
}

pub async fn insert_region(db: &DatabaseConnection, name: &str, government_id: i32) -> region::Model {
    region::ActiveModel {
        name: Set(name.to_string()),
        government_id: Set(government_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert region")
}

pub async fn insert_specialty(db: &DatabaseConnection, name: &str, abbreviation: &str) -> specialty::Model {
    specialty::ActiveModel {
        name: Set(name.to_string()),
        abbreviation: Set(abbreviation.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert specialty")
}

/// Inserts a person of `person_type` with a bare detail row.
pub async fn insert_person(
    db: &DatabaseConnection,
    firstname: &str,
    lastname: &str,
    person_type: PersonType,
    region: &region::Model,
    specialty_id: Option<i32>,
) -> person::Model {
    let mut active = person::ActiveModel {
        firstname: Set(firstname.to_string()),
        lastname: Set(lastname.to_string()),
        address: Set("Unknown".to_string()),
        phone_number: Set("Unknown".to_string()),
        email: Set(None),
        code: Set(None),
        potential: Set(None),
        person_type: Set(person_type),
        doctor_id: Set(None),
        pharmacien_id: Set(None),
        wholesaler_id: Set(None),
        government_id: Set(region.government_id),
        region_id: Set(region.id),
        ..Default::default()
    };

    match person_type {
        PersonType::Doctor => {
            let detail = doctor::ActiveModel {
                doctor_type: Set(Some(1)),
                specialty_id: Set(specialty_id),
                ..Default::default()
            }
            .insert(db)
            .await
            .expect("Failed to insert doctor");
            active.doctor_id = Set(Some(detail.id));
        }
        PersonType::Pharmacien => {
            let detail = pharmacien::ActiveModel {
                contact: Set(None),
                pharmacy_type: Set(Some(1)),
                pharmacy_name: Set(format!("pharmacie {}", lastname)),
                ..Default::default()
            }
            .insert(db)
            .await
            .expect("Failed to insert pharmacien");
            active.pharmacien_id = Set(Some(detail.id));
        }
        PersonType::Wholesaler => {
            let detail = wholesaler::ActiveModel {
                company_name: Set(lastname.to_string()),
                ..Default::default()
            }
            .insert(db)
            .await
            .expect("Failed to insert wholesaler");
            active.wholesaler_id = Set(Some(detail.id));
        }
    }

    active.insert(db).await.expect("Failed to insert person")
}
