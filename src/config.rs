use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment};
use sea_orm::Database;
use serde::Deserialize;
use services::ImportBroadcaster;
use tracing::{debug, info};

use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://fieldops.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Runtime settings. Defaults, then `FIELDOPS_*` environment variables;
/// CLI flags override both.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    /// Upper bound for a single request, imports included
    pub request_timeout_secs: u64,
    pub import_channel_capacity: usize,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings: Settings = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("request_timeout_secs", 300)?
            .set_default("import_channel_capacity", services::notifier::DEFAULT_CHANNEL_CAPACITY as u64)?
            .add_source(Environment::with_prefix("FIELDOPS"))
            .build()?
            .try_deserialize()?;

        debug!(?settings, "Settings loaded");
        Ok(settings)
    }

    pub fn with_overrides(mut self, database_url: Option<String>, bind_address: Option<String>) -> Self {
        if let Some(url) = database_url {
            self.database_url = url;
        }
        if let Some(address) = bind_address {
            self.bind_address = address;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Connect to the database and build the shared handler state
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;

    Ok(AppState {
        db,
        notifier: ImportBroadcaster::with_capacity(settings.import_channel_capacity),
        request_timeout: settings.request_timeout(),
    })
}
