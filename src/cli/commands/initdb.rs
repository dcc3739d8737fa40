use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::{debug, info};

/// Applies every pending migration, returning how many ran.
pub async fn apply_migrations(db: &DatabaseConnection) -> Result<usize> {
    let pending: Vec<String> = Migrator::get_pending_migrations(db)
        .await
        .context("Failed to read the migration status")?
        .iter()
        .map(|migration| migration.name().to_string())
        .collect();

    if pending.is_empty() {
        info!("Schema already up to date");
        return Ok(0);
    }

    debug!(?pending, "Applying migrations");
    Migrator::up(db, None)
        .await
        .context("Failed to apply migrations")?;
    info!("Applied {} migrations", pending.len());
    Ok(pending.len())
}

/// Connects to `database_url` and brings the people, catalog and report tables up to date.
pub async fn init_database(database_url: &str) -> Result<()> {
    info!("Initializing FieldOps database");
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    apply_migrations(&db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_run_applies_nothing() {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        assert_eq!(apply_migrations(&db).await.unwrap(), 2);
        assert_eq!(apply_migrations(&db).await.unwrap(), 0);
        assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());
    }
}
