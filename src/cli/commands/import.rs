use std::path::Path;

use anyhow::{Context, Result};
use sea_orm::Database;
use services::import::{self, ImportFormat, PersonImportMode};
use services::TracingNotifier;
use tracing::{debug, info};

use crate::cli::ImportKind;

/// Runs one importer over a local file, writing progress to the log.
pub async fn import_file(database_url: &str, kind: ImportKind, path: &Path, format: &str) -> Result<()> {
    let format: ImportFormat = format.parse()?;
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read import file {}", path.display()))?;
    debug!("Read {} bytes from {}", data.len(), path.display());

    let db = Database::connect(database_url).await?;
    let notifier = TracingNotifier;

    let summary = match kind {
        ImportKind::Doctors => {
            import::import_persons(&db, &data, format, PersonImportMode::Doctor, &notifier).await?
        }
        ImportKind::Others => {
            import::import_persons(&db, &data, format, PersonImportMode::Mixed, &notifier).await?
        }
        ImportKind::Products => import::import_products(&db, &data, format, &notifier).await?,
        ImportKind::Samples => import::import_samples(&db, &data, format, &notifier).await?,
    };

    info!(
        "Imported {:?} from {}: {} rows, {} created, {} updated, {} skipped, {} failed",
        kind,
        path.display(),
        summary.total,
        summary.created,
        summary.updated,
        summary.skipped,
        summary.failed
    );
    Ok(())
}
