use common::ImportSummary;
use model::entities::{product, sample};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::{error, info, instrument, warn};

use super::{ImportFormat, ImportRow, ProgressTracker, parse_rows, report_completion};
use crate::error::Result;
use crate::notifier::ImportNotifier;
use crate::{products, samples};

/// What happened to one catalog row.
enum Outcome {
    Created,
    Duplicate,
    Failed,
}

async fn import_product_row(
    db: &DatabaseConnection,
    row: &ImportRow,
    notifier: &dyn ImportNotifier,
) -> Result<Outcome> {
    let name = row.get("name");
    let code = row.get("code");
    notifier.send_log(&format!("Product: {}", name.unwrap_or_default()));

    if let Some(existing) = products::find_duplicate(db, name, code, None, None).await? {
        notifier.send_log(&format!(
            "Duplicate detected: {} (existing product {})",
            code.unwrap_or_default(),
            existing.id
        ));
        return Ok(Outcome::Duplicate);
    }

    let insert = product::ActiveModel {
        name: Set(name.unwrap_or("Unknown").to_string()),
        price: Set(row.get("price").map(products::parse_price).unwrap_or_default()),
        family: Set(row.get("family").map(str::to_string)),
        product_creation_date: Set(row.get("productcreationdate").map(str::to_string)),
        product_code: Set(code.map(str::to_string)),
        bar_code: Set(row.get("barcode").map(str::to_string)),
        ..Default::default()
    }
    .insert(db)
    .await;

    match insert {
        Ok(created) => {
            notifier.send_log(&format!("Product saved: {}", created.name));
            Ok(Outcome::Created)
        }
        Err(err) => {
            warn!(error = %err, "Product row could not be saved");
            notifier.send_log(&format!(
                "Existing product: {} {}",
                code.unwrap_or_default(),
                name.unwrap_or_default()
            ));
            Ok(Outcome::Failed)
        }
    }
}

async fn import_sample_row(
    db: &DatabaseConnection,
    row: &ImportRow,
    notifier: &dyn ImportNotifier,
) -> Result<Outcome> {
    let name = row.get("name");
    let code = row.get("code");
    notifier.send_log(&format!("Sample: {}", name.unwrap_or_default()));

    if let Some(existing) = samples::find_duplicate(db, name, code, None).await? {
        notifier.send_log(&format!(
            "Duplicate detected: {} (existing sample {})",
            code.unwrap_or_default(),
            existing.id
        ));
        return Ok(Outcome::Duplicate);
    }

    let insert = sample::ActiveModel {
        name: Set(name.unwrap_or("Unknown").to_string()),
        sample_code: Set(code.map(str::to_string)),
        ..Default::default()
    }
    .insert(db)
    .await;

    match insert {
        Ok(created) => {
            notifier.send_log(&format!("Sample saved: {}", created.name));
            Ok(Outcome::Created)
        }
        Err(err) => {
            warn!(error = %err, "Sample row could not be saved");
            notifier.send_log(&format!(
                "Existing sample: {} {}",
                code.unwrap_or_default(),
                name.unwrap_or_default()
            ));
            Ok(Outcome::Failed)
        }
    }
}

fn tally(summary: &mut ImportSummary, outcome: Result<Outcome>, notifier: &dyn ImportNotifier, index: usize) {
    match outcome {
        Ok(Outcome::Created) => summary.created += 1,
        Ok(Outcome::Duplicate) => summary.skipped += 1,
        Ok(Outcome::Failed) => summary.failed += 1,
        Err(err) => {
            error!(row = index + 1, error = %err, "Catalog row failed");
            notifier.send_log(&format!("Row {} failed: {}", index + 1, err));
            summary.failed += 1;
        }
    }
}

/// Imports products. A row matching an existing product by code or name is
/// skipped as a whole, nothing is merged.
#[instrument(skip(db, data, notifier), fields(bytes = data.len()))]
pub async fn import_products(
    db: &DatabaseConnection,
    data: &[u8],
    format: ImportFormat,
    notifier: &dyn ImportNotifier,
) -> Result<ImportSummary> {
    let rows = parse_rows(data, format)?;
    let mut summary = ImportSummary {
        total: rows.len(),
        ..Default::default()
    };
    let mut progress = ProgressTracker::new(rows.len());

    for (index, row) in rows.iter().enumerate() {
        notifier.send_progress(progress.advance());
        let outcome = import_product_row(db, row, notifier).await;
        tally(&mut summary, outcome, notifier, index);
    }

    info!(?summary, "Product import finished");
    report_completion(notifier, "Product", &summary);
    Ok(summary)
}

/// Imports samples with the same skip-on-duplicate rule as products.
#[instrument(skip(db, data, notifier), fields(bytes = data.len()))]
pub async fn import_samples(
    db: &DatabaseConnection,
    data: &[u8],
    format: ImportFormat,
    notifier: &dyn ImportNotifier,
) -> Result<ImportSummary> {
    let rows = parse_rows(data, format)?;
    let mut summary = ImportSummary {
        total: rows.len(),
        ..Default::default()
    };
    let mut progress = ProgressTracker::new(rows.len());

    for (index, row) in rows.iter().enumerate() {
        notifier.send_progress(progress.advance());
        let outcome = import_sample_row(db, row, notifier).await;
        tally(&mut summary, outcome, notifier, index);
    }

    info!(?summary, "Sample import finished");
    report_completion(notifier, "Sample", &summary);
    Ok(summary)
}
