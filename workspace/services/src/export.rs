use model::entities::person;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, instrument};

use crate::error::{Result, ServiceError};
use crate::import::ImportFormat;
use crate::persons::parse_person_type;

const PERSON_HEADER: [&str; 12] = [
    "id",
    "firstname",
    "lastname",
    "address",
    "phoneNumber",
    "email",
    "type",
    "doctorId",
    "pharmacienId",
    "wholesalerId",
    "governmentId",
    "regionId",
];

fn optional(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes every person of `type_id` as CSV, ordered by id.
///
/// `format` uses the import format names; only `csv` is supported.
#[instrument(skip(db))]
pub async fn export_persons(db: &DatabaseConnection, type_id: i32, format: &str) -> Result<String> {
    let ImportFormat::Csv = format.parse::<ImportFormat>()?;
    let person_type = parse_person_type(type_id)?;

    let rows = person::Entity::find()
        .filter(person::Column::PersonType.eq(person_type))
        .order_by_asc(person::Column::Id)
        .all(db)
        .await?;
    debug!("Exporting {} persons of type {}", rows.len(), type_id);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PERSON_HEADER)?;
    for row in rows {
        writer.write_record([
            row.id.to_string(),
            row.firstname,
            row.lastname,
            row.address,
            row.phone_number,
            row.email.unwrap_or_default(),
            row.person_type.code().to_string(),
            optional(row.doctor_id),
            optional(row.pharmacien_id),
            optional(row.wholesaler_id),
            row.government_id.to_string(),
            row.region_id.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::Parse(format!("Could not flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::Parse(format!("CSV is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{insert_government, insert_person, insert_region, setup_db};
    use model::PersonType;

    #[tokio::test]
    async fn test_export_only_requested_type() {
        let db = setup_db().await;
        let tunis = insert_government(&db, "Tunis").await;
        let bardo = insert_region(&db, "Bardo", tunis.id).await;
        let doctor = insert_person(&db, "Sami", "Ben Ali", PersonType::Doctor, &bardo, None).await;
        insert_person(&db, "Rim", "Ph", PersonType::Pharmacien, &bardo, None).await;

        let csv = export_persons(&db, 1, "csv").await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "id,firstname,lastname,address,phoneNumber,email,type,doctorId,pharmacienId,wholesalerId,governmentId,regionId"
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            format!(
                "{},Sami,Ben Ali,Unknown,Unknown,,1,{},,,{},{}",
                doctor.id,
                doctor.doctor_id.unwrap(),
                tunis.id,
                bardo.id
            )
        );
    }

    #[tokio::test]
    async fn test_export_rejects_unknown_format_and_type() {
        let db = setup_db().await;
        assert!(matches!(
            export_persons(&db, 1, "json").await,
            Err(ServiceError::Parse(_))
        ));
        assert!(matches!(
            export_persons(&db, 4, "csv").await,
            Err(ServiceError::InvalidArgument(_))
        ));
    }
}
