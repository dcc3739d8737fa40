use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_people::{Delegates, Governments, Persons, Regions};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(string(Products::Name).unique_key())
                    .col(decimal(Products::Price).decimal_len(16, 4).default(0))
                    .col(string_null(Products::Family))
                    .col(string_null(Products::ProductCreationDate))
                    .col(string_null(Products::ProductCode).unique_key())
                    .col(string_null(Products::BarCode).unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Samples::Table)
                    .if_not_exists()
                    .col(pk_auto(Samples::Id))
                    .col(string(Samples::Name).unique_key())
                    .col(string_null(Samples::SampleCode).unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(pk_auto(Reports::Id))
                    .col(string(Reports::Name))
                    .col(date(Reports::Date))
                    .col(string(Reports::Duration))
                    .col(string(Reports::Specialty))
                    .col(string(Reports::Note))
                    .col(string(Reports::Status))
                    .col(integer(Reports::GovernmentId))
                    .col(integer(Reports::RegionId))
                    .col(integer(Reports::PersonId))
                    .col(integer(Reports::DelegateId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_government")
                            .from(Reports::Table, Reports::GovernmentId)
                            .to(Governments::Table, Governments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_region")
                            .from(Reports::Table, Reports::RegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_person")
                            .from(Reports::Table, Reports::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_delegate")
                            .from(Reports::Table, Reports::DelegateId)
                            .to(Delegates::Table, Delegates::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReportSamples::Table)
                    .if_not_exists()
                    .col(pk_auto(ReportSamples::Id))
                    .col(integer(ReportSamples::Quantity))
                    .col(integer(ReportSamples::ReportId))
                    .col(integer(ReportSamples::SampleId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_sample_report")
                            .from(ReportSamples::Table, ReportSamples::ReportId)
                            .to(Reports::Table, Reports::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_sample_sample")
                            .from(ReportSamples::Table, ReportSamples::SampleId)
                            .to(Samples::Table, Samples::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReportProducts::Table)
                    .if_not_exists()
                    .col(pk_auto(ReportProducts::Id))
                    .col(string(ReportProducts::Potential))
                    .col(integer(ReportProducts::ReportId))
                    .col(integer(ReportProducts::ProductId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_product_report")
                            .from(ReportProducts::Table, ReportProducts::ReportId)
                            .to(Reports::Table, Reports::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_product_product")
                            .from(ReportProducts::Table, ReportProducts::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportProducts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReportSamples::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Samples::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Price,
    Family,
    ProductCreationDate,
    ProductCode,
    BarCode,
}

#[derive(DeriveIden)]
enum Samples {
    Table,
    Id,
    Name,
    SampleCode,
}

#[derive(DeriveIden)]
enum Reports {
    Table,
    Id,
    Name,
    Date,
    Duration,
    Specialty,
    Note,
    Status,
    GovernmentId,
    RegionId,
    PersonId,
    DelegateId,
}

#[derive(DeriveIden)]
enum ReportSamples {
    Table,
    Id,
    Quantity,
    ReportId,
    SampleId,
}

#[derive(DeriveIden)]
enum ReportProducts {
    Table,
    Id,
    Potential,
    ReportId,
    ProductId,
}
