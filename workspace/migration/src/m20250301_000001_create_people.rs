use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Governments::Table)
                    .if_not_exists()
                    .col(pk_auto(Governments::Id))
                    .col(string(Governments::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Regions::Table)
                    .if_not_exists()
                    .col(pk_auto(Regions::Id))
                    .col(string(Regions::Name))
                    .col(integer(Regions::GovernmentId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_region_government")
                            .from(Regions::Table, Regions::GovernmentId)
                            .to(Governments::Table, Governments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Region names only need to be unique inside their government
        manager
            .create_index(
                Index::create()
                    .name("idx_regions_government_name")
                    .table(Regions::Table)
                    .col(Regions::GovernmentId)
                    .col(Regions::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Specialties::Table)
                    .if_not_exists()
                    .col(pk_auto(Specialties::Id))
                    .col(string(Specialties::Name).unique_key())
                    .col(string(Specialties::Abbreviation).unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Doctors::Table)
                    .if_not_exists()
                    .col(pk_auto(Doctors::Id))
                    .col(integer_null(Doctors::DoctorType))
                    .col(integer_null(Doctors::SpecialtyId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_doctor_specialty")
                            .from(Doctors::Table, Doctors::SpecialtyId)
                            .to(Specialties::Table, Specialties::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Pharmaciens::Table)
                    .if_not_exists()
                    .col(pk_auto(Pharmaciens::Id))
                    .col(string_null(Pharmaciens::Contact))
                    .col(integer_null(Pharmaciens::PharmacyType))
                    .col(string(Pharmaciens::PharmacyName))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Wholesalers::Table)
                    .if_not_exists()
                    .col(pk_auto(Wholesalers::Id))
                    .col(string(Wholesalers::CompanyName))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Persons::Table)
                    .if_not_exists()
                    .col(pk_auto(Persons::Id))
                    .col(string(Persons::Firstname))
                    .col(string(Persons::Lastname))
                    .col(string(Persons::Address))
                    .col(string(Persons::PhoneNumber))
                    .col(string_null(Persons::Email))
                    .col(string_null(Persons::Code))
                    .col(string_null(Persons::Potential))
                    .col(integer(Persons::Type))
                    .col(integer_null(Persons::DoctorId))
                    .col(integer_null(Persons::PharmacienId))
                    .col(integer_null(Persons::WholesalerId))
                    .col(integer(Persons::GovernmentId))
                    .col(integer(Persons::RegionId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_person_doctor")
                            .from(Persons::Table, Persons::DoctorId)
                            .to(Doctors::Table, Doctors::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_person_pharmacien")
                            .from(Persons::Table, Persons::PharmacienId)
                            .to(Pharmaciens::Table, Pharmaciens::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_person_wholesaler")
                            .from(Persons::Table, Persons::WholesalerId)
                            .to(Wholesalers::Table, Wholesalers::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_person_government")
                            .from(Persons::Table, Persons::GovernmentId)
                            .to(Governments::Table, Governments::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_person_region")
                            .from(Persons::Table, Persons::RegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Import deduplication key
        manager
            .create_index(
                Index::create()
                    .name("idx_persons_name_region")
                    .table(Persons::Table)
                    .col(Persons::Firstname)
                    .col(Persons::Lastname)
                    .col(Persons::RegionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Delegates::Table)
                    .if_not_exists()
                    .col(pk_auto(Delegates::Id))
                    .col(string(Delegates::Firstname))
                    .col(string(Delegates::Lastname))
                    .col(string(Delegates::PhoneNumber))
                    .col(string(Delegates::Address))
                    .to_owned(),
            )
            .await?;

        // Create delegates_persons table (join table)
        manager
            .create_table(
                Table::create()
                    .table(DelegatesPersons::Table)
                    .if_not_exists()
                    .col(integer(DelegatesPersons::DelegateId))
                    .col(integer(DelegatesPersons::PersonId))
                    .primary_key(
                        Index::create()
                            .name("pk_delegates_persons")
                            .col(DelegatesPersons::DelegateId)
                            .col(DelegatesPersons::PersonId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_delegates_persons_delegate")
                            .from(DelegatesPersons::Table, DelegatesPersons::DelegateId)
                            .to(Delegates::Table, Delegates::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_delegates_persons_person")
                            .from(DelegatesPersons::Table, DelegatesPersons::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::FirstName))
                    .col(string(Users::LastName))
                    .col(string(Users::PasswordHash))
                    .col(integer(Users::RoleId))
                    .col(integer(Users::StatusId))
                    .col(integer_null(Users::DelegateId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_delegate")
                            .from(Users::Table, Users::DelegateId)
                            .to(Delegates::Table, Delegates::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DelegatesPersons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Delegates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Persons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wholesalers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pharmaciens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Doctors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Specialties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Regions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Governments::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Governments {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub(crate) enum Regions {
    Table,
    Id,
    Name,
    GovernmentId,
}

#[derive(DeriveIden)]
enum Specialties {
    Table,
    Id,
    Name,
    Abbreviation,
}

#[derive(DeriveIden)]
enum Doctors {
    Table,
    Id,
    DoctorType,
    SpecialtyId,
}

#[derive(DeriveIden)]
enum Pharmaciens {
    Table,
    Id,
    Contact,
    PharmacyType,
    PharmacyName,
}

#[derive(DeriveIden)]
enum Wholesalers {
    Table,
    Id,
    CompanyName,
}

#[derive(DeriveIden)]
pub(crate) enum Persons {
    Table,
    Id,
    Firstname,
    Lastname,
    Address,
    PhoneNumber,
    Email,
    Code,
    Potential,
    Type,
    DoctorId,
    PharmacienId,
    WholesalerId,
    GovernmentId,
    RegionId,
}

#[derive(DeriveIden)]
pub(crate) enum Delegates {
    Table,
    Id,
    Firstname,
    Lastname,
    PhoneNumber,
    Address,
}

#[derive(DeriveIden)]
enum DelegatesPersons {
    Table,
    DelegateId,
    PersonId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    PasswordHash,
    RoleId,
    StatusId,
    DelegateId,
}
