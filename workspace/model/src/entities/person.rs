use sea_orm::entity::prelude::*;

/// Discriminator for the kind of contact a person is.
/// Stored as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum PersonType {
    #[sea_orm(num_value = 1)]
    Doctor,
    #[sea_orm(num_value = 2)]
    Pharmacien,
    #[sea_orm(num_value = 3)]
    Wholesaler,
}

impl PersonType {
    /// Maps a numeric discriminator to a type, `None` outside of 1..=3.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(PersonType::Doctor),
            2 => Some(PersonType::Pharmacien),
            3 => Some(PersonType::Wholesaler),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            PersonType::Doctor => 1,
            PersonType::Pharmacien => 2,
            PersonType::Wholesaler => 3,
        }
    }
}

/// A doctor, pharmacist or wholesaler contact.
///
/// Exactly one of `doctor_id`, `pharmacien_id` and `wholesaler_id` is set,
/// the one matching `person_type`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "persons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub address: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub code: Option<String>,
    pub potential: Option<String>,
    #[sea_orm(column_name = "type")]
    pub person_type: PersonType,
    pub doctor_id: Option<i32>,
    pub pharmacien_id: Option<i32>,
    pub wholesaler_id: Option<i32>,
    pub government_id: i32,
    pub region_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::government::Entity",
        from = "Column::GovernmentId",
        to = "super::government::Column::Id"
    )]
    Government,
    #[sea_orm(
        belongs_to = "super::region::Entity",
        from = "Column::RegionId",
        to = "super::region::Column::Id"
    )]
    Region,
    #[sea_orm(
        belongs_to = "super::doctor::Entity",
        from = "Column::DoctorId",
        to = "super::doctor::Column::Id"
    )]
    Doctor,
    #[sea_orm(
        belongs_to = "super::pharmacien::Entity",
        from = "Column::PharmacienId",
        to = "super::pharmacien::Column::Id"
    )]
    Pharmacien,
    #[sea_orm(
        belongs_to = "super::wholesaler::Entity",
        from = "Column::WholesalerId",
        to = "super::wholesaler::Column::Id"
    )]
    Wholesaler,
    #[sea_orm(has_many = "super::delegate_person::Entity")]
    DelegatePerson,
    #[sea_orm(has_many = "super::report::Entity")]
    Report,
}

impl Related<super::government::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Government.def()
    }
}

impl Related<super::region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Region.def()
    }
}

impl Related<super::doctor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Doctor.def()
    }
}

impl Related<super::pharmacien::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pharmacien.def()
    }
}

impl Related<super::wholesaler::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wholesaler.def()
    }
}

impl Related<super::delegate::Entity> for Entity {
    fn to() -> RelationDef {
        super::delegate_person::Relation::Delegate.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::delegate_person::Relation::Person.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
