use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

/// A delegate's visit to a person.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub date: NaiveDate,
    pub duration: String,
    pub specialty: String,
    pub note: String,
    pub status: String,
    pub government_id: i32,
    pub region_id: i32,
    pub person_id: i32,
    pub delegate_id: i32,
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
        belongs_to = "super::person::Entity",
        from = "Column::PersonId",
        to = "super::person::Column::Id"
    )]
    Person,
    #[sea_orm(
        belongs_to = "super::delegate::Entity",
        from = "Column::DelegateId",
        to = "super::delegate::Column::Id"
    )]
    Delegate,
    #[sea_orm(has_many = "super::report_sample::Entity")]
    ReportSample,
    #[sea_orm(has_many = "super::report_product::Entity")]
    ReportProduct,
}

impl Related<super::government::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Government.def()
    }
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Person.def()
    }
}

impl Related<super::delegate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Delegate.def()
    }
}

impl Related<super::report_sample::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportSample.def()
    }
}

impl Related<super::report_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportProduct.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
