use sea_orm::entity::prelude::*;

/// Pharmacist detail row of a person.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pharmaciens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub contact: Option<String>,
    pub pharmacy_type: Option<i32>,
    pub pharmacy_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::person::Entity")]
    Person,
}

impl ActiveModelBehavior for ActiveModel {}
