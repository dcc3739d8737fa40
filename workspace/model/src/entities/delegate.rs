use sea_orm::entity::prelude::*;

/// A field sales representative.
/// Persons are attached through the `delegates_persons` join table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "delegates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
    pub address: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::delegate_person::Entity")]
    DelegatePerson,
    #[sea_orm(has_many = "super::user::Entity")]
    User,
    #[sea_orm(has_many = "super::report::Entity")]
    Report,
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        super::delegate_person::Relation::Person.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::delegate_person::Relation::Delegate.def().rev())
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
