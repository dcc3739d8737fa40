use sea_orm::entity::prelude::*;

/// A region always belongs to exactly one government.
/// The name is only unique within its government.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "regions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub government_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::government::Entity",
        from = "Column::GovernmentId",
        to = "super::government::Column::Id",
        on_delete = "Cascade"
    )]
    Government,
    #[sea_orm(has_many = "super::person::Entity")]
    Person,
}

impl Related<super::government::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Government.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
