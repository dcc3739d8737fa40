use sea_orm::entity::prelude::*;

/// Login account. One is created alongside every delegate.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Salted bcrypt hash, never the plain password.
    pub password_hash: String,
    pub role_id: i32,
    pub status_id: i32,
    pub delegate_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::delegate::Entity",
        from = "Column::DelegateId",
        to = "super::delegate::Column::Id",
        on_delete = "SetNull"
    )]
    Delegate,
}

impl Related<super::delegate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Delegate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
