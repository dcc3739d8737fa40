use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A product that can be presented during a visit.
/// `name`, `product_code` and `bar_code` are each unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub price: Decimal,
    pub family: Option<String>,
    pub product_creation_date: Option<String>,
    #[sea_orm(unique)]
    pub product_code: Option<String>,
    #[sea_orm(unique)]
    pub bar_code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::report_product::Entity")]
    ReportProduct,
}

impl ActiveModelBehavior for ActiveModel {}
