use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "paid_features")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_days: i32,
    pub target_type: String, // 'artist', 'venue', 'event'
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchased_feature::Entity")]
    PurchasedFeature,
}

impl Related<super::purchased_feature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchasedFeature.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
