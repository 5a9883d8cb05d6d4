use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchased_feature")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub paid_feature_id: i32,
    pub user_id: i32,
    pub target_type: String,
    pub target_id: i32,
    pub amount: f64, // 0 for complimentary placements granted by an admin
    pub purchased_at: String,
    pub expires_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::paid_feature::Entity",
        from = "Column::PaidFeatureId",
        to = "super::paid_feature::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    PaidFeature,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::paid_feature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaidFeature.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
