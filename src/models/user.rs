use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String, // 'fan', 'artist', 'organiser', 'venue'
    pub profile_picture: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::artist::Entity")]
    Artist,
    #[sea_orm(has_many = "super::venue::Entity")]
    Venue,
    #[sea_orm(has_many = "super::event::Entity")]
    Event,
    #[sea_orm(has_many = "super::rating::Entity")]
    Rating,
}

impl Related<super::artist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artist.def()
    }
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rating.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Public view of a user (no email, no hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub created_at: String,
}

impl From<Model> for PublicUser {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role,
            profile_picture: model.profile_picture,
            created_at: model.created_at,
        }
    }
}

/// View of a user returned to the account holder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Model> for AccountDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            profile_picture: model.profile_picture,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
