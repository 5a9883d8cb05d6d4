use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organiser_id: i32,
    pub venue_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: String,
    pub ends_at: Option<String>,
    pub ticket_price: Option<f64>,
    pub ticket_url: Option<String>,
    pub profile_picture: Option<String>, // event poster
    pub gallery: String,                 // JSON array of stored paths
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OrganiserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Organiser,
    #[sea_orm(
        belongs_to = "super::venue::Entity",
        from = "Column::VenueId",
        to = "super::venue::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Venue,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organiser.def()
    }
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

// Lineup through the junction table
impl Related<super::artist::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_artist::Relation::Artist.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_artist::Relation::Event.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
