//! SeaORM implementation of EventRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, sea_query::OnConflict,
};

use super::artist_repository::{MAX_NAME_CHARS, fetch_page};
use crate::domain::{
    ArtistSummary, DomainError, Event, EventFilter, EventInput, EventRepository, Paginated,
};
use crate::models::artist;
use crate::models::event::{ActiveModel, Column, Entity as EventEntity, Model};
use crate::models::event_artist;
use crate::models::{encode_gallery, parse_gallery};
use crate::utils::{text, time};

impl From<Model> for Event {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            organiser_id: model.organiser_id,
            venue_id: model.venue_id,
            name: model.name,
            description: model.description,
            starts_at: model.starts_at,
            ends_at: model.ends_at,
            ticket_price: model.ticket_price,
            ticket_url: model.ticket_url,
            profile_picture: model.profile_picture,
            gallery: parse_gallery(&model.gallery),
            average_rating: 0.0,
            rating_count: 0,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<artist::Model> for ArtistSummary {
    fn from(model: artist::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            genre: model.genre,
            profile_picture: model.profile_picture,
        }
    }
}

pub struct SeaOrmEventRepository {
    db: DatabaseConnection,
}

impl SeaOrmEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventRepository for SeaOrmEventRepository {
    async fn find_all(&self, filter: EventFilter) -> Result<Paginated<Event>, DomainError> {
        let mut query = EventEntity::find();

        if let Some(q) = text::clean(filter.query) {
            query = query.filter(
                Condition::any()
                    .add(Column::Name.contains(&q))
                    .add(Column::Description.contains(&q)),
            );
        }
        if let Some(venue_id) = filter.venue_id {
            query = query.filter(Column::VenueId.eq(venue_id));
        }
        if let Some(organiser_id) = filter.organiser_id {
            query = query.filter(Column::OrganiserId.eq(organiser_id));
        }
        if let Some(artist_id) = filter.artist_id {
            query = query
                .inner_join(artist::Entity)
                .filter(event_artist::Column::ArtistId.eq(artist_id));
        }
        if let Some(after) = filter.starts_after {
            query = query.filter(Column::StartsAt.gte(after));
        }

        let query = query
            .order_by_asc(Column::StartsAt)
            .order_by_asc(Column::Id);
        let (models, total) = fetch_page(&self.db, query, filter.page).await?;

        Ok(Paginated {
            items: models.into_iter().map(Event::from).collect(),
            total,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Event>, DomainError> {
        Ok(EventEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Event::from))
    }

    async fn create(&self, organiser_id: i32, input: EventInput) -> Result<Event, DomainError> {
        let name = text::required("name", input.name, MAX_NAME_CHARS)?;
        let starts_at = input
            .starts_at
            .ok_or_else(|| DomainError::validation("starts_at is required"))?;
        let now = time::now();

        let event = ActiveModel {
            organiser_id: Set(organiser_id),
            venue_id: Set(input.venue_id.flatten()),
            name: Set(name),
            description: Set(text::clean(input.description)),
            starts_at: Set(starts_at),
            ends_at: Set(input.ends_at.flatten()),
            ticket_price: Set(input.ticket_price.flatten()),
            ticket_url: Set(text::clean(input.ticket_url)),
            profile_picture: Set(None),
            gallery: Set(encode_gallery(&[])),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(Event::from(event.insert(&self.db).await?))
    }

    async fn update(&self, id: i32, input: EventInput) -> Result<Event, DomainError> {
        let existing = EventEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Event"))?;

        let mut active: ActiveModel = existing.into();
        if input.name.is_some() {
            active.name = Set(text::required("name", input.name, MAX_NAME_CHARS)?);
        }
        if input.description.is_some() {
            active.description = Set(text::clean(input.description));
        }
        if let Some(venue_id) = input.venue_id {
            active.venue_id = Set(venue_id);
        }
        if let Some(starts_at) = input.starts_at {
            active.starts_at = Set(starts_at);
        }
        if let Some(ends_at) = input.ends_at {
            active.ends_at = Set(ends_at);
        }
        if let Some(price) = input.ticket_price {
            active.ticket_price = Set(price);
        }
        if input.ticket_url.is_some() {
            active.ticket_url = Set(text::clean(input.ticket_url));
        }
        active.updated_at = Set(time::now());

        Ok(Event::from(active.update(&self.db).await?))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = EventEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Event"));
        }

        Ok(())
    }

    async fn lineup(&self, event_id: i32) -> Result<Vec<ArtistSummary>, DomainError> {
        let Some(event) = EventEntity::find_by_id(event_id).one(&self.db).await? else {
            return Err(DomainError::not_found("Event"));
        };

        let artists = event
            .find_related(artist::Entity)
            .order_by_asc(artist::Column::Name)
            .all(&self.db)
            .await?;

        Ok(artists.into_iter().map(ArtistSummary::from).collect())
    }

    async fn add_to_lineup(&self, event_id: i32, artist_id: i32) -> Result<(), DomainError> {
        let link = event_artist::ActiveModel {
            event_id: Set(event_id),
            artist_id: Set(artist_id),
        };

        // Already linked rows are left alone
        let res = event_artist::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([event_artist::Column::EventId, event_artist::Column::ArtistId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await;

        match res {
            Ok(_) | Err(sea_orm::DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_from_lineup(
        &self,
        event_id: i32,
        artist_id: i32,
    ) -> Result<bool, DomainError> {
        let result = event_artist::Entity::delete_many()
            .filter(event_artist::Column::EventId.eq(event_id))
            .filter(event_artist::Column::ArtistId.eq(artist_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
