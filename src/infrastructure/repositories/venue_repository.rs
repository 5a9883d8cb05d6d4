//! SeaORM implementation of VenueRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use super::artist_repository::{MAX_NAME_CHARS, fetch_page};
use crate::domain::{DomainError, Paginated, Venue, VenueFilter, VenueInput, VenueRepository};
use crate::models::venue::{ActiveModel, Column, Entity as VenueEntity, Model};
use crate::models::{encode_gallery, parse_gallery};
use crate::utils::{text, time};

impl From<Model> for Venue {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            address: model.address,
            city: model.city,
            capacity: model.capacity,
            description: model.description,
            website: model.website,
            profile_picture: model.profile_picture,
            gallery: parse_gallery(&model.gallery),
            average_rating: 0.0,
            rating_count: 0,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn check_capacity(capacity: Option<i32>) -> Result<Option<i32>, DomainError> {
    match capacity {
        Some(c) if c <= 0 => Err(DomainError::validation("capacity must be greater than 0")),
        other => Ok(other),
    }
}

pub struct SeaOrmVenueRepository {
    db: DatabaseConnection,
}

impl SeaOrmVenueRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VenueRepository for SeaOrmVenueRepository {
    async fn find_all(&self, filter: VenueFilter) -> Result<Paginated<Venue>, DomainError> {
        let mut query = VenueEntity::find();

        if let Some(q) = text::clean(filter.query) {
            query = query.filter(
                Condition::any()
                    .add(Column::Name.contains(&q))
                    .add(Column::Address.contains(&q))
                    .add(Column::Description.contains(&q)),
            );
        }

        if let Some(city) = text::clean(filter.city) {
            query = query.filter(Column::City.contains(&city));
        }

        let query = query.order_by_asc(Column::Name).order_by_asc(Column::Id);
        let (models, total) = fetch_page(&self.db, query, filter.page).await?;

        Ok(Paginated {
            items: models.into_iter().map(Venue::from).collect(),
            total,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Venue>, DomainError> {
        Ok(VenueEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Venue::from))
    }

    async fn create(&self, user_id: i32, input: VenueInput) -> Result<Venue, DomainError> {
        let name = text::required("name", input.name, MAX_NAME_CHARS)?;
        let capacity = check_capacity(input.capacity)?;
        let now = time::now();

        let venue = ActiveModel {
            user_id: Set(user_id),
            name: Set(name),
            address: Set(text::clean(input.address)),
            city: Set(text::clean(input.city)),
            capacity: Set(capacity),
            description: Set(text::clean(input.description)),
            website: Set(text::clean(input.website)),
            profile_picture: Set(None),
            gallery: Set(encode_gallery(&[])),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(Venue::from(venue.insert(&self.db).await?))
    }

    async fn update(&self, id: i32, input: VenueInput) -> Result<Venue, DomainError> {
        let existing = VenueEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Venue"))?;

        let mut active: ActiveModel = existing.into();
        if input.name.is_some() {
            active.name = Set(text::required("name", input.name, MAX_NAME_CHARS)?);
        }
        if input.address.is_some() {
            active.address = Set(text::clean(input.address));
        }
        if input.city.is_some() {
            active.city = Set(text::clean(input.city));
        }
        if input.capacity.is_some() {
            active.capacity = Set(check_capacity(input.capacity)?);
        }
        if input.description.is_some() {
            active.description = Set(text::clean(input.description));
        }
        if input.website.is_some() {
            active.website = Set(text::clean(input.website));
        }
        active.updated_at = Set(time::now());

        Ok(Venue::from(active.update(&self.db).await?))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = VenueEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Venue"));
        }

        Ok(())
    }
}
