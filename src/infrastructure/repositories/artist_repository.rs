//! SeaORM implementation of ArtistRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set,
};

use crate::domain::{Artist, ArtistFilter, ArtistInput, ArtistRepository, DomainError, Paginated, Page};
use crate::models::artist::{ActiveModel, Column, Entity as ArtistEntity, Model};
use crate::models::{encode_gallery, parse_gallery};
use crate::utils::{text, time};

pub const MAX_NAME_CHARS: usize = 120;
pub const MAX_BIO_CHARS: usize = 5000;

impl From<Model> for Artist {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            genre: model.genre,
            bio: model.bio,
            location: model.location,
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

/// Fetch one page (or everything) of a select, with the total row count
pub(crate) async fn fetch_page<E>(
    db: &DatabaseConnection,
    query: Select<E>,
    page: Page,
) -> Result<(Vec<E::Model>, u64), DomainError>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    match page.resolve()? {
        Some((page, limit)) => {
            let paginator = query.paginate(db, limit);
            let total = paginator.num_items().await?;
            let items = paginator.fetch_page(page).await?;
            Ok((items, total))
        }
        None => {
            let items = query.all(db).await?;
            let total = items.len() as u64;
            Ok((items, total))
        }
    }
}

/// SeaORM-based implementation of ArtistRepository
pub struct SeaOrmArtistRepository {
    db: DatabaseConnection,
}

impl SeaOrmArtistRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArtistRepository for SeaOrmArtistRepository {
    async fn find_all(&self, filter: ArtistFilter) -> Result<Paginated<Artist>, DomainError> {
        let mut query = ArtistEntity::find();

        if let Some(q) = text::clean(filter.query) {
            let cond = Condition::any()
                .add(Column::Name.contains(&q))
                .add(Column::Genre.contains(&q))
                .add(Column::Bio.contains(&q));
            query = query.filter(cond);
        }

        if let Some(genre) = text::clean(filter.genre) {
            query = query.filter(Column::Genre.contains(&genre));
        }

        if let Some(location) = text::clean(filter.location) {
            query = query.filter(Column::Location.contains(&location));
        }

        let query = query.order_by_asc(Column::Name).order_by_asc(Column::Id);
        let (models, total) = fetch_page(&self.db, query, filter.page).await?;

        Ok(Paginated {
            items: models.into_iter().map(Artist::from).collect(),
            total,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Artist>, DomainError> {
        let artist = ArtistEntity::find_by_id(id).one(&self.db).await?;
        Ok(artist.map(Artist::from))
    }

    async fn create(&self, user_id: i32, input: ArtistInput) -> Result<Artist, DomainError> {
        let name = text::required("name", input.name, MAX_NAME_CHARS)?;
        let bio = text::clean(input.bio)
            .map(|b| text::bounded("bio", b, MAX_BIO_CHARS))
            .transpose()?;
        let now = time::now();

        let artist = ActiveModel {
            user_id: Set(user_id),
            name: Set(name),
            genre: Set(text::clean(input.genre)),
            bio: Set(bio),
            location: Set(text::clean(input.location)),
            website: Set(text::clean(input.website)),
            profile_picture: Set(None),
            gallery: Set(encode_gallery(&[])),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = artist.insert(&self.db).await?;
        Ok(Artist::from(result))
    }

    async fn update(&self, id: i32, input: ArtistInput) -> Result<Artist, DomainError> {
        let existing = ArtistEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Artist"))?;

        let mut active: ActiveModel = existing.into();
        if input.name.is_some() {
            active.name = Set(text::required("name", input.name, MAX_NAME_CHARS)?);
        }
        if input.genre.is_some() {
            active.genre = Set(text::clean(input.genre));
        }
        if input.bio.is_some() {
            let bio = text::clean(input.bio)
                .map(|b| text::bounded("bio", b, MAX_BIO_CHARS))
                .transpose()?;
            active.bio = Set(bio);
        }
        if input.location.is_some() {
            active.location = Set(text::clean(input.location));
        }
        if input.website.is_some() {
            active.website = Set(text::clean(input.website));
        }
        active.updated_at = Set(time::now());

        let result = active.update(&self.db).await?;
        Ok(Artist::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = ArtistEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Artist"));
        }

        Ok(())
    }
}
