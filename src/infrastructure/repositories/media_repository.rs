//! SeaORM implementation of MediaRepository
//!
//! Users keep a single profile picture; listings keep a picture and a JSON gallery.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::Unchanged, DatabaseConnection, EntityTrait, Set};

use crate::domain::{DomainError, ListingKind, MediaKind, MediaRecord, MediaRepository};
use crate::models::{artist, encode_gallery, event, parse_gallery, user, venue};
use crate::utils::time;

pub struct SeaOrmMediaRepository {
    db: DatabaseConnection,
}

impl SeaOrmMediaRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn owner(&self, user_id: i32) -> Result<user::Model, DomainError> {
        user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Owner"))
    }
}

#[async_trait]
impl MediaRepository for SeaOrmMediaRepository {
    async fn find_media(
        &self,
        kind: MediaKind,
        id: i32,
    ) -> Result<Option<MediaRecord>, DomainError> {
        let (owner_id, profile_picture, gallery) = match kind {
            MediaKind::User => match user::Entity::find_by_id(id).one(&self.db).await? {
                Some(u) => {
                    return Ok(Some(MediaRecord {
                        owner_user_id: u.id,
                        owner_username: u.username,
                        profile_picture: u.profile_picture,
                        gallery: Vec::new(),
                    }));
                }
                None => return Ok(None),
            },
            MediaKind::Listing(ListingKind::Artist) => {
                match artist::Entity::find_by_id(id).one(&self.db).await? {
                    Some(a) => (a.user_id, a.profile_picture, a.gallery),
                    None => return Ok(None),
                }
            }
            MediaKind::Listing(ListingKind::Venue) => {
                match venue::Entity::find_by_id(id).one(&self.db).await? {
                    Some(v) => (v.user_id, v.profile_picture, v.gallery),
                    None => return Ok(None),
                }
            }
            MediaKind::Listing(ListingKind::Event) => {
                match event::Entity::find_by_id(id).one(&self.db).await? {
                    Some(e) => (e.organiser_id, e.profile_picture, e.gallery),
                    None => return Ok(None),
                }
            }
        };

        let owner = self.owner(owner_id).await?;
        Ok(Some(MediaRecord {
            owner_user_id: owner.id,
            owner_username: owner.username,
            profile_picture,
            gallery: parse_gallery(&gallery),
        }))
    }

    async fn save_media(
        &self,
        kind: MediaKind,
        id: i32,
        profile_picture: Option<String>,
        gallery: &[String],
    ) -> Result<(), DomainError> {
        let now = time::now();

        match kind {
            MediaKind::User => {
                let active = user::ActiveModel {
                    id: Unchanged(id),
                    profile_picture: Set(profile_picture),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active.update(&self.db).await?;
            }
            MediaKind::Listing(ListingKind::Artist) => {
                let active = artist::ActiveModel {
                    id: Unchanged(id),
                    profile_picture: Set(profile_picture),
                    gallery: Set(encode_gallery(gallery)),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active.update(&self.db).await?;
            }
            MediaKind::Listing(ListingKind::Venue) => {
                let active = venue::ActiveModel {
                    id: Unchanged(id),
                    profile_picture: Set(profile_picture),
                    gallery: Set(encode_gallery(gallery)),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active.update(&self.db).await?;
            }
            MediaKind::Listing(ListingKind::Event) => {
                let active = event::ActiveModel {
                    id: Unchanged(id),
                    profile_picture: Set(profile_picture),
                    gallery: Set(encode_gallery(gallery)),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active.update(&self.db).await?;
            }
        }

        Ok(())
    }
}
