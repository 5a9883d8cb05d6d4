//! SeaORM implementation of RatingRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Set,
    sea_query::{Expr, Func, OnConflict, SimpleExpr},
};

use super::artist_repository::fetch_page;
use crate::domain::{
    DomainError, NewRating, Page, Paginated, RateableType, Rating, RatingRepository,
    RatingSummary, Review,
};
use crate::models::rating::{self, ActiveModel, Column, Entity as RatingEntity};
use crate::models::{artist, event, user, venue};
use crate::utils::time;

impl TryFrom<rating::Model> for Rating {
    type Error = DomainError;

    fn try_from(model: rating::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            rateable_type: model.rateable_type.parse()?,
            rateable_id: model.rateable_id,
            score: model.score,
            review: model.review,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    rateable_id: i32,
    average: Option<f64>,
    count: i64,
}

pub struct SeaOrmRatingRepository {
    db: DatabaseConnection,
}

impl SeaOrmRatingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// `SELECT rateable_id, AVG(score), COUNT(id) ... GROUP BY rateable_id`
    async fn grouped(
        &self,
        rateable_type: RateableType,
        ids: &[i32],
    ) -> Result<Vec<SummaryRow>, DomainError> {
        let rows = RatingEntity::find()
            .select_only()
            .column(Column::RateableId)
            .column_as(SimpleExpr::from(Func::avg(Expr::col(Column::Score))), "average")
            .column_as(SimpleExpr::from(Func::count(Expr::col(Column::Id))), "count")
            .filter(Column::RateableType.eq(rateable_type.as_str()))
            .filter(Column::RateableId.is_in(ids.iter().copied()))
            .group_by(Column::RateableId)
            .into_model::<SummaryRow>()
            .all(&self.db)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl RatingRepository for SeaOrmRatingRepository {
    async fn upsert(&self, input: NewRating) -> Result<(Rating, bool), DomainError> {
        let existed = self
            .find_for_user(input.user_id, input.rateable_type, input.rateable_id)
            .await?
            .is_some();
        let now = time::now();

        let row = ActiveModel {
            user_id: Set(input.user_id),
            rateable_id: Set(input.rateable_id),
            rateable_type: Set(input.rateable_type.as_str().to_string()),
            score: Set(input.score),
            review: Set(input.review),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        // The unique index decides between insert and update, so two concurrent
        // submissions from the same user end up as one row.
        RatingEntity::insert(row)
            .on_conflict(
                OnConflict::columns([Column::UserId, Column::RateableId, Column::RateableType])
                    .update_columns([Column::Score, Column::Review, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        let stored = self
            .find_for_user(input.user_id, input.rateable_type, input.rateable_id)
            .await?
            .ok_or_else(|| DomainError::Internal("rating vanished after upsert".to_string()))?;

        Ok((stored, !existed))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Rating>, DomainError> {
        RatingEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Rating::try_from)
            .transpose()
    }

    async fn find_for_user(
        &self,
        user_id: i32,
        rateable_type: RateableType,
        rateable_id: i32,
    ) -> Result<Option<Rating>, DomainError> {
        RatingEntity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::RateableType.eq(rateable_type.as_str()))
            .filter(Column::RateableId.eq(rateable_id))
            .one(&self.db)
            .await?
            .map(Rating::try_from)
            .transpose()
    }

    async fn list_for(
        &self,
        rateable_type: RateableType,
        rateable_id: i32,
        page: Page,
    ) -> Result<Paginated<Review>, DomainError> {
        let query = RatingEntity::find()
            .filter(Column::RateableType.eq(rateable_type.as_str()))
            .filter(Column::RateableId.eq(rateable_id))
            .order_by_desc(Column::UpdatedAt)
            .order_by_desc(Column::Id);
        let (models, total) = fetch_page(&self.db, query, page).await?;

        let user_ids: Vec<i32> = models.iter().map(|m| m.user_id).collect();
        let usernames: HashMap<i32, String> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(user_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|u| (u.id, u.username))
                .collect()
        };

        let mut items = Vec::with_capacity(models.len());
        for model in models {
            let username = usernames
                .get(&model.user_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string());
            items.push(Review {
                rating: Rating::try_from(model)?,
                username,
            });
        }

        Ok(Paginated { items, total })
    }

    async fn summary(
        &self,
        rateable_type: RateableType,
        rateable_id: i32,
    ) -> Result<RatingSummary, DomainError> {
        let rows = self.grouped(rateable_type, &[rateable_id]).await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|r| RatingSummary::from_raw(r.average, r.count))
            .unwrap_or_else(RatingSummary::empty))
    }

    async fn summaries(
        &self,
        rateable_type: RateableType,
        ids: &[i32],
    ) -> Result<HashMap<i32, RatingSummary>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = self.grouped(rateable_type, ids).await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.rateable_id, RatingSummary::from_raw(r.average, r.count)))
            .collect())
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = RatingEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Rating"));
        }
        Ok(())
    }

    async fn rateable_owner(
        &self,
        rateable_type: RateableType,
        rateable_id: i32,
    ) -> Result<Option<i32>, DomainError> {
        let owner = match rateable_type {
            RateableType::Artist => artist::Entity::find_by_id(rateable_id)
                .one(&self.db)
                .await?
                .map(|a| a.user_id),
            RateableType::Venue => venue::Entity::find_by_id(rateable_id)
                .one(&self.db)
                .await?
                .map(|v| v.user_id),
            RateableType::Event => event::Entity::find_by_id(rateable_id)
                .one(&self.db)
                .await?
                .map(|e| e.organiser_id),
            RateableType::Organiser => user::Entity::find_by_id(rateable_id)
                .filter(user::Column::Role.eq("organiser"))
                .one(&self.db)
                .await?
                .map(|u| u.id),
        };
        Ok(owner)
    }
}
