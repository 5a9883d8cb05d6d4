//! Rating Service - validation and ownership rules around the rating repository

use serde::Deserialize;

use crate::domain::{
    DomainError, NewRating, Page, Paginated, RateableType, Rating, RatingRepository,
    RatingSummary, Review,
};
use crate::utils::text;

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;
pub const MAX_REVIEW_CHARS: usize = 2000;

#[derive(Debug, Clone, Deserialize)]
pub struct RatingRequest {
    pub rateable_type: String,
    pub rateable_id: i32,
    pub score: i32,
    pub review: Option<String>,
}

fn label(rateable_type: RateableType) -> &'static str {
    match rateable_type {
        RateableType::Artist => "Artist",
        RateableType::Event => "Event",
        RateableType::Venue => "Venue",
        RateableType::Organiser => "Organiser",
    }
}

/// Create or update the caller's rating of a target.
/// Returns the stored rating and whether it was newly created.
pub async fn submit(
    repo: &dyn RatingRepository,
    user_id: i32,
    request: RatingRequest,
) -> Result<(Rating, bool), DomainError> {
    let rateable_type: RateableType = request.rateable_type.parse()?;

    if !(MIN_SCORE..=MAX_SCORE).contains(&request.score) {
        return Err(DomainError::Validation(format!(
            "score must be an integer between {} and {}",
            MIN_SCORE, MAX_SCORE
        )));
    }

    let review = text::clean(request.review)
        .map(|r| text::bounded("review", r, MAX_REVIEW_CHARS))
        .transpose()?;

    let owner = repo
        .rateable_owner(rateable_type, request.rateable_id)
        .await?
        .ok_or_else(|| DomainError::not_found(label(rateable_type)))?;

    if owner == user_id {
        return Err(DomainError::forbidden(match rateable_type {
            RateableType::Organiser => "You cannot rate yourself".to_string(),
            other => format!("You cannot rate your own {}", other),
        }));
    }

    let (rating, created) = repo
        .upsert(NewRating {
            user_id,
            rateable_type,
            rateable_id: request.rateable_id,
            score: request.score,
            review,
        })
        .await?;

    tracing::info!(
        "User {} {} rating {} for {} {}",
        user_id,
        if created { "created" } else { "updated" },
        rating.id,
        rateable_type,
        request.rateable_id
    );

    Ok((rating, created))
}

pub async fn average(
    repo: &dyn RatingRepository,
    rateable_type: RateableType,
    rateable_id: i32,
) -> Result<RatingSummary, DomainError> {
    repo.summary(rateable_type, rateable_id).await
}

pub async fn reviews(
    repo: &dyn RatingRepository,
    rateable_type: RateableType,
    rateable_id: i32,
    page: Page,
) -> Result<Paginated<Review>, DomainError> {
    repo.list_for(rateable_type, rateable_id, page).await
}

pub async fn mine(
    repo: &dyn RatingRepository,
    user_id: i32,
    rateable_type: RateableType,
    rateable_id: i32,
) -> Result<Rating, DomainError> {
    repo.find_for_user(user_id, rateable_type, rateable_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Rating"))
}

/// Delete a rating written by the caller
pub async fn remove(
    repo: &dyn RatingRepository,
    user_id: i32,
    rating_id: i32,
) -> Result<(), DomainError> {
    let rating = repo
        .find_by_id(rating_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Rating"))?;

    if rating.user_id != user_id {
        return Err(DomainError::forbidden("You can only delete your own ratings"));
    }

    repo.delete(rating_id).await
}
