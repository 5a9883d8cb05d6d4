//! Helpers shared by the artist, venue and event handlers

use serde::Deserialize;

use crate::domain::{
    Artist, DomainError, Event, ListingKind, Page, RateableType, RatingRepository, RatingSummary,
    Venue,
};
use crate::infrastructure::auth::AuthUser;

/// `page` and `limit` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl From<&PageQuery> for Page {
    fn from(q: &PageQuery) -> Self {
        Page {
            page: q.page,
            limit: q.limit,
        }
    }
}

/// A listing that carries a rating summary
pub trait Rated {
    const RATEABLE: RateableType;

    fn rateable_id(&self) -> i32;
    fn set_rating(&mut self, summary: RatingSummary);
}

impl Rated for Artist {
    const RATEABLE: RateableType = RateableType::Artist;

    fn rateable_id(&self) -> i32 {
        self.id
    }

    fn set_rating(&mut self, summary: RatingSummary) {
        self.average_rating = summary.average;
        self.rating_count = summary.count;
    }
}

impl Rated for Venue {
    const RATEABLE: RateableType = RateableType::Venue;

    fn rateable_id(&self) -> i32 {
        self.id
    }

    fn set_rating(&mut self, summary: RatingSummary) {
        self.average_rating = summary.average;
        self.rating_count = summary.count;
    }
}

impl Rated for Event {
    const RATEABLE: RateableType = RateableType::Event;

    fn rateable_id(&self) -> i32 {
        self.id
    }

    fn set_rating(&mut self, summary: RatingSummary) {
        self.average_rating = summary.average;
        self.rating_count = summary.count;
    }
}

/// Fill rating summaries for a page of listings with one grouped query
pub async fn attach_ratings<T: Rated>(
    repo: &dyn RatingRepository,
    items: &mut [T],
) -> Result<(), DomainError> {
    let ids: Vec<i32> = items.iter().map(Rated::rateable_id).collect();
    let summaries = repo.summaries(T::RATEABLE, &ids).await?;

    for item in items.iter_mut() {
        if let Some(summary) = summaries.get(&item.rateable_id()) {
            item.set_rating(*summary);
        }
    }
    Ok(())
}

pub fn require_creator(user: &AuthUser, kind: ListingKind) -> Result<(), DomainError> {
    if user.role.creates() == Some(kind) {
        return Ok(());
    }
    let role = match kind {
        ListingKind::Artist => "artist",
        ListingKind::Venue => "venue",
        ListingKind::Event => "organiser",
    };
    Err(DomainError::Forbidden(format!(
        "Only {} accounts can create {} listings",
        role, kind
    )))
}

pub fn require_owner(user: &AuthUser, owner_id: i32) -> Result<(), DomainError> {
    if user.id != owner_id {
        return Err(DomainError::forbidden(
            "Only the owner can change this listing",
        ));
    }
    Ok(())
}
