//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use super::{DomainError, MediaKind, RateableType};

/// Default page size when a list endpoint is called with `page` but no `limit`
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Upper bound on `limit` accepted from clients
pub const MAX_PAGE_SIZE: u64 = 100;

/// Page request shared by list endpoints
#[derive(Debug, Default, Clone, Copy)]
pub struct Page {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl Page {
    /// Zero-based page index and clamped size, or `None` to return everything.
    /// The row offset must fit the signed 64-bit `OFFSET` SQLite accepts.
    pub fn resolve(&self) -> Result<Option<(u64, u64)>, DomainError> {
        let (page, limit) = match (self.page, self.limit) {
            (None, None) => return Ok(None),
            (page, limit) => (
                page.unwrap_or(0),
                limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            ),
        };
        page.checked_mul(limit)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .map(|_| Some((page, limit)))
            .ok_or_else(|| DomainError::validation("page is out of range"))
    }
}

/// Paginated result with total count
#[derive(Debug)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Average score and number of ratings for one rateable row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
}

impl RatingSummary {
    pub fn empty() -> Self {
        Self {
            average: 0.0,
            count: 0,
        }
    }

    /// Build from a raw `AVG()`/`COUNT()` pair, rounding to two decimals
    pub fn from_raw(average: Option<f64>, count: i64) -> Self {
        match average {
            Some(avg) if count > 0 => Self {
                average: (avg * 100.0).round() / 100.0,
                count,
            },
            _ => Self::empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// Artists
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct ArtistFilter {
    pub query: Option<String>,
    pub genre: Option<String>,
    pub location: Option<String>,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize)]
pub struct Artist {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub genre: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub profile_picture: Option<String>,
    pub gallery: Vec<String>,
    pub average_rating: f64,
    pub rating_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ArtistInput {
    pub name: Option<String>,
    pub genre: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

#[async_trait]
pub trait ArtistRepository: Send + Sync {
    /// Find artists matching the filter, ordered by name
    async fn find_all(&self, filter: ArtistFilter) -> Result<Paginated<Artist>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Artist>, DomainError>;

    /// Create an artist profile owned by `user_id`; `input.name` must be set
    async fn create(&self, user_id: i32, input: ArtistInput) -> Result<Artist, DomainError>;

    /// Apply the fields present in `input`; blank strings clear optional fields
    async fn update(&self, id: i32, input: ArtistInput) -> Result<Artist, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

// ---------------------------------------------------------------------------
// Venues
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct VenueFilter {
    pub query: Option<String>,
    pub city: Option<String>,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize)]
pub struct Venue {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub profile_picture: Option<String>,
    pub gallery: Vec<String>,
    pub average_rating: f64,
    pub rating_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct VenueInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub website: Option<String>,
}

#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn find_all(&self, filter: VenueFilter) -> Result<Paginated<Venue>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Venue>, DomainError>;

    async fn create(&self, user_id: i32, input: VenueInput) -> Result<Venue, DomainError>;

    async fn update(&self, id: i32, input: VenueInput) -> Result<Venue, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub query: Option<String>,
    pub venue_id: Option<i32>,
    pub artist_id: Option<i32>,
    pub organiser_id: Option<i32>,
    /// Keep only events starting at or after this timestamp
    pub starts_after: Option<String>,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: i32,
    pub organiser_id: i32,
    pub venue_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: String,
    pub ends_at: Option<String>,
    pub ticket_price: Option<f64>,
    pub ticket_url: Option<String>,
    pub profile_picture: Option<String>,
    pub gallery: Vec<String>,
    pub average_rating: f64,
    pub rating_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Event fields after validation; timestamps already normalised to UTC
#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub venue_id: Option<Option<i32>>,
    pub starts_at: Option<String>,
    pub ends_at: Option<Option<String>>,
    pub ticket_price: Option<Option<f64>>,
    pub ticket_url: Option<String>,
}

/// Compact artist reference used in event lineups
#[derive(Debug, Clone, Serialize)]
pub struct ArtistSummary {
    pub id: i32,
    pub name: String,
    pub genre: Option<String>,
    pub profile_picture: Option<String>,
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Find events matching the filter, ordered by start time
    async fn find_all(&self, filter: EventFilter) -> Result<Paginated<Event>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Event>, DomainError>;

    async fn create(&self, organiser_id: i32, input: EventInput) -> Result<Event, DomainError>;

    async fn update(&self, id: i32, input: EventInput) -> Result<Event, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    /// Artists performing at an event
    async fn lineup(&self, event_id: i32) -> Result<Vec<ArtistSummary>, DomainError>;

    /// Add an artist to the lineup; adding twice is a no-op
    async fn add_to_lineup(&self, event_id: i32, artist_id: i32) -> Result<(), DomainError>;

    /// Remove an artist from the lineup, returning whether it was there
    async fn remove_from_lineup(&self, event_id: i32, artist_id: i32)
    -> Result<bool, DomainError>;
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rating {
    pub id: i32,
    pub user_id: i32,
    pub rateable_type: RateableType,
    pub rateable_id: i32,
    pub score: i32,
    pub review: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A rating joined with its author for public review lists
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    #[serde(flatten)]
    pub rating: Rating,
    pub username: String,
}

/// Validated input for the rating upsert
#[derive(Debug, Clone)]
pub struct NewRating {
    pub user_id: i32,
    pub rateable_type: RateableType,
    pub rateable_id: i32,
    pub score: i32,
    pub review: Option<String>,
}

#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert or update the rating keyed on (user, rateable id, rateable type).
    /// Returns the stored rating and whether it was newly created.
    async fn upsert(&self, rating: NewRating) -> Result<(Rating, bool), DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Rating>, DomainError>;

    async fn find_for_user(
        &self,
        user_id: i32,
        rateable_type: RateableType,
        rateable_id: i32,
    ) -> Result<Option<Rating>, DomainError>;

    /// Reviews for one target, newest first
    async fn list_for(
        &self,
        rateable_type: RateableType,
        rateable_id: i32,
        page: Page,
    ) -> Result<Paginated<Review>, DomainError>;

    async fn summary(
        &self,
        rateable_type: RateableType,
        rateable_id: i32,
    ) -> Result<RatingSummary, DomainError>;

    /// Grouped summaries for many targets of one type; unrated ids are absent
    async fn summaries(
        &self,
        rateable_type: RateableType,
        ids: &[i32],
    ) -> Result<HashMap<i32, RatingSummary>, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    /// Owning user id of the rated row, or `None` if the row does not exist
    async fn rateable_owner(
        &self,
        rateable_type: RateableType,
        rateable_id: i32,
    ) -> Result<Option<i32>, DomainError>;
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// Stored image references for one user or listing
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub owner_user_id: i32,
    pub owner_username: String,
    pub profile_picture: Option<String>,
    pub gallery: Vec<String>,
}

#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn find_media(&self, kind: MediaKind, id: i32)
    -> Result<Option<MediaRecord>, DomainError>;

    /// Persist the picture and gallery columns of a row
    async fn save_media(
        &self,
        kind: MediaKind,
        id: i32,
        profile_picture: Option<String>,
        gallery: &[String],
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamps() {
        assert_eq!(Page::default().resolve().unwrap(), None);
        assert_eq!(
            Page {
                page: Some(2),
                limit: None
            }
            .resolve()
            .unwrap(),
            Some((2, DEFAULT_PAGE_SIZE))
        );
        assert_eq!(
            Page {
                page: None,
                limit: Some(10_000)
            }
            .resolve()
            .unwrap(),
            Some((0, MAX_PAGE_SIZE))
        );
        assert_eq!(
            Page {
                page: None,
                limit: Some(0)
            }
            .resolve()
            .unwrap(),
            Some((0, 1))
        );
    }

    #[test]
    fn page_offset_must_fit_sqlite() {
        let huge = Page {
            page: Some(u64::MAX),
            limit: Some(20),
        };
        assert!(matches!(huge.resolve(), Err(DomainError::Validation(_))));

        let past_i64 = Page {
            page: Some(i64::MAX as u64 / 10),
            limit: Some(100),
        };
        assert!(past_i64.resolve().is_err());

        let last = Page {
            page: Some(i64::MAX as u64 / 100),
            limit: Some(100),
        };
        assert!(last.resolve().unwrap().is_some());
    }

    #[test]
    fn summary_rounds_to_two_decimals() {
        let s = RatingSummary::from_raw(Some(3.666_666), 3);
        assert_eq!(s.average, 3.67);
        assert_eq!(s.count, 3);
        assert_eq!(RatingSummary::from_raw(None, 0), RatingSummary::empty());
    }
}
