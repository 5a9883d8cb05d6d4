//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{
    ArtistRepository, EventRepository, MediaRepository, RatingRepository, VenueRepository,
};
use crate::infrastructure::storage::MediaStorage;
use crate::infrastructure::{
    SeaOrmArtistRepository, SeaOrmEventRepository, SeaOrmMediaRepository, SeaOrmRatingRepository,
    SeaOrmVenueRepository,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection for handlers that query entities directly
    db: DatabaseConnection,
    pub artist_repo: Arc<dyn ArtistRepository>,
    pub venue_repo: Arc<dyn VenueRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub rating_repo: Arc<dyn RatingRepository>,
    pub media_repo: Arc<dyn MediaRepository>,
    /// Upload root and limits
    pub storage: Arc<MediaStorage>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, storage: MediaStorage) -> Self {
        Self {
            artist_repo: Arc::new(SeaOrmArtistRepository::new(db.clone())),
            venue_repo: Arc::new(SeaOrmVenueRepository::new(db.clone())),
            event_repo: Arc::new(SeaOrmEventRepository::new(db.clone())),
            rating_repo: Arc::new(SeaOrmRatingRepository::new(db.clone())),
            media_repo: Arc::new(SeaOrmMediaRepository::new(db.clone())),
            storage: Arc::new(storage),
            db,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
