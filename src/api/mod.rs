pub mod admin;
pub mod artists;
pub mod auth;
pub mod error;
pub mod events;
pub mod features;
pub mod health;
pub mod listing;
pub mod media;
pub mod ratings;
pub mod users;
pub mod venues;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use crate::infrastructure::AppState;

/// Multipart overhead allowed on top of the image bytes themselves
const MULTIPART_SLACK_BYTES: usize = 1024 * 1024;

fn upload_routes(state: &AppState) -> Router<AppState> {
    let body_limit = state
        .storage
        .max_upload_bytes()
        .saturating_mul(state.storage.max_gallery_images())
        .saturating_add(MULTIPART_SLACK_BYTES);

    Router::new()
        .route("/users/me/profile-picture", post(media::user_picture))
        .route("/artists/:id/profile-picture", post(media::artist_picture))
        .route("/venues/:id/profile-picture", post(media::venue_picture))
        .route("/events/:id/profile-picture", post(media::event_picture))
        .route(
            "/artists/:id/gallery",
            post(media::artist_gallery_add).delete(media::artist_gallery_remove),
        )
        .route(
            "/venues/:id/gallery",
            post(media::venue_gallery_add).delete(media::venue_gallery_remove),
        )
        .route(
            "/events/:id/gallery",
            post(media::event_gallery_add).delete(media::event_gallery_remove),
        )
        .layer(DefaultBodyLimit::max(body_limit))
}

pub fn api_router(state: AppState) -> Router {
    let uploads = upload_routes(&state);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::get_me))
        // Users
        .route("/users/me", put(users::update_me).delete(users::delete_me))
        .route("/users/:id", get(users::get_user))
        // Artists
        .route(
            "/artists",
            get(artists::list_artists).post(artists::create_artist),
        )
        .route(
            "/artists/:id",
            get(artists::get_artist)
                .put(artists::update_artist)
                .delete(artists::delete_artist),
        )
        // Venues
        .route("/venues", get(venues::list_venues).post(venues::create_venue))
        .route(
            "/venues/:id",
            get(venues::get_venue)
                .put(venues::update_venue)
                .delete(venues::delete_venue),
        )
        // Events
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/:id/artists/:artist_id",
            put(events::add_lineup_artist).delete(events::remove_lineup_artist),
        )
        // Ratings; the first segment is a rating id or a rateable type
        .route("/ratings", post(ratings::submit_rating))
        .route("/ratings/:key", delete(ratings::delete_rating))
        .route("/ratings/:key/:id", get(ratings::list_ratings))
        .route("/ratings/:key/:id/average", get(ratings::get_average))
        .route("/ratings/:key/:id/mine", get(ratings::my_rating))
        // Paid features
        .route("/features", get(features::list_features))
        .route("/features/mine", get(features::my_purchases))
        .route("/features/:id/purchase", post(features::purchase_feature))
        .route("/featured", get(features::featured))
        // Admin dashboard
        .route("/admin/login", post(admin::login))
        .route(
            "/admin/majesty",
            get(admin::list_majesty).post(admin::create_majesty),
        )
        .route("/admin/majesty/:id", delete(admin::delete_majesty))
        .route(
            "/admin/features",
            get(admin::list_features).post(admin::create_feature),
        )
        .route(
            "/admin/features/:id",
            put(admin::update_feature).delete(admin::delete_feature),
        )
        .route(
            "/admin/purchases",
            get(admin::list_purchases).post(admin::grant_purchase),
        )
        .route("/admin/purchases/:id", delete(admin::revoke_purchase))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id", delete(admin::delete_user))
        .merge(uploads)
        .with_state(state)
}
