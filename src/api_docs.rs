use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::register,
        api::auth::login,
        api::artists::list_artists,
        api::artists::get_artist,
        api::events::list_events,
        api::ratings::submit_rating,
        api::ratings::get_average,
        api::features::featured,
    ),
    tags(
        (name = "mygigguide", description = "MyGigGuide API")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_public_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/health"));
        assert!(doc.paths.paths.contains_key("/api/ratings/{key}/{id}/average"));
    }
}
