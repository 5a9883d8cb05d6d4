mod common;

use axum::http::StatusCode;
use common::{PASSWORD, days_from_now, setup_app};
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let app = setup_app().await;
    let (status, body) = app.get("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "mygigguide");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = setup_app().await;
    let (token, id) = app.register("night_owl", "fan").await;

    let (status, body) = app.call("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id);
    assert_eq!(body["user"]["email"], "night_owl@example.com");
    assert!(body["user"].get("password_hash").is_none());

    // Login works with username or email
    for identifier in ["night_owl", "NIGHT_OWL@example.com"] {
        let (status, body) = app
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "identifier": identifier, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login with {} failed", identifier);
        assert!(body["token"].as_str().is_some());
    }

    let (status, _) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "night_owl", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_defaults_to_fan() {
    let app = setup_app().await;
    let (status, body) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "listener",
                "email": "listener@example.com",
                "password": PASSWORD
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "fan");
}

#[tokio::test]
async fn test_artist_crud_and_search() {
    let app = setup_app().await;
    let (token, user_id) = app.register("velvet_band", "artist").await;

    let id = app.create_artist(&token, "The Velvet Hum").await;
    app.create_artist(&token, "Brass Parade").await;

    let (status, body) = app.get(&format!("/api/artists/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artist"]["name"], "The Velvet Hum");
    assert_eq!(body["artist"]["user_id"], user_id);
    assert_eq!(body["artist"]["rating_count"], 0);
    assert_eq!(body["artist"]["gallery"], json!([]));
    assert_eq!(body["upcoming_events"], json!([]));

    let (status, body) = app.get("/api/artists?q=velvet").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["artists"][0]["id"], id);

    let (_, body) = app.get("/api/artists?page=0&limit=1").await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["artists"].as_array().unwrap().len(), 1);

    // Blank strings clear optional fields
    let (status, body) = app
        .call(
            "PUT",
            &format!("/api/artists/{}", id),
            Some(&token),
            Some(json!({ "bio": "Four-piece from Leeds", "location": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artist"]["bio"], "Four-piece from Leeds");
    assert!(body["artist"]["location"].is_null());
    assert_eq!(body["artist"]["genre"], "Jazz");

    let (status, _) = app
        .call("DELETE", &format!("/api/artists/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/artists/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_venue_crud_and_city_filter() {
    let app = setup_app().await;
    let (token, _) = app.register("velvet_room", "venue").await;

    let id = app.create_venue(&token, "The Velvet Room").await;

    let (_, body) = app.get("/api/venues?city=manchester").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["venues"][0]["capacity"], 250);

    let (_, body) = app.get("/api/venues?city=london").await;
    assert_eq!(body["total"], 0);

    let (status, body) = app
        .call(
            "PUT",
            &format!("/api/venues/{}", id),
            Some(&token),
            Some(json!({ "capacity": 300 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["venue"]["capacity"], 300);
    assert_eq!(body["venue"]["name"], "The Velvet Room");
}

#[tokio::test]
async fn test_event_with_venue_and_lineup() {
    let app = setup_app().await;
    let (organiser, organiser_id) = app.register("gig_runner", "organiser").await;
    let (venue_owner, _) = app.register("room_keeper", "venue").await;
    let (band, _) = app.register("loud_band", "artist").await;

    let venue_id = app.create_venue(&venue_owner, "Band on the Wall").await;
    let artist_id = app.create_artist(&band, "Loud Band").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/events",
            Some(&organiser),
            Some(json!({
                "name": "Friday Night Live",
                "venue_id": venue_id,
                "starts_at": days_from_now(7),
                "ticket_price": 12.5
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let event_id = body["event"]["id"].as_i64().unwrap();
    assert_eq!(body["event"]["organiser_id"], organiser_id);

    let (status, body) = app
        .call(
            "PUT",
            &format!("/api/events/{}/artists/{}", event_id, artist_id),
            Some(&organiser),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lineup"][0]["name"], "Loud Band");

    let (status, body) = app.get(&format!("/api/events/{}", event_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["venue"]["id"], venue_id);
    assert_eq!(body["lineup"].as_array().unwrap().len(), 1);

    // The event shows up on the artist and through the filters
    let (_, body) = app.get(&format!("/api/artists/{}", artist_id)).await;
    assert_eq!(body["upcoming_events"][0]["id"], event_id);

    let (_, body) = app
        .get(&format!("/api/events?venue_id={}&upcoming=true", venue_id))
        .await;
    assert_eq!(body["total"], 1);

    let (_, body) = app.get(&format!("/api/events?artist_id={}", artist_id)).await;
    assert_eq!(body["total"], 1);

    // Clearing the price with null
    let (status, body) = app
        .call(
            "PUT",
            &format!("/api/events/{}", event_id),
            Some(&organiser),
            Some(json!({ "ticket_price": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["event"]["ticket_price"].is_null());

    let (status, body) = app
        .call(
            "DELETE",
            &format!("/api/events/{}/artists/{}", event_id, artist_id),
            Some(&organiser),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lineup"], json!([]));

    let (status, _) = app
        .call(
            "DELETE",
            &format!("/api/events/{}/artists/{}", event_id, artist_id),
            Some(&organiser),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_past_events_are_not_upcoming() {
    let app = setup_app().await;
    let (organiser, _) = app.register("gig_runner", "organiser").await;

    for (name, days) in [("Last Week", -7), ("Next Week", 7)] {
        let (status, _) = app
            .call(
                "POST",
                "/api/events",
                Some(&organiser),
                Some(json!({ "name": name, "starts_at": days_from_now(days) })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.get("/api/events").await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["events"][0]["name"], "Last Week");

    let (_, body) = app.get("/api/events?upcoming=true").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["events"][0]["name"], "Next Week");
}

#[tokio::test]
async fn test_update_and_delete_account() {
    let app = setup_app().await;
    let (token, id) = app.register("renamer", "fan").await;

    let (status, body) = app
        .call(
            "PUT",
            "/api/users/me",
            Some(&token),
            Some(json!({ "username": "renamed", "email": "New@Example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "renamed");
    assert_eq!(body["user"]["email"], "new@example.com");

    let (status, body) = app.get(&format!("/api/users/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "renamed");
    assert!(body["user"].get("email").is_none());

    let (status, _) = app.call("DELETE", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/users/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_a_user_removes_their_listings() {
    let app = setup_app().await;
    let (token, _) = app.register("short_lived", "artist").await;
    let artist_id = app.create_artist(&token, "Gone Soon").await;

    let (status, _) = app.call("DELETE", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/artists/{}", artist_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_token_of_deleted_account_cannot_create_rows() {
    let app = setup_app().await;
    let (band, _) = app.register("still_here", "artist").await;
    let artist_id = app.create_artist(&band, "Still Here").await;
    let (token, _) = app.register("vanished", "artist").await;
    let (fan, _) = app.register("vanished_fan", "fan").await;

    for deleted in [&token, &fan] {
        let (status, _) = app.call("DELETE", "/api/users/me", Some(deleted), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, body) = app
        .call(
            "POST",
            "/api/artists",
            Some(&token),
            Some(json!({ "name": "Ghost Band" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{}", body);
    assert_eq!(body["error"], "Referenced record not found");

    let (status, _) = app
        .call(
            "POST",
            "/api/ratings",
            Some(&fan),
            Some(json!({ "rateable_type": "artist", "rateable_id": artist_id, "score": 4 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/artists").await;
    assert_eq!(body["total"], 1);
}
