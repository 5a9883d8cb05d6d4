mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{PASSWORD, days_from_now, setup_app};
use serde_json::json;

#[tokio::test]
async fn test_unknown_rows_are_404_with_error_body() {
    let app = setup_app().await;

    for uri in [
        "/api/artists/999",
        "/api/venues/999",
        "/api/events/999",
        "/api/users/999",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert!(body["error"].as_str().unwrap().contains("not found"), "{}", uri);
    }
}

#[tokio::test]
async fn test_register_validation() {
    let app = setup_app().await;

    let cases = [
        json!({ "username": "ab", "email": "ab@example.com", "password": PASSWORD }),
        json!({ "username": "has space", "email": "x@example.com", "password": PASSWORD }),
        json!({ "username": "valid_name", "email": "not-an-email", "password": PASSWORD }),
        json!({ "username": "valid_name", "email": "v@example.com", "password": "short" }),
        json!({ "username": "valid_name", "email": "v@example.com", "password": PASSWORD, "role": "promoter" }),
    ];

    for payload in cases {
        let (status, body) = app
            .call("POST", "/api/auth/register", None, Some(payload.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_duplicate_username_and_email_conflict() {
    let app = setup_app().await;
    app.register("taken_name", "fan").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "taken_name",
                "email": "other@example.com",
                "password": PASSWORD
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username is already taken");

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "other_name",
                "email": "Taken_Name@example.com",
                "password": PASSWORD
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email is already registered");
}

#[tokio::test]
async fn test_missing_token_is_401() {
    let app = setup_app().await;

    let (status, body) = app
        .call("POST", "/api/artists", None, Some(json!({ "name": "Nobody" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing Authorization header");

    let (status, _) = app
        .call("GET", "/api/auth/me", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = setup_app().await;
    let (token, _) = app.register("band_leader", "artist").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/artists")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ invalid json }"))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_listing_requires_a_name() {
    let app = setup_app().await;
    let (token, _) = app.register("band_leader", "artist").await;

    let (status, _) = app
        .call("POST", "/api/artists", Some(&token), Some(json!({ "name": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_validation() {
    let app = setup_app().await;
    let (token, _) = app.register("gig_runner", "organiser").await;

    // starts_at is required
    let (status, _) = app
        .call("POST", "/api/events", Some(&token), Some(json!({ "name": "No Date" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unparseable timestamp
    let (status, _) = app
        .call(
            "POST",
            "/api/events",
            Some(&token),
            Some(json!({ "name": "Bad Date", "starts_at": "next friday" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // ends before it starts
    let (status, body) = app
        .call(
            "POST",
            "/api/events",
            Some(&token),
            Some(json!({
                "name": "Backwards",
                "starts_at": days_from_now(3),
                "ends_at": days_from_now(2)
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ends_at must not be before starts_at");

    // negative price
    let (status, _) = app
        .call(
            "POST",
            "/api/events",
            Some(&token),
            Some(json!({ "name": "Paid", "starts_at": days_from_now(3), "ticket_price": -1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unknown venue
    let (status, body) = app
        .call(
            "POST",
            "/api/events",
            Some(&token),
            Some(json!({ "name": "Nowhere", "starts_at": days_from_now(3), "venue_id": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Venue 42 does not exist");
}

#[tokio::test]
async fn test_unknown_rateable_type_is_400() {
    let app = setup_app().await;

    let (status, _) = app.get("/api/ratings/concert/1/average").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/featured?target_type=organiser").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = setup_app().await;
    let (status, _) = app.get("/api/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_past_offset_range_is_400() {
    let app = setup_app().await;
    let (band, _) = app.register("paged_band", "artist").await;
    let artist_id = app.create_artist(&band, "Paged Band").await;

    for uri in [
        "/api/artists?page=18446744073709551615&limit=20".to_string(),
        "/api/venues?page=18446744073709551615".to_string(),
        "/api/events?page=92233720368547759&limit=100".to_string(),
        format!("/api/ratings/artist/{}?page=18446744073709551615", artist_id),
    ] {
        let (status, body) = app.get(&uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}: {}", uri, body);
        assert_eq!(body["error"], "page is out of range");
    }

    let (status, body) = app.get("/api/artists?page=1000000&limit=20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artists"], json!([]));
    assert_eq!(body["total"], 1);
}
