mod common;

use axum::http::StatusCode;
use common::{days_from_now, setup_app};
use serde_json::json;

#[tokio::test]
async fn test_rating_is_upserted_per_user_and_target() {
    let app = setup_app().await;
    let (band, _) = app.register("rated_band", "artist").await;
    let (fan, fan_id) = app.register("keen_fan", "fan").await;
    let artist_id = app.create_artist(&band, "Rated Band").await;

    let payload = |score: i64, review: &str| {
        json!({
            "rateable_type": "artist",
            "rateable_id": artist_id,
            "score": score,
            "review": review
        })
    };

    let (status, body) = app
        .call("POST", "/api/ratings", Some(&fan), Some(payload(3, "Decent set")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let rating_id = body["rating"]["id"].clone();
    assert_eq!(body["rating"]["user_id"], fan_id);
    assert_eq!(body["rating"]["rateable_type"], "artist");

    let (status, body) = app
        .call("POST", "/api/ratings", Some(&fan), Some(payload(5, "Even better live")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"]["id"], rating_id);
    assert_eq!(body["rating"]["score"], 5);

    let (_, body) = app
        .get(&format!("/api/ratings/artist/{}/average", artist_id))
        .await;
    assert_eq!(body["average"], 5.0);
    assert_eq!(body["count"], 1);

    let (_, body) = app.get(&format!("/api/ratings/artist/{}", artist_id)).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["ratings"][0]["username"], "keen_fan");
    assert_eq!(body["ratings"][0]["review"], "Even better live");

    let (_, body) = app
        .call(
            "GET",
            &format!("/api/ratings/artist/{}/mine", artist_id),
            Some(&fan),
            None,
        )
        .await;
    assert_eq!(body["rating"]["score"], 5);
}

#[tokio::test]
async fn test_average_is_rounded_and_shown_on_listing() {
    let app = setup_app().await;
    let (venue_owner, _) = app.register("room_keeper", "venue").await;
    let venue_id = app.create_venue(&venue_owner, "Rated Room").await;

    for (name, score) in [("fan_one", 5), ("fan_two", 4), ("fan_three", 4)] {
        let (token, _) = app.register(name, "fan").await;
        let (status, _) = app
            .call(
                "POST",
                "/api/ratings",
                Some(&token),
                Some(json!({ "rateable_type": "venue", "rateable_id": venue_id, "score": score })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.get(&format!("/api/ratings/venue/{}/average", venue_id)).await;
    assert_eq!(body["average"], 4.33);
    assert_eq!(body["count"], 3);

    let (_, body) = app.get(&format!("/api/venues/{}", venue_id)).await;
    assert_eq!(body["venue"]["average_rating"], 4.33);
    assert_eq!(body["venue"]["rating_count"], 3);

    let (_, body) = app.get("/api/venues").await;
    assert_eq!(body["venues"][0]["rating_count"], 3);
}

#[tokio::test]
async fn test_unrated_target_has_zero_average() {
    let app = setup_app().await;
    let (_, body) = app.get("/api/ratings/event/12345/average").await;
    assert_eq!(body["average"], 0.0);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_cannot_rate_own_listing_or_self() {
    let app = setup_app().await;
    let (band, _) = app.register("vain_band", "artist").await;
    let (organiser, organiser_id) = app.register("vain_organiser", "organiser").await;
    let artist_id = app.create_artist(&band, "Vain Band").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/ratings",
            Some(&band),
            Some(json!({ "rateable_type": "artist", "rateable_id": artist_id, "score": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You cannot rate your own artist");

    let (status, body) = app
        .call(
            "POST",
            "/api/ratings",
            Some(&organiser),
            Some(json!({ "rateable_type": "organiser", "rateable_id": organiser_id, "score": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You cannot rate yourself");
}

#[tokio::test]
async fn test_organisers_are_rated_as_people() {
    let app = setup_app().await;
    let (_, organiser_id) = app.register("gig_runner", "organiser").await;
    let (_, fan_id) = app.register("not_organiser", "fan").await;
    let (rater, _) = app.register("rater", "fan").await;

    let (status, _) = app
        .call(
            "POST",
            "/api/ratings",
            Some(&rater),
            Some(json!({ "rateable_type": "organiser", "rateable_id": organiser_id, "score": 4 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Only organiser accounts can be rated as organisers
    let (status, _) = app
        .call(
            "POST",
            "/api/ratings",
            Some(&rater),
            Some(json!({ "rateable_type": "organiser", "rateable_id": fan_id, "score": 4 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get(&format!("/api/users/{}", organiser_id)).await;
    assert_eq!(body["rating"]["average"], 4.0);
    assert_eq!(body["rating"]["count"], 1);

    let (_, body) = app.get(&format!("/api/users/{}", fan_id)).await;
    assert!(body["rating"].is_null());
}

#[tokio::test]
async fn test_rating_validation() {
    let app = setup_app().await;
    let (organiser, _) = app.register("gig_runner", "organiser").await;
    let (fan, _) = app.register("picky_fan", "fan").await;

    let (_, body) = app
        .call(
            "POST",
            "/api/events",
            Some(&organiser),
            Some(json!({ "name": "Rated Gig", "starts_at": days_from_now(1) })),
        )
        .await;
    let event_id = body["event"]["id"].as_i64().unwrap();

    for score in [0, 6, -1] {
        let (status, _) = app
            .call(
                "POST",
                "/api/ratings",
                Some(&fan),
                Some(json!({ "rateable_type": "event", "rateable_id": event_id, "score": score })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "score {}", score);
    }

    let (status, _) = app
        .call(
            "POST",
            "/api/ratings",
            Some(&fan),
            Some(json!({ "rateable_type": "gig", "rateable_id": event_id, "score": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/ratings",
            Some(&fan),
            Some(json!({
                "rateable_type": "event",
                "rateable_id": event_id,
                "score": 3,
                "review": "x".repeat(2001)
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/ratings",
            Some(&fan),
            Some(json!({ "rateable_type": "event", "rateable_id": 9999, "score": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            "POST",
            "/api/ratings",
            None,
            Some(json!({ "rateable_type": "event", "rateable_id": event_id, "score": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_author_deletes_rating() {
    let app = setup_app().await;
    let (band, _) = app.register("rated_band", "artist").await;
    let (author, _) = app.register("author_fan", "fan").await;
    let (other, _) = app.register("other_fan", "fan").await;
    let artist_id = app.create_artist(&band, "Rated Band").await;

    let (_, body) = app
        .call(
            "POST",
            "/api/ratings",
            Some(&author),
            Some(json!({ "rateable_type": "artist", "rateable_id": artist_id, "score": 2 })),
        )
        .await;
    let rating_id = body["rating"]["id"].as_i64().unwrap();

    let (status, _) = app
        .call("DELETE", &format!("/api/ratings/{}", rating_id), Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call("DELETE", &format!("/api/ratings/{}", rating_id), Some(&author), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .call("DELETE", &format!("/api/ratings/{}", rating_id), Some(&author), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app
        .get(&format!("/api/ratings/artist/{}/average", artist_id))
        .await;
    assert_eq!(body["count"], 0);

    let (status, _) = app
        .call(
            "GET",
            &format!("/api/ratings/artist/{}/mine", artist_id),
            Some(&author),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
