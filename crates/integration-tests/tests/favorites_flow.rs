//! Integration tests for favorites and matching.

#![allow(clippy::unwrap_used)]

use dogfinder_core::FavoritesPolicy;
use dogfinder_integration_tests::{TestApp, location};
use dogfinder_web::routes::SESSION_EXPIRED_MESSAGE;
use reqwest::StatusCode;

const BEAGLES: &str = "page=1&breed=Beagle&sortBy=name&sort=asc";
const BEAGLE_SEARCH: &str = "/search?page=1&breed=Beagle&sortBy=name&sort=asc";

async fn toggle(app: &TestApp, id: &str) -> reqwest::Response {
    app.post_form("/favorites/toggle", &[("id", id), ("query", BEAGLES)])
        .await
}

#[tokio::test]
async fn test_toggle_adds_and_removes() {
    let app = TestApp::spawn().await;
    app.login("Ada", "ada@example.com").await;
    app.page(BEAGLE_SEARCH).await;

    let response = toggle(&app, "beagle-000").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), BEAGLE_SEARCH);

    let body = app.page(BEAGLE_SEARCH).await;
    assert!(body.contains("You favorited 1 dog"));
    assert!(body.contains("aria-pressed=\"true\""));

    toggle(&app, "beagle-000").await;
    let body = app.page(BEAGLE_SEARCH).await;
    assert!(body.contains("You favorited 0 dogs"));
    assert!(!body.contains("aria-pressed=\"true\""));
}

#[tokio::test]
async fn test_cap_refuses_extra_favorites() {
    let app = TestApp::spawn_with(|config| config.policy.favorites = FavoritesPolicy::capped(2)).await;
    app.login("Ada", "ada@example.com").await;

    toggle(&app, "beagle-000").await;
    toggle(&app, "beagle-001").await;
    let response = toggle(&app, "beagle-002").await;
    assert_eq!(location(&response), BEAGLE_SEARCH);

    let body = app.page(BEAGLE_SEARCH).await;
    assert!(body.contains("You can favorite at most 2 dogs. Remove one to add another."));
    assert!(body.contains("You favorited the maximum count of 2 dogs"));
    assert!(body.contains("Favorites full"));

    // Removing one makes room again
    toggle(&app, "beagle-001").await;
    toggle(&app, "beagle-002").await;
    let body = app.page(BEAGLE_SEARCH).await;
    assert!(!body.contains("You can favorite at most"));
}

#[tokio::test]
async fn test_clear_removes_every_favorite() {
    let app = TestApp::spawn().await;
    app.login("Ada", "ada@example.com").await;
    toggle(&app, "beagle-000").await;
    toggle(&app, "poodle-003").await;

    let response = app
        .post_form("/favorites/clear", &[("query", BEAGLES)])
        .await;
    assert_eq!(location(&response), BEAGLE_SEARCH);
    assert!(app.page(BEAGLE_SEARCH).await.contains("You favorited 0 dogs"));
}

#[tokio::test]
async fn test_toggle_requires_an_id() {
    let app = TestApp::spawn().await;
    app.login("Ada", "ada@example.com").await;

    let response = toggle(&app, "  ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_match_without_favorites_makes_no_call() {
    let app = TestApp::spawn().await;
    app.login("Ada", "ada@example.com").await;

    let response = app.post_form("/match", &[("query", BEAGLES)]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), BEAGLE_SEARCH);
    assert_eq!(app.api.call_count("/dogs/match"), 0);

    let body = app.page(BEAGLE_SEARCH).await;
    assert!(body.contains("Add at least one favorite to find a match."));
}

#[tokio::test]
async fn test_match_shows_the_chosen_dog() {
    let app = TestApp::spawn().await;
    app.login("Ada", "ada@example.com").await;
    toggle(&app, "beagle-007").await;

    let response = app.post_form("/match", &[("query", BEAGLES)]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Meet Beagle 7!"));
    assert!(body.contains("https://images.test/beagle-007.jpg"));

    let calls = app.api.calls("/dogs/match");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
}

#[tokio::test]
async fn test_favorites_survive_session_expiry() {
    let app = TestApp::spawn().await;
    app.login("Ada", "ada@example.com").await;
    toggle(&app, "beagle-000").await;

    app.api.revoke_sessions();
    let response = app.get(BEAGLE_SEARCH).await;
    assert_eq!(location(&response), "/login");

    app.api.restore_sessions();
    app.login("Ada", "ada@example.com").await;
    assert!(app.page(BEAGLE_SEARCH).await.contains("You favorited 1 dog"));
}

#[tokio::test]
async fn test_logout_discards_favorites() {
    let app = TestApp::spawn().await;
    app.login("Ada", "ada@example.com").await;
    toggle(&app, "beagle-000").await;

    app.post_form("/logout", &[]).await;
    app.login("Ada", "ada@example.com").await;
    assert!(app.page(BEAGLE_SEARCH).await.contains("You favorited 0 dogs"));
}

#[tokio::test]
async fn test_401_from_match_expires_session() {
    let app = TestApp::spawn().await;
    app.login("Ada", "ada@example.com").await;
    toggle(&app, "beagle-000").await;
    app.api.reject_endpoint("/dogs/match");

    let response = app.post_form("/match", &[("query", BEAGLES)]).await;
    assert_eq!(location(&response), "/login");
    assert_eq!(app.api.call_count("/dogs/match"), 1);
    assert!(app.page("/login").await.contains(SESSION_EXPIRED_MESSAGE));
}
