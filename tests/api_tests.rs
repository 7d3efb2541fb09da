use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use cinecloud_api::{
    api::{create_router, AppState},
    auth::LocalAuthProvider,
    db::{MemoryStore, ProfileStore, Stores},
    error::{AppError, AppResult},
    models::{MetadataDetails, MetadataTitle, ProfilePatch, TrailerMatch, UserProfile},
    services::providers::{MetadataProvider, VideoSearchProvider},
    storage::LocalObjectStorage,
};

const ADMIN_EMAIL: &str = "root@cinecloud.app";

struct StubMetadata;

#[async_trait::async_trait]
impl MetadataProvider for StubMetadata {
    async fn search_titles(&self, _query: &str) -> AppResult<Vec<MetadataTitle>> {
        Ok(Vec::new())
    }

    async fn title_details(&self, imdb_id: &str) -> AppResult<MetadataDetails> {
        Err(AppError::NotFound(format!("Title {} not found", imdb_id)))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

struct StubVideos;

#[async_trait::async_trait]
impl VideoSearchProvider for StubVideos {
    async fn find_video(&self, query: &str) -> AppResult<Option<TrailerMatch>> {
        Ok(query
            .starts_with("Squid Game")
            .then(|| TrailerMatch::new("oqxAJKy0ii4".to_string(), None)))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Profile store whose next write fails once
struct FlakyProfiles {
    inner: Arc<MemoryStore>,
    fail_next_write: AtomicBool,
}

#[async_trait::async_trait]
impl ProfileStore for FlakyProfiles {
    async fn get_profile(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        self.inner.get_profile(user_id).await
    }

    async fn merge_profile(&self, user_id: &str, patch: ProfilePatch) -> AppResult<UserProfile> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal("profile write failed".to_string()));
        }
        self.inner.merge_profile(user_id, patch).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Vec<UserProfile>> {
        self.inner.find_by_email(email).await
    }
}

fn create_test_server() -> TestServer {
    create_test_server_with(Stores::from_backend(Arc::new(MemoryStore::new())))
}

/// A server over existing stores; building a second one over the same
/// stores behaves like a restart
fn create_test_server_with(stores: Stores) -> TestServer {
    let media_root = std::env::temp_dir().join(format!("cinecloud-test-{}", uuid::Uuid::new_v4()));
    let auth = LocalAuthProvider::new(stores.accounts.clone());
    let state = AppState::new(
        stores,
        Arc::new(auth),
        Arc::new(StubMetadata),
        Arc::new(StubVideos),
        Arc::new(LocalObjectStorage::new(media_root, "/media")),
    )
    .with_admin_emails(vec![ADMIN_EMAIL.to_string()]);

    tokio_test::assert_ok!(TestServer::new(create_router(state)))
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

/// Signs up and returns (token, user id)
async fn sign_up(server: &TestServer, email: &str) -> (String, String) {
    let response = server
        .post("/auth/sign-up")
        .json(&json!({
            "email": email,
            "password": "hunter22",
            "confirm_password": "hunter22"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let session: Value = response.json();
    (
        session["token"].as_str().unwrap().to_string(),
        session["user"]["id"].as_str().unwrap().to_string(),
    )
}

fn ids(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_sign_up_then_sign_in() {
    let server = create_test_server();
    let (_, user_id) = sign_up(&server, "Viewer@Example.com").await;

    let response = server
        .post("/auth/sign-in")
        .json(&json!({"email": "viewer@example.com", "password": "hunter22"}))
        .await;
    response.assert_status_ok();
    let session: Value = response.json();
    assert_eq!(session["user"]["id"], user_id.as_str());

    let response = server
        .post("/auth/sign-in")
        .json(&json!({"email": "viewer@example.com", "password": "wrong-password"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_accounts_survive_a_server_restart() {
    let backend = Arc::new(MemoryStore::new());
    let stores = Stores::from_backend(backend.clone());

    let first = create_test_server_with(stores.clone());
    let (token, user_id) = sign_up(&first, "viewer@example.com").await;
    first
        .post("/favourites/8/toggle")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();
    drop(first);

    let second = create_test_server_with(stores);
    let listed: Value = second
        .get("/favourites")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(ids(&listed), vec!["8"]);

    let response = second
        .post("/auth/sign-in")
        .json(&json!({"email": "viewer@example.com", "password": "hunter22"}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["user"]["id"], user_id.as_str());

    second
        .post("/auth/sign-up")
        .json(&json!({
            "email": "viewer@example.com",
            "password": "hunter22",
            "confirm_password": "hunter22"
        }))
        .await
        .assert_status(StatusCode::CONFLICT);
    assert_eq!(backend.find_by_email("viewer@example.com").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_profile_write_undoes_sign_up() {
    let backend = Arc::new(MemoryStore::new());
    let mut stores = Stores::from_backend(backend.clone());
    stores.profiles = Arc::new(FlakyProfiles {
        inner: backend.clone(),
        fail_next_write: AtomicBool::new(true),
    });
    let server = create_test_server_with(stores);

    server
        .post("/auth/sign-up")
        .json(&json!({
            "email": "viewer@example.com",
            "password": "hunter22",
            "confirm_password": "hunter22"
        }))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    server
        .post("/auth/sign-in")
        .json(&json!({"email": "viewer@example.com", "password": "hunter22"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // The retry is not blocked by a half-created account
    let (_, user_id) = sign_up(&server, "viewer@example.com").await;
    let profiles = backend.find_by_email("viewer@example.com").await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].id, user_id);
}

#[tokio::test]
async fn test_mismatched_passwords_are_rejected() {
    let server = create_test_server();
    let response = server
        .post("/auth/sign-up")
        .json(&json!({
            "email": "viewer@example.com",
            "password": "hunter22",
            "confirm_password": "hunter23"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let server = create_test_server();
    server.get("/favourites").await.assert_status(StatusCode::UNAUTHORIZED);
    server.get("/session").await.assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/session")
        .add_header(AUTHORIZATION, bearer("not-a-token"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_lands_standard_user_on_catalog() {
    let server = create_test_server();
    let (token, _) = sign_up(&server, "viewer@example.com").await;

    let response = server
        .get("/session")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let session: Value = response.json();
    assert_eq!(session["state"], "standard");
    assert_eq!(session["landing"], "catalog");
    assert_eq!(session["shows_vip_tab"], false);

    server
        .post("/auth/sign-out")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get("/session")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_toggle_favourite_twice_restores_list() {
    let server = create_test_server();
    let (token, _) = sign_up(&server, "viewer@example.com").await;

    let response = server
        .post("/favourites/8/toggle")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["favourite"], true);

    let listed: Value = server
        .get("/favourites")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(ids(&listed), vec!["8"]);

    let response = server
        .post("/favourites/8/toggle")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.json::<Value>()["favourite"], false);

    let listed: Value = server
        .get("/favourites")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert!(ids(&listed).is_empty());
}

#[tokio::test]
async fn test_toggle_unknown_content_is_not_found() {
    let server = create_test_server();
    let (token, _) = sign_up(&server, "viewer@example.com").await;

    server
        .post("/favourites/does-not-exist/toggle")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_discover_with_single_sparse_genre_uses_positional_slices() {
    let server = create_test_server();
    let (token, _) = sign_up(&server, "viewer@example.com").await;

    server
        .put("/profile/genres")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"genres": ["Romance"]}))
        .await
        .assert_status_ok();

    let response = server
        .get("/discover")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let discover: Value = response.json();

    let sections = discover["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 3);
    assert_eq!(ids(&sections[0]["items"]), vec!["1", "2", "3", "4"]);
    assert_eq!(ids(&sections[1]["items"]), vec!["5", "6", "7", "8"]);
    assert_eq!(ids(&sections[2]["items"]), vec!["9", "10", "11", "12"]);
    assert_eq!(sections[0]["title"], "Picks for You: Romance");
    assert_eq!(discover["featured"].as_array().unwrap().len(), 5);

    server
        .get("/discover/sections/3")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trailer_lookup() {
    let server = create_test_server();
    let (token, _) = sign_up(&server, "viewer@example.com").await;

    let response = server
        .get("/trailers")
        .add_query_param("title", "Squid Game")
        .add_query_param("platform", "Netflix")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["video_id"], "oqxAJKy0ii4");

    server
        .get("/trailers")
        .add_query_param("title", "Unknown")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_grants_premium_and_audits_it() {
    let server = create_test_server();
    let (admin_token, _) = sign_up(&server, ADMIN_EMAIL).await;
    let (viewer_token, viewer_id) = sign_up(&server, "viewer@example.com").await;

    let response = server
        .get("/admin/users")
        .add_query_param("email", "viewer@example.com")
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["id"], viewer_id.as_str());

    let response = server
        .put(&format!("/admin/users/{}/premium", viewer_id))
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .json(&json!({"premium": true}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["premium"], true);

    let audit: Value = server
        .get("/admin/audit")
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .await
        .json();
    let grants: Vec<&Value> = audit
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry["action"] == "GRANT_PREMIUM")
        .collect();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0]["target_user_email"], "viewer@example.com");
    assert_eq!(grants[0]["details"]["newStatus"], true);

    let session: Value = server
        .get("/session")
        .add_header(AUTHORIZATION, bearer(&viewer_token))
        .await
        .json();
    assert_eq!(session["state"], "premium");
    assert_eq!(session["shows_vip_tab"], true);
}

#[tokio::test]
async fn test_admin_search_for_missing_email_is_audited() {
    let server = create_test_server();
    let (admin_token, _) = sign_up(&server, ADMIN_EMAIL).await;

    server
        .get("/admin/users")
        .add_query_param("email", "ghost@example.com")
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let audit: Value = server
        .get("/admin/audit")
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .await
        .json();
    let latest = &audit.as_array().unwrap()[0];
    assert_eq!(latest["action"], "SEARCH_USER_FAILED");
    assert_eq!(latest["target_user_email"], "ghost@example.com");
}

#[tokio::test]
async fn test_admin_flags_round_trip() {
    let server = create_test_server();
    let (admin_token, _) = sign_up(&server, ADMIN_EMAIL).await;

    let response = server
        .put("/admin/flags/newDiscover")
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .json(&json!({"enabled": true}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["newDiscover"], true);

    let flags: Value = server
        .get("/admin/flags")
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .await
        .json();
    assert_eq!(flags["newDiscover"], true);
}

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let server = create_test_server();
    let (token, _) = sign_up(&server, "viewer@example.com").await;

    server
        .get("/admin/flags")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .get("/admin/audit")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_standard_user_cannot_post_until_vip() {
    let server = create_test_server();
    let (token, _) = sign_up(&server, "viewer@example.com").await;
    let post = json!({
        "title": "Night Shift",
        "genres": ["Thriller"],
        "cast": "A. Actor",
        "platform": "Netflix",
        "image": "https://img.example/night.png",
        "description": "A short thriller"
    });

    server
        .post("/community/posts")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&post)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post("/profile/vip")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    let response = server
        .post("/community/posts")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&post)
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();

    let posts: Value = server
        .get("/community/posts")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(ids(&posts), vec![created["id"].as_str().unwrap().to_string()]);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-abc-123"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "trace-abc-123");

    let generated = server.get("/health").await;
    assert!(!generated.header("x-request-id").is_empty());
}
