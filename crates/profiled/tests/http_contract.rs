//! Contract Test: HTTP Boundary
//!
//! Drives the router in-process and checks the outcome → status mapping:
//! - GET    /Profile/{username}  200 | 404
//! - POST   /Profile             201 + percent-encoded Location | 409 | 400
//! - PUT    /Profile/{username}  200 | 404 | 400
//! - storage faults              500

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use profile_core::{Error, MemoryProfileStore, Profile, ProfileOrchestrator, ProfileStore};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(store: MemoryProfileStore) -> Router {
    profiled::router(ProfileOrchestrator::new(Arc::new(store)))
}

async fn seeded(profile: Profile) -> MemoryProfileStore {
    let store = MemoryProfileStore::new();
    store.upsert(&profile).await.unwrap();
    store
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn get_profile() {
    let app = app_with(seeded(Profile::new("foobar", "Foo", "Bar")).await);

    let response = app.oneshot(get_request("/Profile/foobar")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Profile = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, Profile::new("foobar", "Foo", "Bar"));
}

#[tokio::test]
async fn get_profile_not_found() {
    let app = app_with(seeded(Profile::new("foobar", "Foo", "Bar")).await);

    let response = app.oneshot(get_request("/Profile/foo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_string(response).await,
        "A User with username foo was not found"
    );
}

#[tokio::test]
async fn add_profile() {
    let store = MemoryProfileStore::new();
    let app = app_with(store.clone());

    let request = json_request(
        Method::POST,
        "/Profile",
        serde_json::json!({"username": "foobar", "firstName": "Foo", "lastName": "Bar"}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/Profile/foobar"
    );
    let body: Profile = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, Profile::new("foobar", "Foo", "Bar"));
    assert_eq!(
        store.get("foobar").await.unwrap(),
        Some(Profile::new("foobar", "Foo", "Bar"))
    );
}

#[tokio::test]
async fn add_profile_location_resolves_to_created_profile() {
    let store = MemoryProfileStore::new();

    for (username, expected) in [
        ("a/b", "/Profile/a%2Fb"),
        ("a b", "/Profile/a%20b"),
        ("jos\u{e9}", "/Profile/jos%C3%A9"),
    ] {
        let request = json_request(
            Method::POST,
            "/Profile",
            serde_json::json!({"username": username, "firstName": "Foo", "lastName": "Bar"}),
        );
        let response = app_with(store.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, expected);

        let response = app_with(store.clone())
            .oneshot(get_request(location.to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {}", expected);
        let body: Profile = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, Profile::new(username, "Foo", "Bar"));
    }
}

#[tokio::test]
async fn add_profile_conflict() {
    let store = seeded(Profile::new("foobar", "Foo", "Bar")).await;
    let app = app_with(store.clone());

    let request = json_request(
        Method::POST,
        "/Profile",
        serde_json::json!({"username": "foobar", "firstName": "Other", "lastName": "Name"}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_string(response).await,
        "A user with username foobar already exists"
    );
    assert_eq!(
        store.get("foobar").await.unwrap(),
        Some(Profile::new("foobar", "Foo", "Bar"))
    );
}

#[tokio::test]
async fn add_profile_rejects_incomplete_body() {
    let app = app_with(MemoryProfileStore::new());

    let request = json_request(
        Method::POST,
        "/Profile",
        serde_json::json!({"username": "foobar"}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn add_profile_rejects_empty_username() {
    let store = MemoryProfileStore::new();
    let app = app_with(store.clone());

    let request = json_request(
        Method::POST,
        "/Profile",
        serde_json::json!({"username": "", "firstName": "Foo", "lastName": "Bar"}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn update_profile() {
    let store = seeded(Profile::new("foobar", "Foo", "Bar")).await;
    let app = app_with(store.clone());

    // The username in the body is ignored; the path decides
    let request = json_request(
        Method::PUT,
        "/Profile/foobar",
        serde_json::json!({"username": "someone-else", "firstName": "Foo1", "lastName": "Bar1"}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Profile = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, Profile::new("foobar", "Foo1", "Bar1"));
    assert_eq!(store.get("someone-else").await.unwrap(), None);
}

#[tokio::test]
async fn update_profile_not_found() {
    let store = MemoryProfileStore::new();
    let app = app_with(store.clone());

    let request = json_request(
        Method::PUT,
        "/Profile/foobar",
        serde_json::json!({"firstName": "Foo1", "lastName": "Bar1"}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn health_check() {
    let app = app_with(MemoryProfileStore::new());

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

struct BrokenStore;

#[async_trait]
impl ProfileStore for BrokenStore {
    async fn get(&self, _username: &str) -> Result<Option<Profile>, Error> {
        Err(Error::storage("connection refused"))
    }

    async fn upsert(&self, _profile: &Profile) -> Result<(), Error> {
        Err(Error::storage("connection refused"))
    }
}

#[tokio::test]
async fn storage_failure_is_server_error() {
    let app = profiled::router(ProfileOrchestrator::new(Arc::new(BrokenStore)));

    let response = app.oneshot(get_request("/Profile/foobar")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
