//! HTTP surface of the web front-end, driven through the router in-process

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use hallon::auth::{MemoryUserStore, SessionStore};
use hallon::controller::{build_router, AppState, SearchResponse, MAX_ARTISTS};
use hallon::native::memory::MemoryCatalog;
use hallon::native::{ArtistRecord, Engine, ErrorCode};
use hallon::Session;

fn setup_app(catalog: MemoryCatalog) -> Router {
    let engine = Engine::start(catalog).expect("Failed to start engine");
    let session = Session::new(engine).expect("Failed to create session");
    build_router(AppState {
        session,
        users: Arc::new(MemoryUserStore::new()),
        sessions: SessionStore::new(),
        search_timeout: Duration::from_secs(5),
    })
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    request.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(MemoryCatalog::demo());

    let (status, _, body) = send(&app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "hallon");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_search_results_for_demo_catalog() {
    let app = setup_app(MemoryCatalog::demo());

    let (status, _, body) = send(&app, form("/search_results", "query=pantera")).await;

    assert_eq!(status, StatusCode::OK);
    let response: SearchResponse = serde_json::from_slice(&body).unwrap();
    let names: Vec<_> = response.artists.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Pantera", "Pantera Negra"]);
    assert_eq!(response.artists[0].uri, "spotify:artist:1Fmb52lZ6Jv7FMWXXTPO3K");
    assert_eq!(
        response.artists[0].portrait.as_deref(),
        Some("spotify:image:ab67616100005174")
    );
    assert_eq!(response.artists[1].portrait, None);
}

#[tokio::test]
async fn test_search_results_returns_at_most_three_artists() {
    let catalog = (0..5).fold(MemoryCatalog::new(), |catalog, n| {
        catalog.with_artist(ArtistRecord {
            id: format!("riffer{}", n),
            name: format!("Riffer {}", n),
            ..Default::default()
        })
    });
    let app = setup_app(catalog);

    let (status, _, body) = send(&app, form("/search_results", "query=riffer")).await;

    assert_eq!(status, StatusCode::OK);
    let response: SearchResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.artists.len(), MAX_ARTISTS);
    assert_eq!(response.artists[2].name, "Riffer 2");
}

#[tokio::test]
async fn test_search_results_rejects_empty_query() {
    let app = setup_app(MemoryCatalog::demo());

    let (status, _, body) = send(&app, form("/search_results", "query=+")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_search_results_reports_native_failure() {
    let catalog = MemoryCatalog::demo().with_failing_query("down", ErrorCode::OtherTransient);
    let app = setup_app(catalog);

    let (status, _, body) = send(&app, form("/search_results", "query=down")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("search failed"));
}

#[tokio::test]
async fn test_pages_render() {
    let app = setup_app(MemoryCatalog::demo());

    for path in ["/", "/search", "/sessions/new", "/users/new"] {
        let (status, headers, _) = send(&app, get(path, None)).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert!(headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
    }
}

#[tokio::test]
async fn test_sign_up_log_in_and_log_out() {
    let app = setup_app(MemoryCatalog::demo());

    let (status, headers, _) = send(
        &app,
        form("/users", "name=Dimebag&email=dime%40example.com&password=cowboys"),
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/");

    let (status, _, _) = send(
        &app,
        form("/users", "name=Copy&email=dime%40example.com&password=x"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Wrong password: redirected without a cookie.
    let (status, headers, _) = send(
        &app,
        form("/sessions", "email=dime%40example.com&password=nope"),
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(headers.get(header::SET_COOKIE).is_none());

    let (status, headers, _) = send(
        &app,
        form("/sessions", "email=dime%40example.com&password=cowboys"),
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let session_id = cookie.strip_prefix("hallon_session=").unwrap().to_string();

    let (_, _, body) = send(&app, get("/", Some(&cookie))).await;
    let page = String::from_utf8(body).unwrap();
    assert!(page.contains("Welcome back, Dimebag"));
    assert!(page.contains(&session_id));

    let logout = Request::builder()
        .method("DELETE")
        .uri(format!("/sessions/{}", session_id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app, logout).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/");

    let (_, _, body) = send(&app, get("/", Some(&cookie))).await;
    let page = String::from_utf8(body).unwrap();
    assert!(!page.contains("Welcome back"));
}
