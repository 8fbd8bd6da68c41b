//! Route-level tests driven in-process through the router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use bench_core::config::BenchConfig;
use bench_server::{build_router, AppState};

/// Build state over a throwaway testfiles directory. The tempdir must stay
/// alive for the duration of the test.
async fn test_state(config_tweak: impl FnOnce(&mut BenchConfig)) -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = BenchConfig::default();
    config.testfiles_dir = dir.path().to_string_lossy().into_owned();
    config_tweak(&mut config);
    let state = AppState::from_config(config).await.expect("state");
    (state, dir)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn health_reports_healthy() {
    let (state, _dir) = test_state(|_| {}).await;
    let response = build_router(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("healthy"), "unexpected health body: {body}");
}

#[tokio::test]
async fn index_lists_fixture_routes() {
    let (state, _dir) = test_state(|_| {}).await;
    let response = build_router(state)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("/crypto/cookie"));
    assert!(body.contains("/sqli/user-lookup"));
}

#[tokio::test]
async fn cookie_get_plants_demonstration_cookie() {
    let (state, _dir) = test_state(|_| {}).await;
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .uri("/crypto/cookie")
                .header(header::HOST, "fixtures.example:8008")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("demonstration cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("cryptoCookie=someSecret"), "cookie: {cookie}");
    assert!(cookie.contains("Max-Age=180"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("Path=/crypto/cookie"));
    assert!(cookie.contains("Domain=fixtures.example"));

    let body = body_text(response).await;
    assert!(body.contains("method=\"POST\""), "companion page should carry the form");
}

#[tokio::test]
async fn ipv6_host_gets_no_domain_attribute() {
    let (state, _dir) = test_state(|_| {}).await;
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .uri("/crypto/cookie")
                .header(header::HOST, "[::1]:8008")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("demonstration cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(!cookie.contains("Domain="), "cookie: {cookie}");
    assert!(cookie.contains("Path=/crypto/cookie"));
}

#[tokio::test]
async fn cookie_post_encrypts_decoded_cookie_value() {
    let (state, _dir) = test_state(|_| {}).await;
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/crypto/cookie")
                .header(header::COOKIE, "cryptoCookie=hello%20world")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(
        body.contains("Sensitive value: 'hello world' encrypted and stored<br/>"),
        "unexpected body: {body}"
    );
}

#[tokio::test]
async fn param_route_captures_parameter_name() {
    let (state, _dir) = test_state(|_| {}).await;
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .uri("/crypto/param?harmless=1&chosenName=cryptoParamMarker")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(
        body.contains("Sensitive value: 'chosenName' encrypted and stored<br/>"),
        "unexpected body: {body}"
    );
}

#[tokio::test]
async fn param_route_form_body_is_scanned() {
    let (state, _dir) = test_state(|_| {}).await;
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/crypto/param")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("formName=cryptoParamMarker"))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("Sensitive value: 'formName'"), "unexpected body: {body}");
}

#[tokio::test]
async fn param_route_without_marker_encrypts_empty_string() {
    let (state, _dir) = test_state(|_| {}).await;
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .uri("/crypto/param?other=value")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(
        body.contains("Sensitive value: '' encrypted and stored<br/>"),
        "unexpected body: {body}"
    );
}

#[tokio::test]
async fn misconfigured_transformation_is_a_server_error() {
    let (state, _dir) = test_state(|config| {
        config.crypto_alg1 = "AES/GCM/NoPadding".to_string();
    })
    .await;
    let response = build_router(state)
        .oneshot(Request::builder().uri("/crypto/param").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(body.contains("Problem executing crypto"), "unexpected body: {body}");
}

#[tokio::test]
async fn sql_lookup_finds_seeded_user() {
    let (state, _dir) = test_state(|_| {}).await;
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .uri("/sqli/user-lookup?username=jsmith")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("jsmith"), "unexpected body: {body}");
}

#[tokio::test]
async fn sql_lookup_is_injectable_by_design() {
    let (state, _dir) = test_state(|_| {}).await;
    let response = build_router(state)
        .oneshot(
            Request::builder()
                // username=x' OR '1'='1
                .uri("/sqli/user-lookup?username=x%27%20OR%20%271%27%3D%271")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("jsmith"), "tautology should return the whole table: {body}");
    assert!(body.contains("jdoe"));
    assert!(body.contains("admin"));
}
