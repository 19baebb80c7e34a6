mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{MAX_UPLOAD_BYTES, TestApp, json, text};
use serde_json::json;
use tidewave_core::Allocator;
use tidewave_core::validate::SplashDraft;

#[tokio::test]
async fn register_then_login_issue_tokens() {
    let app = TestApp::new().await;
    let resp = app
        .post_json("/api/auth/register", json!({ "username": "marina", "password": "tidepools" }), None)
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .post_json("/api/auth/register", json!({ "username": "Marina", "password": "tidepools" }), None)
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = app
        .post_json("/api/auth/login", json!({ "username": "marina", "password": "nope-nope" }), None)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .post_json("/api/auth/login", json!({ "username": "marina", "password": "tidepools" }), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["username"], "marina");
}

#[tokio::test]
async fn creating_splashes_needs_a_token() {
    let app = TestApp::new().await;
    let resp = app.post_json("/api/splashes", json!({ "body": "hi" }), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.post_json("/api/splashes", json!({ "body": "hi" }), Some("not-a-jwt")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn splash_ids_follow_the_count_and_list_newest_first() {
    let app = TestApp::new().await;
    let token = app.api_token("marina").await;

    for (expected, body) in ["one", "two", "three"].iter().enumerate() {
        let resp = app.post_json("/api/splashes", json!({ "body": body }), Some(&token)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let splash = json(resp).await;
        assert_eq!(splash["id"], expected as i64);
        assert_eq!(splash["author"], "marina");
    }

    let list = json(app.get("/api/splashes", None).await).await;
    let ids: Vec<i64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 1, 0]);
}

#[tokio::test]
async fn invalid_splashes_are_bad_requests() {
    let app = TestApp::new().await;
    let token = app.api_token("marina").await;
    for tide in ["a", "b", "c", "d"] {
        app.state.db.add_tide(tide).unwrap();
    }

    let bad = [
        json!({ "body": "   " }),
        json!({ "body": "x".repeat(1001) }),
        json!({ "body": "hi", "tides": ["a", "b", "c", "d"] }),
        json!({ "body": "hi", "tides": ["atlantis"] }),
        json!({ "body": "hi", "media_link": "https://youtu.be/dQw4w9WgXcQ", "media_file": "f" }),
        json!({ "body": "hi", "media_file": "0".repeat(64) }),
    ];
    for req in bad {
        let resp = app.post_json("/api/splashes", req.clone(), Some(&token)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{req}");
    }
    assert_eq!(app.state.db.count_splashes().unwrap(), 0);
}

#[tokio::test]
async fn media_links_are_classified() {
    let app = TestApp::new().await;
    let token = app.api_token("marina").await;

    let resp = app
        .post_json(
            "/api/splashes",
            json!({ "body": "watch", "media_link": "https://youtu.be/dQw4w9WgXcQ" }),
            Some(&token),
        )
        .await;
    let splash = json(resp).await;
    assert_eq!(splash["media"]["kind"], "link");
    assert_eq!(splash["media"]["embed"]["site"], "youtube");
    assert_eq!(splash["media"]["embed"]["external_id"], "dQw4w9WgXcQ");

    let html = text(app.get("/splashes/0", None).await).await;
    assert!(html.contains("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ"));

    let resp = app
        .post_json(
            "/api/splashes",
            json!({ "body": "plain", "media_link": "https://example.com/x" }),
            Some(&token),
        )
        .await;
    let splash = json(resp).await;
    assert!(splash["media"]["embed"].is_null());
}

#[tokio::test]
async fn scoped_listing_falls_back_for_unknown_names() {
    let app = TestApp::new().await;
    let token = app.api_token("marina").await;
    app.post_json("/api/splashes", json!({ "body": "tagged", "tides": ["general"] }), Some(&token)).await;
    app.post_json("/api/splashes", json!({ "body": "untagged" }), Some(&token)).await;

    let tagged = json(app.get("/api/splashes?tide=general", None).await).await;
    assert_eq!(tagged.as_array().unwrap().len(), 1);

    let fallback = json(app.get("/api/splashes?tide=atlantis", None).await).await;
    assert_eq!(fallback.as_array().unwrap().len(), 2);

    let by_author = json(app.get("/api/splashes?author=MARINA", None).await).await;
    assert_eq!(by_author.as_array().unwrap().len(), 2);

    let unknown_author = json(app.get("/api/splashes?author=nobody", None).await).await;
    assert_eq!(unknown_author.as_array().unwrap().len(), 2);

    let tides = json(app.get("/api/tides", None).await).await;
    assert_eq!(tides[0]["name"], "general");
}

fn upload(token: &str, content_type: &str, bytes: Vec<u8>) -> Request<Body> {
    Request::post("/media")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .unwrap()
}

#[tokio::test]
async fn uploads_are_stored_and_attachable() {
    let app = TestApp::new().await;
    let token = app.api_token("marina").await;

    let resp = app.send(upload(&token, "image/png", b"\x89PNG fake".to_vec())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let uploaded = json(resp).await;
    let file_id = uploaded["file_id"].as_str().unwrap().to_string();
    assert_eq!(uploaded["size"], 9);

    let resp = app.get(&format!("/media/{file_id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(resp.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(resp.headers()[header::CONTENT_SECURITY_POLICY], "sandbox");

    let resp = app
        .post_json("/api/splashes", json!({ "body": "pic", "media_file": file_id }), Some(&token))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let html = text(app.get("/home", None).await).await;
    assert!(html.contains(&format!(r#"src="/media/{file_id}""#)));
}

#[tokio::test]
async fn uploads_are_checked() {
    let app = TestApp::new().await;
    let token = app.api_token("marina").await;

    let resp = app.send(upload(&token, "text/plain", b"hello".to_vec())).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let resp = app.send(upload(&token, "image/png", Vec::new())).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.send(upload(&token, "image/png", vec![0; MAX_UPLOAD_BYTES + 1])).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let resp = app.get("/media/..%2F..%2Fetc%2Fpasswd", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn svg_uploads_are_refused() {
    let app = TestApp::new().await;
    let token = app.api_token("marina").await;

    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"><script>fetch('/splashes',{method:'POST'})</script></svg>"#;
    let resp = app.send(upload(&token, "image/svg+xml", svg.to_vec())).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let resp = app.send(upload(&token, "text/html", svg.to_vec())).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let resp = app.send(upload(&token, "image/webp; charset=binary", b"RIFF".to_vec())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn exhausted_allocation_is_service_unavailable() {
    let app = TestApp::with_allocator(Allocator::new(0)).await;
    let token = app.api_token("marina").await;

    // One splash at id 1: the count is 1, so the next request asks for the
    // taken id 1 and a zero-width walk has nowhere to go.
    let seed = SplashDraft {
        body: "seed".into(),
        tides: vec![],
        media: None,
    };
    app.state
        .db
        .create_splash_near(&Allocator::default(), 5, 1, "marina", seed)
        .unwrap();

    let resp = app.post_json("/api/splashes", json!({ "body": "next" }), Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
