use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use portal_api::auth::{AppState, AppStateInner};
use portal_api::routes;
use portal_types::api::Claims;

const TEST_SECRET: &str = "test-secret";

fn test_app() -> Router {
    let db = portal_db::Database::open_in_memory().unwrap();
    let upload_dir = std::env::temp_dir().join(format!("portal-test-{}", Uuid::new_v4()));
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: TEST_SECRET.into(),
        upload_dir,
    });
    routes::router(state)
}

fn json_request(method: &str, path: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn signup_and_login(app: &Router, username: &str, email: &str) -> String {
    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/signup",
            None,
            &json!({"username": username, "email": email, "password": "pw"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/login",
            None,
            &json!({"email": email, "password": "pw"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn sample_session() -> Value {
    json!({
        "subject": "Math",
        "topic": "Algebra",
        "duration": 60,
        "difficulty": "Medium",
        "completed": false,
        "date": "2025-03-01"
    })
}

// -- Auth --

#[tokio::test]
async fn signup_conflict_then_login() {
    let app = test_app();

    let alice = json!({"username": "alice", "email": "alice@x.com", "password": "pw"});

    let (status, body) = send(&app, json_request("POST", "/signup", None, &alice)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");

    // Same email again, different username
    let dup = json!({"username": "alice2", "email": "alice@x.com", "password": "pw"});
    let (status, body) = send(&app, json_request("POST", "/signup", None, &dup)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already exists");

    // The original credentials still log in
    let creds = json!({"email": "alice@x.com", "password": "pw"});
    let (status, body) = send(&app, json_request("POST", "/login", None, &creds)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn signup_requires_all_fields_but_not_a_long_password() {
    let app = test_app();

    let blank_password = json!({"username": "alice", "email": "alice@x.com", "password": ""});
    let (status, body) = send(&app, json_request("POST", "/signup", None, &blank_password)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "username, email and password are required");

    let blank_username = json!({"username": "  ", "email": "alice@x.com", "password": "pw"});
    let (status, _) = send(&app, json_request("POST", "/signup", None, &blank_username)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Length is not policed; a two-character password registers and logs in
    let short = json!({"username": "alice", "email": "alice@x.com", "password": "pw"});
    let (status, _) = send(&app, json_request("POST", "/signup", None, &short)).await;
    assert_eq!(status, StatusCode::CREATED);

    let creds = json!({"email": "alice@x.com", "password": "pw"});
    let (status, body) = send(&app, json_request("POST", "/login", None, &creds)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = test_app();
    signup_and_login(&app, "alice", "alice@x.com").await;

    let wrong_password = json!({"email": "alice@x.com", "password": "wrong-password"});
    let (status, _) = send(&app, json_request("POST", "/login", None, &wrong_password)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let unknown_email = json!({"email": "nobody@x.com", "password": "pw"});
    let (status, _) = send(&app, json_request("POST", "/login", None, &unknown_email)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// -- Access control --

#[tokio::test]
async fn gated_routes_require_bearer_token() {
    let app = test_app();

    // No token at all
    let (status, body) = send(&app, get("/study-sessions", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized: No token provided");

    // Wrong scheme
    let req = Request::builder()
        .method("GET")
        .uri("/study-sessions")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Malformed token
    let (status, body) = send(&app, get("/study-sessions", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn expired_token_is_forbidden() {
    let app = test_app();

    let claims = Claims {
        sub: Uuid::new_v4(),
        email: "alice@x.com".into(),
        exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let (status, _) = send(&app, get("/study-sessions", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// -- Study sessions --

#[tokio::test]
async fn study_session_end_to_end() {
    let app = test_app();
    let token = signup_and_login(&app, "alice", "alice@x.com").await;

    let (status, created) = send(
        &app,
        json_request("POST", "/study-sessions", Some(&token), &sample_session()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, get("/study-sessions", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let rows = listed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], id.as_str());
    assert_eq!(rows[0]["subject"], "Math");
    assert_eq!(rows[0]["topic"], "Algebra");
    assert_eq!(rows[0]["duration"], 60);
    assert_eq!(rows[0]["difficulty"], "Medium");
    assert_eq!(rows[0]["completed"], false);
    assert_eq!(rows[0]["date"], "2025-03-01");

    // Mark complete via full replacement
    let mut replacement = sample_session();
    replacement["completed"] = json!(true);
    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &format!("/study-sessions/{}", id),
            Some(&token),
            &replacement,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);

    let (_, listed) = send(&app, get("/study-sessions", Some(&token))).await;
    assert_eq!(listed.as_array().unwrap()[0]["completed"], true);
}

#[tokio::test]
async fn study_sessions_are_scoped_per_owner() {
    let app = test_app();
    let alice = signup_and_login(&app, "alice", "alice@x.com").await;
    let bob = signup_and_login(&app, "bob", "bob@x.com").await;

    send(
        &app,
        json_request("POST", "/study-sessions", Some(&alice), &sample_session()),
    )
    .await;
    let mut bobs = sample_session();
    bobs["subject"] = json!("History");
    send(&app, json_request("POST", "/study-sessions", Some(&bob), &bobs)).await;

    let (_, listed) = send(&app, get("/study-sessions", Some(&alice))).await;
    let rows = listed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["subject"], "Math");

    let (_, listed) = send(&app, get("/study-sessions", Some(&bob))).await;
    let rows = listed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["subject"], "History");
}

#[tokio::test]
async fn cross_user_session_update_is_not_found() {
    let app = test_app();
    let alice = signup_and_login(&app, "alice", "alice@x.com").await;
    let bob = signup_and_login(&app, "bob", "bob@x.com").await;

    let (_, created) = send(
        &app,
        json_request("POST", "/study-sessions", Some(&alice), &sample_session()),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    // Bob knows the id but must not be able to touch the row
    let mut replacement = sample_session();
    replacement["completed"] = json!(true);
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/study-sessions/{}", id),
            Some(&bob),
            &replacement,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found");

    // Alice's row is untouched
    let (_, listed) = send(&app, get("/study-sessions", Some(&alice))).await;
    assert_eq!(listed.as_array().unwrap()[0]["completed"], false);
}

// -- Validation --

#[tokio::test]
async fn missing_and_unknown_fields_are_bad_requests() {
    let app = test_app();
    let token = signup_and_login(&app, "alice", "alice@x.com").await;

    // Missing fields
    let (status, _) = send(
        &app,
        json_request("POST", "/study-sessions", Some(&token), &json!({"subject": "Math"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown field
    let mut extra = sample_session();
    extra["surprise"] = json!("field");
    let (status, _) = send(&app, json_request("POST", "/study-sessions", Some(&token), &extra)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Present but empty
    let (status, _) = send(
        &app,
        json_request("POST", "/interview-tips", Some(&token), &json!({"tip": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Books --

#[tokio::test]
async fn books_require_auth_to_create_and_stamp_the_seller() {
    let app = test_app();

    let book = json!({
        "title": "SICP",
        "author": "Abelson",
        "price": 12.5,
        "condition": "Good",
        "contact": "alice@x.com"
    });

    // Unauthenticated create is rejected
    let (status, _) = send(&app, json_request("POST", "/books", None, &book)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = signup_and_login(&app, "alice", "alice@x.com").await;
    let (status, created) = send(&app, json_request("POST", "/books", Some(&token), &book)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["sellerName"], "alice");

    // Listing is public
    let (status, listed) = send(&app, get("/books", None)).await;
    assert_eq!(status, StatusCode::OK);
    let rows = listed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "SICP");
    assert_eq!(rows[0]["sellerName"], "alice");
}

// -- Interview prep --

#[tokio::test]
async fn interview_tips_public_list_gated_create() {
    let app = test_app();

    let (status, _) = send(
        &app,
        json_request("POST", "/interview-tips", None, &json!({"tip": "Research the company"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = signup_and_login(&app, "alice", "alice@x.com").await;
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/interview-tips",
            Some(&token),
            &json!({"tip": "Research the company"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, listed) = send(&app, get("/interview-tips", None)).await;
    assert_eq!(status, StatusCode::OK);
    let rows = listed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["tip"], "Research the company");
    assert_eq!(rows[0]["userName"], "alice");
}

#[tokio::test]
async fn common_questions_are_seeded_and_public() {
    let app = test_app();

    let (status, listed) = send(&app, get("/common-questions", None)).await;
    assert_eq!(status, StatusCode::OK);
    let rows = listed.as_array().unwrap();
    assert!(!rows.is_empty());
    assert!(rows[0]["question"].as_str().is_some());
}

#[tokio::test]
async fn mock_interviews_are_scoped_per_owner() {
    let app = test_app();

    let (status, _) = send(&app, get("/mock-interviews", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let alice = signup_and_login(&app, "alice", "alice@x.com").await;
    let bob = signup_and_login(&app, "bob", "bob@x.com").await;

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/mock-interviews",
            Some(&alice),
            &json!({"mentor": "Prof. Chen", "date": "2025-04-10", "time": "10:00 AM"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["userName"], "alice");

    let (_, listed) = send(&app, get("/mock-interviews", Some(&alice))).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, listed) = send(&app, get("/mock-interviews", Some(&bob))).await;
    assert!(listed.as_array().unwrap().is_empty());
}

// -- Profile --

fn multipart_request(
    path: &str,
    token: &str,
    fields: &[(&str, &str)],
    photo: Option<(&str, &[u8])>,
) -> Request<Body> {
    let boundary = "portal-test-boundary";
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("PUT")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn profile_read_and_update() {
    let app = test_app();
    let token = signup_and_login(&app, "alice", "alice@x.com").await;

    let (status, profile) = send(&app, get("/student", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "alice");
    assert_eq!(profile["email"], "alice@x.com");
    assert_eq!(profile["photo"], Value::Null);

    let req = multipart_request(
        "/student",
        &token,
        &[("name", "Alice L"), ("email", "alice@x.com")],
        None,
    );
    let (status, updated) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Alice L");

    let (_, profile) = send(&app, get("/student", Some(&token))).await;
    assert_eq!(profile["name"], "Alice L");
}

#[tokio::test]
async fn profile_photo_upload_records_a_served_path() {
    let app = test_app();
    let token = signup_and_login(&app, "alice", "alice@x.com").await;

    let req = multipart_request(
        "/student",
        &token,
        &[("name", "alice"), ("email", "alice@x.com")],
        Some(("me.png", b"\x89PNG fake image bytes")),
    );
    let (status, updated) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let photo = updated["photo"].as_str().unwrap();
    assert!(photo.starts_with("/uploads/"));
    assert!(photo.ends_with("me.png"));

    // Photo survives a later update without one
    let req = multipart_request(
        "/student",
        &token,
        &[("name", "alice"), ("email", "alice@x.com")],
        None,
    );
    let (_, updated) = send(&app, req).await;
    assert_eq!(updated["photo"].as_str().unwrap(), photo);
}

#[tokio::test]
async fn profile_update_requires_name_and_email() {
    let app = test_app();
    let token = signup_and_login(&app, "alice", "alice@x.com").await;

    let req = multipart_request("/student", &token, &[("name", "Alice L")], None);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email is required");
}
