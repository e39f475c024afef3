//! End-to-end HTTP tests through the axum router.

mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::Service;

use mcare::domain::UserRole;
use mcare::interfaces::http::{create_api_router, ApiServices};
use support::{at, jwt_config, TestApp, PASSWORD};

async fn router(app: &TestApp) -> Router {
    create_api_router(ApiServices {
        users: Arc::new(app.users()),
        groups: Arc::new(app.groups()),
        duties: Arc::new(app.duties()),
        attendance: Arc::new(app.attendance()),
        clock: app.clock.clone(),
        jwt_config: jwt_config(),
        db: app.db.clone(),
        metrics_handle: PrometheusBuilder::new().build_recorder().handle(),
        reminders_enabled: false,
    })
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let mut svc = app.clone().into_service();
    let response = svc.call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": username, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let router = router(&app).await;

    let (status, body) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"]["status"], "ok");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new().await;
    let router = router(&app).await;

    let mut svc = router.into_service();
    let response = svc
        .call(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn register_login_and_read_own_profile() {
    let app = TestApp::new().await;
    let router = router(&app).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "school_id": "2021-0042",
            "username": "mcruz",
            "email": "MCruz@School.test",
            "password": PASSWORD,
            "name": "Maria Cruz",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["user"]["role"], "user");
    assert_eq!(
        body["data"]["user"]["qr_payload"],
        "http://mcare.test/api/v1/attendance/mark/2021-0042"
    );
    assert!(body["data"]["user"].get("password_hash").is_none());

    // welcome mail went out
    assert_eq!(app.mail.recipients(), vec!["mcruz@school.test".to_string()]);

    let token = login(&router, "mcruz").await;
    let (status, body) = send(&router, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["school_id"], "2021-0042");
    assert!(body["data"]["group"].is_null());

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "school_id": "2021-0043",
            "username": "mcruz",
            "email": "other@school.test",
            "password": PASSWORD
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    app.student("S001").await;
    let router = router(&app).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "s001", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn admin_routes_need_a_token_and_the_admin_role() {
    let app = TestApp::new().await;
    app.student("S001").await;
    app.user_with_role("ADMIN-1", UserRole::Admin).await;
    let router = router(&app).await;

    let (status, _) = send(&router, Method::GET, "/api/v1/groups", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let student = login(&router, "s001").await;
    let (status, body) = send(&router, Method::GET, "/api/v1/groups", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let admin = login(&router, "admin-1").await;
    let (status, body) = send(&router, Method::GET, "/api/v1/groups", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, _) = send(&router, Method::GET, "/api/v1/nothing-here", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn group_and_duty_workflow() {
    let app = TestApp::new().await;
    let s001 = app.student("S001").await;
    let s002 = app.student("S002").await;
    app.student("S003").await;
    app.user_with_role("ADMIN-1", UserRole::Admin).await;
    let router = router(&app).await;
    let admin = login(&router, "admin-1").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/groups",
        Some(&admin),
        Some(json!({ "name": "BSN-3A", "members": ["S001", "S002"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let group_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/v1/groups/{}/members", group_id),
        Some(&admin),
        Some(json!({ "school_ids": ["S003", "S404", "S001"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["added"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["skipped"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["not_found"], json!(["S404"]));

    let duty = json!({
        "group_id": group_id,
        "date": "2025-06-10",
        "place": "Main Hospital",
        "time": "08:00 AM - 10:00 AM",
        "clinical_instructor": "Dr. Reyes",
        "area": "Pediatrics"
    });
    let (status, body) =
        send(&router, Method::POST, "/api/v1/duties", Some(&admin), Some(duty.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["duty"]["date"], "2025-06-10");
    assert_eq!(body["data"]["duty"]["time_range"], "08:00 AM - 10:00 AM");
    assert_eq!(body["data"]["delivery"]["sent"], 3);

    let (status, body) =
        send(&router, Method::POST, "/api/v1/duties", Some(&admin), Some(duty)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    // students read their own schedule only
    let student = login(&router, "s001").await;
    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/api/v1/duties/user/{}", s001.id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &router,
        Method::GET,
        &format!("/api/v1/duties/user/{}", s002.id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duty_with_unparsable_date_is_a_bad_request() {
    let app = TestApp::new().await;
    app.user_with_role("ADMIN-1", UserRole::Admin).await;
    let router = router(&app).await;
    let admin = login(&router, "admin-1").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/duties",
        Some(&admin),
        Some(json!({
            "group_id": "g1",
            "date": "someday",
            "place": "Main Hospital",
            "time_range": "08:00 AM - 10:00 AM",
            "clinical_instructor": "Dr. Reyes",
            "area": "Pediatrics"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("someday"));
}

#[tokio::test]
async fn request_bodies_are_validated() {
    let app = TestApp::new().await;
    app.user_with_role("ADMIN-1", UserRole::Admin).await;
    let router = router(&app).await;
    let admin = login(&router, "admin-1").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/groups",
        Some(&admin),
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("name"));

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/v1/groups",
        Some(&admin),
        Some(json!({ "members": ["S001"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn attendance_by_scan_and_self_service_history() {
    let app = TestApp::new().await;
    app.student("S001").await;
    app.student("S002").await;
    app.user_with_role("PROF-1", UserRole::Professor).await;
    app.user_with_role("ADMIN-1", UserRole::Admin).await;
    app.clock.set(at("2025-06-10 08:00:00"));
    let router = router(&app).await;
    let admin = login(&router, "admin-1").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/attendance/mark/S001",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["attendance"]["date"], "2025-06-10");
    assert_eq!(body["data"]["attendance"]["time_in"], "08:00:00");
    assert_eq!(body["data"]["name"], "Student S001");

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/v1/attendance/mark/S001",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/v1/attendance/mark/S404",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let student = login(&router, "s001").await;
    let (status, body) =
        send(&router, Method::GET, "/api/v1/attendance/S001", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) =
        send(&router, Method::GET, "/api/v1/attendance/S002", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // professors read anyone's history but cannot scan
    let professor = login(&router, "prof-1").await;
    let (status, _) =
        send(&router, Method::GET, "/api/v1/attendance/S002", Some(&professor), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &router,
        Method::POST,
        "/api/v1/attendance/mark/S002",
        Some(&professor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&router, Method::GET, "/api/v1/attendance", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["username"], "s001");
}

#[tokio::test]
async fn admin_can_update_and_delete_users() {
    let app = TestApp::new().await;
    let s001 = app.student("S001").await;
    app.user_with_role("ADMIN-1", UserRole::Admin).await;
    let router = router(&app).await;
    let admin = login(&router, "admin-1").await;

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("/api/v1/users/{}", s001.id),
        Some(&admin),
        Some(json!({ "school_id": "S100", "role": "professor", "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["school_id"], "S100");
    assert_eq!(body["data"]["role"], "professor");
    assert_eq!(body["data"]["name"], "Student S001");
    assert_eq!(
        body["data"]["qr_payload"],
        "http://mcare.test/api/v1/attendance/mark/S100"
    );

    let (status, _) = send(
        &router,
        Method::PUT,
        &format!("/api/v1/users/{}", s001.id),
        Some(&admin),
        Some(json!({ "role": "superuser" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/api/v1/users/{}", s001.id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &router,
        Method::GET,
        &format!("/api/v1/users/{}", s001.id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
