//! Handler tests for Events domain
//!
//! These tests drive the events router end to end over the in-memory
//! repository:
//! - Request deserialization (query strings, JSON bodies)
//! - Response serialization and HTTP status codes
//! - Role enforcement on mutating routes
//!
//! The router is nested under `/api/events` the same way the binary mounts it.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::{JwtAuth, JwtConfig};
use chrono::Duration;
use domain_events::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

const SECRET: &str = "handler-test-secret-0123456789abcdef";

struct TestApp {
    router: Router,
    auth: JwtAuth,
}

impl TestApp {
    fn new() -> Self {
        let auth = JwtAuth::new(&JwtConfig::new(SECRET).unwrap());
        let service = EventService::new(InMemoryEventRepository::new());
        let router = Router::new().nest("/api/events", router(service, auth.clone()));
        Self { router, auth }
    }

    fn token(&self, role: &str) -> String {
        self.auth
            .issue_token(&format!("{}-1", role), &[role], Duration::minutes(5))
            .unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        role: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(role) = role {
            builder = builder.header("authorization", format!("Bearer {}", self.token(role)));
        }
        let body = body.map(Body::from).unwrap_or_else(Body::empty);
        self.send(builder.body(body).unwrap()).await
    }

    async fn create(&self, payload: Value) -> Value {
        let (status, body) = self
            .call("POST", "/api/events", Some("organizer"), Some(payload.to_string()))
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", body);
        body
    }
}

fn event_on(day: u32) -> Value {
    json!({
        "Name": format!("day {}", day),
        "BeginDate": format!("2024-03-{:02}T10:00:00", day),
        "EndDate": format!("2024-03-{:02}T18:00:00", day),
        "Description": ""
    })
}

// ============================================================================
// Scenario
// ============================================================================

#[tokio::test]
async fn test_create_get_delete_scenario() {
    let app = TestApp::new();

    let created = app
        .create(json!({
            "Name": "Sale",
            "BeginDate": "2024-01-01",
            "EndDate": "2024-01-02",
            "Description": "x"
        }))
        .await;

    let id = created["Id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(created["Name"], "Sale");
    assert_eq!(created["BeginDate"], "2024-01-01T00:00:00");
    assert_eq!(created["EndDate"], "2024-01-02T00:00:00");
    assert_eq!(created["EventPartners"], json!([]));

    let (status, fetched) = app.get(&format!("/api/events/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, body) = app
        .call("DELETE", &format!("/api/events/{}", id), Some("admin"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, body) = app.get(&format!("/api/events/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_list_empty_store() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/events").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Data": [], "TotalCount": 0 }));
}

#[tokio::test]
async fn test_list_sorted_by_begin_date_descending() {
    let app = TestApp::new();
    for day in [4, 1, 9, 6] {
        app.create(event_on(day)).await;
    }

    let (status, body) = app.get("/api/events").await;
    assert_eq!(status, StatusCode::OK);

    let begins: Vec<&str> = body["Data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["BeginDate"].as_str().unwrap())
        .collect();
    assert_eq!(
        begins,
        vec![
            "2024-03-09T10:00:00",
            "2024-03-06T10:00:00",
            "2024-03-04T10:00:00",
            "2024-03-01T10:00:00"
        ]
    );
}

#[tokio::test]
async fn test_total_count_ignores_paging() {
    let app = TestApp::new();
    for day in 1..=25 {
        app.create(event_on(day)).await;
    }

    let (_, first) = app.get("/api/events").await;
    assert_eq!(first["Data"].as_array().unwrap().len(), 20);
    assert_eq!(first["TotalCount"], 25);

    let (_, second) = app.get("/api/events?page=1").await;
    assert_eq!(second["Data"].as_array().unwrap().len(), 5);
    assert_eq!(second["TotalCount"], 25);
    assert_eq!(second["Data"][0]["Name"], "day 5");

    let (_, sized) = app.get("/api/events?page=2&pageSize=10").await;
    assert_eq!(sized["Data"].as_array().unwrap().len(), 5);
    assert_eq!(sized["TotalCount"], 25);

    let (_, clamped) = app.get("/api/events?pageSize=500").await;
    assert_eq!(clamped["Data"].as_array().unwrap().len(), 25);

    let (_, beyond) = app.get("/api/events?page=7").await;
    assert_eq!(beyond["Data"], json!([]));
    assert_eq!(beyond["TotalCount"], 25);

    let (status, far_away) = app.get("/api/events?page=500000000000000000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(far_away["Data"], json!([]));
    assert_eq!(far_away["TotalCount"], 25);
}

#[tokio::test]
async fn test_date_bounds_are_inclusive_on_begin_date() {
    let app = TestApp::new();
    for day in 1..=10 {
        app.create(event_on(day)).await;
    }

    let (status, body) = app
        .get("/api/events?beginDate=2024-03-03T10:00:00&endDate=2024-03-06T10:00:00")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["TotalCount"], 4);

    let names: Vec<&str> = body["Data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["Name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["day 6", "day 5", "day 4", "day 3"]);

    let (_, lower_only) = app.get("/api/events?beginDate=2024-03-08").await;
    assert_eq!(lower_only["TotalCount"], 3);

    let (_, upper_only) = app.get("/api/events?endDate=2024-03-02").await;
    assert_eq!(upper_only["TotalCount"], 1);
}

#[tokio::test]
async fn test_inverted_range_is_empty() {
    let app = TestApp::new();
    app.create(event_on(5)).await;

    let (status, body) = app
        .get("/api/events?beginDate=2024-03-10&endDate=2024-03-01")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Data": [], "TotalCount": 0 }));
}

#[tokio::test]
async fn test_query_bound_with_unescaped_offset() {
    let app = TestApp::new();
    app.create(event_on(4)).await;
    app.create(event_on(5)).await;

    // `+02:00` arrives as ` 02:00` once the query string is decoded
    let (status, body) = app
        .get("/api/events?beginDate=2024-03-05T12:00:00+02:00")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["TotalCount"], 1);
    assert_eq!(body["Data"][0]["Name"], "day 5");

    let (_, escaped) = app
        .get("/api/events?beginDate=2024-03-05T12:00:00%2B02:00")
        .await;
    assert_eq!(escaped["TotalCount"], 1);
}

#[tokio::test]
async fn test_malformed_query_is_400() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/events?beginDate=someday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, _) = app.get("/api/events?page=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_date_bounds_are_ignored() {
    let app = TestApp::new();
    app.create(event_on(2)).await;

    let (status, body) = app.get("/api/events?beginDate=&endDate=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["TotalCount"], 1);
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_ignores_client_id() {
    let app = TestApp::new();
    let mut payload = event_on(1);
    payload["Id"] = json!(777);

    let created = app.create(payload).await;

    assert_ne!(created["Id"], 777);
    assert_eq!(created["Id"], 1);
}

#[tokio::test]
async fn test_create_links_partners() {
    let app = TestApp::new();
    let mut payload = event_on(1);
    payload["EventPartners"] = json!([{ "PartnerId": 11 }, { "Id": 50, "PartnerId": 12 }]);

    let created = app.create(payload).await;
    let id = created["Id"].clone();

    let partners = created["EventPartners"].as_array().unwrap();
    assert_eq!(partners.len(), 2);
    assert_eq!(partners[0]["PartnerId"], 11);
    assert_eq!(partners[1]["PartnerId"], 12);
    assert_ne!(partners[1]["Id"], 50);
    assert!(partners.iter().all(|p| p["EventId"] == id));

    let (_, listed) = app.get("/api/events").await;
    assert_eq!(listed["Data"][0]["EventPartners"], created["EventPartners"]);
}

#[tokio::test]
async fn test_create_requires_body() {
    let app = TestApp::new();

    let (status, body) = app.call("POST", "/api/events", Some("admin"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Request body is required");

    let (status, _) = app
        .call("POST", "/api/events", Some("admin"), Some("null".into()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call("POST", "/api/events", Some("admin"), Some("{not json".into()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/events",
            Some("admin"),
            Some(json!({ "Name": "no dates" }).to_string()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_requires_writer_role() {
    let app = TestApp::new();
    let payload = Some(event_on(1).to_string());

    let (status, _) = app.call("POST", "/api/events", None, payload.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .call("POST", "/api/events", Some("viewer"), payload.clone())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = app.call("POST", "/api/events", Some("admin"), payload).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = app.get("/api/events").await;
    assert_eq!(listed["TotalCount"], 1);
}

#[tokio::test]
async fn test_auth_checked_before_body() {
    let app = TestApp::new();

    let (status, _) = app.call("POST", "/api/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Retrieve
// ============================================================================

#[tokio::test]
async fn test_get_missing_is_404() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/events/12345").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn test_get_non_integer_id_is_400() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/events/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ID");
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_changes_only_mutable_fields() {
    let app = TestApp::new();
    let mut payload = event_on(1);
    payload["EventPartners"] = json!([{ "PartnerId": 3 }]);
    let created = app.create(payload).await;
    let id = created["Id"].as_i64().unwrap();

    let update = json!({
        "Id": 999,
        "Name": "renamed",
        "BeginDate": "2024-05-01T08:00:00",
        "EndDate": "2024-05-02T08:00:00",
        "Description": "new text",
        "EventPartners": []
    });
    let (status, updated) = app
        .call(
            "PUT",
            &format!("/api/events/{}", id),
            Some("organizer"),
            Some(update.to_string()),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["Id"], id);
    assert_eq!(updated["Name"], "renamed");
    assert_eq!(updated["BeginDate"], "2024-05-01T08:00:00");
    assert_eq!(updated["EndDate"], "2024-05-02T08:00:00");
    assert_eq!(updated["Description"], "new text");
    assert_eq!(updated["EventPartners"], created["EventPartners"]);

    let (_, fetched) = app.get(&format!("/api/events/{}", id)).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_update_missing_is_404() {
    let app = TestApp::new();

    let (status, _) = app
        .call(
            "PUT",
            "/api/events/41",
            Some("admin"),
            Some(event_on(1).to_string()),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_role_checks_precede_lookup() {
    let app = TestApp::new();
    let payload = Some(event_on(1).to_string());

    let (status, _) = app.call("PUT", "/api/events/41", None, payload.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call("PUT", "/api/events/41", Some("viewer"), payload)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_requires_body() {
    let app = TestApp::new();
    let created = app.create(event_on(1)).await;

    let (status, _) = app
        .call(
            "PUT",
            &format!("/api/events/{}", created["Id"]),
            Some("organizer"),
            Some("null".into()),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_requires_admin() {
    let app = TestApp::new();
    let created = app.create(event_on(1)).await;
    let uri = format!("/api/events/{}", created["Id"]);

    let (status, _) = app.call("DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.call("DELETE", &uri, Some("organizer"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_missing_is_404() {
    let app = TestApp::new();

    let (status, _) = app.call("DELETE", "/api/events/5", Some("admin"), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_event_leaves_listing() {
    let app = TestApp::new();
    let keep = app.create(event_on(1)).await;
    let gone = app.create(event_on(2)).await;

    let (status, _) = app
        .call("DELETE", &format!("/api/events/{}", gone["Id"]), Some("admin"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = app.get("/api/events").await;
    assert_eq!(listed["TotalCount"], 1);
    assert_eq!(listed["Data"][0]["Id"], keep["Id"]);
}
