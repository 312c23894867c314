use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

use trekka_api::middleware::UserClaims;
use trekka_api::{app, AppState, AuthConfig, Repositories, Settings};
use trekka_core::repository::PendingTripRepository;
use trekka_core::{Notifier, NotifyError, PendingStatus, Profile, TripCandidate, TripType};
use trekka_geo::DestinationClassifier;
use trekka_ingest::{ExtractionError, TripExtractor};
use trekka_shared::{Masked, Notification};
use trekka_store::MemoryStore;

const SECRET: &str = "test-secret";
const IMPORT_ID: &str = "abc123";

enum Script {
    Candidate(TripCandidate),
    Fail,
}

struct ScriptedExtractor(Script);

#[async_trait]
impl TripExtractor for ScriptedExtractor {
    async fn extract(&self, _subject: &str, _body: &str) -> Result<TripCandidate, ExtractionError> {
        match &self.0 {
            Script::Candidate(candidate) => Ok(candidate.clone()),
            Script::Fail => Err(ExtractionError::Malformed("not json".to_string())),
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

impl RecordingNotifier {
    fn kinds(&self) -> Vec<&'static str> {
        self.sent.lock().unwrap().iter().map(Notification::kind).collect()
    }
}

struct Harness {
    app: Router,
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    user_id: Uuid,
}

fn tokyo() -> TripCandidate {
    TripCandidate {
        destination: "Tokyo, Japan".to_string(),
        start_date: NaiveDate::from_ymd_opt(2025, 4, 1),
        end_date: NaiveDate::from_ymd_opt(2025, 4, 10),
        description: Some("Flight to Tokyo".to_string()),
        trip_type: Some(TripType::Flight),
        confirmation_number: Some("ABC123".to_string()),
        confidence_score: 0.92,
    }
}

async fn harness(script: Script) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let user_id = Uuid::new_v4();
    store
        .seed_profile(Profile {
            id: user_id,
            username: "jane".to_string(),
            display_name: Some("Jane Doe".to_string()),
            email_import_id: IMPORT_ID.to_string(),
        })
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::new(
        Repositories::in_memory(store.clone()),
        Arc::new(ScriptedExtractor(script)),
        notifier.clone(),
        Arc::new(DestinationClassifier::embedded().unwrap()),
        Settings {
            auth: AuthConfig { secret: Masked(SECRET.to_string()) },
            import_domain: "import.trekka.app".to_string(),
            stored_body_limit: 1000,
        },
    );

    Harness { app: app(state), store, notifier, user_id }
}

fn token(user_id: Uuid) -> String {
    let claims = UserClaims {
        sub: user_id,
        email: Some("jane@example.com".to_string()),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn form_request(fields: &[(&str, &str)]) -> Request<Body> {
    let body = serde_urlencoded::to_string(fields).unwrap();
    Request::builder()
        .method("POST")
        .uri("/api/parse-email")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn multipart_request(fields: &[(&str, &str)]) -> Request<Body> {
    let boundary = "TREKKABOUNDARY";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/api/parse-email")
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

fn email_fields(to: &str) -> Vec<(&str, &str)> {
    vec![
        ("to", to),
        ("from", "Airline <noreply@airline.example>"),
        ("subject", "Your flight to Tokyo"),
        ("text", "Booking ABC123, departing April 1st, returning April 10th."),
        ("envelope", "{\"to\":[\"abc123@import.trekka.app\"]}"),
    ]
}

fn authed(method: &str, uri: &str, user_id: Uuid, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token(user_id)));
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

async fn ingest_one(h: &Harness) -> Uuid {
    let (status, body) = send(&h.app, form_request(&email_fields("abc123@import.trekka.app"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["pending_trip_id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_health() {
    let h = harness(Script::Fail).await;
    let (status, body) = send(&h.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

#[tokio::test]
async fn test_form_email_becomes_pending_trip() {
    let h = harness(Script::Candidate(tokyo())).await;

    let (status, body) = send(&h.app, form_request(&email_fields("ABC123@import.trekka.app"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["parsed_data"]["destination"], "Tokyo, Japan");
    assert_eq!(body["parsed_data"]["start_date"], "2025-04-01");
    assert_eq!(body["parsed_data"]["trip_type"], "flight");

    let id: Uuid = body["pending_trip_id"].as_str().unwrap().parse().unwrap();
    let stored = h.store.get_pending_trip(h.user_id, id).await.unwrap().unwrap();
    assert_eq!(stored.status, PendingStatus::Pending);
    assert_eq!(stored.email_from, "Airline <noreply@airline.example>");
    assert_eq!(h.notifier.kinds(), vec!["pending_trip_created"]);

    let (status, queue) = send(&h.app, authed("GET", "/v1/pending-trips", h.user_id, None)).await;
    assert_eq!(status, StatusCode::OK);
    let queue = queue.as_array().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0]["id"], id.to_string());
    assert_eq!(queue[0]["status"], "pending");
    assert_eq!(queue[0]["low_confidence"], false);
    assert_eq!(queue[0]["region"], "Asia");
    assert_eq!(queue[0]["flag"], "🇯🇵");
}

#[tokio::test]
async fn test_multipart_email_accepted() {
    let h = harness(Script::Candidate(tokyo())).await;

    let (status, body) = send(&h.app, multipart_request(&email_fields("abc123@import.trekka.app"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(h.store.list_pending_trips(h.user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_recipient_is_404() {
    let h = harness(Script::Candidate(tokyo())).await;

    let (status, body) = send(&h.app, form_request(&email_fields("nobody@import.trekka.app"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
    assert!(h.store.list_pending_trips(h.user_id).await.unwrap().is_empty());
    assert!(h.notifier.kinds().is_empty());
}

#[tokio::test]
async fn test_incomplete_email_is_400() {
    let h = harness(Script::Candidate(tokyo())).await;

    let (status, body) = send(
        &h.app,
        form_request(&[("to", "abc123@import.trekka.app"), ("subject", "Hello")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email data");

    let (status, _) = send(&h.app, form_request(&[("subject", "Hello"), ("text", "body")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_extraction_failure_is_500_and_stores_nothing() {
    let h = harness(Script::Fail).await;

    let (status, body) = send(&h.app, form_request(&email_fields("abc123@import.trekka.app"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to parse email");
    assert!(h.store.list_pending_trips(h.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_confirm_with_edits() {
    let h = harness(Script::Candidate(tokyo())).await;
    let id = ingest_one(&h).await;

    let uri = format!("/v1/pending-trips/{}/confirm", id);
    let (status, body) = send(
        &h.app,
        authed("POST", &uri, h.user_id, Some(json!({ "end_date": "2025-04-12", "start_date": "" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["trip"]["start_date"], "2025-04-01");
    assert_eq!(body["trip"]["end_date"], "2025-04-12");

    let trip_id = body["trip_id"].as_str().unwrap();
    let (status, trip) = send(&h.app, authed("GET", &format!("/v1/trips/{}", trip_id), h.user_id, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trip["destination"], "Tokyo, Japan");

    let stored = h.store.get_pending_trip(h.user_id, id).await.unwrap().unwrap();
    assert_eq!(stored.status, PendingStatus::Confirmed);
    assert!(stored.reviewed_at.is_some());
    assert_eq!(h.notifier.kinds(), vec!["pending_trip_created", "trip_added"]);

    let (status, _) = send(&h.app, authed("POST", &uri, h.user_id, Some(json!({})))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(h.store.trips_by(h.user_id).await.len(), 1);
}

#[tokio::test]
async fn test_confirm_rejects_bad_dates() {
    let h = harness(Script::Candidate(tokyo())).await;
    let id = ingest_one(&h).await;
    let uri = format!("/v1/pending-trips/{}/confirm", id);

    let (status, _) = send(&h.app, authed("POST", &uri, h.user_id, Some(json!({ "end_date": "April 12" })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&h.app, authed("POST", &uri, h.user_id, Some(json!({ "end_date": "2025-03-01" })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stored = h.store.get_pending_trip(h.user_id, id).await.unwrap().unwrap();
    assert_eq!(stored.status, PendingStatus::Pending);
    assert!(h.store.trips_by(h.user_id).await.is_empty());
}

#[tokio::test]
async fn test_reject_then_confirm_conflicts() {
    let h = harness(Script::Candidate(tokyo())).await;
    let id = ingest_one(&h).await;

    let (status, body) = send(
        &h.app,
        authed("POST", &format!("/v1/pending-trips/{}/reject", id), h.user_id, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(
        &h.app,
        authed("POST", &format!("/v1/pending-trips/{}/confirm", id), h.user_id, Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, queue) = send(&h.app, authed("GET", "/v1/pending-trips", h.user_id, None)).await;
    assert!(queue.as_array().unwrap().is_empty());
    assert!(h.store.trips_by(h.user_id).await.is_empty());
}

#[tokio::test]
async fn test_confirm_without_body_keeps_extracted_values() {
    let h = harness(Script::Candidate(tokyo())).await;
    let id = ingest_one(&h).await;

    let uri = format!("/v1/pending-trips/{}/confirm", id);
    let (status, body) = send(&h.app, authed("POST", &uri, h.user_id, None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["trip"]["destination"], "Tokyo, Japan");
    assert_eq!(body["trip"]["start_date"], "2025-04-01");
    assert_eq!(body["trip"]["end_date"], "2025-04-10");
    assert_eq!(body["trip"]["is_private"], false);
}

#[tokio::test]
async fn test_confirm_then_reject_conflicts() {
    let h = harness(Script::Candidate(tokyo())).await;
    let id = ingest_one(&h).await;

    let (status, _) = send(
        &h.app,
        authed("POST", &format!("/v1/pending-trips/{}/confirm", id), h.user_id, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reviewed_at = h.store.get_pending_trip(h.user_id, id).await.unwrap().unwrap().reviewed_at;

    let (status, body) = send(
        &h.app,
        authed("POST", &format!("/v1/pending-trips/{}/reject", id), h.user_id, None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let stored = h.store.get_pending_trip(h.user_id, id).await.unwrap().unwrap();
    assert_eq!(stored.status, PendingStatus::Confirmed);
    assert_eq!(stored.reviewed_at, reviewed_at);
    assert_eq!(h.store.trips_by(h.user_id).await.len(), 1);
}

#[tokio::test]
async fn test_review_requires_owner_token() {
    let h = harness(Script::Candidate(tokyo())).await;
    let id = ingest_one(&h).await;

    let (status, _) = send(&h.app, get("/v1/pending-trips")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = Request::builder()
        .uri("/v1/pending-trips")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&h.app, forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let stranger = Uuid::new_v4();
    let (status, _) = send(&h.app, authed("GET", &format!("/v1/pending-trips/{}", id), stranger, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &h.app,
        authed("POST", &format!("/v1/pending-trips/{}/reject", id), stranger, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, record) = send(&h.app, authed("GET", &format!("/v1/pending-trips/{}", id), h.user_id, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "pending");
}

#[tokio::test]
async fn test_import_address() {
    let h = harness(Script::Fail).await;
    let (status, body) = send(&h.app, authed("GET", "/v1/pending-trips/import-address", h.user_id, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], "abc123@import.trekka.app");
}

#[tokio::test]
async fn test_direct_trip_creation() {
    let h = harness(Script::Fail).await;

    let (status, trip) = send(
        &h.app,
        authed(
            "POST",
            "/v1/trips",
            h.user_id,
            Some(json!({ "destination": "Moab, UT", "start_date": "2025-10-01", "end_date": "2025-10-04" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(trip["is_private"], false);
    assert_eq!(h.notifier.kinds(), vec!["trip_added"]);

    let (status, body) = send(
        &h.app,
        authed(
            "POST",
            "/v1/trips",
            h.user_id,
            Some(json!({ "destination": "Moab, UT", "start_date": "2025-10-04", "end_date": "2025-10-01" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "End date must be after or equal to start date");
}

#[tokio::test]
async fn test_classify_endpoints() {
    let h = harness(Script::Fail).await;

    let (status, body) = send(&h.app, get("/v1/destinations/classify?destination=Tokyo%2C%20Japan")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classification"]["country"], "Japan");
    assert_eq!(body["classification"]["country_code"], "JP");
    assert_eq!(body["region"], "Asia");

    let (status, body) = send(&h.app, get("/v1/destinations/classify?destination=Atlantis")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classification"], Value::Null);
    assert_eq!(body["region"], "Other");
    assert_eq!(body["flag"], "🌍");

    let (_, body) = send(&h.app, get("/v1/destinations/regions")).await;
    assert!(body["regions"].as_array().unwrap().contains(&json!("Europe")));

    let (status, body) = send(&h.app, get("/v1/countries/pt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Portugal");

    let (status, _) = send(&h.app, get("/v1/countries/zz")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&h.app, get("/v1/countries/search?q=jap")).await;
    assert_eq!(body[0]["code"], "JP");

    let (status, body) = send(&h.app, get("/v1/destinations/classify")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classification"], Value::Null);
    assert_eq!(body["region"], "Other");
}
