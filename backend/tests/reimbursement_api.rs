//! End-to-end behaviour of the HTTP API over the in-memory stores.
//!
//! Each test assembles the full application with `build_app`, backed by the
//! memory repositories, a real bcrypt hasher, HS256 tokens driven by a
//! controllable clock, and a filesystem image store in a temporary directory.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test as actix_test, web};
use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use rstest::rstest;
use serde_json::{Value, json};
use tempfile::TempDir;

use reimburse::domain::ports::PasswordHasher;
use reimburse::domain::{
    Role, TRACE_ID_HEADER, TicketService, User, UserId, UserService, Username,
};
use reimburse::inbound::http::health::HealthState;
use reimburse::inbound::http::state::{HttpState, HttpStatePorts};
use reimburse::outbound::memory::{MemoryTicketRepository, MemoryUserRepository};
use reimburse::outbound::security::{BcryptPasswordHasher, JwtTokenService, TokenSettings};
use reimburse::outbound::storage::FsImageStore;
use reimburse::server::{AppDependencies, build_app};

const MANAGER_NAME: &str = "manager1";
const MANAGER_PASSWORD: &str = "manager-password";
const BOUNDARY: &str = "reimburse-test-boundary";

struct MutableClock {
    now: Mutex<DateTime<Utc>>,
}

impl MutableClock {
    fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

struct Harness {
    deps: AppDependencies,
    clock: Arc<MutableClock>,
    images: TempDir,
    manager_id: UserId,
}

async fn harness() -> Harness {
    let hasher = Arc::new(BcryptPasswordHasher::new(4));
    let manager = User::from_parts(
        UserId::random(),
        Username::new(MANAGER_NAME).expect("manager username"),
        hasher.hash(MANAGER_PASSWORD).await.expect("hash manager password"),
        Role::Manager,
        None,
    );
    let manager_id = *manager.id();
    let users = Arc::new(UserService::new(
        Arc::new(MemoryUserRepository::with_users([manager])),
        hasher,
    ));
    let tickets = Arc::new(TicketService::new(Arc::new(MemoryTicketRepository::new())));
    let clock = Arc::new(MutableClock {
        now: Mutex::new(Utc::now()),
    });
    let settings = TokenSettings::new(
        b"integration-secret-at-least-32-bytes".to_vec(),
        Duration::from_secs(150 * 60),
    );
    let tokens = Arc::new(JwtTokenService::new(&settings, clock.clone()));
    let images = tempfile::tempdir().expect("tempdir");
    let store = FsImageStore::open(images.path(), "http://images.test/").expect("image store");

    let state = HttpState::new(HttpStatePorts {
        users,
        tickets: tickets.clone(),
        tickets_query: tickets,
        tokens,
        images: Arc::new(store),
    });
    let health = web::Data::new(HealthState::new());
    health.mark_ready();

    Harness {
        deps: AppDependencies {
            health_state: health,
            http_state: web::Data::new(state),
        },
        clock,
        images,
        manager_id,
    }
}

async fn send<S, R>(app: &S, request: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = actix_test::call_service(app, request).await;
    let status = response.status();
    assert!(
        response.headers().contains_key(TRACE_ID_HEADER),
        "every response carries a trace id"
    );
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

fn post_json(uri: &str, body: &Value) -> actix_test::TestRequest {
    actix_test::TestRequest::post().uri(uri).set_json(body)
}

fn with_token(request: actix_test::TestRequest, token: &str) -> actix_test::TestRequest {
    request.insert_header(("authorization", format!("Bearer {token}")))
}

fn token_of(body: &Value) -> String {
    body["token"].as_str().expect("token string").to_owned()
}

fn receipt_form(ticket_id: &str, file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"ticket_id\"\r\n\r\n{ticket_id}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Register `username` and return a bearer token for it.
macro_rules! employee_token {
    ($app:expr, $username:expr) => {{
        let credentials = json!({"username": $username, "password": "employee-pw"});
        let (status, _) = send(
            $app,
            post_json("/api/v1/register", &credentials).to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) =
            send($app, post_json("/api/v1/login", &credentials).to_request()).await;
        assert_eq!(status, StatusCode::OK);
        token_of(&body)
    }};
}

macro_rules! manager_token {
    ($app:expr) => {{
        let credentials = json!({"username": MANAGER_NAME, "password": MANAGER_PASSWORD});
        let (status, body) =
            send($app, post_json("/api/v1/login", &credentials).to_request()).await;
        assert_eq!(status, StatusCode::OK);
        token_of(&body)
    }};
}

macro_rules! submit_ticket {
    ($app:expr, $token:expr, $amount:expr) => {{
        let request = with_token(
            post_json(
                "/api/v1/tickets",
                &json!({"amount": $amount, "description": "Team lunch"}),
            ),
            $token,
        );
        let (status, body) = send($app, request.to_request()).await;
        assert_eq!(status, StatusCode::CREATED);
        body["ticket"]["ticket_id"]
            .as_str()
            .expect("ticket id")
            .to_owned()
    }};
}

#[actix_web::test]
async fn ticket_lifecycle_from_submission_to_approval() {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let employee = employee_token!(&app, "alice01");
    let manager = manager_token!(&app);

    let ticket_id = submit_ticket!(&app, &employee, 42.5);

    let (status, own) = send(
        &app,
        with_token(actix_test::TestRequest::get().uri("/api/v1/tickets"), &employee).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own.as_array().map(Vec::len), Some(1));
    assert_eq!(own[0]["status"], "Pending");
    assert_eq!(own[0]["amount"], 42.5);

    let (status, pending) = send(
        &app,
        with_token(actix_test::TestRequest::get().uri("/api/v1/tickets/pending"), &manager).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending[0]["ticket_id"], ticket_id.as_str());

    let process_uri = format!("/api/v1/tickets/{ticket_id}?status=Approved");
    let (status, processed) = send(
        &app,
        with_token(actix_test::TestRequest::put().uri(&process_uri), &manager).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(processed["status"], "Approved");
    assert_eq!(processed["resolver"], harness.manager_id.to_string());

    let (status, again) = send(
        &app,
        with_token(
            actix_test::TestRequest::put().uri(&format!("/api/v1/tickets/{ticket_id}?status=Rejected")),
            &manager,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["message"], "Ticket already processed");

    let (_, pending_after) = send(
        &app,
        with_token(actix_test::TestRequest::get().uri("/api/v1/tickets/pending"), &manager).to_request(),
    )
    .await;
    assert_eq!(pending_after, json!([]));

    let (_, own_after) = send(
        &app,
        with_token(actix_test::TestRequest::get().uri("/api/v1/tickets"), &employee).to_request(),
    )
    .await;
    assert_eq!(own_after[0]["status"], "Approved");
}

#[actix_web::test]
async fn employees_only_see_their_own_tickets() {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let alice = employee_token!(&app, "alice01");
    let bob = employee_token!(&app, "bobby01");
    let manager = manager_token!(&app);

    let alice_ticket = submit_ticket!(&app, &alice, 10);
    submit_ticket!(&app, &bob, 20);

    let (_, alice_view) = send(
        &app,
        with_token(actix_test::TestRequest::get().uri("/api/v1/tickets"), &alice).to_request(),
    )
    .await;
    assert_eq!(alice_view.as_array().map(Vec::len), Some(1));
    assert_eq!(alice_view[0]["ticket_id"], alice_ticket.as_str());

    let (_, manager_view) = send(
        &app,
        with_token(actix_test::TestRequest::get().uri("/api/v1/tickets"), &manager).to_request(),
    )
    .await;
    assert_eq!(manager_view.as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn employees_cannot_reach_manager_routes() {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let employee = employee_token!(&app, "alice01");
    let ticket_id = submit_ticket!(&app, &employee, 5);

    let (status, body) = send(
        &app,
        with_token(actix_test::TestRequest::get().uri("/api/v1/tickets/pending"), &employee)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, _) = send(
        &app,
        with_token(
            actix_test::TestRequest::put().uri(&format!("/api/v1/tickets/{ticket_id}?status=Approved")),
            &employee,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[case::unknown_uuid("9b2d6a4e-1c1f-4d5e-8f00-000000000000")]
#[case::not_a_uuid("abc123")]
#[actix_web::test]
async fn processing_an_unknown_ticket_is_not_found(#[case] ticket_id: &str) {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let manager = manager_token!(&app);

    let uri = format!("/api/v1/tickets/{ticket_id}?status=Approved");
    let (status, body) = send(
        &app,
        with_token(actix_test::TestRequest::put().uri(&uri), &manager).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Ticket not found");
}

#[actix_web::test]
async fn duplicate_usernames_are_rejected() {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    employee_token!(&app, "alice01");

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/register",
            &json!({"username": "alice01", "password": "another-pw"}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already exists");
}

#[rstest]
#[case::unknown_user("nobody01", "employee-pw")]
#[case::wrong_password("alice01", "not-the-password")]
#[actix_web::test]
async fn failed_logins_are_indistinguishable(#[case] username: &str, #[case] password: &str) {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    employee_token!(&app, "alice01");

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/login",
            &json!({"username": username, "password": password}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["message"], "Invalid username or password");
}

#[actix_web::test]
async fn expired_tokens_are_rejected() {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let employee = employee_token!(&app, "alice01");

    harness.clock.advance(chrono::Duration::minutes(151));

    let (status, body) = send(
        &app,
        with_token(actix_test::TestRequest::get().uri("/api/v1/tickets"), &employee).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid or expired token");
}

#[rstest]
#[case::missing(None)]
#[case::garbage(Some("Bearer not-a-token"))]
#[case::wrong_scheme(Some("Basic YWxpY2U6cHc="))]
#[actix_web::test]
async fn requests_without_a_valid_token_are_unauthorised(#[case] header: Option<&str>) {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;

    let mut request = actix_test::TestRequest::get().uri("/api/v1/tickets");
    if let Some(value) = header {
        request = request.insert_header(("authorization", value));
    }
    let (status, body) = send(&app, request.to_request()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn tampered_tokens_are_rejected() {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let employee = employee_token!(&app, "alice01");

    let payload_start = employee.find('.').expect("token segments") + 1;
    let mut bytes = employee.into_bytes();
    let target = payload_start + 4;
    bytes[target] = if bytes[target] == b'x' { b'y' } else { b'x' };
    let tampered = String::from_utf8(bytes).expect("ascii token");

    let (status, _) = send(
        &app,
        with_token(actix_test::TestRequest::get().uri("/api/v1/tickets"), &tampered).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn receipts_are_stored_and_attached_to_tickets() {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let employee = employee_token!(&app, "alice01");
    let ticket_id = submit_ticket!(&app, &employee, 12);

    let (content_type, payload) = receipt_form(&ticket_id, "receipt.png", b"\x89PNG-bytes");
    let request = with_token(
        actix_test::TestRequest::post()
            .uri("/api/v1/tickets/images")
            .insert_header(("content-type", content_type))
            .set_payload(payload),
        &employee,
    );
    let (status, body) = send(&app, request.to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "File uploaded successfully");
    let expected_url = format!("http://images.test/tickets/{ticket_id}/receipt.png");
    assert_eq!(body["fileUrl"], expected_url.as_str());

    let stored = harness
        .images
        .path()
        .join("tickets")
        .join(&ticket_id)
        .join("receipt.png");
    assert_eq!(std::fs::read(stored).expect("stored receipt"), b"\x89PNG-bytes");

    let (_, listed) = send(
        &app,
        with_token(actix_test::TestRequest::get().uri("/api/v1/tickets"), &employee).to_request(),
    )
    .await;
    assert_eq!(listed[0]["image"]["fileUrl"], expected_url.as_str());
}

#[actix_web::test]
async fn uploaded_receipts_are_served_under_images() {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let employee = employee_token!(&app, "alice01");
    let ticket_id = submit_ticket!(&app, &employee, 12);

    let (content_type, payload) = receipt_form(&ticket_id, "receipt.png", b"\x89PNG-bytes");
    let request = with_token(
        actix_test::TestRequest::post()
            .uri("/api/v1/tickets/images")
            .insert_header(("content-type", content_type))
            .set_payload(payload),
        &employee,
    );
    let (status, _) = send(&app, request.to_request()).await;
    assert_eq!(status, StatusCode::OK);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/images/tickets/{ticket_id}/receipt.png"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok()),
        Some("image/png")
    );
    let body = actix_test::read_body(response).await;
    assert_eq!(&body[..], b"\x89PNG-bytes");

    let (status, _) = send(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/images/tickets/{ticket_id}/missing.png"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn receipts_for_unknown_tickets_are_not_found() {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let employee = employee_token!(&app, "alice01");

    let (content_type, payload) = receipt_form(
        "9b2d6a4e-1c1f-4d5e-8f00-000000000000",
        "receipt.png",
        b"bytes",
    );
    let request = with_token(
        actix_test::TestRequest::post()
            .uri("/api/v1/tickets/images")
            .insert_header(("content-type", content_type))
            .set_payload(payload),
        &employee,
    );
    let (status, body) = send(&app, request.to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Ticket not found");
}

#[actix_web::test]
async fn readiness_endpoint_reports_ready() {
    let harness = harness().await;
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;

    let response =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
}
