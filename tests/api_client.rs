// ABOUTME: Integration tests for the API client against a local stub HTTP server

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use cardiocheck::config::AppConfig;
use cardiocheck::session::SessionContext;

use cardiocheck::api::{ApiError, CardioApiClient, Coordinates, EditUserDetailsRequest, RegisterRequest};
use cardiocheck::app::{state::AsyncAction, AppState};
use cardiocheck::components::assessment::{
    FieldName, FieldValue, PredictionService, RiskBanner, StepFormController, SubmissionError,
};

/// A request as seen by the stub
#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    authorization: Option<String>,
    body: String,
}

/// Serves canned `(status, body)` responses by path and records every request
struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    async fn start(routes: &[(&str, u16, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<HashMap<String, (u16, String)>> = Arc::new(
            routes
                .iter()
                .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let Some(request) = read_request(&mut stream).await else {
                        return;
                    };
                    let (status, body) = routes
                        .get(&request.path)
                        .cloned()
                        .unwrap_or((404, r#"{"message": "Not found"}"#.to_string()));
                    recorded.lock().unwrap().push(request);

                    let response = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self { addr, requests }
    }

    fn client(&self) -> CardioApiClient {
        let base = Url::parse(&format!("http://{}/", self.addr)).unwrap();
        CardioApiClient::with_base_url(base, Duration::from_secs(5)).unwrap()
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.trim_start_matches('/').to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                "authorization" => authorization = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(Recorded {
        method,
        path,
        authorization,
        body,
    })
}

#[tokio::test]
async fn test_login_returns_token() {
    let server = StubServer::start(&[(
        "users/user_login/",
        200,
        r#"{"status": "Success", "message": "Login successful", "token": "abc123"}"#,
    )])
    .await;

    let token = server.client().login(" ada@example.com ", "pw").await.unwrap();

    assert_eq!(token, "abc123");
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["password"], "pw");
}

#[tokio::test]
async fn test_login_failure_reports_server_message() {
    let server = StubServer::start(&[(
        "users/user_login/",
        400,
        r#"{"status": "Error", "message": "Invalid credentials"}"#,
    )])
    .await;

    let err = server.client().login("ada@example.com", "wrong").await.unwrap_err();

    match err {
        ApiError::Server { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_register_omits_missing_phone() {
    let server = StubServer::start(&[(
        "users/user_register/",
        201,
        r#"{"status": "success", "message": "User created", "token": "fresh"}"#,
    )])
    .await;

    let request = RegisterRequest {
        email: "ada@example.com".to_string(),
        password: "pw".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        phone_number: None,
    };
    let token = server.client().register(&request).await.unwrap();

    assert_eq!(token, "fresh");
    let body: serde_json::Value = serde_json::from_str(&server.requests()[0].body).unwrap();
    assert!(body.get("phone_number").is_none());
    assert_eq!(body["first_name"], "Ada");
}

#[tokio::test]
async fn test_prediction_sends_bearer_and_every_field() {
    let server = StubServer::start(&[(
        "cardio/predict/",
        200,
        r#"{"success": true, "message": "ok", "prediction": "You are not likely to have heart disease"}"#,
    )])
    .await;
    let client = server.client().with_token(Some("tok".to_string()));

    let mut controller = StepFormController::new();
    controller.set_field_value(FieldName::Age, FieldValue::text("72")).unwrap();
    for _ in 1..controller.step_count() {
        controller.next_step().unwrap();
    }

    let outcome = controller.submit(&client).await.unwrap();

    assert_eq!(outcome.banner(), RiskBanner::LowRisk);
    let request = &server.requests()[0];
    assert_eq!(request.authorization.as_deref(), Some("Bearer tok"));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body.as_object().unwrap().len(), FieldName::all().len());
    assert_eq!(body["age"], serde_json::json!(72));
    assert_eq!(body["thal"], serde_json::json!(0));
}

#[tokio::test]
async fn test_prediction_rejection_keeps_wizard_intact() {
    let server = StubServer::start(&[(
        "cardio/predict/",
        400,
        r#"{"success": false, "message": "All fields are required."}"#,
    )])
    .await;
    let client = server.client().with_token(Some("tok".to_string()));

    let mut controller = StepFormController::new();
    for _ in 1..controller.step_count() {
        controller.next_step().unwrap();
    }
    controller.set_field_value(FieldName::Ca, FieldValue::text("2")).unwrap();

    let err = PredictionService::predict(&client, &controller.normalize().unwrap())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SubmissionError::Rejected {
            status: Some(400),
            message: "All fields are required.".to_string()
        }
    );
    assert_eq!(controller.value(FieldName::Ca), &FieldValue::text("2"));
}

#[tokio::test]
async fn test_nearby_hospitals_parses_places() {
    let server = StubServer::start(&[(
        "cardio/find_nearby_hospitals/",
        200,
        r#"{
            "success": true,
            "message": "Hospitals found",
            "hospitals": [
                {
                    "place_id": "p1",
                    "name": "City Heart Institute",
                    "vicinity": "12 Main Street",
                    "rating": 4.5,
                    "user_ratings_total": 210,
                    "opening_hours": {"open_now": true},
                    "geometry": {"location": {"lat": 12.97, "lng": 77.59}}
                }
            ]
        }"#,
    )])
    .await;
    let client = server.client().with_token(Some("tok".to_string()));

    let hospitals = client
        .nearby_hospitals(Coordinates {
            latitude: 12.97,
            longitude: 77.59,
        })
        .await
        .unwrap();

    assert_eq!(hospitals.len(), 1);
    assert_eq!(hospitals[0].name, "City Heart Institute");
    assert_eq!(hospitals[0].is_open_now(), Some(true));

    let body: serde_json::Value = serde_json::from_str(&server.requests()[0].body).unwrap();
    assert_eq!(body["latitude"], serde_json::json!(12.97));
}

#[tokio::test]
async fn test_unauthorized_response_is_flagged() {
    let server = StubServer::start(&[(
        "users/user_details/",
        401,
        r#"{"success": false, "message": "Invalid token data."}"#,
    )])
    .await;
    let client = server.client().with_token(Some("expired".to_string()));

    let err = client.user_details().await.unwrap_err();

    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_expired_token_on_prediction_logs_out() {
    let server = StubServer::start(&[(
        "cardio/predict/",
        401,
        r#"{"success": false, "message": "Invalid token data."}"#,
    )])
    .await;
    let client = server.client().with_token(Some("expired".to_string()));

    let mut session = SessionContext::new();
    session.establish("expired", None);
    let mut state = AppState::new(AppConfig::default(), session);
    for _ in 1..state.assessment.step_count() {
        state.assessment.next_step().unwrap();
    }
    let submission = state.assessment.begin_submit().unwrap();

    let result = PredictionService::predict(&client, &submission).await;
    assert_eq!(result.as_ref().unwrap_err(), &SubmissionError::NotAuthenticated);

    state.apply_prediction(result);
    assert!(!state.assessment.is_submitting());
    assert!(matches!(state.pending_async_action, Some(AsyncAction::Logout)));
}

#[tokio::test]
async fn test_edit_user_details_sends_only_given_fields() {
    let server = StubServer::start(&[(
        "users/edit_user_details/",
        200,
        r#"{
            "success": true,
            "message": "User details updated successfully",
            "user_details": {
                "email": "ada@example.com",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "username": "ada",
                "phone_number": "555-0100"
            }
        }"#,
    )])
    .await;
    let client = server.client().with_token(Some("tok".to_string()));

    let changes = EditUserDetailsRequest {
        first_name: Some("Ada".to_string()),
        phone_number: Some("555-0100".to_string()),
        ..Default::default()
    };
    let user = client.edit_user_details(&changes).await.unwrap();

    assert_eq!(user.first_name.as_deref(), Some("Ada"));
    assert_eq!(user.phone_number.as_deref(), Some("555-0100"));

    let mut session = SessionContext::new();
    session.establish("tok", None);
    session.set_user(user);
    assert_eq!(session.user().map(|u| u.email.as_str()), Some("ada@example.com"));

    let request = &server.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.authorization.as_deref(), Some("Bearer tok"));
    assert!(request.body.contains("first_name=Ada"));
    assert!(request.body.contains("phone_number=555-0100"));
    assert!(!request.body.contains("last_name"));
}

#[tokio::test]
async fn test_edit_user_details_requires_login() {
    let server = StubServer::start(&[]).await;

    let changes = EditUserDetailsRequest {
        last_name: Some("Byron".to_string()),
        ..Default::default()
    };
    let err = server.client().edit_user_details(&changes).await.unwrap_err();

    assert!(matches!(err, ApiError::NotAuthenticated));
    assert!(server.requests().is_empty());
}
