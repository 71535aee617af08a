use crate::core::ingest::Ingestor;
use crate::domain::model::{FieldError, RawRecord};
use crate::domain::ports::ContactStore;
use crate::utils::error::{ErrorCategory, IntakeError, Result};
use axum::extract::{FromRequest, Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

const FORM_PAGE: &str = include_str!("../../assets/form.html");
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self'; style-src 'self'";

/// Shared state for the form handlers.
#[derive(Clone)]
pub struct AppState {
    ingestor: Ingestor,
    store: Arc<dyn ContactStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self {
            ingestor: Ingestor::new(store.clone()),
            store,
        }
    }
}

/// How the client spoke to us, and so how we answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Html,
    Json,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    messages: Vec<String>,
    reply: Reply,
}

impl ApiError {
    fn rejected(reply: Reply, errors: &[FieldError]) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "ValidationFailed",
            messages: errors.iter().map(|e| e.message.clone()).collect(),
            reply,
        }
    }

    fn from_intake(reply: Reply, err: &IntakeError) -> Self {
        let (status, error, message) = match err.category() {
            ErrorCategory::Validation => (
                StatusCode::BAD_REQUEST,
                "BadRequest",
                err.user_friendly_message(),
            ),
            ErrorCategory::Storage => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "StorageError",
                format!("DB insert error: {}", err),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                err.to_string(),
            ),
        };
        Self {
            status,
            error,
            messages: vec![message],
            reply,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.reply {
            Reply::Html => {
                let body = self
                    .messages
                    .iter()
                    .map(|m| escape_html(m))
                    .collect::<Vec<_>>()
                    .join("<br>");
                (self.status, Html(body)).into_response()
            }
            Reply::Json => {
                let body = json!({
                    "error": self.error,
                    "messages": self.messages,
                    "code": self.status.as_u16(),
                });
                (self.status, Json(body)).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_page))
        .route("/submit", post(submit))
        .route("/health", get(health))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn form_page() -> Html<&'static str> {
    Html(FORM_PAGE)
}

async fn submit(State(state): State<AppState>, request: Request) -> Response {
    let (raw, reply) = match read_submission(request).await {
        Ok(parsed) => parsed,
        Err(e) => return e.into_response(),
    };

    match state.ingestor.ingest_one(raw).await {
        Ok(outcome) if outcome.accepted => match reply {
            Reply::Html => Html("Saved to database successfully.").into_response(),
            Reply::Json => Json(outcome).into_response(),
        },
        Ok(outcome) => ApiError::rejected(reply, &outcome.errors).into_response(),
        Err(e) => {
            tracing::error!("❌ Submission could not be stored: {}", e);
            ApiError::from_intake(reply, &e).into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> Response {
    match state.store.check_connection().await {
        Ok(true) => Json(json!({ "status": "ok", "database": "ok" })).into_response(),
        Ok(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "unexpected reply" })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Accepts urlencoded forms and JSON objects; absent fields stay absent.
async fn read_submission(request: Request) -> std::result::Result<(RawRecord, Reply), ApiError> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        let Json(body) = Json::<serde_json::Map<String, serde_json::Value>>::from_request(request, &())
            .await
            .map_err(|e| ApiError::from_intake(Reply::Json, &IntakeError::validation(e.body_text())))?;
        Ok((body.into_iter().collect(), Reply::Json))
    } else {
        let Form(body) = Form::<HashMap<String, String>>::from_request(request, &())
            .await
            .map_err(|e| ApiError::from_intake(Reply::Html, &IntakeError::validation(e.body_text())))?;
        Ok((body.into_iter().collect(), Reply::Html))
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::model::CleanRecord;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    const VALID_FORM: &str =
        "first_name=John&second_name=Doe&email=j%40x.com&phone=0871234567&eir_code=1A2B3C";

    struct DownStore;

    #[async_trait]
    impl ContactStore for DownStore {
        async fn insert_one(&self, _record: &CleanRecord) -> Result<()> {
            Err(IntakeError::storage("connection refused"))
        }

        async fn insert_many(&self, _records: &[CleanRecord]) -> Result<u64> {
            Err(IntakeError::storage("connection refused"))
        }

        async fn check_connection(&self) -> Result<bool> {
            Err(IntakeError::storage("connection refused"))
        }
    }

    fn form_request(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/submit")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_form_page_has_security_headers() {
        let app = router(AppState::new(Arc::new(MemoryStore::new())));
        let response = app
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_SECURITY_POLICY],
            CONTENT_SECURITY_POLICY
        );
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert!(body_text(response).await.contains("action=\"/submit\""));
    }

    #[tokio::test]
    async fn test_valid_form_is_saved() {
        let store = Arc::new(MemoryStore::new());
        let app = router(AppState::new(store.clone()));

        let response = app.oneshot(form_request(VALID_FORM)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Saved to database successfully.");
        let saved = store.records().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].email(), "j@x.com");
    }

    #[tokio::test]
    async fn test_invalid_form_returns_every_message() {
        let store = Arc::new(MemoryStore::new());
        let app = router(AppState::new(store.clone()));

        let response = app
            .oneshot(form_request("first_name=Bad+Name%21&second_name=Doe&email=nope"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        let lines: Vec<&str> = body.split("<br>").collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("first_name"));
        assert!(lines[1].starts_with("email"));
        assert!(lines[2].starts_with("phone"));
        assert!(lines[3].starts_with("eir_code"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_phone_is_bad_request_not_server_error() {
        let app = router(AppState::new(Arc::new(MemoryStore::new())));

        let response = app
            .oneshot(form_request(
                "first_name=John&second_name=Doe&email=j%40x.com&eir_code=1A2B3C",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.starts_with("phone"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_server_error() {
        let app = router(AppState::new(Arc::new(DownStore)));

        let response = app.oneshot(form_request(VALID_FORM)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.starts_with("DB insert error"));
    }

    #[tokio::test]
    async fn test_json_submission_coerces_numeric_phone() {
        let store = Arc::new(MemoryStore::new());
        let app = router(AppState::new(store.clone()));
        let body = json!({
            "first_name": "Ciara",
            "second_name": "Walsh",
            "email": "ciara@example.ie",
            "phone": 8712345678u64,
            "eir_code": "3C4D5E",
        });

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/submit")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let reply: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(reply["accepted"], true);
        assert_eq!(reply["inserted_count"], 1);
        assert_eq!(store.records().await[0].phone(), "8712345678");
    }

    #[tokio::test]
    async fn test_json_rejection_lists_messages() {
        let app = router(AppState::new(Arc::new(MemoryStore::new())));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/submit")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let reply: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(reply["error"], "ValidationFailed");
        assert_eq!(reply["messages"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_unparseable_json_is_bad_request() {
        let store = Arc::new(MemoryStore::new());
        let app = router(AppState::new(store.clone()));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/submit")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("[1, 2"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let reply: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(reply["error"], "BadRequest");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_health_reports_storage_state() {
        let healthy = router(AppState::new(Arc::new(MemoryStore::new())))
            .oneshot(HttpRequest::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(healthy.status(), StatusCode::OK);

        let down = router(AppState::new(Arc::new(DownStore)))
            .oneshot(HttpRequest::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"x\" & 'y'</b>"),
            "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;"
        );
    }
}
