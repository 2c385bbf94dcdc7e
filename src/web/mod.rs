//! Web front end: the converter page and a JSON endpoint.

mod page;
mod presenter;

pub use page::{escape_html, render_markdown, render_page, FormValues};
pub use presenter::{
    export_file_name, handle_submission, DownloadArtifact, GenerateForm, Outcome, MARKDOWN_MIME,
};

use crate::error::ErrorKind;
use crate::pipeline::BlogGenerator;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
pub struct AppState {
    pub generator: Arc<dyn BlogGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn BlogGenerator>) -> Self {
        Self { generator }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate_page))
        .route("/api/generate", post(generate_api))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub events: Vec<String>,
}

impl GenerateResponse {
    fn failure(kind: ErrorKind, message: String) -> Self {
        Self {
            success: false,
            content: None,
            file_name: None,
            error: Some(message),
            error_kind: Some(kind),
            events: Vec::new(),
        }
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn index() -> Html<String> {
    Html(render_page(&FormValues::default(), None))
}

async fn generate_page(
    State(state): State<Arc<AppState>>,
    Form(form): Form<GenerateForm>,
) -> Html<String> {
    let values = FormValues::from(&form);
    let outcome = handle_submission(&form.into_request(), state.generator.as_ref()).await;
    Html(render_page(&values, Some(&outcome)))
}

async fn generate_api(
    State(state): State<Arc<AppState>>,
    Json(form): Json<GenerateForm>,
) -> impl IntoResponse {
    match handle_submission(&form.into_request(), state.generator.as_ref()).await {
        Outcome::Generated {
            markdown,
            download,
            events,
        } => Json(GenerateResponse {
            success: true,
            content: Some(markdown),
            file_name: Some(download.file_name),
            error: None,
            error_kind: None,
            events,
        })
        .into_response(),
        Outcome::Invalid { message } => (
            StatusCode::BAD_REQUEST,
            Json(GenerateResponse::failure(ErrorKind::Validation, message)),
        )
            .into_response(),
        Outcome::Failed { kind, message } => (
            StatusCode::BAD_GATEWAY,
            Json(GenerateResponse::failure(kind, message)),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, TubeblogError};
    use crate::orchestrator::PipelineResult;
    use crate::pipeline::ValidatedRequest;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    struct EchoGenerator;

    #[async_trait]
    impl BlogGenerator for EchoGenerator {
        async fn generate(&self, request: &ValidatedRequest) -> Result<PipelineResult> {
            if request.credential.expose() == "bad" {
                return Err(TubeblogError::Authentication("Invalid API Key".to_string()));
            }
            Ok(PipelineResult::from_content(format!(
                "# {}\n\nFrom {}",
                request.topic, request.channel
            )))
        }
    }

    fn app() -> Router {
        router(Arc::new(AppState::new(Arc::new(EchoGenerator))))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("ok"));
    }

    #[tokio::test]
    async fn test_index_renders_form() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("YouTube to Blog Converter"));
        assert!(body.contains(r#"type="password""#));
    }

    #[tokio::test]
    async fn test_form_submission_renders_result() {
        let request = Request::post("/generate")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                "api_key=secret-key&channel_handle=%40rustlang&topic=Rust+async&model=llama3-70b-8192&verbosity=1",
            ))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("<h1>Rust async</h1>"));
        assert!(body.contains(r#"download="Rust_async_blog.md""#));
        assert!(!body.contains("secret-key"));
    }

    #[tokio::test]
    async fn test_form_submission_missing_key() {
        let request = Request::post("/generate")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("channel_handle=%40rustlang&topic=Rust"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        let body = body_string(response).await;
        assert!(body.contains("Please enter your API key!"));
        assert!(!body.contains("Generated Content"));
    }

    #[tokio::test]
    async fn test_api_success() {
        let request = Request::post("/api/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"api_key":"k","channel_handle":"@rustlang","topic":"Rust vs Go"}"#,
            ))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["content"], "# Rust vs Go\n\nFrom @rustlang");
        assert_eq!(json["file_name"], "Rust_vs_Go_blog.md");
    }

    #[tokio::test]
    async fn test_api_validation_error() {
        let request = Request::post("/api/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"api_key":"k","topic":"Rust"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_kind"], "validation");
        assert_eq!(json["error"], "Please fill in both topic and channel handle!");
    }

    #[tokio::test]
    async fn test_api_generation_failure() {
        let request = Request::post("/api/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"api_key":"bad","channel_handle":"@rustlang","topic":"Rust"}"#,
            ))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error_kind"], "authentication");
        assert!(json["error"].as_str().unwrap().contains("Invalid API Key"));
        assert!(json.get("content").is_none());
    }
}
