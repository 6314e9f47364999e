//! HTTP surface
//!
//! `POST /ask` hands the question to the [`Assistant`] and returns its answer.
//! `GET /health` reports the dataset and tool set. Anything else falls through
//! to the static browser client when its directory exists.

pub mod error;
pub mod routes;

pub use error::{ApiError, GENERIC_FAILURE};
pub use routes::{AskRequest, AskResponse};

use axum::Router;
use axum::routing::{get, post};
use pantry_core::Assistant;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Header used to correlate a request with its log lines
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<dyn Assistant>,
    pub recipe_count: usize,
    pub tools: Arc<[String]>,
}

impl AppState {
    pub fn new(assistant: Arc<dyn Assistant>, recipe_count: usize, tools: Vec<String>) -> Self {
        Self {
            assistant,
            recipe_count,
            tools: tools.into(),
        }
    }
}

/// Build the application router
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/ask", post(routes::ask))
        .route("/health", get(routes::health))
        .with_state(state);

    match static_dir {
        Some(dir) if dir.is_dir() => {
            info!(dir = %dir.display(), "Serving static client");
            app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
        }
        Some(dir) => warn!(dir = %dir.display(), "Static directory not found, browser client disabled"),
        None => {}
    }

    app.layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` until Ctrl-C or SIGTERM
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecipeBook, RecipeConfig, build_orchestrator};
    use crate::dataset::DatasetFormat;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use pantry_llm::{CompletionResponse, ScriptStep, ScriptedProvider, ToolCall};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;

    const FIXTURE: &str = include_str!("../../fixtures/recipes.csv");

    fn book() -> Arc<RecipeBook> {
        Arc::new(RecipeBook::from_bytes(FIXTURE.as_bytes(), DatasetFormat::Csv).unwrap())
    }

    fn app_with(provider: Arc<ScriptedProvider>, config: &RecipeConfig) -> Router {
        let book = book();
        let orchestrator = build_orchestrator(Arc::clone(&book), provider, config).unwrap();
        let tools = orchestrator
            .tool_definitions()
            .iter()
            .map(|t| t.name.clone())
            .collect();
        let state = AppState::new(Arc::new(orchestrator), book.len(), tools);
        router(state, None)
    }

    fn app(provider: Arc<ScriptedProvider>) -> Router {
        app_with(provider, &RecipeConfig::default())
    }

    fn ask(body: impl Into<Body>) -> Request<Body> {
        Request::post("/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn ask_question(question: &str) -> Request<Body> {
        ask(json!({ "question": question }).to_string())
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ask_runs_tools_and_answers() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .then_tool_call("search_recipes", json!({"ingredients": ["chicken", "rice"]}))
                .then_answer("Try the **Chicken Fried Rice**."),
        );
        let response = app(provider.clone())
            .oneshot(ask_question("What can I make with chicken and rice?"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body = json_body(response).await;
        assert_eq!(body["answer"], "Try the **Chicken Fried Rice**.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].system.as_deref().unwrap().contains("12 recipes"));
        let tool_result = serde_json::to_string(&requests[1].messages[2]).unwrap();
        assert!(tool_result.contains("Chicken Fried Rice"));
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected_without_model_call() {
        let provider = Arc::new(ScriptedProvider::new().then_answer("unused"));
        let response = app(provider.clone()).oneshot(ask_question("   ")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "invalid_question");
        assert!(body["request_id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let provider = Arc::new(ScriptedProvider::new());
        let response = app(provider.clone()).oneshot(ask("{\"question\": ")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "invalid_request");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let provider = Arc::new(ScriptedProvider::new());
        let question = "a".repeat(MAX_BODY_BYTES + 1);
        let body = json!({ "question": question }).to_string();
        let request = Request::post("/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();

        let response = app(provider.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_hides_provider_details() {
        let provider = Arc::new(ScriptedProvider::new().then_fail("401 invalid key sk-secret"));
        let response = app(provider).oneshot(ask_question("soup?")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"], GENERIC_FAILURE);
        assert_eq!(body["kind"], "upstream_failure");
        assert!(!body.to_string().contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_endless_tool_calls_end_in_server_error() {
        let provider = Arc::new(ScriptedProvider::new().repeating(ScriptStep::Respond(
            CompletionResponse::tool_calls(vec![ToolCall {
                id: "call_loop".to_string(),
                name: "find_recipes_by_ingredient".to_string(),
                arguments: json!({"ingredient": "salt"}),
            }]),
        )));
        let config = RecipeConfig::builder().max_tool_rounds(2).build().unwrap();
        let response = app_with(provider.clone(), &config)
            .oneshot(ask_question("salt?"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "loop_bound_exceeded");
        assert_eq!(body["error"], GENERIC_FAILURE);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_bad_gateway() {
        let provider = Arc::new(ScriptedProvider::new().then_tool_call("drop_tables", json!({})));
        let response = app(provider).oneshot(ask_question("hi")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["kind"], "unknown_tool");
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let provider = Arc::new(ScriptedProvider::new().then_delayed(
            Duration::from_millis(500),
            ScriptStep::Respond(CompletionResponse::text("too late")),
        ));
        let config = RecipeConfig::builder()
            .model_timeout(Duration::from_millis(20))
            .build()
            .unwrap();
        let response = app_with(provider, &config)
            .oneshot(ask_question("anything quick?"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json_body(response).await["kind"], "upstream_timeout");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let provider = Arc::new(ScriptedProvider::new());
        let request = Request::post("/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, "trace-abc")
            .body(Body::from(json!({"question": ""}).to_string()))
            .unwrap();

        let response = app(provider).oneshot(request).await.unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "trace-abc");
        assert_eq!(json_body(response).await["request_id"], "trace-abc");
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::new(ScriptedProvider::new()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["recipes"], 12);
        assert_eq!(body["tools"].as_array().unwrap().len(), 5);
        assert_eq!(body["tools"][0], "search_recipes");
    }

    #[tokio::test]
    async fn test_static_client_is_served() {
        let dir = std::env::temp_dir().join(format!("pantry-static-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<h1>pantry</h1>").unwrap();

        let book = book();
        let provider = Arc::new(ScriptedProvider::new());
        let orchestrator =
            build_orchestrator(Arc::clone(&book), provider, &RecipeConfig::default()).unwrap();
        let state = AppState::new(Arc::new(orchestrator), book.len(), Vec::new());

        let response = router(state, Some(&dir))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>pantry</h1>");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_static_dir_is_not_fatal() {
        let state = AppState::new(
            Arc::new(
                build_orchestrator(
                    book(),
                    Arc::new(ScriptedProvider::new()),
                    &RecipeConfig::default(),
                )
                .unwrap(),
            ),
            0,
            Vec::new(),
        );
        let response = router(state, Some(Path::new("/definitely/not/here")))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
