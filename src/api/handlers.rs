//! HTTP request handlers

use super::assets::{serve_index, serve_static};
use super::types::{
    ChatRequest, ChatResponse, Control, ControlsResponse, CosmosResponse, ErrorResponse,
    HealthResponse, HistoryResponse, SessionResponse, SuccessResponse, TurnView,
};
use super::AppState;
use crate::cosmos::{random_space_fact, CosmicDecor};
use crate::llm::GenerationParams;
use crate::session::{ConversationSession, SessionError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the chat page
        .route("/", get(serve_index))
        .route("/assets/*path", get(serve_static))
        // Sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", delete(end_session))
        .route("/api/sessions/:id/history", get(get_history))
        .route("/api/sessions/:id/chat", post(send_chat))
        // Sidebar and decoration
        .route("/api/controls", get(get_controls))
        .route("/api/cosmos", get(get_cosmos))
        .route("/healthz", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let (id, _) = state.sessions.create().await;
    Json(SessionResponse { id: id.to_string() })
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = parse_session_id(&id)?;
    if state.sessions.remove(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    let session = lookup(&state, &id).await?;
    let turns = session.history().await.iter().map(TurnView::from).collect();
    Ok(Json(HistoryResponse { turns }))
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Message is empty".to_string()));
    }

    let params = GenerationParams::new(
        req.temperature
            .unwrap_or(GenerationParams::DEFAULT_TEMPERATURE),
        req.max_output_tokens
            .unwrap_or(GenerationParams::DEFAULT_MAX_OUTPUT_TOKENS),
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let session = lookup(&state, &id).await?;

    let turn = session
        .append_and_generate(&req.text, params)
        .await
        .map_err(|e| {
            let SessionError::ExternalService(inner) = &e;
            tracing::warn!(session_id = %id, kind = inner.kind.as_str(), error = %e, "Exchange failed");
            AppError::ExternalService(e.to_string())
        })?;

    Ok(Json(ChatResponse {
        turn: TurnView::from(&turn),
    }))
}

async fn lookup(state: &AppState, id: &str) -> Result<Arc<ConversationSession>, AppError> {
    let id = parse_session_id(id)?;
    state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

fn parse_session_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound(format!("Session {id} not found")))
}

// ============================================================
// Sidebar and Decoration
// ============================================================

async fn get_controls() -> Json<ControlsResponse> {
    Json(ControlsResponse {
        temperature: Control {
            min: *GenerationParams::TEMPERATURE_RANGE.start(),
            max: *GenerationParams::TEMPERATURE_RANGE.end(),
            step: GenerationParams::TEMPERATURE_STEP,
            default: GenerationParams::DEFAULT_TEMPERATURE,
        },
        max_output_tokens: Control {
            min: *GenerationParams::MAX_OUTPUT_TOKENS_RANGE.start(),
            max: *GenerationParams::MAX_OUTPUT_TOKENS_RANGE.end(),
            step: GenerationParams::MAX_OUTPUT_TOKENS_STEP,
            default: GenerationParams::DEFAULT_MAX_OUTPUT_TOKENS,
        },
    })
}

async fn get_cosmos() -> Json<CosmosResponse> {
    let mut rng = rand::thread_rng();
    Json(CosmosResponse {
        space_fact: random_space_fact(&mut rng),
        decor: CosmicDecor::roll(&mut rng, chrono::Utc::now()),
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.model_id.clone(),
        active_sessions: state.sessions.count().await,
    })
}

async fn get_version() -> &'static str {
    concat!("cosmic-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    /// The model service failed; the message is shown verbatim
    ExternalService(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ExternalService(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::MockLlmService;
    use crate::llm::LlmError;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(mock: &Arc<MockLlmService>) -> Router {
        create_router(AppState::new(mock.clone(), std::time::Duration::from_secs(60)))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = call(app, Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_chat_round_trip_renders_assistant_role() {
        let mock = Arc::new(MockLlmService::new("mock"));
        mock.queue_text("100°C at sea level.");
        let app = app(&mock);
        let id = new_session(&app).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/chat"),
            Some(json!({
                "text": "What is the boiling point of water?",
                "temperature": 0.3,
                "max_output_tokens": 400
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["turn"], json!({"role": "assistant", "text": "100°C at sea level."}));

        let (status, body) = call(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["turns"],
            json!([
                {"role": "user", "text": "What is the boiling point of water?"},
                {"role": "assistant", "text": "100°C at sea level."}
            ])
        );

        let request = &mock.recorded_requests()[0];
        assert_eq!(request.params, GenerationParams::new(0.3, 400).unwrap());
    }

    #[tokio::test]
    async fn test_missing_params_use_defaults() {
        let mock = Arc::new(MockLlmService::new("mock"));
        mock.queue_text("ok");
        let app = app(&mock);
        let id = new_session(&app).await;

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/chat"),
            Some(json!({"text": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mock.recorded_requests()[0].params, GenerationParams::default());
    }

    #[tokio::test]
    async fn test_out_of_range_params_are_rejected() {
        let mock = Arc::new(MockLlmService::new("mock"));
        let app = app(&mock);
        let id = new_session(&app).await;
        let uri = format!("/api/sessions/{id}/chat");

        for body in [
            json!({"text": "hi", "temperature": 1.5}),
            json!({"text": "hi", "temperature": -0.1}),
            json!({"text": "hi", "max_output_tokens": 49}),
            json!({"text": "hi", "max_output_tokens": 1001}),
        ] {
            let (status, resp) = call(&app, Method::POST, &uri, Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(resp["error"].as_str().unwrap().contains("must be between"));
        }

        assert!(mock.recorded_requests().is_empty());
        let (_, history) = call(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
        assert_eq!(history["turns"], json!([]));
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let mock = Arc::new(MockLlmService::new("mock"));
        let app = app(&mock);
        let id = new_session(&app).await;

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/chat"),
            Some(json!({"text": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(mock.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_service_error_is_bad_gateway_and_keeps_user_turn() {
        let mock = Arc::new(MockLlmService::new("mock"));
        mock.queue_error(LlmError::auth("Authentication failed: API key not valid"));
        let app = app(&mock);
        let id = new_session(&app).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/chat"),
            Some(json!({"text": "hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Authentication failed: API key not valid");

        let (_, history) = call(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
        assert_eq!(history["turns"], json!([{"role": "user", "text": "hello"}]));
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let mock = Arc::new(MockLlmService::new("mock"));
        let app = app(&mock);

        let (status, _) = call(&app, Method::GET, "/api/sessions/not-a-uuid/history", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let missing = Uuid::new_v4();
        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{missing}/chat"),
            Some(json!({"text": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_expired_session_then_resend_to_new_session() {
        let mock = Arc::new(MockLlmService::new("mock"));
        mock.queue_text("welcome back");
        let state = AppState::new(mock.clone(), std::time::Duration::ZERO);
        let app = create_router(state.clone());
        let stale = new_session(&app).await;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert_eq!(state.sessions.evict_idle(std::time::Instant::now()).await, 1);

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{stale}/chat"),
            Some(json!({"text": "still there?"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
        assert!(mock.recorded_requests().is_empty());

        let fresh = new_session(&app).await;
        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{fresh}/chat"),
            Some(json!({"text": "still there?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["turn"]["text"], "welcome back");
        let (_, history) = call(&app, Method::GET, &format!("/api/sessions/{fresh}/history"), None).await;
        assert_eq!(history["turns"][0], json!({"role": "user", "text": "still there?"}));
    }

    #[tokio::test]
    async fn test_end_session() {
        let mock = Arc::new(MockLlmService::new("mock"));
        let app = app(&mock);
        let id = new_session(&app).await;

        let (status, _) = call(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_controls_and_cosmos() {
        let mock = Arc::new(MockLlmService::new("mock"));
        let app = app(&mock);

        let (status, controls) = call(&app, Method::GET, "/api/controls", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(controls["max_output_tokens"], json!({"min": 50, "max": 1000, "step": 50, "default": 250}));
        assert_eq!(controls["temperature"]["max"], json!(1.0));

        let (status, cosmos) = call(&app, Method::GET, "/api/cosmos", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(crate::cosmos::SPACE_FACTS.contains(&cosmos["space_fact"].as_str().unwrap()));
        assert!(cosmos["deep_space_time"].as_str().unwrap().ends_with(" UTC"));
        assert_eq!(cosmos["guide"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_health_counts_sessions() {
        let mock = Arc::new(MockLlmService::new("mock-model"));
        let app = app(&mock);
        new_session(&app).await;

        let (_, body) = call(&app, Method::GET, "/healthz", None).await;
        assert_eq!(body, json!({"status": "ok", "model": "mock-model", "active_sessions": 1}));
    }
}
