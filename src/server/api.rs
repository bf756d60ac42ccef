//! HTTP API server implementation

use axum::{
    extract::{
        rejection::{JsonRejection, StringRejection},
        DefaultBodyLimit, Json, State,
    },
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::core::context::{Context, DEFAULT_MIN_CONTEXT_LINES};
use crate::core::errors::TranslationError;
use crate::core::models::{LanguageCode, ProviderId, SessionTotals, TranslationOutcome};
use crate::core::orchestrator::TranslationOrchestrator;
use crate::core::provider::ProviderClient;

/// Header carrying the shared access password
pub const PASSWORD_HEADER: &str = "x-access-password";

/// Largest accepted Master upload
pub const MAX_CONTEXT_BYTES: usize = 64 * 1024 * 1024;

/// Application state
pub struct AppState {
    orchestrator: RwLock<Arc<TranslationOrchestrator>>,
    access_password: Option<String>,
    min_context_lines: usize,
}

impl AppState {
    /// State serving `orchestrator`; an empty password leaves the API open
    pub fn new(orchestrator: Arc<TranslationOrchestrator>, access_password: Option<String>) -> Self {
        Self {
            orchestrator: RwLock::new(orchestrator),
            access_password: access_password.filter(|p| !p.is_empty()),
            min_context_lines: DEFAULT_MIN_CONTEXT_LINES,
        }
    }

    /// Minimum line count of an uploaded Master
    pub fn with_min_context_lines(mut self, min_context_lines: usize) -> Self {
        self.min_context_lines = min_context_lines;
        self
    }

    async fn orchestrator(&self) -> Arc<TranslationOrchestrator> {
        self.orchestrator.read().await.clone()
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let Some(expected) = self.access_password.as_deref() else {
            return Ok(());
        };
        let supplied = headers.get(PASSWORD_HEADER).and_then(|v| v.to_str().ok());
        if supplied == Some(expected) {
            Ok(())
        } else {
            Err(error(StatusCode::UNAUTHORIZED, "Incorrect password", "unauthorized", "auth_error"))
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

#[derive(Serialize)]
struct LanguageInfo {
    code: &'static str,
    name: &'static str,
}

#[derive(Serialize)]
struct LanguagesResponse {
    data: Vec<LanguageInfo>,
}

#[derive(Debug, Serialize)]
struct ProviderStatus {
    id: ProviderId,
    model: String,
    configured: bool,
}

impl ProviderStatus {
    fn of(provider: &dyn ProviderClient) -> Self {
        Self {
            id: provider.id(),
            model: provider.model().to_string(),
            configured: provider.is_configured(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    totals: SessionTotals,
    context_lines: usize,
    primary: ProviderStatus,
    secondary: ProviderStatus,
}

#[derive(Debug, Serialize)]
struct ContextResponse {
    status: &'static str,
    lines: usize,
    bytes: usize,
}

/// Translation request body
#[derive(Deserialize)]
pub struct TranslateRequest {
    /// Source text
    pub text: String,
    /// Source language code, e.g. `ja`
    pub source_lang: String,
    /// Target language code, e.g. `en`
    pub target_lang: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Human-readable message
    pub message: String,
    /// Machine-readable code, e.g. `invalid_request`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error class, e.g. `invalid_request_error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>, code: &str, kind: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: ErrorDetail {
                message: message.into(),
                code: Some(code.to_string()),
                r#type: Some(kind.to_string()),
            },
        }),
    )
}

fn invalid_request(message: impl Into<String>) -> ApiError {
    error(StatusCode::BAD_REQUEST, message, "invalid_request", "invalid_request_error")
}

fn translation_error(err: &TranslationError) -> ApiError {
    match err {
        TranslationError::InvalidRequest { .. } => invalid_request(err.to_string()),
        TranslationError::TranslationFailed { .. } => {
            error(StatusCode::BAD_GATEWAY, err.to_string(), "translation_failed", "api_error")
        }
        _ => error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), "internal_error", "api_error"),
    }
}

/// Health check handler
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Supported languages handler
async fn get_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        data: LanguageCode::ALL
            .iter()
            .map(|l| LanguageInfo {
                code: l.code(),
                name: l.display_name(),
            })
            .collect(),
    })
}

/// Session totals handler
async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    state.authorize(&headers)?;
    let orchestrator = state.orchestrator().await;
    Ok(Json(SessionResponse {
        totals: orchestrator.session_totals().await,
        context_lines: orchestrator.context_lines(),
        primary: ProviderStatus::of(orchestrator.primary()),
        secondary: ProviderStatus::of(orchestrator.secondary()),
    }))
}

/// Translation handler
async fn translate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslationOutcome>, ApiError> {
    state.authorize(&headers)?;
    let Json(payload) = payload.map_err(|rejection| invalid_request(rejection.body_text()))?;

    let parse = |code: &str| code.parse::<LanguageCode>().map_err(|e| translation_error(&e));
    let source_lang = parse(&payload.source_lang)?;
    let target_lang = parse(&payload.target_lang)?;

    match state
        .orchestrator()
        .await
        .translate(&payload.text, source_lang, target_lang)
        .await
    {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            warn!("Translation failed: {}", e);
            Err(translation_error(&e))
        }
    }
}

/// Master upload handler; a rejected document leaves the current one in place
async fn upload_context(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<String, StringRejection>,
) -> Result<Json<ContextResponse>, ApiError> {
    state.authorize(&headers)?;
    let body = body.map_err(|rejection| invalid_context(rejection.body_text()))?;

    let context = Context::from_text(body, state.min_context_lines).map_err(|e| {
        warn!("Rejected Master upload: {}", e);
        invalid_context(e.to_string())
    })?;
    let response = ContextResponse {
        status: "loaded",
        lines: context.lines(),
        bytes: context.len(),
    };

    let mut current = state.orchestrator.write().await;
    *current = Arc::new(current.replace_context(context));
    info!("Master replaced: {} lines, {} bytes", response.lines, response.bytes);

    Ok(Json(response))
}

fn invalid_context(message: impl Into<String>) -> ApiError {
    error(StatusCode::BAD_REQUEST, message, "invalid_context", "invalid_request_error")
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/v1/languages", get(get_languages))
        .route("/v1/session", get(get_session))
        .route("/v1/translate", post(translate))
        .route(
            "/v1/context",
            post(upload_context).layer(DefaultBodyLimit::max(MAX_CONTEXT_BYTES)),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(
    host: String,
    port: u16,
    orchestrator: TranslationOrchestrator,
    access_password: Option<String>,
    min_context_lines: usize,
) -> anyhow::Result<()> {
    let state = Arc::new(
        AppState::new(Arc::new(orchestrator), access_password).with_min_context_lines(min_context_lines),
    );
    if state.access_password.is_none() {
        warn!("No access password configured, the API is open");
    }

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
