//! HTTP API server for the guide.
//!
//! The UI boundary: a chat surface, region/language selectors, one button per
//! dungeon and a summarize action. Runs on port 7860 (configurable) using axum.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::{NaviError, NaviResult};
use crate::guide::{ChatReply, NaviGuide, SessionInfo, SpokenText};
use crate::locale::{Language, Locale, Region};
use crate::prompt::Dungeon;
use crate::transcript::DisplayRow;

pub type ApiState = Arc<NaviGuide>;

// --- Request/Response types ---

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize, Default)]
struct TranscriptQuery {
    #[serde(default)]
    paired: bool,
}

#[derive(Deserialize)]
struct RegionRequest {
    region: String,
}

#[derive(Deserialize)]
struct LanguageRequest {
    language: String,
}

#[derive(Deserialize)]
struct SolveRequest {
    dungeon: String,
    #[serde(default)]
    question: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    model: String,
    sessions: usize,
    playback: bool,
}

#[derive(Serialize)]
struct SessionResponse {
    session_id: String,
}

#[derive(Serialize)]
struct TranscriptResponse {
    rows: Vec<DisplayRow>,
}

#[derive(Serialize)]
struct DungeonInfo {
    slug: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct SolveResponse {
    dungeon: &'static str,
    answer: String,
}

#[derive(Serialize)]
struct SimpleResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SimpleResponse {
    fn ok(status: &str) -> Self {
        Self {
            status: status.into(),
            kind: None,
            error: None,
        }
    }

    fn err(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            kind: Some(kind),
            error: Some(message.into()),
        }
    }
}

enum ApiError {
    BadRequest(String),
    NotFound(String),
    Guide(NaviError),
}

impl From<NaviError> for ApiError {
    fn from(err: NaviError) -> Self {
        ApiError::Guide(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, body) = match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, SimpleResponse::err("bad_request", message))
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, SimpleResponse::err("not_found", message))
            }
            ApiError::Guide(err) => {
                let code = match &err {
                    NaviError::EmptyInput(_) => StatusCode::BAD_REQUEST,
                    NaviError::Upstream(_) => StatusCode::BAD_GATEWAY,
                    NaviError::Configuration(_) | NaviError::Audio(_) | NaviError::Io(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                warn!("Request failed: {err}");
                (code, SimpleResponse::err(err.kind(), err.to_string()))
            }
        };
        (code, Json(body)).into_response()
    }
}

/// Build the axum router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(handle_status))
        .route("/dungeons", get(handle_dungeons))
        .route("/solve", post(handle_solve))
        .route("/sessions", post(handle_new_session))
        .route("/sessions/{id}", get(handle_session_info).delete(handle_end_session))
        .route("/sessions/{id}/transcript", get(handle_transcript))
        .route("/sessions/{id}/chat", post(handle_chat))
        .route("/sessions/{id}/clear", post(handle_clear))
        .route("/sessions/{id}/locale", get(handle_locale))
        .route("/sessions/{id}/region", post(handle_region))
        .route("/sessions/{id}/language", post(handle_language))
        .route("/sessions/{id}/summarize", post(handle_summarize))
        .route("/sessions/{id}/speak", post(handle_speak))
        .with_state(state)
}

/// Serve the API until Ctrl-C.
pub async fn serve(state: ApiState, addr: &str) -> NaviResult<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Navi API listening on {addr}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Navi API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

// --- Handlers ---

async fn handle_status(State(guide): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        model: guide.model().to_string(),
        sessions: guide.session_count(),
        playback: guide.playback_enabled(),
    })
}

async fn handle_dungeons() -> Json<Vec<DungeonInfo>> {
    Json(
        Dungeon::all()
            .iter()
            .map(|d| DungeonInfo {
                slug: d.slug(),
                label: d.label(),
            })
            .collect(),
    )
}

async fn handle_new_session(State(guide): State<ApiState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        session_id: guide.create_session(),
    })
}

async fn handle_end_session(
    State(guide): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<SimpleResponse>, ApiError> {
    if guide.end_session(&id) {
        Ok(Json(SimpleResponse::ok("ended")))
    } else {
        Err(unknown_session(&id))
    }
}

async fn handle_transcript(
    State(guide): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<TranscriptQuery>,
) -> Json<TranscriptResponse> {
    let rows = if query.paired {
        guide.display_paired(&id)
    } else {
        guide.display(&id)
    };
    Json(TranscriptResponse { rows })
}

fn unknown_session(id: &str) -> ApiError {
    ApiError::NotFound(format!("no session {id}"))
}

async fn handle_session_info(
    State(guide): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<SessionInfo>, ApiError> {
    guide.session_info(&id).map(Json).ok_or_else(|| unknown_session(&id))
}

async fn handle_locale(
    State(guide): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Locale>, ApiError> {
    guide.locale(&id).map(Json).ok_or_else(|| unknown_session(&id))
}

async fn handle_chat(
    State(guide): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatReply> {
    let preview: String = req.message.chars().take(80).collect();
    info!(
        "HTTP /chat [{id}]: \"{}{}\"",
        preview.replace('\n', " "),
        if req.message.chars().count() > 80 { "..." } else { "" },
    );
    Json(guide.chat(&id, &req.message).await)
}

async fn handle_clear(State(guide): State<ApiState>, Path(id): Path<String>) -> Json<SimpleResponse> {
    guide.clear(&id);
    Json(SimpleResponse::ok("cleared"))
}

async fn handle_region(
    State(guide): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<RegionRequest>,
) -> Result<Json<Locale>, ApiError> {
    let region: Region = req.region.parse().map_err(ApiError::BadRequest)?;
    Ok(Json(guide.set_region(&id, region)))
}

async fn handle_language(
    State(guide): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<LanguageRequest>,
) -> Result<Json<Locale>, ApiError> {
    let language: Language = req.language.parse().map_err(ApiError::BadRequest)?;
    Ok(Json(guide.set_language(&id, language)))
}

async fn handle_solve(
    State(guide): State<ApiState>,
    Json(req): Json<SolveRequest>,
) -> Result<Json<SolveResponse>, ApiError> {
    let dungeon: Dungeon = req.dungeon.parse().map_err(ApiError::BadRequest)?;
    let answer = guide.solve(dungeon, &req.question).await?;
    Ok(Json(SolveResponse {
        dungeon: dungeon.label(),
        answer,
    }))
}

async fn handle_summarize(
    State(guide): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<SpokenText>, ApiError> {
    Ok(Json(guide.summarize(&id).await?))
}

async fn handle_speak(
    State(guide): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<SpokenText>, ApiError> {
    Ok(Json(guide.speak_latest(&id).await?))
}
