//! Axum route handlers for the Reading and Codex APIs.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codex::prompts;
use crate::codex::resolver::{
    prepare_reading, Markup, PositionLabel, Reading, ResolvedFragment, SelectedId, Strictness,
};
use crate::codex::table::CodexEntry;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReadingRequest {
    /// The four selected fragment ids. Strings and numbers both accepted.
    pub selection: Option<Vec<SelectedId>>,
    #[serde(default)]
    pub positions: Option<Vec<PositionLabel>>,
    #[serde(default)]
    pub intent: Option<String>,
    /// Opt into hard failure on unknown ids. Default: substitute placeholders.
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub markup: Markup,
}

#[derive(Debug, Serialize)]
pub struct ReadingResponse {
    pub synthesis: String,
    pub fragments: Vec<ResolvedFragment>,
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub prompt: String,
    pub fragments: Vec<ResolvedFragment>,
}

#[derive(Debug, Serialize)]
pub struct CodexListResponse {
    pub entries: Vec<CodexEntry>,
    pub count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/reading
/// Resolves the selection, assembles the prompt, and forwards it to the
/// completion service. Returns the model's synthesis plus the fragments.
pub async fn handle_reading(
    State(state): State<AppState>,
    Json(req): Json<ReadingRequest>,
) -> Result<Json<ReadingResponse>, AppError> {
    let markup = req.markup;
    let reading = resolve_request(&state, req)?;
    debug!("Reading prompt assembled ({} chars)", reading.prompt.len());

    let synthesis = state
        .llm
        .complete(&reading.prompt, prompts::system_prompt(markup))
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    Ok(Json(ReadingResponse {
        synthesis,
        fragments: reading.fragments,
    }))
}

/// POST /api/v1/reading/prompt
/// Dry run: resolves and assembles without calling the completion service.
pub async fn handle_reading_prompt(
    State(state): State<AppState>,
    Json(req): Json<ReadingRequest>,
) -> Result<Json<PromptResponse>, AppError> {
    let reading = resolve_request(&state, req)?;
    Ok(Json(PromptResponse {
        prompt: reading.prompt,
        fragments: reading.fragments,
    }))
}

/// GET /api/v1/codex
pub async fn handle_list_codex(
    State(state): State<AppState>,
) -> Result<Json<CodexListResponse>, AppError> {
    let entries = state.codex.entries().to_vec();
    let count = entries.len();
    Ok(Json(CodexListResponse { entries, count }))
}

/// GET /api/v1/codex/:id
pub async fn handle_get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CodexEntry>, AppError> {
    let entry = state
        .codex
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("No codex entry matches id '{id}'")))?;
    Ok(Json(entry))
}

/// Shared request-to-reading step for both reading endpoints.
fn resolve_request(state: &AppState, req: ReadingRequest) -> Result<Reading, AppError> {
    let selection = req
        .selection
        .ok_or_else(|| AppError::Validation("Missing field 'selection'".to_string()))?;
    let strictness = if req.strict {
        Strictness::Strict
    } else {
        Strictness::Lenient
    };

    let reading = prepare_reading(
        &state.codex,
        &selection,
        req.positions.as_deref(),
        req.intent.as_deref(),
        strictness,
        req.markup,
    )?;
    Ok(reading)
}
