use std::sync::Arc;

use crate::codex::table::CodexTable;
use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The static codex table. Read-only after startup; no locking needed.
    pub codex: Arc<CodexTable>,
    pub llm: LlmClient,
    pub config: Config,
}
