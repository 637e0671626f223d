pub mod health;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};

use crate::codex::handlers;
use crate::errors::AppError;
use crate::state::AppState;

/// Header carrying the shared access key for the reading endpoints.
pub const ACCESS_KEY_HEADER: &str = "x-access-key";

pub fn build_router(state: AppState) -> Router {
    // Reading endpoints sit behind the optional access key; the codex
    // listing and health stay open.
    let readings = Router::new()
        .route("/api/v1/reading", post(handlers::handle_reading))
        .route(
            "/api/v1/reading/prompt",
            post(handlers::handle_reading_prompt),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_key,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/codex", get(handlers::handle_list_codex))
        .route("/api/v1/codex/:id", get(handlers::handle_get_entry))
        .merge(readings)
        .with_state(state)
}

/// Rejects requests whose `x-access-key` header does not match the
/// configured key. A no-op when no key is configured.
async fn require_access_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.access_key.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(ACCESS_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided == Some(expected) {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized)
    }
}
