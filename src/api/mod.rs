//! REST API endpoints.
//!
//! Axum-based HTTP API for player and team season views, league leaders,
//! standings, team trends, game previews and the league chat.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use self::state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }

    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS origin '{}', allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/leagues", get(routes::league::list_leagues))
        .route(
            "/api/leagues/:league/players/compare",
            get(routes::players::compare_players),
        )
        .route(
            "/api/leagues/:league/players/:player/summary",
            get(routes::players::player_summary),
        )
        .route(
            "/api/leagues/:league/teams/compare",
            get(routes::teams::compare_teams),
        )
        .route(
            "/api/leagues/:league/teams/:team/summary",
            get(routes::teams::team_summary),
        )
        .route(
            "/api/leagues/:league/teams/:team/roster",
            get(routes::teams::team_roster),
        )
        .route(
            "/api/leagues/:league/teams/:team/trends",
            get(routes::teams::team_trends),
        )
        .route("/api/leagues/:league/trends", get(routes::league::trends))
        .route("/api/leagues/:league/leaders", get(routes::league::leaders))
        .route(
            "/api/leagues/:league/standings",
            get(routes::league::standings),
        )
        .route("/api/leagues/:league/games", get(routes::league::games))
        .route(
            "/api/leagues/:league/games/:game",
            get(routes::league::game),
        )
        .route(
            "/api/leagues/:league/games/:game/preview",
            get(routes::league::preview),
        )
        .route("/api/chat/league", post(routes::chat::ask))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
