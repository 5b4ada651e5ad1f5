//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{error, info, warn};

use crate::advisor::AdvisorError;
use crate::domain::SessionId;
use crate::planner::{PlannerError, SearchRequest};
use crate::trip::{LiveTripState, TripHandle};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/routes/search", post(search_routes))
        .route("/v1/trip/start", post(start_trip))
        .route("/v1/trip/:session", get(trip_state))
        .route("/v1/trip/:session/position", post(report_position))
        .route("/v1/trip/:session/end", post(end_trip))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search for route options between two coordinates.
async fn search_routes(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let options = state.search.search(&request).await?;
    Ok(Json(SearchResponse { options }))
}

/// Start tracking a previously searched route option.
async fn start_trip(
    State(state): State<AppState>,
    Json(request): Json<StartTripRequest>,
) -> Result<Json<StartTripResponse>, AppError> {
    let route = state
        .search
        .option(&request.selected_route_id)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!(
                "Unknown or expired route option: {}",
                request.selected_route_id
            ),
        })?;

    let session_id = state
        .advisor
        .start_session(&route.id, request.user_context.as_deref())
        .await?;

    info!(session = %session_id, route = %route.id, "trip started");

    let handle = TripHandle::start(
        Arc::clone(&route),
        session_id.clone(),
        state.advisor.clone(),
        state.trip_config.clone(),
    );
    state.trips.insert(session_id.clone(), handle);

    Ok(Json(StartTripResponse { session_id }))
}

/// Current state of a live trip.
async fn trip_state(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<LiveTripState>, AppError> {
    let session = parse_session(&session)?;

    state
        .trips
        .with(&session, |trip| Json(trip.snapshot()))
        .ok_or_else(|| unknown_session(&session))
}

/// Report a positioning update for a live trip.
async fn report_position(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(report): Json<PositionReport>,
) -> Result<StatusCode, AppError> {
    let session = parse_session(&session)?;

    let feed = state
        .trips
        .with(&session, |trip| trip.position_feed())
        .ok_or_else(|| unknown_session(&session))?;

    match (report.location, report.error) {
        (Some(coord), _) => feed.fix(coord),
        (None, Some(message)) => feed.error(message),
        (None, None) => {
            return Err(AppError::BadRequest {
                message: "Position report needs a location or an error".to_string(),
            });
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// End a live trip. Idempotent: ending an unknown or already-ended session
/// succeeds.
async fn end_trip(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<StatusCode, AppError> {
    let session = parse_session(&session)?;
    state.trips.end(&session);
    info!(session = %session, "trip ended");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_session(raw: &str) -> Result<SessionId, AppError> {
    SessionId::new(raw).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

fn unknown_session(session: &SessionId) -> AppError {
    AppError::NotFound {
        message: format!("No live trip for session {session}"),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Upstream { message: String },
    Internal { message: String },
}

impl From<PlannerError> for AppError {
    fn from(e: PlannerError) -> Self {
        match e {
            PlannerError::Fixture(message) => AppError::Internal { message },
            _ => AppError::Upstream {
                message: e.to_string(),
            },
        }
    }
}

impl From<AdvisorError> for AppError {
    fn from(e: AdvisorError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
