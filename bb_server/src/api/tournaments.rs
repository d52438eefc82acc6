//! Tournament API handlers.
//!
//! Listing and reading tournaments is public. Creating one is an admin
//! operation mounted under `/api/v1/admin`.
//!
//! # Examples
//!
//! List tournaments:
//! ```bash
//! curl http://localhost:8080/api/v1/tournaments
//! ```
//!
//! Create a tournament:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/admin/tournaments \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"title":"Sunday Squad Cup","game":"PUBG","date":"2026-11-01","time":"18:30:00",
//!        "entry_fee":50,"prize_pool":1000,"slots_total":25}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use battlebucks::{NewTournament, Tournament};
use serde::Serialize;

use super::{ApiError, AppState, tournament_error};

/// Tournament with its remaining capacity
#[derive(Debug, Serialize)]
pub struct TournamentView {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub slots_left: i64,
}

impl From<Tournament> for TournamentView {
    fn from(tournament: Tournament) -> Self {
        Self {
            slots_left: tournament.slots_left(),
            tournament,
        }
    }
}

/// List every tournament, latest match date first.
///
/// # Errors
///
/// - `503 Service Unavailable`: store error
pub async fn list_tournaments(
    State(state): State<AppState>,
) -> Result<Json<Vec<TournamentView>>, ApiError> {
    let tournaments = state
        .tournaments
        .list_tournaments()
        .await
        .map_err(tournament_error)?;

    Ok(Json(tournaments.into_iter().map(TournamentView::from).collect()))
}

/// Get one tournament.
///
/// # Errors
///
/// - `404 Not Found`: no tournament with this ID
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<String>,
) -> Result<Json<TournamentView>, ApiError> {
    state
        .tournaments
        .get_tournament(&tournament_id)
        .await
        .map(|t| Json(t.into()))
        .map_err(tournament_error)
}

/// Create a tournament (admin).
///
/// Returns `201 Created` with the stored tournament, which starts
/// `Upcoming` with no slots allotted.
///
/// # Errors
///
/// - `400 Bad Request`: empty title, non-positive slots or negative fees
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(request): Json<NewTournament>,
) -> Result<(StatusCode, Json<TournamentView>), ApiError> {
    let tournament = state
        .tournaments
        .create_tournament(request)
        .await
        .map_err(tournament_error)?;

    tracing::info!("Created tournament {} ({})", tournament.id, tournament.title);
    Ok((StatusCode::CREATED, Json(tournament.into())))
}
