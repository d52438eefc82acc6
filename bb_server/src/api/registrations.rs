//! Registration API handlers.
//!
//! Players register for a tournament; admins list registrations and move
//! them between `Pending` and `Confirmed`. Status changes go through the
//! [`RegistrationLedger`](battlebucks::RegistrationLedger) so the slot
//! counter moves in the same transaction as the status.
//!
//! # Examples
//!
//! Register:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments/TID/registrations \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"game_id":"5123456789","team_name":"Night Owls","upi_id":"owls@upi"}'
//! ```
//!
//! Confirm a payment:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/admin/registrations/RID/confirm \
//!   -H "Authorization: Bearer ADMIN_TOKEN"
//! ```

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use battlebucks::{
    CallerIdentity, DashboardSummary, LedgerError, NewRegistration, PaymentStatus, Registration,
    RegistrationFilter, SlotOutcome,
};
use serde::Deserialize;

use super::request_id::RequestId;
use super::{ApiError, AppState, api_error, ledger_error, registration_error};
use crate::{logging, metrics};

/// Registration form body; the tournament comes from the path
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub game_id: String,
    pub team_name: String,
    pub upi_id: String,
}

/// Query string for the admin listing
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `Pending`, `Confirmed` or `all` (default)
    pub status: Option<String>,
    pub tournament_id: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl ListQuery {
    fn into_filter(self) -> Result<RegistrationFilter, String> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(s.parse::<PaymentStatus>()?),
        };

        if let Some(limit) = self.limit
            && limit <= 0
        {
            return Err("limit must be positive".to_string());
        }

        Ok(RegistrationFilter {
            status,
            tournament_id: self.tournament_id.filter(|t| !t.trim().is_empty()),
            search: self.search,
            limit: self.limit,
        })
    }
}

/// Register the caller for a tournament.
///
/// Returns `201 Created` with the stored registration in `Pending`.
///
/// # Errors
///
/// - `400 Bad Request`: a form field failed validation, or the token has no email
/// - `404 Not Found`: no tournament with this ID
/// - `409 Conflict`: the tournament is completed
pub async fn register(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(tournament_id): Path<String>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let form = NewRegistration {
        tournament_id,
        game_id: request.game_id,
        team_name: request.team_name,
        upi_id: request.upi_id,
    };

    let registration = state
        .registrations
        .register(&caller, form)
        .await
        .map_err(registration_error)?;

    metrics::registrations_created_total();
    Ok((StatusCode::CREATED, Json(registration)))
}

/// List registrations for the admin panel, newest first.
///
/// # Errors
///
/// - `400 Bad Request`: unknown `status` or non-positive `limit`
pub async fn list_registrations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Registration>>, ApiError> {
    let filter = query
        .into_filter()
        .map_err(|reason| api_error(StatusCode::BAD_REQUEST, reason))?;

    state
        .registrations
        .list_registrations(&filter)
        .await
        .map(Json)
        .map_err(registration_error)
}

/// Mark a registration's payment as confirmed (admin).
///
/// # Errors
///
/// - `404 Not Found`: registration or its tournament is gone
/// - `409 Conflict`: no slots left
/// - `422 Unprocessable Entity`: the registration has no usable tournament reference
/// - `503 Service Unavailable`: the transaction was aborted
pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(admin): Extension<CallerIdentity>,
    request_id: RequestId,
    Path(registration_id): Path<String>,
) -> Result<Json<SlotOutcome>, ApiError> {
    let registration = state
        .registrations
        .get_registration(&registration_id)
        .await
        .map_err(registration_error)?;

    let result = state
        .ledger
        .confirm_payment(&admin, &registration.id, registration.tournament_id.as_deref())
        .await;

    record("confirm_payment", &admin, &registration.id, &request_id, &result);
    result.map(Json).map_err(ledger_error)
}

/// Move a registration back to pending (admin).
///
/// Errors as for [`confirm_payment`], minus the capacity conflict.
pub async fn revert_to_pending(
    State(state): State<AppState>,
    Extension(admin): Extension<CallerIdentity>,
    request_id: RequestId,
    Path(registration_id): Path<String>,
) -> Result<Json<SlotOutcome>, ApiError> {
    let registration = state
        .registrations
        .get_registration(&registration_id)
        .await
        .map_err(registration_error)?;

    let result = state
        .ledger
        .revert_to_pending(&admin, &registration.id, registration.tournament_id.as_deref())
        .await;

    record("revert_to_pending", &admin, &registration.id, &request_id, &result);
    result.map(Json).map_err(ledger_error)
}

/// Dashboard figures (admin)
pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, ApiError> {
    state
        .registrations
        .dashboard()
        .await
        .map(Json)
        .map_err(registration_error)
}

fn record(
    operation: &'static str,
    admin: &CallerIdentity,
    registration_id: &str,
    request_id: &RequestId,
    result: &Result<SlotOutcome, LedgerError>,
) {
    let outcome = outcome_label(result);
    metrics::ledger_operation(operation, outcome);
    tracing::debug!(request_id = %request_id.as_str(), "{} -> {}", operation, outcome);
    logging::log_admin_action(&admin.uid, operation, registration_id, outcome);
}

fn outcome_label(result: &Result<SlotOutcome, LedgerError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(LedgerError::InvalidReference(_)) => "invalid_reference",
        Err(LedgerError::NotFound { .. }) => "not_found",
        Err(LedgerError::CapacityExceeded { .. }) => "capacity_exceeded",
        Err(LedgerError::TransactionAborted(_)) => "aborted",
    }
}
