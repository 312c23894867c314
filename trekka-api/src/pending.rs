use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use trekka_core::repository::UserDirectory;
use trekka_core::PendingTrip;
use trekka_trips::ConfirmEdits;

use crate::error::AppError;
use crate::inbound::RelayEmail;
use crate::middleware::UserClaims;
use crate::state::AppState;

/// Relay webhook. Unauthenticated: the recipient address identifies the user.
pub fn relay_routes() -> Router<AppState> {
    Router::new().route("/api/parse-email", post(parse_email))
}

/// Review queue, behind the user auth middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/pending-trips", get(list_pending))
        .route("/v1/pending-trips/import-address", get(import_address))
        .route("/v1/pending-trips/{id}", get(get_pending))
        .route("/v1/pending-trips/{id}/confirm", post(confirm_pending))
        .route("/v1/pending-trips/{id}/reject", post(reject_pending))
}

async fn parse_email(
    State(state): State<AppState>,
    RelayEmail(email): RelayEmail,
) -> Result<Json<Value>, AppError> {
    let outcome = state.ingestor.ingest(&email).await?;

    Ok(Json(json!({
        "success": true,
        "pending_trip_id": outcome.pending_trip.id,
        "parsed_data": outcome.candidate,
    })))
}

/// Pending record plus what the review screen shows next to it.
#[derive(Serialize)]
struct PendingTripView {
    #[serde(flatten)]
    trip: PendingTrip,
    low_confidence: bool,
    region: String,
    flag: String,
}

impl PendingTripView {
    fn new(state: &AppState, trip: PendingTrip) -> Self {
        Self {
            low_confidence: trip.is_low_confidence(),
            region: state.classifier.region_of(&trip.destination),
            flag: state.classifier.flag_of(&trip.destination),
            trip,
        }
    }
}

async fn list_pending(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<Vec<PendingTripView>>, AppError> {
    let queue = state.review.list_pending(claims.sub).await?;
    Ok(Json(queue.into_iter().map(|trip| PendingTripView::new(&state, trip)).collect()))
}

async fn get_pending(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<PendingTripView>, AppError> {
    let trip = state.review.get_pending(claims.sub, id).await?;
    Ok(Json(PendingTripView::new(&state, trip)))
}

async fn import_address(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<Value>, AppError> {
    let profile = state
        .directory
        .get_profile(claims.sub)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("Profile not found".to_string()))?;

    Ok(Json(json!({ "address": profile.import_address(&state.import_domain) })))
}

/// Dates are `YYYY-MM-DD`; blank strings keep the extracted value.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmRequest {
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub is_private: Option<bool>,
}

impl ConfirmRequest {
    fn into_edits(self) -> Result<ConfirmEdits, AppError> {
        Ok(ConfirmEdits {
            start_date: parse_date("start_date", self.start_date)?,
            end_date: parse_date("end_date", self.end_date)?,
            destination: self.destination,
            description: self.description,
            is_private: self.is_private,
        })
    }
}

fn parse_date(field: &str, raw: Option<String>) -> Result<Option<NaiveDate>, AppError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::ValidationError(format!("{} must be YYYY-MM-DD", field))),
    }
}

async fn confirm_pending(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<Uuid>,
    body: Option<Json<ConfirmRequest>>,
) -> Result<Json<Value>, AppError> {
    // No body confirms the record as extracted.
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let trip = state.review.confirm(claims.sub, id, request.into_edits()?).await?;
    Ok(Json(json!({ "success": true, "trip_id": trip.id, "trip": trip })))
}

async fn reject_pending(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.review.reject(claims.sub, id).await?;
    Ok(Json(json!({ "success": true })))
}
