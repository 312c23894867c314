use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

/// Below this score the review queue shows a "low confidence" warning.
/// Display only; nothing is rejected automatically.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Review status of an imported trip. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PendingStatus {
    Pending,
    Confirmed,
    Rejected,
}

/// What the owner decided to do with a pending trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Confirm,
    Reject,
}

impl PendingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingStatus::Pending => "pending",
            PendingStatus::Confirmed => "confirmed",
            PendingStatus::Rejected => "rejected",
        }
    }

    /// Transition: Pending → Confirmed | Rejected. Terminal states never move.
    pub fn review(self, decision: ReviewDecision) -> Result<PendingStatus, CoreError> {
        match (self, decision) {
            (PendingStatus::Pending, ReviewDecision::Confirm) => Ok(PendingStatus::Confirmed),
            (PendingStatus::Pending, ReviewDecision::Reject) => Ok(PendingStatus::Rejected),
            (PendingStatus::Confirmed | PendingStatus::Rejected, _) => Err(CoreError::ConflictError(
                format!("pending trip is already {}", self),
            )),
        }
    }
}

impl fmt::Display for PendingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PendingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PendingStatus::Pending),
            "confirmed" => Ok(PendingStatus::Confirmed),
            "rejected" => Ok(PendingStatus::Rejected),
            other => Err(format!("unknown pending trip status: {}", other)),
        }
    }
}

/// Kind of booking the email confirmed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Flight,
    Hotel,
    Rental,
    Train,
    Other,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::Flight => "flight",
            TripType::Hotel => "hotel",
            TripType::Rental => "rental",
            TripType::Train => "train",
            TripType::Other => "other",
        }
    }

    /// Lenient parse for model output: anything unrecognised is `Other`.
    pub fn from_label(label: &str) -> TripType {
        match label.trim().to_ascii_lowercase().as_str() {
            "flight" => TripType::Flight,
            "hotel" => TripType::Hotel,
            "rental" => TripType::Rental,
            "train" => TripType::Train,
            _ => TripType::Other,
        }
    }
}

/// Structured, best-effort result of reading one confirmation email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripCandidate {
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub trip_type: Option<TripType>,
    pub confirmation_number: Option<String>,
    pub confidence_score: f64,
}

impl TripCandidate {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence_score < LOW_CONFIDENCE_THRESHOLD
    }
}

/// Where a pending trip came from, kept for audit and manual correction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailProvenance {
    pub subject: String,
    pub from: String,
    /// Already truncated by the ingestion pipeline.
    pub body: String,
}

/// An imported trip waiting for its owner to confirm or reject it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingTrip {
    pub id: Uuid,
    pub user_id: Uuid,
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub trip_type: Option<TripType>,
    pub confirmation_number: Option<String>,
    pub email_subject: String,
    pub email_from: String,
    pub email_body: String,
    pub confidence_score: f64,
    pub parsed_data: serde_json::Value,
    pub status: PendingStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl PendingTrip {
    pub fn new(user_id: Uuid, candidate: &TripCandidate, provenance: EmailProvenance) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            destination: candidate.destination.clone(),
            start_date: candidate.start_date,
            end_date: candidate.end_date,
            description: candidate.description.clone(),
            trip_type: candidate.trip_type,
            confirmation_number: candidate.confirmation_number.clone(),
            email_subject: provenance.subject,
            email_from: provenance.from,
            email_body: provenance.body,
            confidence_score: candidate.confidence_score,
            parsed_data: serde_json::to_value(candidate).unwrap_or_default(),
            status: PendingStatus::Pending,
            created_at: Utc::now(),
            reviewed_at: None,
        }
    }

    pub fn is_low_confidence(&self) -> bool {
        self.confidence_score < LOW_CONFIDENCE_THRESHOLD
    }
}
