use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// A published trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trip {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a trip.
///
/// Both direct creation and pending-trip confirmation go through
/// [`NewTrip::new`], so they share one set of rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTrip {
    pub creator_id: Uuid,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
    pub is_private: bool,
}

impl NewTrip {
    pub fn new(
        creator_id: Uuid,
        destination: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        description: Option<String>,
        is_private: bool,
    ) -> CoreResult<Self> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(CoreError::ValidationError("Destination is required".to_string()));
        }

        let start_date = start_date
            .ok_or_else(|| CoreError::ValidationError("Start date is required".to_string()))?;
        let end_date = end_date
            .ok_or_else(|| CoreError::ValidationError("End date is required".to_string()))?;

        if end_date < start_date {
            return Err(CoreError::ValidationError(
                "End date must be after or equal to start date".to_string(),
            ));
        }

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            creator_id,
            destination: destination.to_string(),
            start_date,
            end_date,
            description,
            is_private,
        })
    }

    pub fn into_trip(self) -> Trip {
        Trip {
            id: Uuid::new_v4(),
            creator_id: self.creator_id,
            destination: self.destination,
            start_date: self.start_date,
            end_date: self.end_date,
            description: self.description,
            is_private: self.is_private,
            created_at: Utc::now(),
        }
    }
}
