//! Database models for booking periods and their reservation links.
//!
//! A booking period is a span of time reserved for one purpose. Its `category`
//! tags what the span is about; the matching reservation link (vehicle, item
//! or crew member) is stored in a separate join table per entity kind.

use crate::types::{CompanyId, ItemId, JobId, PeriodId, UserId, VehicleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a booking period reserves time for.
///
/// Stored as lowercase text in the `category` column; unknown values parse to
/// `None` and default to `Program` at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodCategory {
    #[default]
    Program,
    Equipment,
    Crew,
    Transport,
}

impl PeriodCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodCategory::Program => "program",
            PeriodCategory::Equipment => "equipment",
            PeriodCategory::Crew => "crew",
            PeriodCategory::Transport => "transport",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "program" => Some(PeriodCategory::Program),
            "equipment" => Some(PeriodCategory::Equipment),
            "crew" => Some(PeriodCategory::Crew),
            "transport" => Some(PeriodCategory::Transport),
            _ => None,
        }
    }
}

/// Database request for creating a new booking period
#[derive(Debug, Clone)]
pub struct BookingPeriodCreateDBRequest {
    pub company_id: CompanyId,
    pub job_id: Option<JobId>,
    pub title: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub category: PeriodCategory,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub meta: Option<serde_json::Value>,
}

/// Database request for updating a booking period
#[derive(Debug, Clone, Default)]
pub struct BookingPeriodUpdateDBRequest {
    pub title: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub meta: Option<serde_json::Value>,
}

/// Database response for a booking period
#[derive(Debug, Clone)]
pub struct BookingPeriodDBResponse {
    pub id: PeriodId,
    pub company_id: CompanyId,
    pub job_id: Option<JobId>,
    pub title: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub category: PeriodCategory,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub meta: Option<serde_json::Value>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One reservation link row: the entity a period reserves.
///
/// At most one of the entity fields is set, matching the join table the row
/// came from.
#[derive(Debug, Clone)]
pub struct ReservationLinkDBResponse {
    pub time_period_id: PeriodId,
    pub vehicle_id: Option<VehicleId>,
    pub item_id: Option<ItemId>,
    pub user_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for category in [
            PeriodCategory::Program,
            PeriodCategory::Equipment,
            PeriodCategory::Crew,
            PeriodCategory::Transport,
        ] {
            assert_eq!(PeriodCategory::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_unknown_category_is_none() {
        assert_eq!(PeriodCategory::parse("meeting"), None);
        assert_eq!(PeriodCategory::parse(""), None);
    }
}
