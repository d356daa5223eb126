//! Database models for internal matters and their votes.

use crate::types::{CompanyId, MatterId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a matter. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatterStatus {
    #[default]
    Open,
    Closed,
}

impl MatterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatterStatus::Open => "open",
            MatterStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(MatterStatus::Open),
            "closed" => Some(MatterStatus::Closed),
            _ => None,
        }
    }
}

/// A single vote option. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Yes,
    No,
    Abstain,
}

impl VoteChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteChoice::Yes => "yes",
            VoteChoice::No => "no",
            VoteChoice::Abstain => "abstain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(VoteChoice::Yes),
            "no" => Some(VoteChoice::No),
            "abstain" => Some(VoteChoice::Abstain),
            _ => None,
        }
    }
}

/// Database request for creating a new matter
#[derive(Debug, Clone)]
pub struct MatterCreateDBRequest {
    pub company_id: CompanyId,
    pub title: String,
    pub body: Option<String>,
    pub created_by: UserId,
}

/// Database request for updating a matter
#[derive(Debug, Clone, Default)]
pub struct MatterUpdateDBRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<MatterStatus>,
}

/// Database response for a matter
#[derive(Debug, Clone)]
pub struct MatterDBResponse {
    pub id: MatterId,
    pub company_id: CompanyId,
    pub title: String,
    pub body: Option<String>,
    pub status: MatterStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database response for a single cast vote
#[derive(Debug, Clone)]
pub struct MatterVoteDBResponse {
    pub matter_id: MatterId,
    pub user_id: UserId,
    pub choice: VoteChoice,
    pub cast_at: DateTime<Utc>,
}

/// Aggregated vote counts for a matter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub yes: i64,
    pub no: i64,
    pub abstain: i64,
}
