//! Database models for crew member profiles.

use crate::types::{CompanyId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new profile
#[derive(Debug, Clone)]
pub struct ProfileCreateDBRequest {
    pub company_id: CompanyId,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    /// Free-form role label shown in rosters, e.g. "driver" or "sound technician"
    pub role: Option<String>,
}

/// Database request for updating a profile
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateDBRequest {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

/// Database response for a profile
#[derive(Debug, Clone)]
pub struct ProfileDBResponse {
    pub id: UserId,
    pub company_id: CompanyId,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
