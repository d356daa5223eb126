//! Database models for time logs.

use crate::types::{CompanyId, JobId, TimeLogId, UserId};
use chrono::{DateTime, Utc};

/// Database request for starting a new time log
#[derive(Debug, Clone)]
pub struct TimeLogCreateDBRequest {
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub job_id: Option<JobId>,
    pub started_at: DateTime<Utc>,
    pub note: Option<String>,
}

/// Database response for a time log
#[derive(Debug, Clone)]
pub struct TimeLogDBResponse {
    pub id: TimeLogId,
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub job_id: Option<JobId>,
    pub started_at: DateTime<Utc>,
    /// Unset while the log is still running
    pub ended_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
