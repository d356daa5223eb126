//! Database models for jobs.

use crate::types::{CompanyId, JobId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new job
#[derive(Debug, Clone)]
pub struct JobCreateDBRequest {
    pub company_id: CompanyId,
    pub title: String,
    pub description: Option<String>,
    /// Profile id of the project lead, if one is assigned
    pub project_lead: Option<UserId>,
    pub status: Option<String>,
}

/// Database request for updating a job
#[derive(Debug, Clone, Default)]
pub struct JobUpdateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_lead: Option<UserId>,
    pub status: Option<String>,
}

/// Database response for a job
#[derive(Debug, Clone)]
pub struct JobDBResponse {
    pub id: JobId,
    pub company_id: CompanyId,
    pub title: String,
    pub description: Option<String>,
    pub project_lead: Option<UserId>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
