//! Database models for companies (tenants).

use crate::types::CompanyId;
use chrono::{DateTime, Utc};

/// Database request for creating a new company
#[derive(Debug, Clone)]
pub struct CompanyCreateDBRequest {
    pub name: String,
    pub org_number: Option<String>,
}

/// Database request for updating a company
#[derive(Debug, Clone, Default)]
pub struct CompanyUpdateDBRequest {
    pub name: Option<String>,
    pub org_number: Option<String>,
}

/// Database response for a company
#[derive(Debug, Clone)]
pub struct CompanyDBResponse {
    pub id: CompanyId,
    pub name: String,
    pub org_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
