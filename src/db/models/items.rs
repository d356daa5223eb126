//! Database models for equipment items.

use crate::types::{CompanyId, ItemId};
use chrono::{DateTime, Utc};

/// Database request for creating a new equipment item
#[derive(Debug, Clone)]
pub struct ItemCreateDBRequest {
    pub company_id: CompanyId,
    pub name: String,
    pub serial_number: Option<String>,
    pub quantity: i32,
}

/// Database request for updating an equipment item
#[derive(Debug, Clone, Default)]
pub struct ItemUpdateDBRequest {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub quantity: Option<i32>,
}

/// Database response for an equipment item
#[derive(Debug, Clone)]
pub struct ItemDBResponse {
    pub id: ItemId,
    pub company_id: CompanyId,
    pub name: String,
    pub serial_number: Option<String>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
