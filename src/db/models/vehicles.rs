//! Database models for vehicles.

use crate::types::{CompanyId, VehicleId};
use chrono::{DateTime, Utc};

/// Database request for creating a new vehicle
#[derive(Debug, Clone)]
pub struct VehicleCreateDBRequest {
    pub company_id: CompanyId,
    pub name: String,
    pub registration: Option<String>,
    pub model: Option<String>,
    pub seats: Option<i32>,
}

/// Database request for updating a vehicle
#[derive(Debug, Clone, Default)]
pub struct VehicleUpdateDBRequest {
    pub name: Option<String>,
    pub registration: Option<String>,
    pub model: Option<String>,
    pub seats: Option<i32>,
}

/// Database response for a vehicle
#[derive(Debug, Clone)]
pub struct VehicleDBResponse {
    pub id: VehicleId,
    pub company_id: CompanyId,
    pub name: String,
    pub registration: Option<String>,
    pub model: Option<String>,
    pub seats: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
