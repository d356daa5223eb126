//! Common type definitions shared across the crate.
//!
//! All entity IDs are UUIDs wrapped in type aliases for better type safety:
//!
//! - [`CompanyId`]: Tenant (company) identifier
//! - [`UserId`]: Crew member / profile identifier
//! - [`JobId`]: Job identifier
//! - [`VehicleId`]: Vehicle identifier
//! - [`ItemId`]: Equipment item identifier
//! - [`PeriodId`]: Booking period identifier
//! - [`MatterId`]: Internal matter identifier
//! - [`TimeLogId`]: Time log identifier

use uuid::Uuid;

// Type aliases for IDs
pub type CompanyId = Uuid;
pub type UserId = Uuid;
pub type JobId = Uuid;
pub type VehicleId = Uuid;
pub type ItemId = Uuid;
pub type PeriodId = Uuid;
pub type MatterId = Uuid;
pub type TimeLogId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&id), "550e8400");
    }
}
