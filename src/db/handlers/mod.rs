//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! Most repositories implement the [`Repository`] trait; [`TimeLogs`] exposes a
//! start/stop lifecycle instead of generic updates.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Companies`]: Tenant management
//! - [`Profiles`]: Crew member directory
//! - [`Vehicles`]: Vehicle inventory
//! - [`Items`]: Equipment inventory
//! - [`Jobs`]: Job management
//! - [`BookingPeriods`]: Scheduling writes and reservation links
//! - [`Matters`]: Internal matters and voting
//! - [`TimeLogs`]: Time logging

pub mod booking_periods;
pub mod companies;
pub mod items;
pub mod jobs;
pub mod matters;
pub mod profiles;
pub mod repository;
pub mod time_logs;
pub mod vehicles;

pub use booking_periods::BookingPeriods;
pub use companies::Companies;
pub use items::Items;
pub use jobs::Jobs;
pub use matters::Matters;
pub use profiles::Profiles;
pub use repository::Repository;
pub use time_logs::TimeLogs;
pub use vehicles::Vehicles;
