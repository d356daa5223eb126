//! Database model structures.
//!
//! Each submodule defines the request and response types for one entity:
//!
//! - `*CreateDBRequest`: input for inserting a new row
//! - `*UpdateDBRequest`: partial update input (None fields are left unchanged)
//! - `*DBResponse`: the row as returned to application code
//!
//! Raw `FromRow` structs live next to the queries in [`crate::db::handlers`];
//! the types here are the boundary representation the rest of the crate sees.

pub mod booking_periods;
pub mod companies;
pub mod items;
pub mod jobs;
pub mod matters;
pub mod profiles;
pub mod time_logs;
pub mod vehicles;
