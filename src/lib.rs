//! # opsdeck: operations platform backend core
//!
//! `opsdeck` is the data layer of a multi-tenant operations-management
//! platform: companies run their crews, vehicle fleets, equipment inventory,
//! jobs, internal matters and time logging against it, and read everything
//! back through calendar views. The HTTP surface, authentication and UI live
//! in a separate application; this crate owns data access and domain
//! projection only.
//!
//! ## Architecture
//!
//! All persistence is PostgreSQL via [SQLx](https://github.com/launchbadge/sqlx).
//! The [`db`] module follows the repository pattern: one repository per
//! entity, wrapping a connection or transaction and returning typed models.
//!
//! The [`calendar`] module is the read path the scheduling views are built
//! on. It aggregates booking periods across three reservation-link tables,
//! enriches them with job display data, normalizes the result into a single
//! record shape, and applies client-side kind/scope/fuzzy-text filtering.
//! Each calendar query is exposed as a descriptor with a stable value key so
//! an external caching layer can identify result sets.
//!
//! ## Example
//!
//! ```ignore
//! use opsdeck::calendar::{CalendarQuery, PgCalendarStore};
//! use opsdeck::config::Config;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load("config.yaml")?;
//! let pool = opsdeck::db::connect(&config.database).await?;
//!
//! let store = PgCalendarStore::new(pool);
//! let records = CalendarQuery::company(company_id, None).run(&store).await?;
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod config;
pub mod db;
pub mod telemetry;
pub mod types;
