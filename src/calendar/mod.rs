//! The calendar aggregation core.
//!
//! Joins booking periods with their reservation links and job display data,
//! normalizes the heterogeneous categories into one record shape, and filters
//! the result client-side.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────┐   ┌────────────┐   ┌───────────────┐
//! │ Reservation      │ → │ Period fetch │ → │ Enrichment │ → │ Normalization │
//! │ lookup (links)   │   │ (by id set,  │   │ (job title │   │ (one record   │
//! │                  │   │  job, company)│  │  + lead)   │   │  shape)       │
//! └──────────────────┘   └──────────────┘   └────────────┘   └───────────────┘
//!                                                                   ↓
//!                                                        ┌──────────────────┐
//!                                                        │ Client filter    │
//!                                                        │ (kind/scope/text)│
//!                                                        └──────────────────┘
//! ```
//!
//! The company-wide query additionally resolves each period's kind and entity
//! reference by fanning out over the three reservation-link tables.
//!
//! Every step is single-shot request/response: no retries, no timeouts, no
//! state across calls. Errors from the store propagate unchanged; absence of
//! rows is an empty vec, never an error.

pub mod domain;
pub mod filter;
pub mod fuzzy;
pub mod queries;
pub mod store;

pub use domain::{CalendarKind, CalendarRecord, CalendarRef, ProjectLead};
pub use filter::{CalendarFilter, CalendarScope, apply_calendar_filter};
pub use queries::{CalendarQuery, CalendarQueryKey};
pub use store::{CalendarStore, JobEnrichment, Page, PeriodRow, PeriodWindow, PgCalendarStore};
