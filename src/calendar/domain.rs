//! Normalization of booking-period rows into calendar records.
//!
//! Everything here is pure: rows fetched by a query variant are projected into
//! the single [`CalendarRecord`] shape the calendar UI consumes. No I/O, no
//! failure modes.

use crate::calendar::store::{JobEnrichment, PeriodRow};
use crate::db::models::booking_periods::PeriodCategory;
use crate::types::{ItemId, JobId, PeriodId, UserId, VehicleId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Which domain object a calendar record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarKind {
    Job,
    Item,
    Vehicle,
    Crew,
}

impl CalendarKind {
    /// Derive the kind from a period's category tag.
    ///
    /// Unrecognized categories land on `Job`, same as `program`.
    pub fn from_category(category: &str) -> Self {
        match category {
            "transport" => CalendarKind::Vehicle,
            "equipment" => CalendarKind::Item,
            "crew" => CalendarKind::Crew,
            _ => CalendarKind::Job,
        }
    }
}

/// The entities a calendar record points at.
///
/// Entity-scoped queries set exactly the field of the queried entity;
/// the company-wide query sets whichever field its link resolution found.
/// `job_id` is independent of the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalendarRef {
    pub job_id: Option<JobId>,
    pub item_id: Option<ItemId>,
    /// Older bookings carried several items on one period; both shapes are
    /// accepted by the client filter
    pub item_ids: Option<Vec<ItemId>>,
    pub vehicle_id: Option<VehicleId>,
    pub user_id: Option<UserId>,
}

/// Project-lead profile shown on company-wide calendar entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectLead {
    pub id: UserId,
    pub display_name: Option<String>,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// The normalized, UI-facing projection of a booking period.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarRecord {
    pub id: PeriodId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub kind: CalendarKind,
    pub r#ref: CalendarRef,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub meta: Option<serde_json::Value>,
    /// Only populated by the company-wide query
    pub project_lead: Option<ProjectLead>,
    pub category: PeriodCategory,
    pub job_title: Option<String>,
}

// Title fallbacks are fixed per query variant, not per record kind.
pub(crate) const VEHICLE_TITLE_FALLBACK: &str = "Transport";
pub(crate) const ITEM_TITLE_FALLBACK: &str = "Equipment";
pub(crate) const CREW_TITLE_FALLBACK: &str = "Crew assignment";
pub(crate) const JOB_TITLE_FALLBACK: &str = "Program";
pub(crate) const COMPANY_TITLE_FALLBACK: &str = "Event";

/// Project one fetched row into a [`CalendarRecord`].
pub(crate) fn normalize_period(
    row: PeriodRow,
    r#ref: CalendarRef,
    fallback_title: &str,
    enrichment: &JobEnrichment,
) -> CalendarRecord {
    let kind = CalendarKind::from_category(&row.category);
    let category = PeriodCategory::parse(&row.category).unwrap_or_default();
    let job_title = row.job_id.and_then(|id| enrichment.titles.get(&id).cloned());
    let project_lead = row.job_id.and_then(|id| enrichment.leads.get(&id).cloned());

    let title = match row.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => fallback_title.to_string(),
    };

    CalendarRecord {
        id: row.id,
        title,
        start: row.start_at,
        end: row.end_at,
        kind,
        r#ref,
        status: row.status,
        notes: row.notes,
        location: row.location,
        meta: row.meta,
        project_lead,
        category,
        job_title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn row(category: &str, title: Option<&str>) -> PeriodRow {
        PeriodRow {
            id: Uuid::new_v4(),
            job_id: None,
            title: title.map(String::from),
            start_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            end_at: None,
            category: category.to_string(),
            status: None,
            notes: None,
            location: None,
            meta: None,
        }
    }

    #[test]
    fn test_kind_is_a_pure_function_of_category() {
        assert_eq!(CalendarKind::from_category("transport"), CalendarKind::Vehicle);
        assert_eq!(CalendarKind::from_category("equipment"), CalendarKind::Item);
        assert_eq!(CalendarKind::from_category("crew"), CalendarKind::Crew);
        assert_eq!(CalendarKind::from_category("program"), CalendarKind::Job);
        assert_eq!(CalendarKind::from_category("something-else"), CalendarKind::Job);
        assert_eq!(CalendarKind::from_category(""), CalendarKind::Job);
    }

    #[test]
    fn test_title_fallback_applies_to_missing_and_blank_titles() {
        let record = normalize_period(row("equipment", None), CalendarRef::default(), ITEM_TITLE_FALLBACK, &JobEnrichment::default());
        assert_eq!(record.title, "Equipment");

        let record = normalize_period(row("equipment", Some("   ")), CalendarRef::default(), ITEM_TITLE_FALLBACK, &JobEnrichment::default());
        assert_eq!(record.title, "Equipment");

        let record = normalize_period(
            row("equipment", Some("PA rig")),
            CalendarRef::default(),
            ITEM_TITLE_FALLBACK,
            &JobEnrichment::default(),
        );
        assert_eq!(record.title, "PA rig");
    }

    #[test]
    fn test_enrichment_maps_are_merged_by_job_id() {
        let job_id = Uuid::new_v4();
        let mut period = row("program", Some("Load-in"));
        period.job_id = Some(job_id);

        let mut enrichment = JobEnrichment::default();
        enrichment.titles.insert(job_id, "Summer tour".to_string());
        enrichment.leads.insert(
            job_id,
            ProjectLead {
                id: Uuid::new_v4(),
                display_name: Some("Sam Berg".to_string()),
                email: "sam@example.com".to_string(),
                avatar_url: None,
            },
        );

        let record = normalize_period(period, CalendarRef::default(), COMPANY_TITLE_FALLBACK, &enrichment);
        assert_eq!(record.job_title.as_deref(), Some("Summer tour"));
        assert_eq!(record.project_lead.as_ref().and_then(|l| l.display_name.as_deref()), Some("Sam Berg"));
    }

    #[test]
    fn test_unknown_category_defaults_to_program() {
        let record = normalize_period(row("offsite", None), CalendarRef::default(), COMPANY_TITLE_FALLBACK, &JobEnrichment::default());
        assert_eq!(record.kind, CalendarKind::Job);
        assert_eq!(record.category, PeriodCategory::Program);
    }
}
