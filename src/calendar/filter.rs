//! Client-side filtering of normalized calendar events.
//!
//! Filters are ephemeral, built per render and applied in memory over the
//! records a calendar query already returned. Kind and scope are exact-match
//! predicates; free text goes through the approximate matcher in
//! [`crate::calendar::fuzzy`].

use crate::calendar::domain::{CalendarKind, CalendarRecord};
use crate::calendar::fuzzy;
use crate::types::{ItemId, JobId, UserId, VehicleId};
use std::collections::HashSet;

/// Acceptance threshold for the free-text match; lower admits more.
const TEXT_MATCH_THRESHOLD: f32 = 0.3;

/// Restricts results to one concrete entity. Unset fields don't constrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarScope {
    pub job_id: Option<JobId>,
    pub item_id: Option<ItemId>,
    pub vehicle_id: Option<VehicleId>,
    pub user_id: Option<UserId>,
}

/// Ephemeral, client-side calendar filter.
#[derive(Debug, Clone, Default)]
pub struct CalendarFilter {
    /// Allowed kinds; `None` admits every kind
    pub kinds: Option<HashSet<CalendarKind>>,
    pub scope: CalendarScope,
    /// Free-text query; blank or whitespace-only text is a no-op
    pub text: Option<String>,
}

/// Apply kind, scope and text predicates to already-normalized events.
///
/// Pure function: no I/O and no failure mode. A record missing an optional
/// field simply fails the predicate on that field. Without a text query the
/// input ordering is preserved; with one, survivors come back ranked best
/// match first.
pub fn apply_calendar_filter(events: Vec<CalendarRecord>, filter: &CalendarFilter) -> Vec<CalendarRecord> {
    let events: Vec<CalendarRecord> = events
        .into_iter()
        .filter(|event| matches_kinds(event, filter.kinds.as_ref()) && matches_scope(event, &filter.scope))
        .collect();

    let Some(text) = filter.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return events;
    };

    let extractors: [fn(&CalendarRecord) -> Option<&str>; 3] = [
        |event| Some(event.title.as_str()),
        |event| event.job_title.as_deref(),
        |event| event.project_lead.as_ref().and_then(|lead| lead.display_name.as_deref()),
    ];
    fuzzy::rank_by_similarity(events, text, &extractors, TEXT_MATCH_THRESHOLD)
}

fn matches_kinds(event: &CalendarRecord, kinds: Option<&HashSet<CalendarKind>>) -> bool {
    kinds.is_none_or(|kinds| kinds.contains(&event.kind))
}

fn matches_scope(event: &CalendarRecord, scope: &CalendarScope) -> bool {
    if let Some(job_id) = scope.job_id
        && event.r#ref.job_id != Some(job_id)
    {
        return false;
    }
    if let Some(vehicle_id) = scope.vehicle_id
        && event.r#ref.vehicle_id != Some(vehicle_id)
    {
        return false;
    }
    if let Some(user_id) = scope.user_id
        && event.r#ref.user_id != Some(user_id)
    {
        return false;
    }
    if let Some(item_id) = scope.item_id {
        // Older records carry a list of item ids instead of a single one;
        // either representation satisfies the scope
        let single = event.r#ref.item_id == Some(item_id);
        let listed = event.r#ref.item_ids.as_ref().is_some_and(|ids| ids.contains(&item_id));
        if !single && !listed {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::domain::{CalendarRef, ProjectLead};
    use crate::db::models::booking_periods::PeriodCategory;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn record(kind: CalendarKind, title: &str) -> CalendarRecord {
        CalendarRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            start: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            end: None,
            kind,
            r#ref: CalendarRef::default(),
            status: None,
            notes: None,
            location: None,
            meta: None,
            project_lead: None,
            category: PeriodCategory::Program,
            job_title: None,
        }
    }

    #[test]
    fn test_kind_filter_admits_only_listed_kinds() {
        let events = vec![record(CalendarKind::Vehicle, "Transport"), record(CalendarKind::Crew, "Crew assignment")];
        let filter = CalendarFilter {
            kinds: Some(HashSet::from([CalendarKind::Crew])),
            ..Default::default()
        };

        let result = apply_calendar_filter(events, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].kind, CalendarKind::Crew);
    }

    #[test]
    fn test_item_scope_matches_single_and_listed_representations() {
        let item_id = Uuid::new_v4();

        let mut single = record(CalendarKind::Item, "PA rig");
        single.r#ref.item_id = Some(item_id);

        let mut listed = record(CalendarKind::Item, "Light rig");
        listed.r#ref.item_ids = Some(vec![Uuid::new_v4(), item_id]);

        let mut neither = record(CalendarKind::Item, "Cable case");
        neither.r#ref.item_id = Some(Uuid::new_v4());

        let filter = CalendarFilter {
            scope: CalendarScope {
                item_id: Some(item_id),
                ..Default::default()
            },
            ..Default::default()
        };

        let result = apply_calendar_filter(vec![single.clone(), listed.clone(), neither], &filter);
        let ids: Vec<Uuid> = result.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![single.id, listed.id]);
    }

    #[test]
    fn test_scope_on_missing_field_excludes_the_record() {
        let events = vec![record(CalendarKind::Job, "Program")];
        let filter = CalendarFilter {
            scope: CalendarScope {
                vehicle_id: Some(Uuid::new_v4()),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(apply_calendar_filter(events, &filter).is_empty());
    }

    #[test]
    fn test_blank_text_is_a_no_op_on_membership_and_order() {
        let events = vec![
            record(CalendarKind::Vehicle, "Zebra run"),
            record(CalendarKind::Vehicle, "Airport shuttle"),
        ];
        let expected_ids: Vec<Uuid> = events.iter().map(|r| r.id).collect();

        for text in [None, Some(String::new()), Some("   ".to_string())] {
            let filter = CalendarFilter {
                text,
                ..Default::default()
            };
            let result = apply_calendar_filter(events.clone(), &filter);
            let ids: Vec<Uuid> = result.iter().map(|r| r.id).collect();
            assert_eq!(ids, expected_ids);
        }
    }

    #[test]
    fn test_text_searches_title_job_title_and_lead_name() {
        let mut by_title = record(CalendarKind::Vehicle, "Festival transport");
        by_title.job_title = Some("Unrelated".to_string());

        let mut by_job_title = record(CalendarKind::Job, "Day one");
        by_job_title.job_title = Some("Festival build".to_string());

        let mut by_lead = record(CalendarKind::Job, "Day two");
        by_lead.project_lead = Some(ProjectLead {
            id: Uuid::new_v4(),
            display_name: Some("Fest Ivalsson".to_string()),
            email: "fest@example.com".to_string(),
            avatar_url: None,
        });

        let unrelated = record(CalendarKind::Crew, "Crew assignment");

        let filter = CalendarFilter {
            text: Some("fest".to_string()),
            ..Default::default()
        };
        let result = apply_calendar_filter(vec![by_title, by_job_title, by_lead, unrelated], &filter);

        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|r| r.kind != CalendarKind::Crew));
    }

    #[test]
    fn test_text_ranking_puts_best_match_first() {
        let close = record(CalendarKind::Vehicle, "Transprot to Arlanda");
        let exact = record(CalendarKind::Vehicle, "Transport");

        let filter = CalendarFilter {
            text: Some("transport".to_string()),
            ..Default::default()
        };
        let result = apply_calendar_filter(vec![close.clone(), exact.clone()], &filter);

        let ids: Vec<Uuid> = result.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![exact.id, close.id]);
    }
}
