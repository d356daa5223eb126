//! The calendar query variants.
//!
//! Each variant is exposed as a [`CalendarQuery`] descriptor: a value carrying
//! the [`CalendarQueryKey`] used by the caching layer plus an async `run`
//! against any [`CalendarStore`]. Every input that affects the result set is
//! part of the key, so two descriptors with equal keys return the same data.
//!
//! All variants follow the same pipeline: resolve the period set, batch-fetch
//! job display data, project into [`CalendarRecord`]s. The company-wide
//! variant additionally resolves which entity each period reserves by fanning
//! out over the three reservation-link tables.

use crate::calendar::domain::{
    COMPANY_TITLE_FALLBACK, CREW_TITLE_FALLBACK, CalendarKind, CalendarRecord, CalendarRef, ITEM_TITLE_FALLBACK,
    JOB_TITLE_FALLBACK, VEHICLE_TITLE_FALLBACK, normalize_period,
};
use crate::calendar::store::{CalendarStore, JobEnrichment, PeriodRow, PeriodWindow};
use crate::db::errors::Result;
use crate::db::models::booking_periods::PeriodCategory;
use crate::types::{CompanyId, ItemId, JobId, PeriodId, UserId, VehicleId};
use tracing::instrument;

/// Cache identity of one calendar query.
///
/// The caching layer keys result sets by this value; anything that changes
/// the rows a query returns must appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarQueryKey {
    Company {
        company_id: CompanyId,
        category: Option<PeriodCategory>,
    },
    Vehicle {
        company_id: CompanyId,
        vehicle_id: VehicleId,
        window: PeriodWindow,
    },
    Item {
        company_id: CompanyId,
        item_id: ItemId,
    },
    Crew {
        company_id: CompanyId,
        user_id: UserId,
    },
    Job {
        company_id: CompanyId,
        job_id: JobId,
    },
}

/// One runnable calendar query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarQuery {
    key: CalendarQueryKey,
}

impl CalendarQuery {
    /// Company-wide calendar, optionally restricted to one category
    pub fn company(company_id: CompanyId, category: Option<PeriodCategory>) -> Self {
        Self {
            key: CalendarQueryKey::Company { company_id, category },
        }
    }

    /// Periods reserved by one vehicle, with optional date bound and pagination
    pub fn vehicle(company_id: CompanyId, vehicle_id: VehicleId, window: PeriodWindow) -> Self {
        Self {
            key: CalendarQueryKey::Vehicle {
                company_id,
                vehicle_id,
                window,
            },
        }
    }

    /// Periods reserved by one equipment item
    pub fn item(company_id: CompanyId, item_id: ItemId) -> Self {
        Self {
            key: CalendarQueryKey::Item { company_id, item_id },
        }
    }

    /// Periods a crew member is assigned to
    pub fn crew(company_id: CompanyId, user_id: UserId) -> Self {
        Self {
            key: CalendarQueryKey::Crew { company_id, user_id },
        }
    }

    /// A job's program periods
    pub fn job(company_id: CompanyId, job_id: JobId) -> Self {
        Self {
            key: CalendarQueryKey::Job { company_id, job_id },
        }
    }

    /// The cache key for this query
    pub fn key(&self) -> CalendarQueryKey {
        self.key
    }

    /// Execute the query against the given store.
    ///
    /// Any upstream fetch error aborts the whole query and propagates
    /// unchanged; an empty result set is a success, not an error.
    #[instrument(skip(self, store), fields(key = ?self.key), err)]
    pub async fn run<S>(&self, store: &S) -> Result<Vec<CalendarRecord>>
    where
        S: CalendarStore + ?Sized,
    {
        match self.key {
            CalendarQueryKey::Company { company_id, category } => company_calendar(store, company_id, category).await,
            CalendarQueryKey::Vehicle {
                company_id,
                vehicle_id,
                window,
            } => vehicle_calendar(store, company_id, vehicle_id, window).await,
            CalendarQueryKey::Item { company_id, item_id } => item_calendar(store, company_id, item_id).await,
            CalendarQueryKey::Crew { company_id, user_id } => crew_calendar(store, company_id, user_id).await,
            CalendarQueryKey::Job { company_id, job_id } => job_calendar(store, company_id, job_id).await,
        }
    }
}

/// Batch-fetch job display data for the distinct job ids in `rows`.
///
/// Zero distinct job ids skips the round trip entirely.
async fn job_enrichment_for<S>(store: &S, company_id: CompanyId, rows: &[PeriodRow], with_leads: bool) -> Result<JobEnrichment>
where
    S: CalendarStore + ?Sized,
{
    let mut job_ids: Vec<JobId> = rows.iter().filter_map(|row| row.job_id).collect();
    job_ids.sort_unstable();
    job_ids.dedup();

    if job_ids.is_empty() {
        return Ok(JobEnrichment::default());
    }

    store.job_enrichment(company_id, &job_ids, with_leads).await
}

async fn vehicle_calendar<S>(store: &S, company_id: CompanyId, vehicle_id: VehicleId, window: PeriodWindow) -> Result<Vec<CalendarRecord>>
where
    S: CalendarStore + ?Sized,
{
    let ids = store.vehicle_period_ids(vehicle_id).await?;
    // Nothing reserved: skip the period fetch, an empty id list must not hit the backend
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = store.periods_by_ids(company_id, PeriodCategory::Transport, &ids, window).await?;
    let enrichment = job_enrichment_for(store, company_id, &rows, false).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let r#ref = CalendarRef {
                job_id: row.job_id,
                vehicle_id: Some(vehicle_id),
                ..Default::default()
            };
            normalize_period(row, r#ref, VEHICLE_TITLE_FALLBACK, &enrichment)
        })
        .collect())
}

async fn item_calendar<S>(store: &S, company_id: CompanyId, item_id: ItemId) -> Result<Vec<CalendarRecord>>
where
    S: CalendarStore + ?Sized,
{
    let ids = store.item_period_ids(item_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = store
        .periods_by_ids(company_id, PeriodCategory::Equipment, &ids, PeriodWindow::default())
        .await?;
    let enrichment = job_enrichment_for(store, company_id, &rows, false).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let r#ref = CalendarRef {
                job_id: row.job_id,
                item_id: Some(item_id),
                ..Default::default()
            };
            normalize_period(row, r#ref, ITEM_TITLE_FALLBACK, &enrichment)
        })
        .collect())
}

async fn crew_calendar<S>(store: &S, company_id: CompanyId, user_id: UserId) -> Result<Vec<CalendarRecord>>
where
    S: CalendarStore + ?Sized,
{
    let ids = store.crew_period_ids(user_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = store
        .periods_by_ids(company_id, PeriodCategory::Crew, &ids, PeriodWindow::default())
        .await?;
    let enrichment = job_enrichment_for(store, company_id, &rows, false).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let r#ref = CalendarRef {
                job_id: row.job_id,
                user_id: Some(user_id),
                ..Default::default()
            };
            normalize_period(row, r#ref, CREW_TITLE_FALLBACK, &enrichment)
        })
        .collect())
}

async fn job_calendar<S>(store: &S, company_id: CompanyId, job_id: JobId) -> Result<Vec<CalendarRecord>>
where
    S: CalendarStore + ?Sized,
{
    let rows = store.periods_by_job(company_id, job_id).await?;
    let enrichment = job_enrichment_for(store, company_id, &rows, false).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let r#ref = CalendarRef {
                job_id: Some(job_id),
                ..Default::default()
            };
            normalize_period(row, r#ref, JOB_TITLE_FALLBACK, &enrichment)
        })
        .collect())
}

async fn company_calendar<S>(store: &S, company_id: CompanyId, category: Option<PeriodCategory>) -> Result<Vec<CalendarRecord>>
where
    S: CalendarStore + ?Sized,
{
    let rows = store.periods_by_company(company_id, category).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let period_ids: Vec<PeriodId> = rows.iter().map(|row| row.id).collect();

    // The three link lookups are independent; run them concurrently and fail
    // fast on the first error.
    let (vehicles, items, crews) = tokio::try_join!(
        store.vehicle_links(&period_ids),
        store.item_links(&period_ids),
        store.crew_links(&period_ids),
    )?;

    let enrichment = job_enrichment_for(store, company_id, &rows, true).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let mut r#ref = CalendarRef {
                job_id: row.job_id,
                ..Default::default()
            };
            // A period whose category implies a link can still lack one; the
            // ref field is simply left unset in that case.
            match CalendarKind::from_category(&row.category) {
                CalendarKind::Vehicle => r#ref.vehicle_id = vehicles.get(&row.id).copied(),
                CalendarKind::Item => r#ref.item_id = items.get(&row.id).copied(),
                CalendarKind::Crew => r#ref.user_id = crews.get(&row.id).copied(),
                CalendarKind::Job => {}
            }
            normalize_period(row, r#ref, COMPANY_TITLE_FALLBACK, &enrichment)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::domain::ProjectLead;
    use crate::calendar::store::Page;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Debug, Default)]
    struct CallCounts {
        link_lookups: usize,
        period_fetches: usize,
        enrichment_fetches: usize,
        link_map_fetches: usize,
    }

    struct FakeJob {
        id: JobId,
        title: String,
        lead: Option<ProjectLead>,
    }

    /// In-memory store with call counting, used to pin the query pipeline's
    /// short-circuits and fan-out behavior.
    #[derive(Default)]
    struct FakeStore {
        periods: Vec<(CompanyId, PeriodRow)>,
        vehicle_links: Vec<(PeriodId, VehicleId)>,
        item_links: Vec<(PeriodId, ItemId)>,
        crew_links: Vec<(PeriodId, UserId)>,
        jobs: Vec<FakeJob>,
        counts: Mutex<CallCounts>,
        last_window: Mutex<Option<PeriodWindow>>,
    }

    impl FakeStore {
        fn sorted_periods(&self, company_id: CompanyId, category: Option<&str>) -> Vec<PeriodRow> {
            let mut rows: Vec<PeriodRow> = self
                .periods
                .iter()
                .filter(|(company, row)| *company == company_id && category.is_none_or(|c| row.category == c))
                .map(|(_, row)| row.clone())
                .collect();
            rows.sort_by_key(|row| row.start_at);
            rows
        }
    }

    #[async_trait]
    impl CalendarStore for FakeStore {
        async fn vehicle_period_ids(&self, vehicle_id: VehicleId) -> Result<Vec<PeriodId>> {
            self.counts.lock().unwrap().link_lookups += 1;
            Ok(self
                .vehicle_links
                .iter()
                .filter(|(_, v)| *v == vehicle_id)
                .map(|(p, _)| *p)
                .collect())
        }

        async fn item_period_ids(&self, item_id: ItemId) -> Result<Vec<PeriodId>> {
            self.counts.lock().unwrap().link_lookups += 1;
            Ok(self.item_links.iter().filter(|(_, i)| *i == item_id).map(|(p, _)| *p).collect())
        }

        async fn crew_period_ids(&self, user_id: UserId) -> Result<Vec<PeriodId>> {
            self.counts.lock().unwrap().link_lookups += 1;
            Ok(self.crew_links.iter().filter(|(_, u)| *u == user_id).map(|(p, _)| *p).collect())
        }

        async fn periods_by_ids(
            &self,
            company_id: CompanyId,
            category: PeriodCategory,
            ids: &[PeriodId],
            window: PeriodWindow,
        ) -> Result<Vec<PeriodRow>> {
            self.counts.lock().unwrap().period_fetches += 1;
            *self.last_window.lock().unwrap() = Some(window);

            let rows: Vec<PeriodRow> = self
                .sorted_periods(company_id, Some(category.as_str()))
                .into_iter()
                .filter(|row| ids.contains(&row.id))
                .filter(|row| window.from.is_none_or(|from| row.start_at >= from))
                .collect();

            Ok(match window.page {
                Some(page) => rows
                    .into_iter()
                    .skip(page.offset as usize)
                    .take(page.limit as usize)
                    .collect(),
                None => rows,
            })
        }

        async fn periods_by_job(&self, company_id: CompanyId, job_id: JobId) -> Result<Vec<PeriodRow>> {
            self.counts.lock().unwrap().period_fetches += 1;
            Ok(self
                .sorted_periods(company_id, Some("program"))
                .into_iter()
                .filter(|row| row.job_id == Some(job_id))
                .collect())
        }

        async fn periods_by_company(&self, company_id: CompanyId, category: Option<PeriodCategory>) -> Result<Vec<PeriodRow>> {
            self.counts.lock().unwrap().period_fetches += 1;
            Ok(self.sorted_periods(company_id, category.map(PeriodCategory::as_str)))
        }

        async fn job_enrichment(&self, _company_id: CompanyId, job_ids: &[JobId], with_leads: bool) -> Result<JobEnrichment> {
            self.counts.lock().unwrap().enrichment_fetches += 1;
            let mut enrichment = JobEnrichment::default();
            for job in self.jobs.iter().filter(|job| job_ids.contains(&job.id)) {
                enrichment.titles.insert(job.id, job.title.clone());
                if with_leads && let Some(lead) = &job.lead {
                    enrichment.leads.insert(job.id, lead.clone());
                }
            }
            Ok(enrichment)
        }

        async fn vehicle_links(&self, period_ids: &[PeriodId]) -> Result<HashMap<PeriodId, VehicleId>> {
            self.counts.lock().unwrap().link_map_fetches += 1;
            Ok(self
                .vehicle_links
                .iter()
                .filter(|(p, _)| period_ids.contains(p))
                .copied()
                .collect())
        }

        async fn item_links(&self, period_ids: &[PeriodId]) -> Result<HashMap<PeriodId, ItemId>> {
            self.counts.lock().unwrap().link_map_fetches += 1;
            Ok(self.item_links.iter().filter(|(p, _)| period_ids.contains(p)).copied().collect())
        }

        async fn crew_links(&self, period_ids: &[PeriodId]) -> Result<HashMap<PeriodId, UserId>> {
            self.counts.lock().unwrap().link_map_fetches += 1;
            Ok(self.crew_links.iter().filter(|(p, _)| period_ids.contains(p)).copied().collect())
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn period(category: &str, start: DateTime<Utc>) -> PeriodRow {
        PeriodRow {
            id: Uuid::new_v4(),
            job_id: None,
            title: None,
            start_at: start,
            end_at: None,
            category: category.to_string(),
            status: None,
            notes: None,
            location: None,
            meta: None,
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_zero_links_short_circuits_the_period_fetch() {
        let company_id = Uuid::new_v4();
        let mut store = FakeStore::default();
        // A transport period exists but nothing links the queried vehicle to it
        store.periods.push((company_id, period("transport", at(1, 9))));

        let records = CalendarQuery::vehicle(company_id, Uuid::new_v4(), PeriodWindow::default())
            .run(&store)
            .await
            .unwrap();

        assert!(records.is_empty());
        let counts = store.counts.lock().unwrap();
        assert_eq!(counts.link_lookups, 1);
        assert_eq!(counts.period_fetches, 0, "period fetch must not run for an empty id set");
        assert_eq!(counts.enrichment_fetches, 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_zero_job_ids_skips_the_enrichment_fetch() {
        let company_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();
        let mut store = FakeStore::default();
        let row = period("transport", at(1, 9));
        store.vehicle_links.push((row.id, vehicle_id));
        store.periods.push((company_id, row));

        let records = CalendarQuery::vehicle(company_id, vehicle_id, PeriodWindow::default())
            .run(&store)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(store.counts.lock().unwrap().enrichment_fetches, 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_item_scoped_query_sets_ref_and_fallback_title() {
        let company_id = Uuid::new_v4();
        let item_id = Uuid::new_v4();
        let mut store = FakeStore::default();
        let row = period("equipment", at(2, 10));
        store.item_links.push((row.id, item_id));
        store.periods.push((company_id, row));

        let records = CalendarQuery::item(company_id, item_id).run(&store).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Equipment");
        assert_eq!(records[0].kind, CalendarKind::Item);
        assert_eq!(records[0].r#ref.item_id, Some(item_id));
        assert_eq!(records[0].r#ref.vehicle_id, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_crew_query_uses_crew_fallback_and_user_ref() {
        let company_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let mut store = FakeStore::default();
        let row = period("crew", at(3, 8));
        store.crew_links.push((row.id, user_id));
        store.periods.push((company_id, row));

        let records = CalendarQuery::crew(company_id, user_id).run(&store).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Crew assignment");
        assert_eq!(records[0].r#ref.user_id, Some(user_id));
    }

    #[test_log::test(tokio::test)]
    async fn test_vehicle_pagination_requests_the_inclusive_row_range() {
        let company_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();
        let mut store = FakeStore::default();

        // 30 reserved transport periods, one per hour-ish slot across June
        let mut expected_ids = Vec::new();
        for i in 0..30u32 {
            let row = period("transport", at(1 + i / 24, i % 24));
            store.vehicle_links.push((row.id, vehicle_id));
            expected_ids.push(row.id);
            store.periods.push((company_id, row));
        }

        let window = PeriodWindow {
            from: None,
            page: Some(Page::new(20, 10)),
        };
        let records = CalendarQuery::vehicle(company_id, vehicle_id, window).run(&store).await.unwrap();

        assert_eq!(records.len(), 10);
        assert_eq!(records[0].id, expected_ids[20]);
        assert_eq!(records[9].id, expected_ids[29]);

        let recorded = store.last_window.lock().unwrap().unwrap();
        let page = recorded.page.unwrap();
        assert_eq!((page.first_row(), page.last_row()), (20, 29));
    }

    #[test_log::test(tokio::test)]
    async fn test_vehicle_from_date_is_an_inclusive_lower_bound() {
        let company_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();
        let mut store = FakeStore::default();

        let early = period("transport", at(1, 9));
        let cutoff = at(15, 0);
        let on_cutoff = period("transport", cutoff);
        let late = period("transport", at(20, 9));
        for row in [&early, &on_cutoff, &late] {
            store.vehicle_links.push((row.id, vehicle_id));
        }
        store.periods.push((company_id, early.clone()));
        store.periods.push((company_id, on_cutoff.clone()));
        store.periods.push((company_id, late.clone()));

        let bounded = CalendarQuery::vehicle(
            company_id,
            vehicle_id,
            PeriodWindow {
                from: Some(cutoff),
                page: None,
            },
        )
        .run(&store)
        .await
        .unwrap();
        let ids: Vec<PeriodId> = bounded.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![on_cutoff.id, late.id]);

        let unbounded = CalendarQuery::vehicle(company_id, vehicle_id, PeriodWindow::default())
            .run(&store)
            .await
            .unwrap();
        assert_eq!(unbounded.len(), 3);
    }

    #[test_log::test(tokio::test)]
    async fn test_company_query_resolves_kinds_and_tolerates_missing_links() {
        let company_id = Uuid::new_v4();
        let item_id = Uuid::new_v4();
        let mut store = FakeStore::default();

        // P1: transport period with no reservation link at all
        let p1 = period("transport", at(1, 9));
        // P2: equipment period linked to item I1
        let p2 = period("equipment", at(2, 9));
        store.item_links.push((p2.id, item_id));
        store.periods.push((company_id, p1.clone()));
        store.periods.push((company_id, p2.clone()));

        let records = CalendarQuery::company(company_id, None).run(&store).await.unwrap();

        assert_eq!(records.len(), 2);
        let r1 = records.iter().find(|r| r.id == p1.id).unwrap();
        assert_eq!(r1.kind, CalendarKind::Vehicle);
        assert_eq!(r1.r#ref.vehicle_id, None, "unresolved link leaves the ref unset");

        let r2 = records.iter().find(|r| r.id == p2.id).unwrap();
        assert_eq!(r2.kind, CalendarKind::Item);
        assert_eq!(r2.r#ref.item_id, Some(item_id));

        // All three link tables were consulted
        assert_eq!(store.counts.lock().unwrap().link_map_fetches, 3);
    }

    #[test_log::test(tokio::test)]
    async fn test_company_query_populates_job_title_and_lead() {
        let company_id = Uuid::new_v4();
        let job_id = Uuid::new_v4();
        let mut store = FakeStore::default();

        store.jobs.push(FakeJob {
            id: job_id,
            title: "Autumn festival".to_string(),
            lead: Some(ProjectLead {
                id: Uuid::new_v4(),
                display_name: Some("Kim Lindqvist".to_string()),
                email: "kim@example.com".to_string(),
                avatar_url: None,
            }),
        });

        let mut row = period("program", at(5, 12));
        row.job_id = Some(job_id);
        store.periods.push((company_id, row));

        let records = CalendarQuery::company(company_id, None).run(&store).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Event");
        assert_eq!(records[0].kind, CalendarKind::Job);
        assert_eq!(records[0].r#ref.job_id, Some(job_id));
        assert_eq!(records[0].job_title.as_deref(), Some("Autumn festival"));
        assert_eq!(
            records[0].project_lead.as_ref().and_then(|l| l.display_name.as_deref()),
            Some("Kim Lindqvist")
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_entity_scoped_queries_do_not_fetch_project_leads() {
        let company_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();
        let job_id = Uuid::new_v4();
        let mut store = FakeStore::default();

        store.jobs.push(FakeJob {
            id: job_id,
            title: "Corporate shuttle".to_string(),
            lead: Some(ProjectLead {
                id: Uuid::new_v4(),
                display_name: Some("Alex Moe".to_string()),
                email: "alex@example.com".to_string(),
                avatar_url: None,
            }),
        });

        let mut row = period("transport", at(7, 7));
        row.job_id = Some(job_id);
        store.vehicle_links.push((row.id, vehicle_id));
        store.periods.push((company_id, row));

        let records = CalendarQuery::vehicle(company_id, vehicle_id, PeriodWindow::default())
            .run(&store)
            .await
            .unwrap();

        assert_eq!(records[0].job_title.as_deref(), Some("Corporate shuttle"));
        assert!(records[0].project_lead.is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_job_query_filters_to_the_job_and_orders_by_start() {
        let company_id = Uuid::new_v4();
        let job_id = Uuid::new_v4();
        let other_job = Uuid::new_v4();
        let mut store = FakeStore::default();
        store.jobs.push(FakeJob {
            id: job_id,
            title: "Warehouse move".to_string(),
            lead: None,
        });

        let mut second = period("program", at(10, 14));
        second.job_id = Some(job_id);
        let mut first = period("program", at(10, 9));
        first.job_id = Some(job_id);
        let mut unrelated = period("program", at(10, 11));
        unrelated.job_id = Some(other_job);
        store.periods.push((company_id, second.clone()));
        store.periods.push((company_id, first.clone()));
        store.periods.push((company_id, unrelated));

        let records = CalendarQuery::job(company_id, job_id).run(&store).await.unwrap();

        let ids: Vec<PeriodId> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(records[0].title, "Program");
        assert_eq!(records[0].r#ref.job_id, Some(job_id));
    }

    #[test_log::test(tokio::test)]
    async fn test_company_category_filter_restricts_the_result() {
        let company_id = Uuid::new_v4();
        let mut store = FakeStore::default();
        store.periods.push((company_id, period("transport", at(1, 8))));
        store.periods.push((company_id, period("equipment", at(1, 9))));

        let records = CalendarQuery::company(company_id, Some(PeriodCategory::Equipment))
            .run(&store)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, CalendarKind::Item);
    }

    #[test_log::test(tokio::test)]
    async fn test_other_companies_periods_are_invisible() {
        let company_id = Uuid::new_v4();
        let other_company = Uuid::new_v4();
        let mut store = FakeStore::default();
        store.periods.push((other_company, period("program", at(1, 9))));

        let records = CalendarQuery::company(company_id, None).run(&store).await.unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_query_keys_are_value_identities() {
        let company_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();
        let window = PeriodWindow {
            from: None,
            page: Some(Page::new(0, 50)),
        };

        assert_eq!(
            CalendarQuery::vehicle(company_id, vehicle_id, window).key(),
            CalendarQuery::vehicle(company_id, vehicle_id, window).key(),
        );
        // Changing any input that affects results must change the key
        assert_ne!(
            CalendarQuery::vehicle(company_id, vehicle_id, window).key(),
            CalendarQuery::vehicle(company_id, vehicle_id, PeriodWindow::default()).key(),
        );
        assert_ne!(
            CalendarQuery::company(company_id, None).key(),
            CalendarQuery::company(company_id, Some(PeriodCategory::Crew)).key(),
        );
    }
}
