//! The data seam between the calendar aggregation pipeline and PostgreSQL.
//!
//! [`CalendarStore`] is the trait the query pipeline in [`crate::calendar::queries`]
//! runs against; [`PgCalendarStore`] is the production implementation. Tests use an
//! in-memory fake. All methods are read-only; column names and the lowercase
//! category values form the wire contract with the backend schema.

use crate::calendar::domain::ProjectLead;
use crate::db::errors::Result;
use crate::db::models::booking_periods::PeriodCategory;
use crate::types::{CompanyId, ItemId, JobId, PeriodId, UserId, VehicleId, abbrev_uuid};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, query_builder::QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Pagination over an inclusive row range.
///
/// `offset`/`limit` select the rows `[offset, offset + limit - 1]` of the
/// ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Index of the first requested row
    pub fn first_row(&self) -> i64 {
        self.offset
    }

    /// Index of the last requested row, inclusive
    pub fn last_row(&self) -> i64 {
        self.offset + self.limit - 1
    }
}

/// Optional bounds on a period fetch. Only the vehicle-scoped calendar query
/// passes anything other than the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PeriodWindow {
    /// Inclusive lower bound on `start_at`
    pub from: Option<DateTime<Utc>>,
    pub page: Option<Page>,
}

/// One booking-period row as fetched for calendar aggregation.
///
/// `category` is carried raw; it is interpreted during normalization.
#[derive(Debug, Clone, FromRow)]
pub struct PeriodRow {
    pub id: PeriodId,
    pub job_id: Option<JobId>,
    pub title: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub category: String,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub meta: Option<serde_json::Value>,
}

/// Job display data merged into calendar records.
#[derive(Debug, Clone, Default)]
pub struct JobEnrichment {
    pub titles: HashMap<JobId, String>,
    /// Only populated when the caller asked for project leads
    pub leads: HashMap<JobId, ProjectLead>,
}

/// Read-only access to the tables the calendar aggregates over.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Booking-period ids reserved by the given vehicle
    async fn vehicle_period_ids(&self, vehicle_id: VehicleId) -> Result<Vec<PeriodId>>;

    /// Booking-period ids reserved by the given equipment item
    async fn item_period_ids(&self, item_id: ItemId) -> Result<Vec<PeriodId>>;

    /// Booking-period ids reserved by the given crew member
    async fn crew_period_ids(&self, user_id: UserId) -> Result<Vec<PeriodId>>;

    /// Fetch non-deleted periods of one category from an explicit id set,
    /// ordered ascending by start time. An empty id set returns an empty vec
    /// without a round trip.
    async fn periods_by_ids(
        &self,
        company_id: CompanyId,
        category: PeriodCategory,
        ids: &[PeriodId],
        window: PeriodWindow,
    ) -> Result<Vec<PeriodRow>>;

    /// Fetch a job's program periods, ordered ascending by start time
    async fn periods_by_job(&self, company_id: CompanyId, job_id: JobId) -> Result<Vec<PeriodRow>>;

    /// Fetch all of a company's non-deleted periods, optionally restricted to
    /// one category, ordered ascending by start time
    async fn periods_by_company(&self, company_id: CompanyId, category: Option<PeriodCategory>) -> Result<Vec<PeriodRow>>;

    /// Batched job display data: titles always, project-lead profiles only
    /// when `with_leads` is set
    async fn job_enrichment(&self, company_id: CompanyId, job_ids: &[JobId], with_leads: bool) -> Result<JobEnrichment>;

    /// Vehicle reservation links for the given periods, keyed by period id
    async fn vehicle_links(&self, period_ids: &[PeriodId]) -> Result<HashMap<PeriodId, VehicleId>>;

    /// Item reservation links for the given periods, keyed by period id
    async fn item_links(&self, period_ids: &[PeriodId]) -> Result<HashMap<PeriodId, ItemId>>;

    /// Crew reservation links for the given periods, keyed by period id
    async fn crew_links(&self, period_ids: &[PeriodId]) -> Result<HashMap<PeriodId, UserId>>;
}

const PERIOD_COLUMNS: &str = "id, job_id, title, start_at, end_at, category, status, notes, location, meta";

/// PostgreSQL-backed [`CalendarStore`].
///
/// Calendar reads are single-shot and read-only, so this works directly off
/// the pool rather than a transaction.
#[derive(Debug, Clone)]
pub struct PgCalendarStore {
    pool: PgPool,
}

impl PgCalendarStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn link_period_ids(&self, table: &str, column: &str, entity_id: uuid::Uuid) -> Result<Vec<PeriodId>> {
        let ids = sqlx::query_scalar::<_, PeriodId>(&format!("SELECT time_period_id FROM {table} WHERE {column} = $1"))
            .bind(entity_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}

#[async_trait]
impl CalendarStore for PgCalendarStore {
    #[instrument(skip(self), fields(vehicle_id = %abbrev_uuid(&vehicle_id)), err)]
    async fn vehicle_period_ids(&self, vehicle_id: VehicleId) -> Result<Vec<PeriodId>> {
        self.link_period_ids("vehicle_time_periods", "vehicle_id", vehicle_id).await
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&item_id)), err)]
    async fn item_period_ids(&self, item_id: ItemId) -> Result<Vec<PeriodId>> {
        self.link_period_ids("item_time_periods", "item_id", item_id).await
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    async fn crew_period_ids(&self, user_id: UserId) -> Result<Vec<PeriodId>> {
        self.link_period_ids("crew_time_periods", "user_id", user_id).await
    }

    #[instrument(skip(self, ids), fields(company_id = %abbrev_uuid(&company_id), count = ids.len()), err)]
    async fn periods_by_ids(
        &self,
        company_id: CompanyId,
        category: PeriodCategory,
        ids: &[PeriodId],
        window: PeriodWindow,
    ) -> Result<Vec<PeriodRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::new(format!("SELECT {PERIOD_COLUMNS} FROM time_periods WHERE deleted = false AND company_id = "));
        query.push_bind(company_id);
        query.push(" AND category = ");
        query.push_bind(category.as_str());
        query.push(" AND id = ANY(");
        query.push_bind(ids.to_vec());
        query.push(")");

        if let Some(from) = window.from {
            query.push(" AND start_at >= ");
            query.push_bind(from);
        }

        query.push(" ORDER BY start_at ASC");

        if let Some(page) = window.page {
            query.push(" LIMIT ");
            query.push_bind(page.limit);
            query.push(" OFFSET ");
            query.push_bind(page.offset);
        }

        let rows = query.build_query_as::<PeriodRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(company_id = %abbrev_uuid(&company_id), job_id = %abbrev_uuid(&job_id)), err)]
    async fn periods_by_job(&self, company_id: CompanyId, job_id: JobId) -> Result<Vec<PeriodRow>> {
        let rows = sqlx::query_as::<_, PeriodRow>(&format!(
            r#"
            SELECT {PERIOD_COLUMNS} FROM time_periods
            WHERE deleted = false AND company_id = $1 AND job_id = $2 AND category = 'program'
            ORDER BY start_at ASC
            "#
        ))
        .bind(company_id)
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(company_id = %abbrev_uuid(&company_id)), err)]
    async fn periods_by_company(&self, company_id: CompanyId, category: Option<PeriodCategory>) -> Result<Vec<PeriodRow>> {
        let mut query = QueryBuilder::new(format!("SELECT {PERIOD_COLUMNS} FROM time_periods WHERE deleted = false AND company_id = "));
        query.push_bind(company_id);

        if let Some(category) = category {
            query.push(" AND category = ");
            query.push_bind(category.as_str());
        }

        query.push(" ORDER BY start_at ASC");

        let rows = query.build_query_as::<PeriodRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    #[instrument(skip(self, job_ids), fields(company_id = %abbrev_uuid(&company_id), count = job_ids.len(), with_leads), err)]
    async fn job_enrichment(&self, company_id: CompanyId, job_ids: &[JobId], with_leads: bool) -> Result<JobEnrichment> {
        if job_ids.is_empty() {
            return Ok(JobEnrichment::default());
        }

        if !with_leads {
            let rows = sqlx::query_as::<_, (JobId, String)>("SELECT id, title FROM jobs WHERE company_id = $1 AND id = ANY($2)")
                .bind(company_id)
                .bind(job_ids.to_vec())
                .fetch_all(&self.pool)
                .await?;

            return Ok(JobEnrichment {
                titles: rows.into_iter().collect(),
                leads: HashMap::new(),
            });
        }

        #[derive(FromRow)]
        struct JobDisplayRow {
            id: JobId,
            title: String,
            lead_id: Option<UserId>,
            display_name: Option<String>,
            email: Option<String>,
            avatar_url: Option<String>,
        }

        let rows = sqlx::query_as::<_, JobDisplayRow>(
            r#"
            SELECT j.id, j.title, p.id AS lead_id, p.display_name, p.email, p.avatar_url
            FROM jobs j
            LEFT JOIN profiles p ON p.id = j.project_lead
            WHERE j.company_id = $1 AND j.id = ANY($2)
            "#,
        )
        .bind(company_id)
        .bind(job_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        let mut enrichment = JobEnrichment::default();
        for row in rows {
            if let (Some(id), Some(email)) = (row.lead_id, row.email) {
                enrichment.leads.insert(
                    row.id,
                    ProjectLead {
                        id,
                        display_name: row.display_name,
                        email,
                        avatar_url: row.avatar_url,
                    },
                );
            }
            enrichment.titles.insert(row.id, row.title);
        }

        Ok(enrichment)
    }

    #[instrument(skip(self, period_ids), fields(count = period_ids.len()), err)]
    async fn vehicle_links(&self, period_ids: &[PeriodId]) -> Result<HashMap<PeriodId, VehicleId>> {
        if period_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (PeriodId, VehicleId)>(
            "SELECT time_period_id, vehicle_id FROM vehicle_time_periods WHERE time_period_id = ANY($1)",
        )
        .bind(period_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    #[instrument(skip(self, period_ids), fields(count = period_ids.len()), err)]
    async fn item_links(&self, period_ids: &[PeriodId]) -> Result<HashMap<PeriodId, ItemId>> {
        if period_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (PeriodId, ItemId)>(
            "SELECT time_period_id, item_id FROM item_time_periods WHERE time_period_id = ANY($1)",
        )
        .bind(period_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    #[instrument(skip(self, period_ids), fields(count = period_ids.len()), err)]
    async fn crew_links(&self, period_ids: &[PeriodId]) -> Result<HashMap<PeriodId, UserId>> {
        if period_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (PeriodId, UserId)>(
            "SELECT time_period_id, user_id FROM crew_time_periods WHERE time_period_id = ANY($1)",
        )
        .bind(period_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_requests_inclusive_row_range() {
        let page = Page::new(20, 10);
        assert_eq!(page.first_row(), 20);
        assert_eq!(page.last_row(), 29);
    }

    #[test]
    fn test_single_row_page() {
        let page = Page::new(0, 1);
        assert_eq!(page.first_row(), 0);
        assert_eq!(page.last_row(), 0);
    }
}
