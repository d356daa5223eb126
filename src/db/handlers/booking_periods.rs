//! Database repository for booking periods.
//!
//! Booking periods are soft-deleted: `delete` flips the `deleted` flag so the
//! calendar core (which filters on `deleted = false`) stops seeing the row,
//! while scheduling history stays intact. Reservation links tie a period to
//! the vehicle, item or crew member it reserves.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::booking_periods::{
        BookingPeriodCreateDBRequest, BookingPeriodDBResponse, BookingPeriodUpdateDBRequest, PeriodCategory,
        ReservationLinkDBResponse,
    },
};
use crate::types::{CompanyId, ItemId, JobId, PeriodId, UserId, VehicleId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, query_builder::QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter options for listing booking periods
#[derive(Debug, Clone)]
pub struct PeriodFilter {
    pub company_id: CompanyId,
    pub skip: i64,
    pub limit: i64,
    pub category: Option<PeriodCategory>,
    pub job_id: Option<JobId>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl PeriodFilter {
    pub fn new(company_id: CompanyId, skip: i64, limit: i64) -> Self {
        Self {
            company_id,
            skip,
            limit,
            category: None,
            job_id: None,
            from: None,
            until: None,
        }
    }

    pub fn with_category(mut self, category: PeriodCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_job(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn with_range(mut self, from: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.until = until;
        self
    }
}

// Database entity model. The category column is lowercase text and is parsed
// into PeriodCategory at the boundary.
#[derive(Debug, Clone, FromRow)]
struct BookingPeriodRow {
    pub id: PeriodId,
    pub company_id: CompanyId,
    pub job_id: Option<JobId>,
    pub title: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub category: String,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub meta: Option<serde_json::Value>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingPeriodRow> for BookingPeriodDBResponse {
    fn from(r: BookingPeriodRow) -> Self {
        Self {
            id: r.id,
            company_id: r.company_id,
            job_id: r.job_id,
            title: r.title,
            start_at: r.start_at,
            end_at: r.end_at,
            category: PeriodCategory::parse(&r.category).unwrap_or_default(),
            status: r.status,
            notes: r.notes,
            location: r.location,
            meta: r.meta,
            deleted: r.deleted,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub struct BookingPeriods<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for BookingPeriods<'c> {
    type CreateRequest = BookingPeriodCreateDBRequest;
    type UpdateRequest = BookingPeriodUpdateDBRequest;
    type Response = BookingPeriodDBResponse;
    type Id = PeriodId;
    type Filter = PeriodFilter;

    #[instrument(skip(self, request), fields(category = request.category.as_str()), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        if let Some(end_at) = request.end_at
            && end_at < request.start_at
        {
            return Err(DbError::InvalidField { field: "end_at" });
        }

        let period = sqlx::query_as::<_, BookingPeriodRow>(
            r#"
            INSERT INTO time_periods (company_id, job_id, title, start_at, end_at, category, status, notes, location, meta)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(request.company_id)
        .bind(request.job_id)
        .bind(&request.title)
        .bind(request.start_at)
        .bind(request.end_at)
        .bind(request.category.as_str())
        .bind(&request.status)
        .bind(&request.notes)
        .bind(&request.location)
        .bind(&request.meta)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(BookingPeriodDBResponse::from(period))
    }

    #[instrument(skip(self), fields(period_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let period = sqlx::query_as::<_, BookingPeriodRow>("SELECT * FROM time_periods WHERE id = $1 AND deleted = false")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(period.map(BookingPeriodDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let periods = sqlx::query_as::<_, BookingPeriodRow>("SELECT * FROM time_periods WHERE id = ANY($1) AND deleted = false")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        let mut result = HashMap::new();
        for period in periods {
            result.insert(period.id, BookingPeriodDBResponse::from(period));
        }

        Ok(result)
    }

    /// Soft delete: the row stays for history, the calendar stops returning it
    #[instrument(skip(self), fields(period_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("UPDATE time_periods SET deleted = true, updated_at = NOW() WHERE id = $1 AND deleted = false")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(period_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let period = sqlx::query_as::<_, BookingPeriodRow>(
            r#"
            UPDATE time_periods SET
                title = COALESCE($2, title),
                start_at = COALESCE($3, start_at),
                end_at = COALESCE($4, end_at),
                status = COALESCE($5, status),
                notes = COALESCE($6, notes),
                location = COALESCE($7, location),
                meta = COALESCE($8, meta),
                updated_at = NOW()
            WHERE id = $1 AND deleted = false
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(request.start_at)
        .bind(request.end_at)
        .bind(&request.status)
        .bind(&request.notes)
        .bind(&request.location)
        .bind(&request.meta)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(BookingPeriodDBResponse::from(period))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM time_periods WHERE deleted = false AND company_id = ");
        query.push_bind(filter.company_id);

        if let Some(category) = filter.category {
            query.push(" AND category = ");
            query.push_bind(category.as_str());
        }

        if let Some(job_id) = filter.job_id {
            query.push(" AND job_id = ");
            query.push_bind(job_id);
        }

        if let Some(from) = filter.from {
            query.push(" AND start_at >= ");
            query.push_bind(from);
        }

        if let Some(until) = filter.until {
            query.push(" AND start_at <= ");
            query.push_bind(until);
        }

        query.push(" ORDER BY start_at ASC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let periods = query.build_query_as::<BookingPeriodRow>().fetch_all(&mut *self.db).await?;

        Ok(periods.into_iter().map(BookingPeriodDBResponse::from).collect())
    }
}

impl<'c> BookingPeriods<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    // ===== Reservation Link Management =====

    /// Link a vehicle to a booking period (idempotent)
    #[instrument(skip(self), fields(period_id = %abbrev_uuid(&period_id), vehicle_id = %abbrev_uuid(&vehicle_id)), err)]
    pub async fn link_vehicle(&mut self, period_id: PeriodId, vehicle_id: VehicleId) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicle_time_periods (time_period_id, vehicle_id)
            VALUES ($1, $2)
            ON CONFLICT (time_period_id, vehicle_id) DO NOTHING
            "#,
        )
        .bind(period_id)
        .bind(vehicle_id)
        .execute(&mut *self.db)
        .await?;

        Ok(())
    }

    /// Remove a vehicle link from a booking period
    #[instrument(skip(self), fields(period_id = %abbrev_uuid(&period_id), vehicle_id = %abbrev_uuid(&vehicle_id)), err)]
    pub async fn unlink_vehicle(&mut self, period_id: PeriodId, vehicle_id: VehicleId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vehicle_time_periods WHERE time_period_id = $1 AND vehicle_id = $2")
            .bind(period_id)
            .bind(vehicle_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Link an equipment item to a booking period (idempotent)
    #[instrument(skip(self), fields(period_id = %abbrev_uuid(&period_id), item_id = %abbrev_uuid(&item_id)), err)]
    pub async fn link_item(&mut self, period_id: PeriodId, item_id: ItemId) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO item_time_periods (time_period_id, item_id)
            VALUES ($1, $2)
            ON CONFLICT (time_period_id, item_id) DO NOTHING
            "#,
        )
        .bind(period_id)
        .bind(item_id)
        .execute(&mut *self.db)
        .await?;

        Ok(())
    }

    /// Remove an equipment item link from a booking period
    #[instrument(skip(self), fields(period_id = %abbrev_uuid(&period_id), item_id = %abbrev_uuid(&item_id)), err)]
    pub async fn unlink_item(&mut self, period_id: PeriodId, item_id: ItemId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM item_time_periods WHERE time_period_id = $1 AND item_id = $2")
            .bind(period_id)
            .bind(item_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Link a crew member to a booking period (idempotent)
    #[instrument(skip(self), fields(period_id = %abbrev_uuid(&period_id), user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn link_crew(&mut self, period_id: PeriodId, user_id: UserId) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO crew_time_periods (time_period_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (time_period_id, user_id) DO NOTHING
            "#,
        )
        .bind(period_id)
        .bind(user_id)
        .execute(&mut *self.db)
        .await?;

        Ok(())
    }

    /// Remove a crew member link from a booking period
    #[instrument(skip(self), fields(period_id = %abbrev_uuid(&period_id), user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn unlink_crew(&mut self, period_id: PeriodId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM crew_time_periods WHERE time_period_id = $1 AND user_id = $2")
            .bind(period_id)
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get the reservation links for a set of periods, keyed by period id.
    ///
    /// Each period's links from all three join tables are merged into one list.
    #[instrument(skip(self, period_ids), fields(count = period_ids.len()), err)]
    pub async fn get_links_bulk(&mut self, period_ids: &[PeriodId]) -> Result<HashMap<PeriodId, Vec<ReservationLinkDBResponse>>> {
        if period_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (PeriodId, Option<VehicleId>, Option<ItemId>, Option<UserId>)>(
            r#"
            SELECT time_period_id, vehicle_id, NULL::uuid AS item_id, NULL::uuid AS user_id
                FROM vehicle_time_periods WHERE time_period_id = ANY($1)
            UNION ALL
            SELECT time_period_id, NULL::uuid, item_id, NULL::uuid
                FROM item_time_periods WHERE time_period_id = ANY($1)
            UNION ALL
            SELECT time_period_id, NULL::uuid, NULL::uuid, user_id
                FROM crew_time_periods WHERE time_period_id = ANY($1)
            "#,
        )
        .bind(period_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut result: HashMap<PeriodId, Vec<ReservationLinkDBResponse>> = HashMap::new();
        for (time_period_id, vehicle_id, item_id, user_id) in rows {
            result.entry(time_period_id).or_default().push(ReservationLinkDBResponse {
                time_period_id,
                vehicle_id,
                item_id,
                user_id,
            });
        }

        Ok(result)
    }
}
