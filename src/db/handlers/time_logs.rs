//! Database repository for time logs.
//!
//! Time logs have a start/stop lifecycle rather than free-form updates, so
//! this repository exposes purpose-built methods instead of the generic
//! [`crate::db::handlers::Repository`] trait.

use crate::db::{
    errors::{DbError, Result},
    models::time_logs::{TimeLogCreateDBRequest, TimeLogDBResponse},
};
use crate::types::{CompanyId, JobId, TimeLogId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, query_builder::QueryBuilder};
use tracing::instrument;

/// Filter options for listing time logs
#[derive(Debug, Clone)]
pub struct TimeLogFilter {
    pub company_id: CompanyId,
    pub skip: i64,
    pub limit: i64,
    pub user_id: Option<UserId>,
    pub job_id: Option<JobId>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TimeLogFilter {
    pub fn new(company_id: CompanyId, skip: i64, limit: i64) -> Self {
        Self {
            company_id,
            skip,
            limit,
            user_id: None,
            job_id: None,
            from: None,
            until: None,
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
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

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct TimeLogRow {
    pub id: TimeLogId,
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub job_id: Option<JobId>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TimeLogRow> for TimeLogDBResponse {
    fn from(r: TimeLogRow) -> Self {
        Self {
            id: r.id,
            company_id: r.company_id,
            user_id: r.user_id,
            job_id: r.job_id,
            started_at: r.started_at,
            ended_at: r.ended_at,
            note: r.note,
            created_at: r.created_at,
        }
    }
}

pub struct TimeLogs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> TimeLogs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Start a new time log
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    pub async fn start(&mut self, request: &TimeLogCreateDBRequest) -> Result<TimeLogDBResponse> {
        let log = sqlx::query_as::<_, TimeLogRow>(
            r#"
            INSERT INTO time_logs (company_id, user_id, job_id, started_at, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.company_id)
        .bind(request.user_id)
        .bind(request.job_id)
        .bind(request.started_at)
        .bind(&request.note)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(TimeLogDBResponse::from(log))
    }

    /// Close an open time log. Fails with [`DbError::InvalidField`] if `ended_at`
    /// precedes the log's start, and [`DbError::NotFound`] if the log does not
    /// exist or was already closed.
    #[instrument(skip(self), fields(time_log_id = %abbrev_uuid(&id)), err)]
    pub async fn stop(&mut self, id: TimeLogId, ended_at: DateTime<Utc>) -> Result<TimeLogDBResponse> {
        let existing = sqlx::query_as::<_, TimeLogRow>("SELECT * FROM time_logs WHERE id = $1 AND ended_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        if ended_at < existing.started_at {
            return Err(DbError::InvalidField { field: "ended_at" });
        }

        let log = sqlx::query_as::<_, TimeLogRow>("UPDATE time_logs SET ended_at = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(ended_at)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(TimeLogDBResponse::from(log))
    }

    /// Get a time log by id
    #[instrument(skip(self), fields(time_log_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: TimeLogId) -> Result<Option<TimeLogDBResponse>> {
        let log = sqlx::query_as::<_, TimeLogRow>("SELECT * FROM time_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(log.map(TimeLogDBResponse::from))
    }

    /// Get the currently open log for a user, if any
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn open_log_for_user(&mut self, company_id: CompanyId, user_id: UserId) -> Result<Option<TimeLogDBResponse>> {
        let log = sqlx::query_as::<_, TimeLogRow>(
            r#"
            SELECT * FROM time_logs
            WHERE company_id = $1 AND user_id = $2 AND ended_at IS NULL
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(log.map(TimeLogDBResponse::from))
    }

    /// Delete a time log
    #[instrument(skip(self), fields(time_log_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: TimeLogId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM time_logs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List time logs matching the filter, newest first
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &TimeLogFilter) -> Result<Vec<TimeLogDBResponse>> {
        let mut query = QueryBuilder::new("SELECT * FROM time_logs WHERE company_id = ");
        query.push_bind(filter.company_id);

        if let Some(user_id) = filter.user_id {
            query.push(" AND user_id = ");
            query.push_bind(user_id);
        }

        if let Some(job_id) = filter.job_id {
            query.push(" AND job_id = ");
            query.push_bind(job_id);
        }

        if let Some(from) = filter.from {
            query.push(" AND started_at >= ");
            query.push_bind(from);
        }

        if let Some(until) = filter.until {
            query.push(" AND started_at <= ");
            query.push_bind(until);
        }

        query.push(" ORDER BY started_at DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let logs = query.build_query_as::<TimeLogRow>().fetch_all(&mut *self.db).await?;

        Ok(logs.into_iter().map(TimeLogDBResponse::from).collect())
    }
}
