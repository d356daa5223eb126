//! Database repository for jobs.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::jobs::{JobCreateDBRequest, JobDBResponse, JobUpdateDBRequest},
};
use crate::types::{CompanyId, JobId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, query_builder::QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter options for listing jobs
#[derive(Debug, Clone)]
pub struct JobFilter {
    pub company_id: CompanyId,
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
    pub project_lead: Option<UserId>,
    pub status: Option<String>,
}

impl JobFilter {
    pub fn new(company_id: CompanyId, skip: i64, limit: i64) -> Self {
        Self {
            company_id,
            skip,
            limit,
            search: None,
            project_lead: None,
            status: None,
        }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_project_lead(mut self, user_id: UserId) -> Self {
        self.project_lead = Some(user_id);
        self
    }

    pub fn with_status(mut self, status: String) -> Self {
        self.status = Some(status);
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct JobRow {
    pub id: JobId,
    pub company_id: CompanyId,
    pub title: String,
    pub description: Option<String>,
    pub project_lead: Option<UserId>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobRow> for JobDBResponse {
    fn from(r: JobRow) -> Self {
        Self {
            id: r.id,
            company_id: r.company_id,
            title: r.title,
            description: r.description,
            project_lead: r.project_lead,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub struct Jobs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Jobs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Jobs<'c> {
    type CreateRequest = JobCreateDBRequest;
    type UpdateRequest = JobUpdateDBRequest;
    type Response = JobDBResponse;
    type Id = JobId;
    type Filter = JobFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(DbError::InvalidField { field: "title" });
        }

        let job = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (company_id, title, description, project_lead, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.company_id)
        .bind(title)
        .bind(&request.description)
        .bind(request.project_lead)
        .bind(&request.status)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(JobDBResponse::from(job))
    }

    #[instrument(skip(self), fields(job_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(job.map(JobDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let jobs = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        let mut result = HashMap::new();
        for job in jobs {
            result.insert(job.id, JobDBResponse::from(job));
        }

        Ok(result)
    }

    #[instrument(skip(self), fields(job_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(job_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        if let Some(title) = &request.title
            && title.trim().is_empty()
        {
            return Err(DbError::InvalidField { field: "title" });
        }

        let job = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                project_lead = COALESCE($4, project_lead),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.title.as_ref().map(|s| s.trim()))
        .bind(&request.description)
        .bind(request.project_lead)
        .bind(&request.status)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(JobDBResponse::from(job))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM jobs WHERE company_id = ");
        query.push_bind(filter.company_id);

        if let Some(lead) = filter.project_lead {
            query.push(" AND project_lead = ");
            query.push_bind(lead);
        }

        if let Some(ref status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status.clone());
        }

        if let Some(ref search) = filter.search {
            let search_pattern = format!("%{}%", search.to_lowercase());
            query.push(" AND LOWER(title) LIKE ");
            query.push_bind(search_pattern);
        }

        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let jobs = query.build_query_as::<JobRow>().fetch_all(&mut *self.db).await?;

        Ok(jobs.into_iter().map(JobDBResponse::from).collect())
    }
}
