//! Database repository for companies.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::companies::{CompanyCreateDBRequest, CompanyDBResponse, CompanyUpdateDBRequest},
};
use crate::types::{CompanyId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, query_builder::QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter options for listing companies
#[derive(Debug, Clone)]
pub struct CompanyFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl CompanyFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            search: None,
        }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct CompanyRow {
    pub id: CompanyId,
    pub name: String,
    pub org_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CompanyRow> for CompanyDBResponse {
    fn from(r: CompanyRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            org_number: r.org_number,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub struct Companies<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Companies<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Companies<'c> {
    type CreateRequest = CompanyCreateDBRequest;
    type UpdateRequest = CompanyUpdateDBRequest;
    type Response = CompanyDBResponse;
    type Id = CompanyId;
    type Filter = CompanyFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(DbError::InvalidField { field: "name" });
        }

        let company = sqlx::query_as::<_, CompanyRow>(
            r#"
            INSERT INTO companies (name, org_number)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(&request.org_number)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(CompanyDBResponse::from(company))
    }

    #[instrument(skip(self), fields(company_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let company = sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(company.map(CompanyDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let companies = sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        let mut result = HashMap::new();
        for company in companies {
            result.insert(company.id, CompanyDBResponse::from(company));
        }

        Ok(result)
    }

    #[instrument(skip(self), fields(company_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(company_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        if let Some(name) = &request.name
            && name.trim().is_empty()
        {
            return Err(DbError::InvalidField { field: "name" });
        }

        let company = sqlx::query_as::<_, CompanyRow>(
            r#"
            UPDATE companies SET
                name = COALESCE($2, name),
                org_number = COALESCE($3, org_number),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.name.as_ref().map(|s| s.trim()))
        .bind(&request.org_number)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(CompanyDBResponse::from(company))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM companies WHERE 1=1");

        if let Some(ref search) = filter.search {
            let search_pattern = format!("%{}%", search.to_lowercase());
            query.push(" AND LOWER(name) LIKE ");
            query.push_bind(search_pattern);
        }

        query.push(" ORDER BY name ASC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let companies = query.build_query_as::<CompanyRow>().fetch_all(&mut *self.db).await?;

        Ok(companies.into_iter().map(CompanyDBResponse::from).collect())
    }
}
