//! Database repository for crew member profiles.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::profiles::{ProfileCreateDBRequest, ProfileDBResponse, ProfileUpdateDBRequest},
};
use crate::types::{CompanyId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, query_builder::QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter options for listing profiles
#[derive(Debug, Clone)]
pub struct ProfileFilter {
    pub company_id: CompanyId,
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl ProfileFilter {
    pub fn new(company_id: CompanyId, skip: i64, limit: i64) -> Self {
        Self {
            company_id,
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
struct ProfileRow {
    pub id: UserId,
    pub company_id: CompanyId,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for ProfileDBResponse {
    fn from(r: ProfileRow) -> Self {
        Self {
            id: r.id,
            company_id: r.company_id,
            email: r.email,
            display_name: r.display_name,
            avatar_url: r.avatar_url,
            phone: r.phone,
            role: r.role,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub struct Profiles<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Profiles<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Get a profile by its email address
    #[instrument(skip(self), fields(email = %email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<ProfileDBResponse>> {
        let profile = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(profile.map(ProfileDBResponse::from))
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Profiles<'c> {
    type CreateRequest = ProfileCreateDBRequest;
    type UpdateRequest = ProfileUpdateDBRequest;
    type Response = ProfileDBResponse;
    type Id = UserId;
    type Filter = ProfileFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let email = request.email.trim();
        if email.is_empty() {
            return Err(DbError::InvalidField { field: "email" });
        }

        let profile = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (company_id, email, display_name, avatar_url, phone, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(request.company_id)
        .bind(email)
        .bind(&request.display_name)
        .bind(&request.avatar_url)
        .bind(&request.phone)
        .bind(&request.role)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ProfileDBResponse::from(profile))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let profile = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(profile.map(ProfileDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        let mut result = HashMap::new();
        for profile in profiles {
            result.insert(profile.id, ProfileDBResponse::from(profile));
        }

        Ok(result)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let profile = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles SET
                display_name = COALESCE($2, display_name),
                avatar_url = COALESCE($3, avatar_url),
                phone = COALESCE($4, phone),
                role = COALESCE($5, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.display_name)
        .bind(&request.avatar_url)
        .bind(&request.phone)
        .bind(&request.role)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ProfileDBResponse::from(profile))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM profiles WHERE company_id = ");
        query.push_bind(filter.company_id);

        if let Some(ref search) = filter.search {
            let search_pattern = format!("%{}%", search.to_lowercase());
            query.push(" AND (LOWER(COALESCE(display_name, '')) LIKE ");
            query.push_bind(search_pattern.clone());
            query.push(" OR LOWER(email) LIKE ");
            query.push_bind(search_pattern);
            query.push(")");
        }

        query.push(" ORDER BY display_name ASC NULLS LAST LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let profiles = query.build_query_as::<ProfileRow>().fetch_all(&mut *self.db).await?;

        Ok(profiles.into_iter().map(ProfileDBResponse::from).collect())
    }
}
