//! Database repository for vehicles.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::vehicles::{VehicleCreateDBRequest, VehicleDBResponse, VehicleUpdateDBRequest},
};
use crate::types::{CompanyId, VehicleId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, query_builder::QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter options for listing vehicles
#[derive(Debug, Clone)]
pub struct VehicleFilter {
    pub company_id: CompanyId,
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl VehicleFilter {
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
struct VehicleRow {
    pub id: VehicleId,
    pub company_id: CompanyId,
    pub name: String,
    pub registration: Option<String>,
    pub model: Option<String>,
    pub seats: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VehicleRow> for VehicleDBResponse {
    fn from(r: VehicleRow) -> Self {
        Self {
            id: r.id,
            company_id: r.company_id,
            name: r.name,
            registration: r.registration,
            model: r.model,
            seats: r.seats,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub struct Vehicles<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Vehicles<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Vehicles<'c> {
    type CreateRequest = VehicleCreateDBRequest;
    type UpdateRequest = VehicleUpdateDBRequest;
    type Response = VehicleDBResponse;
    type Id = VehicleId;
    type Filter = VehicleFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(DbError::InvalidField { field: "name" });
        }

        let vehicle = sqlx::query_as::<_, VehicleRow>(
            r#"
            INSERT INTO vehicles (company_id, name, registration, model, seats)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.company_id)
        .bind(name)
        .bind(&request.registration)
        .bind(&request.model)
        .bind(request.seats)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(VehicleDBResponse::from(vehicle))
    }

    #[instrument(skip(self), fields(vehicle_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let vehicle = sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(vehicle.map(VehicleDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let vehicles = sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        let mut result = HashMap::new();
        for vehicle in vehicles {
            result.insert(vehicle.id, VehicleDBResponse::from(vehicle));
        }

        Ok(result)
    }

    #[instrument(skip(self), fields(vehicle_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(vehicle_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        if let Some(name) = &request.name
            && name.trim().is_empty()
        {
            return Err(DbError::InvalidField { field: "name" });
        }

        let vehicle = sqlx::query_as::<_, VehicleRow>(
            r#"
            UPDATE vehicles SET
                name = COALESCE($2, name),
                registration = COALESCE($3, registration),
                model = COALESCE($4, model),
                seats = COALESCE($5, seats),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.name.as_ref().map(|s| s.trim()))
        .bind(&request.registration)
        .bind(&request.model)
        .bind(request.seats)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(VehicleDBResponse::from(vehicle))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM vehicles WHERE company_id = ");
        query.push_bind(filter.company_id);

        if let Some(ref search) = filter.search {
            let search_pattern = format!("%{}%", search.to_lowercase());
            query.push(" AND (LOWER(name) LIKE ");
            query.push_bind(search_pattern.clone());
            query.push(" OR LOWER(COALESCE(registration, '')) LIKE ");
            query.push_bind(search_pattern);
            query.push(")");
        }

        query.push(" ORDER BY name ASC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let vehicles = query.build_query_as::<VehicleRow>().fetch_all(&mut *self.db).await?;

        Ok(vehicles.into_iter().map(VehicleDBResponse::from).collect())
    }
}
