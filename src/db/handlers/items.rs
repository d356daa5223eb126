//! Database repository for equipment items.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::items::{ItemCreateDBRequest, ItemDBResponse, ItemUpdateDBRequest},
};
use crate::types::{CompanyId, ItemId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, query_builder::QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter options for listing equipment items
#[derive(Debug, Clone)]
pub struct ItemFilter {
    pub company_id: CompanyId,
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl ItemFilter {
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
struct ItemRow {
    pub id: ItemId,
    pub company_id: CompanyId,
    pub name: String,
    pub serial_number: Option<String>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ItemRow> for ItemDBResponse {
    fn from(r: ItemRow) -> Self {
        Self {
            id: r.id,
            company_id: r.company_id,
            name: r.name,
            serial_number: r.serial_number,
            quantity: r.quantity,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub struct Items<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Items<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Items<'c> {
    type CreateRequest = ItemCreateDBRequest;
    type UpdateRequest = ItemUpdateDBRequest;
    type Response = ItemDBResponse;
    type Id = ItemId;
    type Filter = ItemFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(DbError::InvalidField { field: "name" });
        }
        if request.quantity < 0 {
            return Err(DbError::InvalidField { field: "quantity" });
        }

        let item = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items (company_id, name, serial_number, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.company_id)
        .bind(name)
        .bind(&request.serial_number)
        .bind(request.quantity)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ItemDBResponse::from(item))
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let item = sqlx::query_as::<_, ItemRow>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(item.map(ItemDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let items = sqlx::query_as::<_, ItemRow>("SELECT * FROM items WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        let mut result = HashMap::new();
        for item in items {
            result.insert(item.id, ItemDBResponse::from(item));
        }

        Ok(result)
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        if let Some(name) = &request.name
            && name.trim().is_empty()
        {
            return Err(DbError::InvalidField { field: "name" });
        }
        if let Some(quantity) = request.quantity
            && quantity < 0
        {
            return Err(DbError::InvalidField { field: "quantity" });
        }

        let item = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE items SET
                name = COALESCE($2, name),
                serial_number = COALESCE($3, serial_number),
                quantity = COALESCE($4, quantity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.name.as_ref().map(|s| s.trim()))
        .bind(&request.serial_number)
        .bind(request.quantity)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ItemDBResponse::from(item))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM items WHERE company_id = ");
        query.push_bind(filter.company_id);

        if let Some(ref search) = filter.search {
            let search_pattern = format!("%{}%", search.to_lowercase());
            query.push(" AND (LOWER(name) LIKE ");
            query.push_bind(search_pattern.clone());
            query.push(" OR LOWER(COALESCE(serial_number, '')) LIKE ");
            query.push_bind(search_pattern);
            query.push(")");
        }

        query.push(" ORDER BY name ASC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let items = query.build_query_as::<ItemRow>().fetch_all(&mut *self.db).await?;

        Ok(items.into_iter().map(ItemDBResponse::from).collect())
    }
}
