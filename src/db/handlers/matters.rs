//! Database repository for internal matters and voting.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::matters::{
        MatterCreateDBRequest, MatterDBResponse, MatterStatus, MatterUpdateDBRequest, MatterVoteDBResponse, VoteChoice,
        VoteTally,
    },
};
use crate::types::{CompanyId, MatterId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, query_builder::QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter options for listing matters
#[derive(Debug, Clone)]
pub struct MatterFilter {
    pub company_id: CompanyId,
    pub skip: i64,
    pub limit: i64,
    pub status: Option<MatterStatus>,
}

impl MatterFilter {
    pub fn new(company_id: CompanyId, skip: i64, limit: i64) -> Self {
        Self {
            company_id,
            skip,
            limit,
            status: None,
        }
    }

    pub fn with_status(mut self, status: MatterStatus) -> Self {
        self.status = Some(status);
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct MatterRow {
    pub id: MatterId,
    pub company_id: CompanyId,
    pub title: String,
    pub body: Option<String>,
    pub status: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MatterRow> for MatterDBResponse {
    fn from(r: MatterRow) -> Self {
        Self {
            id: r.id,
            company_id: r.company_id,
            title: r.title,
            body: r.body,
            status: MatterStatus::parse(&r.status).unwrap_or_default(),
            created_by: r.created_by,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// Database entity model for votes
#[derive(Debug, Clone, FromRow)]
struct MatterVoteRow {
    pub matter_id: MatterId,
    pub user_id: UserId,
    pub choice: String,
    pub cast_at: DateTime<Utc>,
}

pub struct Matters<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Matters<'c> {
    type CreateRequest = MatterCreateDBRequest;
    type UpdateRequest = MatterUpdateDBRequest;
    type Response = MatterDBResponse;
    type Id = MatterId;
    type Filter = MatterFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(DbError::InvalidField { field: "title" });
        }

        let matter = sqlx::query_as::<_, MatterRow>(
            r#"
            INSERT INTO matters (company_id, title, body, status, created_by)
            VALUES ($1, $2, $3, 'open', $4)
            RETURNING *
            "#,
        )
        .bind(request.company_id)
        .bind(title)
        .bind(&request.body)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(MatterDBResponse::from(matter))
    }

    #[instrument(skip(self), fields(matter_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let matter = sqlx::query_as::<_, MatterRow>("SELECT * FROM matters WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(matter.map(MatterDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let matters = sqlx::query_as::<_, MatterRow>("SELECT * FROM matters WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        let mut result = HashMap::new();
        for matter in matters {
            result.insert(matter.id, MatterDBResponse::from(matter));
        }

        Ok(result)
    }

    #[instrument(skip(self), fields(matter_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM matters WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(matter_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        if let Some(title) = &request.title
            && title.trim().is_empty()
        {
            return Err(DbError::InvalidField { field: "title" });
        }

        let matter = sqlx::query_as::<_, MatterRow>(
            r#"
            UPDATE matters SET
                title = COALESCE($2, title),
                body = COALESCE($3, body),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.title.as_ref().map(|s| s.trim()))
        .bind(&request.body)
        .bind(request.status.map(MatterStatus::as_str))
        .fetch_one(&mut *self.db)
        .await?;

        Ok(MatterDBResponse::from(matter))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM matters WHERE company_id = ");
        query.push_bind(filter.company_id);

        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status.as_str());
        }

        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let matters = query.build_query_as::<MatterRow>().fetch_all(&mut *self.db).await?;

        Ok(matters.into_iter().map(MatterDBResponse::from).collect())
    }
}

impl<'c> Matters<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    // ===== Voting =====

    /// Cast a vote on a matter. Voting again replaces the previous choice.
    #[instrument(skip(self), fields(matter_id = %abbrev_uuid(&matter_id), user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn cast_vote(&mut self, matter_id: MatterId, user_id: UserId, choice: VoteChoice) -> Result<MatterVoteDBResponse> {
        let vote = sqlx::query_as::<_, MatterVoteRow>(
            r#"
            INSERT INTO matter_votes (matter_id, user_id, choice)
            VALUES ($1, $2, $3)
            ON CONFLICT (matter_id, user_id) DO UPDATE SET choice = EXCLUDED.choice, cast_at = NOW()
            RETURNING *
            "#,
        )
        .bind(matter_id)
        .bind(user_id)
        .bind(choice.as_str())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(MatterVoteDBResponse {
            matter_id: vote.matter_id,
            user_id: vote.user_id,
            choice: VoteChoice::parse(&vote.choice).unwrap_or(VoteChoice::Abstain),
            cast_at: vote.cast_at,
        })
    }

    /// Remove a user's vote from a matter
    #[instrument(skip(self), fields(matter_id = %abbrev_uuid(&matter_id), user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn retract_vote(&mut self, matter_id: MatterId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM matter_votes WHERE matter_id = $1 AND user_id = $2")
            .bind(matter_id)
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Tally votes for multiple matters, keyed by matter id.
    ///
    /// Matters with no votes are absent from the map; callers treat absence as
    /// an all-zero tally.
    #[instrument(skip(self, matter_ids), fields(count = matter_ids.len()), err)]
    pub async fn tally_bulk(&mut self, matter_ids: &[MatterId]) -> Result<HashMap<MatterId, VoteTally>> {
        if matter_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (MatterId, String, i64)>(
            r#"
            SELECT matter_id, choice, COUNT(*) AS votes
            FROM matter_votes
            WHERE matter_id = ANY($1)
            GROUP BY matter_id, choice
            "#,
        )
        .bind(matter_ids)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(fold_tallies(rows))
    }
}

/// Fold grouped vote counts into per-matter tallies.
///
/// Unparseable choices count as abstentions rather than disappearing.
fn fold_tallies(rows: Vec<(MatterId, String, i64)>) -> HashMap<MatterId, VoteTally> {
    let mut result: HashMap<MatterId, VoteTally> = HashMap::new();
    for (matter_id, choice, votes) in rows {
        let tally = result.entry(matter_id).or_default();
        match VoteChoice::parse(&choice) {
            Some(VoteChoice::Yes) => tally.yes += votes,
            Some(VoteChoice::No) => tally.no += votes,
            Some(VoteChoice::Abstain) | None => tally.abstain += votes,
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_fold_tallies_groups_by_matter() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            (a, "yes".to_string(), 3),
            (a, "no".to_string(), 1),
            (b, "abstain".to_string(), 2),
        ];

        let tallies = fold_tallies(rows);
        assert_eq!(tallies[&a], VoteTally { yes: 3, no: 1, abstain: 0 });
        assert_eq!(tallies[&b], VoteTally { yes: 0, no: 0, abstain: 2 });
    }

    #[test]
    fn test_fold_tallies_counts_unknown_choices_as_abstentions() {
        let a = Uuid::new_v4();
        let tallies = fold_tallies(vec![(a, "maybe".to_string(), 4)]);
        assert_eq!(tallies[&a], VoteTally { yes: 0, no: 0, abstain: 4 });
    }
}
