//! PostgreSQL-backed `ScoreRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, ScoreRepository};
use crate::domain::{Score, ScoreDraft, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewScoreRow, ScoreRow};
use super::pool::DbPool;
use super::schema::scores;

/// Diesel-backed implementation of the `ScoreRepository` port.
#[derive(Clone)]
pub struct DieselScoreRepository {
    pool: DbPool,
}

impl DieselScoreRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_score(row: ScoreRow) -> Score {
    Score::new(
        row.id,
        UserId::from_uuid(row.user_id),
        row.subject,
        row.score_value,
        row.total,
        row.recorded_at,
    )
}

#[async_trait]
impl ScoreRepository for DieselScoreRepository {
    async fn insert(&self, owner: &UserId, draft: &ScoreDraft) -> Result<Score, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: ScoreRow = diesel::insert_into(scores::table)
            .values(&NewScoreRow {
                user_id: *owner.as_uuid(),
                subject: draft.subject(),
                score_value: draft.score_value(),
                total: draft.total(),
            })
            .returning(ScoreRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_score(row))
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Score>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ScoreRow> = scores::table
            .filter(scores::user_id.eq(owner.as_uuid()))
            .select(ScoreRow::as_select())
            .order_by((scores::recorded_at.desc(), scores::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_score).collect())
    }
}
