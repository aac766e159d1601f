//! PostgreSQL-backed `SchoolworkRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, SchoolworkRepository};
use crate::domain::{AnalysisDraft, SchoolworkAnalysis, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewSchoolworkAnalysisRow, SchoolworkAnalysisRow};
use super::pool::DbPool;
use super::schema::schoolwork_analyses;

/// Diesel-backed implementation of the `SchoolworkRepository` port.
#[derive(Clone)]
pub struct DieselSchoolworkRepository {
    pool: DbPool,
}

impl DieselSchoolworkRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_analysis(row: SchoolworkAnalysisRow) -> SchoolworkAnalysis {
    SchoolworkAnalysis::new(
        row.id,
        UserId::from_uuid(row.user_id),
        row.kind,
        row.subject,
        row.topic,
        row.content,
        row.created_at,
    )
}

#[async_trait]
impl SchoolworkRepository for DieselSchoolworkRepository {
    async fn insert(
        &self,
        owner: &UserId,
        draft: &AnalysisDraft,
    ) -> Result<SchoolworkAnalysis, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: SchoolworkAnalysisRow = diesel::insert_into(schoolwork_analyses::table)
            .values(&NewSchoolworkAnalysisRow {
                user_id: *owner.as_uuid(),
                kind: draft.kind(),
                subject: draft.subject(),
                topic: draft.topic(),
                content: draft.content(),
            })
            .returning(SchoolworkAnalysisRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_analysis(row))
    }

    async fn list_recent(
        &self,
        owner: &UserId,
        limit: i64,
    ) -> Result<Vec<SchoolworkAnalysis>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SchoolworkAnalysisRow> = schoolwork_analyses::table
            .filter(schoolwork_analyses::user_id.eq(owner.as_uuid()))
            .select(SchoolworkAnalysisRow::as_select())
            .order_by((
                schoolwork_analyses::created_at.desc(),
                schoolwork_analyses::id.desc(),
            ))
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_analysis).collect())
    }

    async fn find_by_id(
        &self,
        owner: &UserId,
        id: i32,
    ) -> Result<Option<SchoolworkAnalysis>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<SchoolworkAnalysisRow> = schoolwork_analyses::table
            .filter(schoolwork_analyses::user_id.eq(owner.as_uuid()))
            .filter(schoolwork_analyses::id.eq(id))
            .select(SchoolworkAnalysisRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_analysis))
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for row conversion; query paths run against a live
    //! database in the integration environment.
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    #[rstest]
    fn rows_convert_with_optional_topics() {
        let row = SchoolworkAnalysisRow {
            id: 9,
            user_id: Uuid::new_v4(),
            kind: "exam".to_owned(),
            subject: "Maths".to_owned(),
            topic: None,
            content: "Work on signs.".to_owned(),
            created_at: Utc::now(),
        };

        let analysis = row_to_analysis(row);
        assert_eq!(analysis.id(), 9);
        assert_eq!(analysis.topic(), None);
        assert_eq!(analysis.content(), "Work on signs.");
    }
}
