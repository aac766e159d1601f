//! PostgreSQL-backed `EventRepository` implementation using Diesel.
//!
//! Every query and mutation filters on the owning user id, so an event
//! belonging to another user is indistinguishable from one that does
//! not exist.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EventRepository, PersistenceError};
use crate::domain::{CalendarEvent, EventDraft, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{EventRow, NewEventRow};
use super::pool::DbPool;
use super::schema::events;

/// Diesel-backed implementation of the `EventRepository` port.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_event(row: EventRow) -> Result<CalendarEvent, PersistenceError> {
    let kind = row
        .kind
        .parse()
        .map_err(|_| PersistenceError::query("stored event kind is invalid"))?;
    Ok(CalendarEvent::new(
        row.id,
        UserId::from_uuid(row.user_id),
        row.date,
        kind,
        row.description,
    ))
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn insert(
        &self,
        owner: &UserId,
        draft: &EventDraft,
    ) -> Result<CalendarEvent, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: EventRow = diesel::insert_into(events::table)
            .values(&NewEventRow {
                user_id: *owner.as_uuid(),
                date: draft.date(),
                kind: draft.kind().as_str(),
                description: draft.description(),
            })
            .returning(EventRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_event(row)
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<CalendarEvent>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<EventRow> = events::table
            .filter(events::user_id.eq(owner.as_uuid()))
            .select(EventRow::as_select())
            .order_by((events::date.asc(), events::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_event).collect()
    }

    async fn delete_matching(
        &self,
        owner: &UserId,
        date: NaiveDate,
        description: &str,
    ) -> Result<usize, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(
            events::table
                .filter(events::user_id.eq(owner.as_uuid()))
                .filter(events::date.eq(date))
                .filter(events::description.eq(description)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}
