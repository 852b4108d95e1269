//! `SQLite` implementation of [`CalendarStore`].

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use inksync_app::ports::CalendarStore;
use inksync_domain::calendar::CalendarEvent;
use inksync_domain::error::InkSyncError;
use inksync_domain::id::CalendarEventId;

use crate::error::StorageError;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

struct Wrapper(CalendarEvent);

fn parse_time(raw: &str) -> Result<NaiveDateTime, sqlx::Error> {
    NaiveDateTime::parse_from_str(raw, TIME_FORMAT).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let start: String = row.try_get("start_at")?;
        let end: String = row.try_get("end_at")?;

        Ok(Self(CalendarEvent {
            id: CalendarEventId::from_uuid(id),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            start: parse_time(&start)?,
            end: parse_time(&end)?,
            all_day: row.try_get("all_day")?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO calendar_events (id, name, description, start_at, end_at, all_day)
    VALUES (?, ?, ?, ?, ?, ?)
";

// Stored times start with `YYYY-MM-DD`, so comparing the first ten
// characters compares calendar days.
const SELECT_BETWEEN: &str = r"
    SELECT * FROM calendar_events
    WHERE substr(start_at, 1, 10) <= ? AND substr(end_at, 1, 10) >= ?
    ORDER BY start_at
";

const DELETE_BY_ID: &str = "DELETE FROM calendar_events WHERE id = ?";

/// `SQLite`-backed calendar store.
pub struct SqliteCalendarStore {
    pool: SqlitePool,
}

impl SqliteCalendarStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CalendarStore for SqliteCalendarStore {
    async fn list_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, InkSyncError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BETWEEN)
            .bind(to.format(DATE_FORMAT).to_string())
            .bind(from.format(DATE_FORMAT).to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn insert(&self, event: CalendarEvent) -> Result<CalendarEvent, InkSyncError> {
        sqlx::query(INSERT)
            .bind(event.id.as_uuid())
            .bind(&event.name)
            .bind(&event.description)
            .bind(event.start.format(TIME_FORMAT).to_string())
            .bind(event.end.format(TIME_FORMAT).to_string())
            .bind(event.all_day)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(event)
    }

    async fn delete(&self, id: CalendarEventId) -> Result<bool, InkSyncError> {
        let result = sqlx::query(DELETE_BY_ID)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
