//! Calendar store port — persistence for calendar events.

use std::future::Future;

use chrono::NaiveDate;
use inksync_domain::calendar::CalendarEvent;
use inksync_domain::error::InkSyncError;
use inksync_domain::id::CalendarEventId;

pub trait CalendarStore {
    /// Events touching any day in `from..=to`, ordered by start.
    fn list_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<CalendarEvent>, InkSyncError>> + Send;

    /// Persist a new event.
    fn insert(
        &self,
        event: CalendarEvent,
    ) -> impl Future<Output = Result<CalendarEvent, InkSyncError>> + Send;

    /// Delete an event. Returns `false` when no event had that id.
    fn delete(&self, id: CalendarEventId)
    -> impl Future<Output = Result<bool, InkSyncError>> + Send;
}

impl<T: CalendarStore + Send + Sync> CalendarStore for std::sync::Arc<T> {
    fn list_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<CalendarEvent>, InkSyncError>> + Send {
        (**self).list_between(from, to)
    }

    fn insert(
        &self,
        event: CalendarEvent,
    ) -> impl Future<Output = Result<CalendarEvent, InkSyncError>> + Send {
        (**self).insert(event)
    }

    fn delete(
        &self,
        id: CalendarEventId,
    ) -> impl Future<Output = Result<bool, InkSyncError>> + Send {
        (**self).delete(id)
    }
}
