//! Calendar service — listing, creating and deleting calendar events and
//! building the agenda of a day.

use chrono::NaiveDate;

use inksync_domain::calendar::{self, Agenda, CalendarEvent};
use inksync_domain::error::{InkSyncError, NotFoundError, ValidationError};
use inksync_domain::id::CalendarEventId;
use inksync_domain::time;

use crate::ports::CalendarStore;

pub struct CalendarService<C> {
    store: C,
}

impl<C: CalendarStore + Sync> CalendarService<C> {
    pub fn new(store: C) -> Self {
        Self { store }
    }

    /// List events overlapping the range given as client-supplied date or
    /// date-time strings. Only the date part of each bound is used.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::Validation`] when a bound cannot be parsed or
    /// `from` is after `to`, or a storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn list_between(&self, from: &str, to: &str) -> Result<Vec<CalendarEvent>, InkSyncError> {
        let from = parse_bound(from)?;
        let to = parse_bound(to)?;
        if from > to {
            return Err(ValidationError::InvalidCalendarEvent("range start is after its end").into());
        }
        self.store.list_between(from, to).await
    }

    /// Store a new event.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::Validation`] for a blank name or an end
    /// before the start, or a storage error from the store.
    #[tracing::instrument(skip(self, event), fields(event_name = %event.name))]
    pub async fn create(&self, event: CalendarEvent) -> Result<CalendarEvent, InkSyncError> {
        event.validate()?;
        self.store.insert(event).await
    }

    /// # Errors
    ///
    /// Returns [`InkSyncError::NotFound`] when no event with `id` exists.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: CalendarEventId) -> Result<(), InkSyncError> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(NotFoundError {
                entity: "CalendarEvent",
                id: id.to_string(),
            }
            .into())
        }
    }

    /// Events covering `day`, ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the store.
    pub async fn agenda(&self, day: NaiveDate) -> Result<Agenda, InkSyncError> {
        let events = self.store.list_between(day, day).await?;
        Ok(calendar::agenda_for(&events, day))
    }

    /// Agenda of the current local day.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the store.
    pub async fn today(&self) -> Result<Agenda, InkSyncError> {
        self.agenda(time::local_now().date()).await
    }
}

fn parse_bound(raw: &str) -> Result<NaiveDate, ValidationError> {
    calendar::parse_event_time(raw)
        .map(|at| at.date())
        .ok_or_else(|| ValidationError::InvalidIdentifier(raw.to_string()))
}
