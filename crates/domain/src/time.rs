//! Time and timestamp helpers.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// UTC timestamp used for event times and run bookkeeping.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the device's local wall-clock time.
///
/// Time variables (`current_hour`, …) and calendar events are expressed in
/// local time, the way the device displays them.
#[must_use]
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
