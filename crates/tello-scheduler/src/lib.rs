//! `tello-scheduler`: the two batch jobs behind the cron endpoints.
//!
//! | Job                          | Behaviour                                           |
//! |------------------------------|-----------------------------------------------------|
//! | [`recurring::materialize`]   | Create bookings for the next 8 weeks of templates   |
//! | [`reminders::send_due_reminders`] | Email bookings starting within 24 hours, once  |
//!
//! Both take "now" from the caller as a naive Costa Rica wall-clock value,
//! the same representation the store uses for `hora_inicio`.

pub mod error;
pub mod recurring;
pub mod reminders;

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

pub use error::{Result, SchedulerError};
pub use recurring::{materialize, next_occurrence, occurrences, MaterializeReport, WEEKS_AHEAD};
pub use reminders::{send_due_reminders, ReminderReport, ReminderWindow};

/// Current wall-clock time at the site, without offset.
pub fn wall_clock_now(tz: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}
