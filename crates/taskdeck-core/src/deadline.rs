//! Deadline classification shared by the reminder scanner and the frontend
//! display rules.
//!
//! All functions are pure and take `now` explicitly so callers (and tests)
//! control the clock. The classifier is completion-agnostic: excluding
//! completed tasks is the caller's responsibility.

use time::{Duration, OffsetDateTime};

/// Default look-ahead window for "due soon".
pub const DUE_SOON_WINDOW: Duration = Duration::hours(24);

/// Whether the deadline lies strictly in the past.
#[must_use]
pub fn is_overdue(deadline: OffsetDateTime, now: OffsetDateTime) -> bool {
    deadline < now
}

/// Whether the deadline lies strictly in the future but within `window`.
///
/// A deadline exactly equal to `now` is neither overdue nor due soon, and an
/// overdue deadline never counts as due soon: the two classifications are
/// mutually exclusive by construction.
#[must_use]
pub fn is_due_within(deadline: OffsetDateTime, now: OffsetDateTime, window: Duration) -> bool {
    let ahead = deadline - now;
    ahead > Duration::ZERO && ahead <= window
}

/// [`is_due_within`] with the default 24-hour window.
#[must_use]
pub fn is_due_soon(deadline: OffsetDateTime, now: OffsetDateTime) -> bool {
    is_due_within(deadline, now, DUE_SOON_WINDOW)
}
