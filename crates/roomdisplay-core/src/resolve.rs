//! Meeting window resolution.
//!
//! Given the decoded events of a feed and a reference instant, selects the
//! events of the reference day and determines the current and next meeting.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::event::CalendarEvent;
use crate::time::TimeWindow;

/// The resolved state of the room for one reference instant.
///
/// `all_events` is sorted ascending by start and restricted to the reference
/// day. `current_meeting` and `next_meeting` are copies of entries in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingWindow {
    /// The first event (in start order) whose interval contains "now".
    pub current_meeting: Option<CalendarEvent>,
    /// The earliest event starting strictly after "now".
    pub next_meeting: Option<CalendarEvent>,
    /// Every event overlapping the reference day.
    pub all_events: Vec<CalendarEvent>,
}

impl MeetingWindow {
    /// Returns true if a meeting is in progress.
    ///
    /// This is the only BUSY/FREE discriminator.
    pub fn is_busy(&self) -> bool {
        self.current_meeting.is_some()
    }

    /// Returns true if nothing is booked for the reference day.
    pub fn is_empty(&self) -> bool {
        self.all_events.is_empty()
    }
}

/// Resolves the meeting window for the local day (in `tz`) containing `now`.
pub fn resolve_meetings<Tz, I>(events: I, now: DateTime<Utc>, tz: &Tz) -> MeetingWindow
where
    Tz: TimeZone,
    I: IntoIterator<Item = CalendarEvent>,
{
    resolve_meetings_in(events, now, &TimeWindow::day_of(now, tz))
}

/// Resolves the meeting window against an explicit reference day.
///
/// Events are assumed not to overlap each other. When they do, the first one
/// in start order containing `now` is the current meeting.
pub fn resolve_meetings_in<I>(events: I, now: DateTime<Utc>, day: &TimeWindow) -> MeetingWindow
where
    I: IntoIterator<Item = CalendarEvent>,
{
    let mut all_events: Vec<CalendarEvent> = events
        .into_iter()
        .filter(|event| event.overlaps(day))
        .collect();

    // Stable: ties keep feed order.
    all_events.sort_by_key(|event| event.start);

    let mut current = None;
    let mut next = None;

    for (idx, event) in all_events.iter().enumerate() {
        if current.is_none() && event.is_ongoing_at(now) {
            current = Some(idx);
        } else if next.is_none() && event.starts_after(now) {
            next = Some(idx);
        }

        if current.is_some() && next.is_some() {
            break;
        }
    }

    trace!(
        day_events = all_events.len(),
        current = ?current,
        next = ?next,
        "Resolved meeting window"
    );

    MeetingWindow {
        current_meeting: current.map(|idx| all_events[idx].clone()),
        next_meeting: next.map(|idx| all_events[idx].clone()),
        all_events,
    }
}
