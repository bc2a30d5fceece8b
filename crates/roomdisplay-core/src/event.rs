//! Event types for room reservations.
//!
//! A [`CalendarEvent`] is one reservation materialized from a single feed
//! record. Events are never mutated after construction; each fetch produces
//! a fresh set.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::time::TimeWindow;

/// One scheduled reservation of the room or space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Identifier, unique within one feed.
    ///
    /// Comes from the record's UID when present, otherwise a generated
    /// placeholder that is not stable across parses.
    pub id: String,
    /// Display text.
    pub subject: String,
    /// Start instant (inclusive).
    pub start: DateTime<Utc>,
    /// End instant (exclusive).
    pub end: DateTime<Utc>,
    /// Free-text location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Organizer display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
}

impl CalendarEvent {
    /// Creates a new event with the required fields.
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            start,
            end,
            location: None,
            organizer: None,
        }
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the organizer.
    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizer = Some(organizer.into());
        self
    }

    /// Returns true if `now` falls inside `[start, end)`.
    pub fn is_ongoing_at(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }

    /// Returns true if the event starts strictly after `now`.
    pub fn starts_after(&self, now: DateTime<Utc>) -> bool {
        self.start > now
    }

    /// Returns true if the event overlaps the given window.
    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        window.overlaps(self.start, self.end)
    }

    /// Length of the reservation.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
