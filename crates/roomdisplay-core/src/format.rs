//! Status formatting for the room display.
//!
//! Turns a [`MeetingWindow`] into what the kiosk shows:
//! - **Status**: BUSY/FREE, the current meeting with its countdown, the next booking
//! - **Agenda**: one line per booking of the reference day
//! - **JSON**: the `currentMeeting` / `nextMeeting` / `allEvents` document
//!   served to web frontends

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::event::CalendarEvent;
use crate::resolve::MeetingWindow;

/// Whether the room is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    /// A meeting is in progress.
    Busy,
    /// No meeting is in progress.
    Free,
}

impl Occupancy {
    /// Returns the banner text for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Busy => "BUSY",
            Self::Free => "FREE",
        }
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time format preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// 24-hour format (e.g., "14:30").
    #[default]
    H24,
    /// 12-hour format with AM/PM (e.g., "02:30 PM").
    H12,
}

/// Configuration options for status formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Name of the room or space shown in the header.
    pub space_name: String,
    /// Time format preference.
    pub time_format: TimeFormat,
    /// Maximum length for meeting subjects (truncated with ellipsis).
    pub max_title_length: Option<usize>,
    /// Whether to show the organizer of the current meeting.
    pub show_organizer: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            space_name: "Meeting Room".to_string(),
            time_format: TimeFormat::H24,
            max_title_length: None,
            show_organizer: true,
        }
    }
}

/// One line of the daily agenda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaLine {
    /// "HH:MM - HH:MM" in the display timezone.
    pub time_range: String,
    /// Meeting subject (may be truncated).
    pub subject: String,
    /// Whether this is the meeting in progress.
    pub is_current: bool,
}

/// Everything the kiosk renders for one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    /// Room or space name.
    pub space_name: String,
    /// Wall clock at the reference instant.
    pub clock: String,
    /// BUSY or FREE.
    pub occupancy: Occupancy,
    /// Current meeting subject, or "Available".
    pub headline: String,
    /// Time range and countdown, or how long the room stays free.
    pub detail: String,
    /// Organizer of the current meeting, when enabled and known.
    pub organizer: Option<String>,
    /// Summary of the next booking.
    pub next: Option<String>,
    /// The day's bookings in start order.
    pub agenda: Vec<AgendaLine>,
}

/// Formatter for the room status.
#[derive(Debug, Clone, Default)]
pub struct StatusFormatter {
    options: DisplayOptions,
}

impl StatusFormatter {
    /// Creates a new formatter with the given options.
    pub fn new(options: DisplayOptions) -> Self {
        Self { options }
    }

    /// Creates a new formatter with default options.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Returns the formatter options.
    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    /// Builds the status view for `now`, rendering times in `tz`.
    pub fn status_at<Tz>(&self, window: &MeetingWindow, now: DateTime<Utc>, tz: &Tz) -> StatusView
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let (occupancy, headline, detail, organizer) = match &window.current_meeting {
            Some(current) => (
                Occupancy::Busy,
                self.title(&current.subject).into_owned(),
                format!(
                    "{} | {}",
                    self.time_range(current, tz),
                    time_remaining(current.end, now)
                ),
                current
                    .organizer
                    .clone()
                    .filter(|_| self.options.show_organizer),
            ),
            None => {
                let detail = match &window.next_meeting {
                    Some(next) => format!("Until {}", self.format_time(next.start, tz)),
                    None => "For the rest of the day".to_string(),
                };
                (Occupancy::Free, "Available".to_string(), detail, None)
            }
        };

        let next = window.next_meeting.as_ref().map(|next| {
            format!(
                "Next: {} at {} ({})",
                self.title(&next.subject),
                self.format_time(next.start, tz),
                time_until(next.start, now)
            )
        });

        let agenda = window
            .all_events
            .iter()
            .map(|event| AgendaLine {
                time_range: self.time_range(event, tz),
                subject: self.title(&event.subject).into_owned(),
                is_current: window.current_meeting.as_ref() == Some(event),
            })
            .collect();

        StatusView {
            space_name: self.options.space_name.clone(),
            clock: self.format_time(now, tz),
            occupancy,
            headline,
            detail,
            organizer,
            next,
            agenda,
        }
    }

    /// Renders a status view as terminal text.
    pub fn render_tty(&self, view: &StatusView) -> String {
        let mut lines = vec![
            format!("{}  {}", view.space_name, view.clock),
            view.occupancy.to_string(),
            view.headline.clone(),
            view.detail.clone(),
        ];

        if let Some(ref organizer) = view.organizer {
            lines.push(format!("Organizer: {}", organizer));
        }
        if let Some(ref next) = view.next {
            lines.push(next.clone());
        }

        lines.push(String::new());
        lines.push("Today:".to_string());

        if view.agenda.is_empty() {
            lines.push("  No bookings".to_string());
        }
        for line in &view.agenda {
            let marker = if line.is_current { '>' } else { ' ' };
            lines.push(format!("{} {}  {}", marker, line.time_range, line.subject));
        }

        lines.join("\n")
    }

    /// Builds the JSON document for a meeting window.
    pub fn format_json(&self, window: &MeetingWindow) -> JsonStatus {
        JsonStatus::from(window)
    }

    fn time_range<Tz>(&self, event: &CalendarEvent, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        format!(
            "{} - {}",
            self.format_time(event.start, tz),
            self.format_time(event.end, tz)
        )
    }

    fn format_time<Tz>(&self, dt: DateTime<Utc>, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let local = dt.with_timezone(tz);
        match self.options.time_format {
            TimeFormat::H24 => local.format("%H:%M").to_string(),
            TimeFormat::H12 => local.format("%I:%M %p").to_string(),
        }
    }

    fn title<'a>(&self, subject: &'a str) -> Cow<'a, str> {
        match self.options.max_title_length {
            Some(max_len) => ellipsis(subject, max_len),
            None => Cow::Borrowed(subject),
        }
    }
}

/// Countdown to the end of an ongoing meeting.
///
/// `"1h 5m remaining"`, `"25 min remaining"`, or `"Ending soon"` once no
/// time is left.
pub fn time_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if end <= now {
        return "Ending soon".to_string();
    }
    let minutes = (end - now).num_minutes();
    let hours = minutes / 60;
    if hours > 0 {
        format!("{}h {}m remaining", hours, minutes % 60)
    } else {
        format!("{} min remaining", minutes)
    }
}

/// Countdown to the start of an upcoming meeting.
///
/// `"in 1h 5m"`, `"in 25 min"`, or `"Starting now"` once no time is left.
pub fn time_until(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if start <= now {
        return "Starting now".to_string();
    }
    let minutes = (start - now).num_minutes();
    let hours = minutes / 60;
    if hours > 0 {
        format!("in {}h {}m", hours, minutes % 60)
    } else {
        format!("in {} min", minutes)
    }
}

/// Truncates a string with ellipsis if it exceeds the given length.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}

/// The status document served to web frontends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonStatus {
    /// Meeting in progress, `null` when free.
    pub current_meeting: Option<JsonMeeting>,
    /// Next booking, `null` when none is left today.
    pub next_meeting: Option<JsonMeeting>,
    /// The day's bookings in start order.
    pub all_events: Vec<JsonMeeting>,
}

impl From<&MeetingWindow> for JsonStatus {
    fn from(window: &MeetingWindow) -> Self {
        Self {
            current_meeting: window.current_meeting.as_ref().map(JsonMeeting::from),
            next_meeting: window.next_meeting.as_ref().map(JsonMeeting::from),
            all_events: window.all_events.iter().map(JsonMeeting::from).collect(),
        }
    }
}

/// A single meeting in the status document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonMeeting {
    pub subject: String,
    pub start: JsonDateTime,
    pub end: JsonDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<JsonOrganizer>,
}

impl From<&CalendarEvent> for JsonMeeting {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            subject: event.subject.clone(),
            start: JsonDateTime::from(event.start),
            end: JsonDateTime::from(event.end),
            location: event.location.clone(),
            organizer: event.organizer.as_ref().map(|name| JsonOrganizer {
                email_address: JsonEmailAddress { name: name.clone() },
            }),
        }
    }
}

/// An instant as `{ "dateTime": "2025-03-01T09:00:00.000Z" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDateTime {
    pub date_time: String,
}

impl From<DateTime<Utc>> for JsonDateTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            date_time: dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonOrganizer {
    pub email_address: JsonEmailAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonEmailAddress {
    pub name: String,
}
