//! Core types: events, reference day, meeting resolution, status formatting

pub mod event;
pub mod format;
pub mod resolve;
pub mod time;
pub mod tracing;

pub use event::CalendarEvent;
pub use format::{
    AgendaLine, DisplayOptions, JsonMeeting, JsonStatus, Occupancy, StatusFormatter, StatusView,
    TimeFormat, ellipsis, time_remaining, time_until,
};
pub use resolve::{MeetingWindow, resolve_meetings, resolve_meetings_in};
pub use time::{TimeWindow, local_to_utc};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
