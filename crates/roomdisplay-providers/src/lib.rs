//! Feed ingestion for the room display.
//!
//! This crate turns a calendar feed into resolved room state:
//!
//! - [`ical`] - line unfolding, date/time decoding, event record parsing
//! - [`FeedClient`] - retrieves the raw feed text (HTTP or local file)
//! - [`CalendarProvider`] - the trait the display polls
//! - [`ProviderError`] - transport and configuration failures
//!
//! # Architecture
//!
//! ```text
//!  feed text ──► unfold() ──► IcalParser ──► Vec<CalendarEvent>
//!                              │ decode()                │
//!                                                        ▼ resolve_meetings()
//!                                                 ┌───────────────┐
//!                                                 │ MeetingWindow │
//!                                                 └───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use chrono::{Local, Utc};
//! use roomdisplay_providers::{FeedConfig, FeedProvider};
//!
//! let config = FeedConfig::from_url("https://example.com/room.ics")?;
//! let provider = FeedProvider::new(config, Local)?;
//! let window = provider.fetch_window(Utc::now()).await?;
//! println!("busy: {}", window.is_busy());
//! ```

pub mod error;
pub mod feed;
pub mod ical;
pub mod ids;
pub mod provider;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use feed::{FeedClient, FeedConfig, FeedProvider, FeedSource};
pub use ical::{DecodeError, DecodedTime, IcalParser, decode, decode_in, unfold};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use provider::{BoxFuture, CalendarProvider};
