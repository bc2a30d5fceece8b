//! CalendarProvider trait definition.
//!
//! A provider hands the display the events of its room. The feed provider
//! is the only implementation shipped here; others (directory services,
//! booking systems) plug in behind the same trait.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use roomdisplay_core::CalendarEvent;

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Keeps [`CalendarProvider`] object-safe so the display can hold a
/// `Box<dyn CalendarProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The source of events for a room.
pub trait CalendarProvider: Send + Sync {
    /// Returns the name/type of this provider (e.g., "ical").
    fn name(&self) -> &str;

    /// Fetches all events currently published for the room, in source order.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when the source cannot be reached or read.
    /// Malformed records are not errors; they are left out of the result.
    fn fetch_events(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarEvent>>>;

    /// How often the display should poll this provider.
    fn suggested_poll_interval(&self) -> Duration {
        Duration::from_secs(60)
    }
}
