//! Feed-backed calendar provider.

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use roomdisplay_core::{CalendarEvent, MeetingWindow, resolve_meetings};
use tracing::{debug, info};

use crate::error::ProviderResult;
use crate::ical::IcalParser;
use crate::ids::IdGenerator;
use crate::provider::{BoxFuture, CalendarProvider};

use super::client::FeedClient;
use super::config::FeedConfig;

/// Calendar provider reading a single iCal feed.
///
/// Every fetch retrieves and parses the whole feed; nothing is cached
/// between calls.
#[derive(Debug)]
pub struct FeedProvider<Tz: TimeZone = Local> {
    /// HTTP/file client.
    client: FeedClient,
    /// Parser carrying the local timezone.
    parser: IcalParser<Tz>,
    /// Poll interval suggested to the display loop.
    poll_interval: Duration,
}

impl<Tz: TimeZone> FeedProvider<Tz> {
    /// Creates a provider whose all-day and floating times resolve in `tz`.
    pub fn new(config: FeedConfig, tz: Tz) -> ProviderResult<Self> {
        let client = FeedClient::new(config)?;

        Ok(Self {
            client,
            parser: IcalParser::new(tz),
            poll_interval: Duration::from_secs(60),
        })
    }

    /// Uses `ids` for records without a UID.
    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.parser = self.parser.with_ids(ids);
        self
    }

    /// Sets the poll interval suggested to callers.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Retrieves and parses the feed.
    pub async fn fetch(&self) -> ProviderResult<Vec<CalendarEvent>> {
        let text = self.client.fetch().await?;
        debug!(bytes = text.len(), "Retrieved feed");

        let events = self.parser.parse(&text);
        info!(
            source = %self.client.config().source,
            count = events.len(),
            "Fetched events"
        );
        Ok(events)
    }

    /// Retrieves the feed and resolves the meetings of the day containing `now`.
    pub async fn fetch_window(&self, now: DateTime<Utc>) -> ProviderResult<MeetingWindow> {
        let events = self.fetch().await?;
        Ok(resolve_meetings(events, now, self.parser.timezone()))
    }

    /// The timezone used for the reference day.
    pub fn timezone(&self) -> &Tz {
        self.parser.timezone()
    }
}

impl<Tz> CalendarProvider for FeedProvider<Tz>
where
    Tz: TimeZone + Send + Sync,
{
    fn name(&self) -> &str {
        "ical"
    }

    fn fetch_events(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarEvent>>> {
        Box::pin(async move {
            self.fetch()
                .await
                .map_err(|e| e.with_provider(self.name()))
        })
    }

    fn suggested_poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
