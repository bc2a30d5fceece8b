//! Polling display loop.
//!
//! Fetches, parses and re-renders on a fixed interval until Ctrl-C. A failed
//! fetch is reported and the loop carries on with the next tick.

use std::fmt;
use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use roomdisplay_core::{MeetingWindow, StatusFormatter, resolve_meetings};
use roomdisplay_providers::{CalendarProvider, FeedProvider, ProviderResult};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cli::StatusArgs;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

use super::status::{feed_config, formatter, render};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Runs the display loop.
pub async fn run(config: &ClientConfig, args: &StatusArgs, interval: Option<u64>) -> ClientResult<()> {
    let feed = feed_config(config, args)?;
    let formatter = formatter(config, args);
    let period = interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.poll_interval());

    if period.is_zero() {
        return Err(ClientError::InvalidArgument(
            "interval must be greater than zero".to_string(),
        ));
    }

    let mut screen = Screen {
        out: io::stdout(),
        formatter: &formatter,
        json: args.json,
        clear: !args.json && io::stdout().is_terminal(),
    };

    match config.timezone().map_err(ClientError::Config)? {
        Some(tz) => {
            let provider = FeedProvider::new(feed, tz)?.with_poll_interval(period);
            watch(&provider, &tz, &mut screen, tokio::signal::ctrl_c()).await
        }
        None => {
            let provider = FeedProvider::new(feed, Local)?.with_poll_interval(period);
            watch(&provider, &Local, &mut screen, tokio::signal::ctrl_c()).await
        }
    }
}

/// Where rendered status goes.
struct Screen<'a, W> {
    out: W,
    formatter: &'a StatusFormatter,
    json: bool,
    clear: bool,
}

impl<W: Write> Screen<'_, W> {
    fn show<Tz>(&mut self, window: &MeetingWindow, now: DateTime<Utc>, tz: &Tz) -> ClientResult<()>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let output = render(self.formatter, window, now, tz, self.json)?;
        if self.clear {
            write!(self.out, "{}", CLEAR_SCREEN)?;
        }
        writeln!(self.out, "{}", output)?;
        self.out.flush()?;
        Ok(())
    }
}

async fn watch<Tz, W, F>(
    provider: &dyn CalendarProvider,
    tz: &Tz,
    screen: &mut Screen<'_, W>,
    shutdown: F,
) -> ClientResult<()>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
    W: Write,
    F: Future<Output = io::Result<()>>,
{
    let period = provider.suggested_poll_interval();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    info!(
        provider = provider.name(),
        interval_secs = period.as_secs(),
        "Watching feed"
    );

    loop {
        tokio::select! {
            result = &mut shutdown => return stopped(result),
            _ = ticker.tick() => {}
        }

        let now = Utc::now();
        let polled = tokio::select! {
            result = &mut shutdown => return stopped(result),
            polled = poll_once(provider, now, tz) => polled,
        };

        match polled {
            Ok(window) => screen.show(&window, now, tz)?,
            Err(e) => {
                warn!(error = %e, retryable = e.is_retryable(), "Fetch failed");
                eprintln!("error: {}", e);
            }
        }
    }
}

fn stopped(signal: io::Result<()>) -> ClientResult<()> {
    signal?;
    info!("Interrupted, stopping");
    Ok(())
}

/// One fetch-parse-resolve cycle.
async fn poll_once<Tz: TimeZone>(
    provider: &dyn CalendarProvider,
    now: DateTime<Utc>,
    tz: &Tz,
) -> ProviderResult<MeetingWindow> {
    let events = provider.fetch_events().await?;
    let window = resolve_meetings(events, now, tz);
    debug!(
        busy = window.is_busy(),
        events = window.all_events.len(),
        "Resolved meeting window"
    );
    Ok(window)
}
