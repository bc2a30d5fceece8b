//! One-shot status: fetch the feed, resolve the reference day, print.

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};
use roomdisplay_core::{MeetingWindow, StatusFormatter};
use roomdisplay_providers::{FeedConfig, FeedProvider, FeedSource};
use tracing::debug;

use crate::cli::StatusArgs;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Prints the room status once.
pub async fn run(config: &ClientConfig, args: &StatusArgs) -> ClientResult<()> {
    let feed = feed_config(config, args)?;
    let formatter = formatter(config, args);
    let now = args.now.unwrap_or_else(Utc::now);

    match config.timezone().map_err(ClientError::Config)? {
        Some(tz) => show(feed, tz, now, &formatter, args.json).await,
        None => show(feed, Local, now, &formatter, args.json).await,
    }
}

async fn show<Tz>(
    feed: FeedConfig,
    tz: Tz,
    now: DateTime<Utc>,
    formatter: &StatusFormatter,
    json: bool,
) -> ClientResult<()>
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: fmt::Display,
{
    let provider = FeedProvider::new(feed, tz)?;
    let window = provider.fetch_window(now).await?;
    println!("{}", render(formatter, &window, now, provider.timezone(), json)?);
    Ok(())
}

/// Picks the feed source: `--file`, then `--url`, then `[feed] url`.
pub fn feed_config(config: &ClientConfig, args: &StatusArgs) -> ClientResult<FeedConfig> {
    let source = if let Some(ref path) = args.file {
        FeedSource::File(path.clone())
    } else if let Some(ref url) = args.url {
        FeedSource::from_url(url).map_err(|e| ClientError::InvalidArgument(e.to_string()))?
    } else {
        config
            .feed
            .source()
            .map_err(ClientError::Config)?
            .ok_or_else(|| {
                ClientError::Config(format!(
                    "no feed configured: set [feed] url in {} or pass --url/--file",
                    ClientConfig::default_path().display()
                ))
            })?
    };

    debug!(source = %source, "Using feed");
    Ok(config.feed.to_provider_config(source))
}

/// Builds the formatter from `[display]`, applying command-line overrides.
pub fn formatter(config: &ClientConfig, args: &StatusArgs) -> StatusFormatter {
    let mut options = config.display.clone();
    if let Some(ref name) = args.space_name {
        options.space_name = name.clone();
    }
    StatusFormatter::new(options)
}

/// Renders a meeting window as terminal text or as the JSON document.
pub fn render<Tz>(
    formatter: &StatusFormatter,
    window: &MeetingWindow,
    now: DateTime<Utc>,
    tz: &Tz,
    json: bool,
) -> ClientResult<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if json {
        Ok(serde_json::to_string_pretty(&formatter.format_json(window))?)
    } else {
        let view = formatter.status_at(window, now, tz);
        Ok(formatter.render_tty(&view))
    }
}
