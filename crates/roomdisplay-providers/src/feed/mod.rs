//! iCal feed provider.
//!
//! Retrieves a room's published calendar, over HTTP(S) or from a local file,
//! and parses it into events.
//!
//! # Example
//!
//! ```ignore
//! use chrono_tz::Europe::Paris;
//! use roomdisplay_providers::feed::{FeedConfig, FeedProvider};
//!
//! let config = FeedConfig::from_url("https://calendar.example.com/rooms/4.02.ics")?
//!     .with_timeout(std::time::Duration::from_secs(10));
//!
//! let provider = FeedProvider::new(config, Paris)?;
//! let window = provider.fetch_window(chrono::Utc::now()).await?;
//! ```

mod client;
mod config;
mod provider;

pub use client::FeedClient;
pub use config::{FeedConfig, FeedSource};
pub use provider::FeedProvider;
