//! Date/time token decoding.
//!
//! Handles the forms found in DTSTART/DTEND values:
//! - `20250301` - an all-day date, local midnight
//! - `20250301T090000` - a floating date-time, local wall-clock time
//! - `20250301T090000Z` - a UTC date-time
//!
//! Anything else goes through a generic parse (RFC 3339, RFC 2822, ISO-like
//! forms) before being rejected.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use roomdisplay_core::time::{local_midnight, local_to_utc};
use thiserror::Error;

/// Failure to decode a date/time token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty date token")]
    Empty,

    #[error("unrecognized date token: {token:?}")]
    Unrecognized { token: String },
}

/// A decoded token, before the local timezone is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedTime {
    /// A date without time; resolves to local midnight.
    AllDay(NaiveDate),
    /// A wall-clock date-time without zone; resolves in the local timezone.
    Floating(NaiveDateTime),
    /// An absolute UTC instant (`Z` marker).
    Utc(DateTime<Utc>),
    /// An absolute instant with an explicit offset (generic parse only).
    Fixed(DateTime<FixedOffset>),
}

impl DecodedTime {
    /// Pins the decoded value to an instant, using `tz` for local forms.
    pub fn resolve<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        match self {
            Self::AllDay(date) => local_midnight(*date, tz),
            Self::Floating(naive) => local_to_utc(naive, tz),
            Self::Utc(dt) => *dt,
            Self::Fixed(dt) => dt.with_timezone(&Utc),
        }
    }

    /// Returns true for the date-only form.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }
}

/// Decodes a date/time token.
///
/// # Errors
///
/// Returns [`DecodeError`] when neither the calendar forms nor the generic
/// parse accept the token.
pub fn decode(token: &str) -> Result<DecodedTime, DecodeError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }

    let (body, is_utc) = match token.strip_suffix('Z') {
        Some(body) => (body, true),
        None => (token, false),
    };

    if body.len() == 8 {
        if let Ok(date) = NaiveDate::parse_from_str(body, "%Y%m%d") {
            return Ok(DecodedTime::AllDay(date));
        }
    } else if body.len() >= 15
        && let Some(naive) = body
            .get(..15)
            .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S").ok())
    {
        return Ok(if is_utc {
            DecodedTime::Utc(naive.and_utc())
        } else {
            DecodedTime::Floating(naive)
        });
    }

    decode_generic(token)
}

/// Decodes a token straight to an instant in `tz`.
pub fn decode_in<Tz: TimeZone>(token: &str, tz: &Tz) -> Result<DateTime<Utc>, DecodeError> {
    decode(token).map(|decoded| decoded.resolve(tz))
}

fn decode_generic(token: &str) -> Result<DecodedTime, DecodeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
        return Ok(DecodedTime::Fixed(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(token) {
        return Ok(DecodedTime::Fixed(dt));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(token, format) {
            return Ok(DecodedTime::Floating(naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return Ok(DecodedTime::AllDay(date));
    }

    Err(DecodeError::Unrecognized {
        token: token.to_string(),
    })
}
