//! iCalendar (RFC 5545) feed parsing.
//!
//! Only the subset a room display needs: VEVENT records with their subject,
//! start, end, location, organizer and UID. Values are taken verbatim;
//! backslash escapes are not decoded.

mod datetime;
mod parser;
mod unfold;

pub use datetime::{DecodeError, DecodedTime, decode, decode_in};
pub use parser::IcalParser;
pub use unfold::{PhysicalLines, Unfold, unfold};
