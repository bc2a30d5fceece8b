//! Event record parsing.
//!
//! Walks the logical lines of a feed once. Each `BEGIN:VEVENT` ...
//! `END:VEVENT` block feeds a [`RecordBuilder`]; complete records become
//! [`CalendarEvent`]s, incomplete ones are dropped without error.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use roomdisplay_core::{CalendarEvent, MeetingWindow, resolve_meetings};
use tracing::{debug, warn};

use crate::ids::{IdGenerator, RandomIds};

use super::datetime::decode_in;
use super::unfold::unfold;

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";

static CN_IN_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CN=([^:]+)").expect("CN regex should be valid"));

/// Parser for iCalendar feeds.
///
/// Holds no state between calls; `parse` can run concurrently from several
/// tasks sharing one parser.
#[derive(Debug, Clone)]
pub struct IcalParser<Tz: TimeZone> {
    tz: Tz,
    ids: Arc<dyn IdGenerator>,
}

impl<Tz: TimeZone> IcalParser<Tz> {
    /// Creates a parser resolving local times in `tz`, with random placeholder IDs.
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            ids: Arc::new(RandomIds),
        }
    }

    /// Uses `ids` for records without a UID.
    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// The timezone used for all-day and floating times.
    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Parses a feed into events, in feed order.
    ///
    /// Never fails: unusable records are dropped.
    pub fn parse(&self, text: &str) -> Vec<CalendarEvent> {
        let mut events = Vec::new();
        let mut record: Option<RecordBuilder> = None;
        let mut dropped = 0usize;

        for line in unfold(text) {
            let line = line.as_ref();

            if line.starts_with(BEGIN_EVENT) {
                let fresh = RecordBuilder::begin(self.ids.next_id());
                if let Some(unfinished) = record.replace(fresh) {
                    debug!(id = %unfinished.id, "Record restarted before END:VEVENT, discarding");
                    dropped += 1;
                }
            } else if line.starts_with(END_EVENT) {
                if let Some(builder) = record.take() {
                    match builder.finish() {
                        Some(event) => events.push(event),
                        None => dropped += 1,
                    }
                }
            } else if let Some(builder) = record.as_mut() {
                builder.ingest(line, &self.tz);
            }
        }

        debug!(events = events.len(), dropped, "Parsed feed");
        events
    }

    /// Parses a feed and resolves the current and next meeting for `now`.
    pub fn parse_window(&self, text: &str, now: DateTime<Utc>) -> MeetingWindow {
        resolve_meetings(self.parse(text), now, &self.tz)
    }
}

/// The in-flight record between `BEGIN:VEVENT` and `END:VEVENT`.
#[derive(Debug)]
struct RecordBuilder {
    id: String,
    subject: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    location: Option<String>,
    organizer: Option<String>,
    /// Depth of nested components (VALARM, ...) whose properties are skipped.
    nested: usize,
}

impl RecordBuilder {
    fn begin(id: String) -> Self {
        Self {
            id,
            subject: None,
            start: None,
            end: None,
            location: None,
            organizer: None,
            nested: 0,
        }
    }

    /// Applies one content line.
    fn ingest<Tz: TimeZone>(&mut self, line: &str, tz: &Tz) {
        let Some((key_spec, value)) = line.split_once(':') else {
            return;
        };
        if key_spec.is_empty() {
            return;
        }
        let (name, params) = key_spec.split_once(';').unwrap_or((key_spec, ""));

        match name {
            "BEGIN" => self.nested += 1,
            "END" => self.nested = self.nested.saturating_sub(1),
            _ if self.nested > 0 => {}
            "SUMMARY" => self.subject = Some(value.to_string()),
            "DTSTART" => self.start = decode_property(name, value, tz),
            "DTEND" => self.end = decode_property(name, value, tz),
            "LOCATION" => self.location = Some(value.to_string()),
            "ORGANIZER" => self.organizer = organizer_name(params, value),
            "UID" => self.id = value.to_string(),
            _ => {}
        }
    }

    /// Completes the record, or `None` when it is unusable.
    fn finish(self) -> Option<CalendarEvent> {
        let (Some(subject), Some(start), Some(end)) = (
            self.subject.filter(|s| !s.is_empty()),
            self.start,
            self.end,
        ) else {
            debug!(id = %self.id, "Dropping record without subject, start or end");
            return None;
        };

        if end <= start {
            debug!(id = %self.id, %start, %end, "Dropping record that ends before it starts");
            return None;
        }

        Some(CalendarEvent {
            id: self.id,
            subject,
            start,
            end,
            location: self.location,
            organizer: self.organizer,
        })
    }
}

fn decode_property<Tz: TimeZone>(name: &str, value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    match decode_in(value, tz) {
        Ok(dt) => Some(dt),
        Err(e) => {
            warn!(property = name, error = %e, "Undecodable date, record will be dropped");
            None
        }
    }
}

/// Display name from an ORGANIZER property.
///
/// Prefers a `CN` parameter, then a `CN=` inside the value, then the value
/// with a leading `mailto:` removed.
fn organizer_name(params: &str, value: &str) -> Option<String> {
    let from_params = params.split(';').find_map(|param| {
        let (key, cn) = param.split_once('=')?;
        key.eq_ignore_ascii_case("CN").then(|| cn.trim_matches('"'))
    });

    let name = from_params
        .filter(|cn| !cn.is_empty())
        .or_else(|| {
            CN_IN_VALUE
                .captures(value)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
        })
        .unwrap_or_else(|| strip_mailto(value));

    (!name.is_empty()).then(|| name.to_string())
}

fn strip_mailto(value: &str) -> &str {
    match value.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("mailto:") => &value[7..],
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use chrono::{Duration, FixedOffset};

    fn utc(d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, h, min, 0).unwrap()
    }

    fn parser() -> IcalParser<Utc> {
        IcalParser::new(Utc).with_ids(SequentialIds::new())
    }

    fn feed(body: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//Test//EN\r\n{}END:VCALENDAR\r\n",
            body
        )
    }

    fn vevent(lines: &[&str]) -> String {
        let mut out = String::from("BEGIN:VEVENT\r\n");
        for line in lines {
            out.push_str(line);
            out.push_str("\r\n");
        }
        out.push_str("END:VEVENT\r\n");
        out
    }

    mod records {
        use super::*;

        #[test]
        fn complete_record() {
            let text = feed(&vevent(&[
                "UID:standup-1@example.com",
                "DTSTART:20250301T090000Z",
                "DTEND:20250301T093000Z",
                "SUMMARY:Standup",
                "LOCATION:Room 4.02",
                "ORGANIZER:mailto:alice@example.com",
            ]));

            let events = parser().parse(&text);

            assert_eq!(events.len(), 1);
            let event = &events[0];
            assert_eq!(event.id, "standup-1@example.com");
            assert_eq!(event.subject, "Standup");
            assert_eq!(event.start, utc(1, 9, 0));
            assert_eq!(event.end, utc(1, 9, 30));
            assert_eq!(event.location.as_deref(), Some("Room 4.02"));
            assert_eq!(event.organizer.as_deref(), Some("alice@example.com"));
        }

        #[test]
        fn placeholder_id_without_uid() {
            let text = feed(&format!(
                "{}{}",
                vevent(&["SUMMARY:A", "DTSTART:20250301T090000Z", "DTEND:20250301T100000Z"]),
                vevent(&["SUMMARY:B", "DTSTART:20250301T110000Z", "DTEND:20250301T120000Z"]),
            ));

            let events = parser().parse(&text);

            assert_eq!(events[0].id, "event-1");
            assert_eq!(events[1].id, "event-2");
        }

        #[test]
        fn missing_end_dropped() {
            let text = feed(&format!(
                "{}{}",
                vevent(&["SUMMARY:No end", "DTSTART:20250301T090000Z"]),
                vevent(&["SUMMARY:Kept", "DTSTART:20250301T100000Z", "DTEND:20250301T110000Z"]),
            ));

            let events = parser().parse(&text);

            assert_eq!(events.len(), 1);
            assert_eq!(events[0].subject, "Kept");
        }

        #[test]
        fn missing_or_empty_subject_dropped() {
            let text = feed(&format!(
                "{}{}",
                vevent(&["DTSTART:20250301T090000Z", "DTEND:20250301T100000Z"]),
                vevent(&["SUMMARY:", "DTSTART:20250301T090000Z", "DTEND:20250301T100000Z"]),
            ));

            assert!(parser().parse(&text).is_empty());
        }

        #[test]
        fn inverted_interval_dropped() {
            let text = feed(&vevent(&[
                "SUMMARY:Backwards",
                "DTSTART:20250301T100000Z",
                "DTEND:20250301T090000Z",
            ]));

            assert!(parser().parse(&text).is_empty());
        }

        #[test]
        fn undecodable_date_drops_record() {
            let text = feed(&vevent(&[
                "SUMMARY:Broken",
                "DTSTART:sometime",
                "DTEND:20250301T090000Z",
            ]));

            assert!(parser().parse(&text).is_empty());
        }

        #[test]
        fn no_events() {
            assert!(parser().parse(&feed("")).is_empty());
            assert!(parser().parse("").is_empty());
        }

        #[test]
        fn unterminated_record_dropped() {
            let text = "BEGIN:VEVENT\r\nSUMMARY:Dangling\r\nDTSTART:20250301T090000Z\r\nDTEND:20250301T100000Z\r\n";
            assert!(parser().parse(text).is_empty());
        }

        #[test]
        fn begin_restarts_record() {
            let text = "BEGIN:VEVENT\r\nSUMMARY:Lost\r\n\
                        BEGIN:VEVENT\r\nDTSTART:20250301T090000Z\r\nDTEND:20250301T100000Z\r\nEND:VEVENT\r\n";
            assert!(parser().parse(text).is_empty());
        }

        #[test]
        fn stray_end_ignored() {
            let text = format!(
                "END:VEVENT\r\n{}",
                vevent(&["SUMMARY:A", "DTSTART:20250301T090000Z", "DTEND:20250301T100000Z"])
            );
            assert_eq!(parser().parse(&text).len(), 1);
        }

        #[test]
        fn lines_outside_records_ignored() {
            let text = "SUMMARY:Outside\r\nDTSTART:20250301T090000Z\r\nDTEND:20250301T100000Z\r\n";
            assert!(parser().parse(text).is_empty());
        }

        #[test]
        fn keeps_feed_order() {
            let text = feed(&format!(
                "{}{}",
                vevent(&["SUMMARY:Late", "DTSTART:20250301T150000Z", "DTEND:20250301T160000Z"]),
                vevent(&["SUMMARY:Early", "DTSTART:20250301T090000Z", "DTEND:20250301T100000Z"]),
            ));

            let subjects: Vec<_> = parser()
                .parse(&text)
                .into_iter()
                .map(|e| e.subject)
                .collect();
            assert_eq!(subjects, vec!["Late", "Early"]);
        }
    }

    mod properties {
        use super::*;

        #[test]
        fn parameters_dropped_from_key() {
            let tz = FixedOffset::east_opt(3600).unwrap();
            let text = feed(&vevent(&[
                "SUMMARY;LANGUAGE=en:Planning",
                "DTSTART;TZID=Europe/Paris:20250301T090000",
                "DTEND;TZID=Europe/Paris:20250301T100000",
            ]));

            let events = IcalParser::new(tz).parse(&text);

            assert_eq!(events[0].subject, "Planning");
            assert_eq!(events[0].start, utc(1, 8, 0));
        }

        #[test]
        fn values_taken_verbatim() {
            let text = feed(&vevent(&[
                "SUMMARY:Budget\\, Q3: review",
                "LOCATION:Building 2\\; Floor 3",
                "DTSTART:20250301T090000Z",
                "DTEND:20250301T100000Z",
            ]));

            let events = parser().parse(&text);

            assert_eq!(events[0].subject, "Budget\\, Q3: review");
            assert_eq!(events[0].location.as_deref(), Some("Building 2\\; Floor 3"));
        }

        #[test]
        fn unknown_properties_ignored() {
            let text = feed(&vevent(&[
                "SUMMARY:Sync",
                "DESCRIPTION:Agenda",
                "X-MICROSOFT-CDO-BUSYSTATUS:BUSY",
                "no colon on this line",
                ":leading colon",
                "DTSTART:20250301T090000Z",
                "DTEND:20250301T100000Z",
            ]));

            let events = parser().parse(&text);
            assert_eq!(events.len(), 1);
            assert!(events[0].location.is_none());
            assert!(events[0].organizer.is_none());
        }

        #[test]
        fn nested_alarm_does_not_overwrite_fields() {
            let text = feed(&vevent(&[
                "SUMMARY:Design review",
                "DTSTART:20250301T090000Z",
                "DTEND:20250301T100000Z",
                "BEGIN:VALARM",
                "ACTION:DISPLAY",
                "SUMMARY:Reminder",
                "TRIGGER:-PT15M",
                "END:VALARM",
                "LOCATION:Room 1",
            ]));

            let events = parser().parse(&text);

            assert_eq!(events[0].subject, "Design review");
            assert_eq!(events[0].location.as_deref(), Some("Room 1"));
        }

        #[test]
        fn folded_uid_unfolds_cleanly() {
            let text = feed(
                "BEGIN:VEVENT\r\n\
                 UID:040000008200E00074C5B7101A82E008000000\r\n 00F0B1D2C3@example.com\r\n\
                 SUMMARY:Folded\r\n\
                 DTSTART:20250301T090000Z\r\n\
                 DTEND:20250301T100000Z\r\n\
                 END:VEVENT\r\n",
            );

            let events = parser().parse(&text);

            assert_eq!(
                events[0].id,
                "040000008200E00074C5B7101A82E00800000000F0B1D2C3@example.com"
            );
        }

        #[test]
        fn all_day_record_spans_local_day() {
            let tz = FixedOffset::east_opt(9 * 3600).unwrap();
            let text = feed(&vevent(&[
                "SUMMARY:Offsite",
                "DTSTART;VALUE=DATE:20250301",
                "DTEND;VALUE=DATE:20250302",
            ]));

            let events = IcalParser::new(tz).parse(&text);

            assert_eq!(events[0].start, utc(1, 0, 0) - Duration::hours(9));
            assert_eq!(events[0].duration(), Duration::hours(24));
        }
    }

    mod organizer {
        use super::*;

        #[test]
        fn cn_parameter() {
            assert_eq!(
                organizer_name("CN=Alice Martin", "mailto:alice@example.com").as_deref(),
                Some("Alice Martin")
            );
        }

        #[test]
        fn quoted_cn_among_other_parameters() {
            assert_eq!(
                organizer_name("SENT-BY=\"mailto:bob@example.com\";cn=\"Martin, Alice\"", "mailto:alice@example.com")
                    .as_deref(),
                Some("Martin, Alice")
            );
        }

        #[test]
        fn cn_inside_value() {
            assert_eq!(
                organizer_name("", "CN=Room Bot:mailto:bot@example.com").as_deref(),
                Some("Room Bot")
            );
        }

        #[test]
        fn mailto_stripped() {
            assert_eq!(
                organizer_name("", "mailto:alice@example.com").as_deref(),
                Some("alice@example.com")
            );
            assert_eq!(
                organizer_name("", "MAILTO:alice@example.com").as_deref(),
                Some("alice@example.com")
            );
        }

        #[test]
        fn plain_value() {
            assert_eq!(organizer_name("", "Front desk").as_deref(), Some("Front desk"));
        }

        #[test]
        fn empty_value() {
            assert_eq!(organizer_name("", ""), None);
            assert_eq!(organizer_name("", "mailto:"), None);
        }

        #[test]
        fn through_the_parser() {
            let text = feed(&vevent(&[
                "SUMMARY:1:1",
                "ORGANIZER;CN=Alice Martin:mailto:alice@example.com",
                "DTSTART:20250301T090000Z",
                "DTEND:20250301T093000Z",
            ]));

            let events = parser().parse(&text);

            assert_eq!(events[0].subject, "1:1");
            assert_eq!(events[0].organizer.as_deref(), Some("Alice Martin"));
        }
    }

    mod windows {
        use super::*;

        const TWO_MEETINGS: &str = "BEGIN:VCALENDAR\r\n\
            BEGIN:VEVENT\r\n\
            SUMMARY:Standup\r\n\
            DTSTART:20250301T090000\r\n\
            DTEND:20250301T093000\r\n\
            END:VEVENT\r\n\
            BEGIN:VEVENT\r\n\
            SUMMARY:Retro\r\n\
            DTSTART:20250301T160000\r\n\
            DTEND:20250301T170000\r\n\
            END:VEVENT\r\n\
            END:VCALENDAR\r\n";

        fn local_tz() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }

        fn local(h: u32, min: u32) -> DateTime<Utc> {
            local_tz()
                .with_ymd_and_hms(2025, 3, 1, h, min, 0)
                .unwrap()
                .with_timezone(&Utc)
        }

        #[test]
        fn standup_in_progress() {
            let parser = IcalParser::new(local_tz()).with_ids(SequentialIds::new());
            let window = parser.parse_window(TWO_MEETINGS, local(9, 15));

            assert_eq!(window.current_meeting.unwrap().subject, "Standup");
            assert_eq!(window.next_meeting.unwrap().subject, "Retro");
        }

        #[test]
        fn single_meeting_in_progress() {
            let text = "BEGIN:VEVENT\r\nSUMMARY:Standup\r\nDTSTART:20250301T090000\r\n\
                        DTEND:20250301T093000\r\nEND:VEVENT\r\n";
            let window = IcalParser::new(local_tz()).parse_window(text, local(9, 15));

            assert_eq!(window.current_meeting.unwrap().subject, "Standup");
            assert!(window.next_meeting.is_none());
        }

        #[test]
        fn between_meetings() {
            let window = IcalParser::new(local_tz()).parse_window(TWO_MEETINGS, local(12, 0));

            assert!(window.current_meeting.is_none());
            assert_eq!(window.next_meeting.unwrap().subject, "Retro");
            assert_eq!(window.all_events.len(), 2);
        }

        #[test]
        fn empty_feed() {
            let window = IcalParser::new(local_tz())
                .parse_window("BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n", local(12, 0));

            assert_eq!(window, MeetingWindow::default());
        }

        #[test]
        fn parsing_twice_is_identical_modulo_placeholders() {
            let strip = |window: MeetingWindow| -> Vec<(String, DateTime<Utc>, DateTime<Utc>)> {
                window
                    .all_events
                    .into_iter()
                    .map(|e| (e.subject, e.start, e.end))
                    .collect()
            };

            let parser = IcalParser::new(local_tz());
            let first = parser.parse_window(TWO_MEETINGS, local(12, 0));
            let second = parser.parse_window(TWO_MEETINGS, local(12, 0));

            assert_ne!(first.all_events[0].id, second.all_events[0].id);
            assert_eq!(strip(first), strip(second));
        }
    }
}
