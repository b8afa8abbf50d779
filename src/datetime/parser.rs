use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use super::shift::offset_from_minutes;

/// Offset assumed for timestamps that carry no zone: the event's fixed PDT (UTC-07:00).
///
/// This is applied regardless of the DST rules on the parsed date, so a session
/// scheduled after the autumn switch still parses as -07:00 rather than -08:00.
pub const DEFAULT_SOURCE_OFFSET_MINUTES: i32 = -7 * 60;

const VERBOSE_FORMAT: &str = "%B %d, %Y %I:%M %p";

fn zone_suffix() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([+-])(\d{2}):?(\d{2})$").ok())
        .as_ref()
}

/// Converts session start/end attribute strings into absolute instants
#[derive(Debug, Clone, Copy)]
pub struct TimeParser {
    source_offset: FixedOffset,
}

impl TimeParser {
    pub fn new(source_offset_minutes: i32) -> Self {
        Self {
            source_offset: offset_from_minutes(source_offset_minutes),
        }
    }

    pub fn source_offset(&self) -> FixedOffset {
        self.source_offset
    }

    /// Parse `YYYY-MM-DD HH:mm[:ss]`, ISO 8601 with or without offset, or
    /// `Month D, YYYY h:mm AM`. Returns `None` for anything else.
    pub fn parse(&self, raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let parsed = if raw.starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.parse_verbose(raw)
        } else {
            self.parse_numeric(raw)
        };

        if parsed.is_none() {
            debug!(raw, "unparseable session time");
        }
        parsed
    }

    fn parse_verbose(&self, raw: &str) -> Option<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(raw, VERBOSE_FORMAT).ok()?;
        self.localize(naive, self.source_offset)
    }

    fn parse_numeric(&self, raw: &str) -> Option<DateTime<Utc>> {
        let (body, offset) = split_zone(raw);
        let offset = offset.unwrap_or(self.source_offset);
        let naive = normalize(body)?;
        self.localize(naive, offset)
    }

    fn localize(&self, naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
        offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_OFFSET_MINUTES)
    }
}

/// Strip a trailing `Z` or `±HH[:]MM` and return the explicit offset, if any
fn split_zone(raw: &str) -> (&str, Option<FixedOffset>) {
    if let Some(body) = raw.strip_suffix(['Z', 'z']) {
        return (body, Some(Utc.fix()));
    }

    let Some(caps) = zone_suffix().and_then(|re| re.captures(raw)) else {
        return (raw, None);
    };
    // A bare date like 2025-10-17 never reaches here: the suffix needs four digits
    let hours: i32 = caps[2].parse().unwrap_or(0);
    let minutes: i32 = caps[3].parse().unwrap_or(0);
    let sign = if &caps[1] == "-" { -1 } else { 1 };
    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60));

    let start = caps.get(0).map(|m| m.start()).unwrap_or(raw.len());
    (raw[..start].trim_end(), offset)
}

/// `2025-10-17 9:10`, `2025-10-17T09:10:00`, `2025-10-17 9:10 pm` → naive local time
fn normalize(body: &str) -> Option<NaiveDateTime> {
    let (date, rest) = match body.split_once('T') {
        Some((d, t)) => (d, t.to_string()),
        None => {
            let mut parts = body.split_whitespace();
            let date = parts.next()?;
            let rest: Vec<&str> = parts.collect();
            (date, rest.join(" "))
        }
    };

    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = parse_clock(rest.trim())?;
    Some(date.and_time(time))
}

fn parse_clock(raw: &str) -> Option<NaiveTime> {
    if raw.is_empty() {
        return NaiveTime::from_hms_opt(0, 0, 0);
    }

    let lower = raw.to_ascii_lowercase();
    let (clock, meridiem) = if let Some(c) = lower.strip_suffix("am") {
        (c.trim_end(), Some(false))
    } else if let Some(c) = lower.strip_suffix("pm") {
        (c.trim_end(), Some(true))
    } else {
        (lower.as_str(), None)
    };
    if clock.contains(char::is_whitespace) {
        return None;
    }

    let mut fields = clock.split(':');
    let mut hour: u32 = fields.next()?.parse().ok()?;
    let minute: u32 = match fields.next() {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    let second: u32 = match fields.next() {
        // fractional seconds are dropped
        Some(s) => s.split('.').next()?.parse().ok()?,
        None => 0,
    };
    if fields.next().is_some() {
        return None;
    }

    match meridiem {
        Some(true) if hour < 12 => hour += 12,
        Some(false) if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_unzoned_uses_fixed_offset() {
        let parser = TimeParser::default();
        assert_eq!(
            parser.parse("2025-10-17 9:10"),
            Some(at("2025-10-17T09:10:00-07:00"))
        );
        assert_eq!(
            parser.parse("2025-10-17 09:10:30"),
            Some(at("2025-10-17T09:10:30-07:00"))
        );
    }

    #[test]
    fn test_fixed_offset_ignores_dst_switch() {
        // PST would be -08:00 in December; the fixed rule keeps -07:00
        let parser = TimeParser::default();
        assert_eq!(
            parser.parse("2025-12-01 10:00"),
            Some(at("2025-12-01T10:00:00-07:00"))
        );
    }

    #[test]
    fn test_explicit_offsets_win() {
        let parser = TimeParser::default();
        assert_eq!(
            parser.parse("2025-10-17T16:10:00Z"),
            Some(at("2025-10-17T09:10:00-07:00"))
        );
        assert_eq!(
            parser.parse("2025-10-17T18:10:00+02:00"),
            Some(at("2025-10-17T16:10:00Z"))
        );
        assert_eq!(
            parser.parse("2025-10-17 18:10+0200"),
            Some(at("2025-10-17T16:10:00Z"))
        );
        assert_eq!(
            parser.parse("2025-10-17T09:10"),
            Some(at("2025-10-17T09:10:00-07:00"))
        );
    }

    #[test]
    fn test_verbose_format() {
        let parser = TimeParser::default();
        assert_eq!(
            parser.parse("October 16, 2025 9:10 AM"),
            Some(at("2025-10-16T09:10:00-07:00"))
        );
        assert_eq!(
            parser.parse("October 16, 2025 12:30 PM"),
            Some(at("2025-10-16T12:30:00-07:00"))
        );
    }

    #[test]
    fn test_meridiem_numeric_variant() {
        let parser = TimeParser::default();
        assert_eq!(
            parser.parse("2025-10-17 1:05 pm"),
            Some(at("2025-10-17T13:05:00-07:00"))
        );
        assert_eq!(
            parser.parse("2025-10-17 12:00am"),
            Some(at("2025-10-17T00:00:00-07:00"))
        );
    }

    #[test]
    fn test_date_only_is_midnight() {
        let parser = TimeParser::default();
        assert_eq!(
            parser.parse("2025-10-17"),
            Some(at("2025-10-17T00:00:00-07:00"))
        );
    }

    #[test]
    fn test_malformed_returns_none() {
        let parser = TimeParser::default();
        assert_eq!(parser.parse(""), None);
        assert_eq!(parser.parse("   "), None);
        assert_eq!(parser.parse("tomorrow-ish"), None);
        assert_eq!(parser.parse("2025-13-40 10:00"), None);
        assert_eq!(parser.parse("2025-10-17 25:00"), None);
        assert_eq!(parser.parse("Smarch 3, 2025 9:10 AM"), None);
    }

    #[test]
    fn test_custom_source_offset() {
        let parser = TimeParser::new(60);
        assert_eq!(
            parser.parse("2025-10-17 10:00"),
            Some(at("2025-10-17T09:00:00Z"))
        );
    }

    #[test]
    fn test_unusable_source_offset_falls_back_to_utc() {
        let parser = TimeParser::new(i32::MAX);
        assert_eq!(parser.source_offset(), Utc.fix());
        assert_eq!(
            parser.parse("2025-10-17 10:00"),
            Some(at("2025-10-17T10:00:00Z"))
        );
    }
}
