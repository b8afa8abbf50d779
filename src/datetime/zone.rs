use chrono::{FixedOffset, Local, Offset, Utc};
use std::fs;

use super::shift::offset_from_minutes;

/// Display label for the viewer's IANA zone.
///
/// Static table of the zones the event's audience sits in, with the daylight
/// variant the event dates fall in. Anything else gets `GMT±N (City)` built
/// from the supplied offset. This is a display nicety, not a source of truth.
pub fn abbreviation_for(iana: &str, offset: FixedOffset) -> String {
    if let Some(abbr) = table_lookup(iana) {
        return abbr.to_string();
    }

    let hours = offset.local_minus_utc() as f64 / 3600.0;
    let label = if hours >= 0.0 {
        format!("GMT+{}", hours)
    } else {
        format!("GMT{}", hours)
    };
    let city = iana
        .split('/')
        .nth(1)
        .map(|c| c.replace('_', " "))
        .unwrap_or_default();

    if city.is_empty() {
        label
    } else {
        format!("{} ({})", label, city)
    }
}

fn table_lookup(iana: &str) -> Option<&'static str> {
    if let Some(city) = iana.strip_prefix("Europe/") {
        return Some(match city {
            "London" | "Dublin" => "BST",
            "Lisbon" => "WEST",
            "Moscow" => "MSK",
            _ => "CEST",
        });
    }
    if iana.starts_with("Australia/") {
        return Some(match iana {
            "Australia/Brisbane" | "Australia/Lindeman" => "AEST",
            "Australia/Adelaide" => "ACDT",
            "Australia/Perth" => "AWST",
            "Australia/Darwin" => "ACST",
            _ => "AEDT",
        });
    }

    let abbr = match iana {
        "Atlantic/Reykjavik" => "GMT",
        "Asia/Kuala_Lumpur" => "MYT",
        "Asia/Singapore" => "SGT",
        "Asia/Seoul" => "KST",
        "Asia/Tokyo" => "JST",
        "Asia/Hong_Kong" => "HKT",
        "Asia/Shanghai" => "CST",
        "Asia/Bangkok" | "Asia/Ho_Chi_Minh" => "ICT",
        "Asia/Dubai" => "GST",
        "Asia/Kolkata" => "IST",
        "America/Los_Angeles" => "PDT",
        "America/New_York" | "America/Toronto" => "EDT",
        "America/Chicago" => "CDT",
        "America/Denver" => "MDT",
        _ => return None,
    };
    Some(abbr)
}

/// Zone the page is being viewed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerZone {
    pub iana: String,
    pub offset: FixedOffset,
}

impl ViewerZone {
    pub fn new(iana: impl Into<String>, offset_minutes: i32) -> Self {
        Self {
            iana: iana.into(),
            offset: offset_from_minutes(offset_minutes),
        }
    }

    /// Resolve the viewer zone, preferring explicit overrides over detection
    pub fn detect(iana_override: Option<&str>, offset_override: Option<i32>) -> Self {
        let iana = iana_override
            .filter(|z| !z.is_empty())
            .map(str::to_string)
            .unwrap_or_else(detect_iana);

        let offset = match offset_override {
            Some(minutes) => offset_from_minutes(minutes),
            None => detect_offset(),
        };

        Self { iana, offset }
    }

    pub fn abbreviation(&self) -> String {
        abbreviation_for(&self.iana, self.offset)
    }
}

fn detect_iana() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        let tz = tz.trim_start_matches(':');
        if tz.contains('/') {
            return tz.to_string();
        }
    }

    fs::read_link("/etc/localtime")
        .ok()
        .and_then(|target| {
            let target = target.to_string_lossy().into_owned();
            target
                .split_once("zoneinfo/")
                .map(|(_, zone)| zone.to_string())
        })
        .unwrap_or_else(|| "UTC".to_string())
}

fn detect_offset() -> FixedOffset {
    match time::UtcOffset::current_local_offset() {
        Ok(offset) => FixedOffset::east_opt(offset.whole_seconds()).unwrap_or(Utc.fix()),
        // time refuses to read the offset once other threads exist; chrono does not
        Err(_) => Local::now().offset().fix(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(minutes: i32) -> FixedOffset {
        FixedOffset::east_opt(minutes * 60).unwrap()
    }

    #[test]
    fn test_table_zones() {
        assert_eq!(abbreviation_for("America/Los_Angeles", offset(-420)), "PDT");
        assert_eq!(abbreviation_for("America/Toronto", offset(-240)), "EDT");
        assert_eq!(abbreviation_for("Europe/Dublin", offset(60)), "BST");
        assert_eq!(abbreviation_for("Europe/Berlin", offset(120)), "CEST");
        assert_eq!(abbreviation_for("Asia/Kolkata", offset(330)), "IST");
        assert_eq!(abbreviation_for("Australia/Sydney", offset(660)), "AEDT");
        assert_eq!(abbreviation_for("Australia/Perth", offset(480)), "AWST");
        assert_eq!(abbreviation_for("Atlantic/Reykjavik", offset(0)), "GMT");
    }

    #[test]
    fn test_fallback_label() {
        assert_eq!(
            abbreviation_for("America/Sao_Paulo", offset(-180)),
            "GMT-3 (Sao Paulo)"
        );
        assert_eq!(
            abbreviation_for("Asia/Kathmandu", offset(345)),
            "GMT+5.75 (Kathmandu)"
        );
        assert_eq!(abbreviation_for("UTC", offset(0)), "GMT+0");
    }

    #[test]
    fn test_detect_honours_overrides() {
        let zone = ViewerZone::detect(Some("Asia/Tokyo"), Some(540));
        assert_eq!(zone.iana, "Asia/Tokyo");
        assert_eq!(zone.offset, offset(540));
        assert_eq!(zone.abbreviation(), "JST");
    }

    #[test]
    fn test_out_of_range_offsets_are_utc() {
        assert_eq!(ViewerZone::new("Etc/Unknown", i32::MIN).offset, offset(0));
        let zone = ViewerZone::detect(Some("Etc/Unknown"), Some(i32::MAX));
        assert_eq!(zone.offset, offset(0));
    }
}
