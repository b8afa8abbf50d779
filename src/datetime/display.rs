use super::zone::ViewerZone;
use chrono::{DateTime, Utc};
use serde::Serialize;

const TIME_FORMAT: &str = "%H:%M";
const DATE_FORMAT: &str = "%b %-d";

/// Localized strings written into `[data-time-copy]` children of a session card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeCopy {
    pub start: String,
    pub end: String,
    pub date: String,
    pub tz: String,
}

impl TimeCopy {
    pub fn render(start: DateTime<Utc>, end: DateTime<Utc>, zone: &ViewerZone) -> Self {
        let local_start = start.with_timezone(&zone.offset);
        let local_end = end.with_timezone(&zone.offset);
        Self {
            start: local_start.format(TIME_FORMAT).to_string(),
            end: local_end.format(TIME_FORMAT).to_string(),
            date: local_start.format(DATE_FORMAT).to_string(),
            tz: format!("\u{00A0}{}", zone.abbreviation()),
        }
    }

    /// Value for a `data-time-copy` role, `None` for unknown roles
    pub fn get(&self, role: &str) -> Option<&str> {
        match role {
            "start" => Some(&self.start),
            "end" => Some(&self.end),
            "date" => Some(&self.date),
            "tz" => Some(&self.tz),
            _ => None,
        }
    }
}
