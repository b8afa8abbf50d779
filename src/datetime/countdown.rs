use chrono::{DateTime, Utc};

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Time remaining until a target, split into whole units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Breakdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Breakdown {
    /// `None` once the target is reached
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let diff = (target - now).num_milliseconds();
        if diff <= 0 {
            return None;
        }
        Some(Self {
            days: diff / MS_PER_DAY,
            hours: (diff % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (diff % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (diff % MS_PER_MINUTE) / MS_PER_SECOND,
        })
    }

    pub fn total_hours(&self) -> i64 {
        self.days * 24 + self.hours
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("{} {}s", n, unit)
    } else {
        format!("{} {}", n, unit)
    }
}

/// Most significant unit only: "3 days", "2 hours", "5 minutes", "Starting now"
pub fn coarse_text(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match Breakdown::until(target, now) {
        Some(b) if b.days > 0 => plural(b.days, "day"),
        Some(b) if b.hours > 0 => plural(b.hours, "hour"),
        Some(b) if b.minutes > 0 => plural(b.minutes, "minute"),
        _ => "Starting now".to_string(),
    }
}

/// Full breakdown with leading zero units dropped: "1d 2h 3m 4s" .. "4s"
pub fn fine_text(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let Some(b) = Breakdown::until(target, now) else {
        return "Starting now...".to_string();
    };

    if b.days > 0 {
        format!("{}d {}h {}m {}s", b.days, b.hours, b.minutes, b.seconds)
    } else if b.hours > 0 {
        format!("{}h {}m {}s", b.hours, b.minutes, b.seconds)
    } else if b.minutes > 0 {
        format!("{}m {}s", b.minutes, b.seconds)
    } else {
        format!("{}s", b.seconds)
    }
}

/// Event-level banner copy, e.g. "We start in 2h 5m."
pub fn start_countdown_text(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let b = Breakdown::until(target, now).unwrap_or_default();
    let hours = b.total_hours();

    let body = if hours > 0 {
        format!("We start in {}h {}m.", hours, b.minutes)
    } else if b.minutes > 0 {
        format!("We start in {}m.", b.minutes)
    } else {
        "We start in <1m.".to_string()
    };
    format!("{}\u{00A0}", body)
}
