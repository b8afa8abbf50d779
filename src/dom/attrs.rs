//! Attribute and class names set by the event site's markup.

// Session root
pub const AGENDA_ITEM: &str = "data-agenda-item";
pub const AGENDA_TITLE: &str = "data-agenda-title";
pub const START_TIME: &str = "data-start-time";
pub const END_TIME: &str = "data-end-time";
pub const DURING_OFFSET: &str = "data-during-offset";

// State groups under a session root
pub const BEFORE_SESSION: &str = "data-before-session";
pub const DURING_SESSION: &str = "data-during-session";
pub const AFTER_SESSION: &str = "data-after-session";
pub const AGENDA_LIVE: &str = "data-agenda-live";

// Countdown and time copy nodes
pub const COUNTDOWN: &str = "data-countdown";
pub const SESSION_COUNTDOWN: &str = "data-session-countdown";
pub const TIME_COPY: &str = "data-time-copy";
pub const UNIT_DAYS: &str = "data-days";
pub const UNIT_HOURS: &str = "data-hours";
pub const UNIT_MINUTES: &str = "data-minutes";
pub const UNIT_SECONDS: &str = "data-seconds";

// Containers
pub const UPCOMING_SESSIONS: &str = "data-upcoming-sessions";
pub const LIVE_SESSIONS: &str = "data-live-sessions";
pub const AGENDA_NEXT: &str = "data-agenda-next";
pub const LIVE_UPCOMING_SESSIONS: &str = "data-live-upcoming-sessions";
pub const START_COUNTDOWN: &str = "data-start-countdown";
pub const NEXT_SESSION_COVER: &str = "data-next-session-cover";

// Redirect prompt
pub const NEXT_REDIRECT: &str = "data-next-redirect";
pub const NEXT_REDIRECT_LINK: &str = "data-next-redirect-link";
pub const NEXT_REDIRECT_TITLE: &str = "data-next-redirect-title";
pub const NEXT_REDIRECT_CANCEL: &str = "data-next-redirect-cancel";
pub const NEXT_REDIRECT_PROGRESS: &str = "data-next-redirect-progress";
pub const NEXT_REDIRECT_COUNT: &str = "data-next-redirect-count";
pub const NEXT_REDIRECT_AUTO: &str = "data-next-redirect-auto";

// Banners
pub const SESSION_ENDED: &str = "data-session-ended";
pub const SESSION_ONDEMAND: &str = "data-session-ondemand";
pub const SESSION_FEEDBACK: &str = "data-session-feedback";

pub const HREF: &str = "href";
pub const SRC: &str = "src";
pub const ALT: &str = "alt";

pub const HIDE_CLASS: &str = "hide";
pub const DYN_ITEM_CLASS: &str = "w-dyn-item";

/// Parse an integer attribute the way `parseInt` is used on the site: leading
/// integer prefix, anything else is ignored.
pub fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    raw[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int("15"), Some(15));
        assert_eq!(parse_int(" -30 "), Some(-30));
        assert_eq!(parse_int("20min"), Some(20));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("-"), None);
    }
}
