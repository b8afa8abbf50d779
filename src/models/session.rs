use crate::datetime::shift_minutes;
use crate::dom::NodeId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Where a session sits relative to its (offset-adjusted) window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Before,
    During,
    After,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::During => "during",
            Phase::After => "after",
        }
    }

    /// Class put on the session root, e.g. `session-during`
    pub fn class_name(&self) -> &'static str {
        match self {
            Phase::Before => "session-before",
            Phase::During => "session-during",
            Phase::After => "session-after",
        }
    }

    pub const ALL: [Phase; 3] = [Phase::Before, Phase::During, Phase::After];
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One agenda item, rebuilt from its root element's attributes on every poll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    #[serde(skip)]
    pub node: NodeId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Signed minutes; only a negative value has any effect
    pub during_offset_minutes: Option<i64>,
}

impl Session {
    /// Start of the `during` phase: the nominal start pulled earlier by a
    /// negative offset. Positive offsets are ignored.
    pub fn effective_start(&self) -> DateTime<Utc> {
        match self.during_offset_minutes {
            Some(minutes) if minutes < 0 => shift_minutes(self.start, minutes),
            _ => self.start,
        }
    }

    pub fn phase_at(&self, now: DateTime<Utc>) -> Phase {
        if now < self.effective_start() {
            Phase::Before
        } else if now <= self.end {
            Phase::During
        } else {
            Phase::After
        }
    }

    /// True only inside the literal `[start, end]` window, offset ignored
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }

    /// Overlaps `other` or starts within `buffer` after it ends
    pub fn follows_within(&self, other: &Session, buffer: Duration) -> bool {
        let overlaps = self.start < other.end && self.end > other.start;
        let starts_after = self.start >= other.end && self.start - other.end <= buffer;
        overlaps || starts_after
    }
}

/// A session together with the phase computed for it in one poll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    #[serde(flatten)]
    pub session: Session,
    pub phase: Phase,
    pub live: bool,
}

/// A phase change observed between two polls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub node: NodeId,
    pub id: String,
    pub from: Option<Phase>,
    pub to: Phase,
}

impl Transition {
    /// The `during → after` edge
    pub fn is_ending(&self) -> bool {
        self.from == Some(Phase::During) && self.to == Phase::After
    }
}

/// Consistent view of every tracked session at one instant
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub at: Option<DateTime<Utc>>,
    pub sessions: Vec<SessionState>,
}

impl Snapshot {
    pub fn by_id(&self, id: &str) -> Option<&SessionState> {
        self.sessions.iter().find(|s| s.session.id == id)
    }

    pub fn by_node(&self, node: NodeId) -> Option<&SessionState> {
        self.sessions.iter().find(|s| s.session.node == node)
    }

    pub fn count(&self, phase: Phase) -> usize {
        self.sessions.iter().filter(|s| s.phase == phase).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    fn session(offset: Option<i64>) -> Session {
        Session {
            id: "keynote".to_string(),
            title: "Keynote".to_string(),
            node: 1,
            start: at("2025-10-17T09:00:00-07:00"),
            end: at("2025-10-17T10:00:00-07:00"),
            during_offset_minutes: offset,
        }
    }

    #[test]
    fn test_phase_boundaries() {
        let s = session(None);
        assert_eq!(s.phase_at(at("2025-10-17T08:59:59-07:00")), Phase::Before);
        assert_eq!(s.phase_at(at("2025-10-17T09:00:00-07:00")), Phase::During);
        assert_eq!(s.phase_at(at("2025-10-17T10:00:00-07:00")), Phase::During);
        assert_eq!(s.phase_at(at("2025-10-17T10:00:01-07:00")), Phase::After);
    }

    #[test]
    fn test_negative_offset_pulls_start_earlier() {
        let s = session(Some(-15));
        assert_eq!(s.effective_start(), at("2025-10-17T08:45:00-07:00"));
        let early = at("2025-10-17T08:50:00-07:00");
        assert_eq!(s.phase_at(early), Phase::During);
        assert!(!s.is_live_at(early));
    }

    #[test]
    fn test_positive_offset_is_ignored() {
        let s = session(Some(20));
        assert_eq!(s.effective_start(), s.start);
        assert_eq!(s.phase_at(at("2025-10-17T10:10:00-07:00")), Phase::After);
    }

    #[test]
    fn test_offset_beyond_calendar_saturates() {
        let s = session(Some(-999_999_999_999));
        assert_eq!(s.effective_start(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(s.phase_at(at("2025-10-17T06:00:00-07:00")), Phase::During);
        assert_eq!(s.phase_at(at("2025-10-17T10:00:01-07:00")), Phase::After);
    }

    #[test]
    fn test_during_without_offset_for_every_interior_instant() {
        let s = session(None);
        for minute in 1..60 {
            let now = s.start + Duration::minutes(minute);
            assert_eq!(s.phase_at(now), Phase::During);
            assert!(s.is_live_at(now));
        }
    }

    #[test]
    fn test_follows_within() {
        let parent = session(None);
        let mut child = session(None);

        child.start = at("2025-10-17T09:30:00-07:00");
        child.end = at("2025-10-17T10:30:00-07:00");
        assert!(child.follows_within(&parent, Duration::minutes(30)));

        child.start = at("2025-10-17T10:30:00-07:00");
        child.end = at("2025-10-17T11:00:00-07:00");
        assert!(child.follows_within(&parent, Duration::minutes(30)));

        child.start = at("2025-10-17T10:31:00-07:00");
        assert!(!child.follows_within(&parent, Duration::minutes(30)));
    }
}
