use crate::dom::NodeId;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const DEFAULT_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Not yet started
    Upcoming,
    /// `start <= now < end`
    Live,
}

/// Card inside a container, with whatever times could be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub node: NodeId,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// A list container showing at most `limit` qualifying sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionWindow {
    #[serde(skip)]
    pub node: NodeId,
    pub kind: WindowKind,
    pub limit: usize,
}

impl SessionWindow {
    pub fn new(node: NodeId, kind: WindowKind, limit: usize) -> Self {
        Self { node, kind, limit }
    }

    fn qualifies(&self, c: &Candidate, now: DateTime<Utc>) -> bool {
        match (self.kind, c.start, c.end) {
            (WindowKind::Upcoming, Some(start), _) => start > now,
            (WindowKind::Live, Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }

    /// Nodes to show, earliest start first, capped at `limit`
    pub fn select(&self, candidates: &[Candidate], now: DateTime<Utc>) -> Vec<NodeId> {
        let mut keep: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| self.qualifies(c, now))
            .collect();
        keep.sort_by_key(|c| c.start);
        keep.into_iter().take(self.limit).map(|c| c.node).collect()
    }
}

/// `[data-agenda-next=<parent>]` collection filtered against its parent session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedList {
    pub node: NodeId,
    pub parent_id: String,
}

/// Banners revealed once per session after its end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Ended,
    OnDemand,
}

impl BannerKind {
    pub fn label(&self) -> &'static str {
        match self {
            BannerKind::Ended => "ended",
            BannerKind::OnDemand => "ondemand",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneShotBanner {
    pub node: NodeId,
    pub kind: BannerKind,
    pub delay: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-10-17T16:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::minutes(minutes)
    }

    #[test]
    fn test_upcoming_limit_ignores_dom_order() {
        let window = SessionWindow::new(0, WindowKind::Upcoming, 3);
        let candidates: Vec<Candidate> = [50, 10, 90, 30, 70, 20, 100, 40, 60, 80]
            .iter()
            .enumerate()
            .map(|(i, &m)| Candidate {
                node: i + 1,
                start: Some(at(m)),
                end: Some(at(m + 30)),
            })
            .collect();

        assert_eq!(window.select(&candidates, at(0)), vec![2, 6, 4]);
    }

    #[test]
    fn test_live_window_is_half_open() {
        let window = SessionWindow::new(0, WindowKind::Live, 5);
        let candidates = [
            Candidate { node: 1, start: Some(at(0)), end: Some(at(30)) },
            Candidate { node: 2, start: Some(at(-30)), end: Some(at(0)) },
            Candidate { node: 3, start: Some(at(-10)), end: None },
            Candidate { node: 4, start: Some(at(5)), end: Some(at(10)) },
        ];
        assert_eq!(window.select(&candidates, at(0)), vec![1]);
    }

    #[test]
    fn test_unparsed_start_never_qualifies() {
        let window = SessionWindow::new(0, WindowKind::Upcoming, 3);
        let candidates = [Candidate { node: 1, start: None, end: None }];
        assert!(window.select(&candidates, at(0)).is_empty());
    }
}
