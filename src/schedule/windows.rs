use super::clock::read_session;
use crate::config::{PageConfig, StartCountdownConfig};
use crate::datetime::{start_countdown_text, TimeParser};
use crate::dom::{attrs, Display, Document, NodeId};
use crate::models::{Candidate, NestedList, SessionWindow, Snapshot, WindowKind};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

const COVER_ALT: &str = "Next session";

/// Outcome of one container pass, for status output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WindowReport {
    pub windows: Vec<WindowResult>,
    pub nested_kept: usize,
    pub start_countdown: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowResult {
    pub kind: WindowKind,
    pub limit: usize,
    pub shown: Vec<String>,
}

/// Upcoming/live containers, nested collections and the start countdown
#[derive(Debug, Clone)]
pub struct WindowUpdater {
    parser: TimeParser,
    nested_buffer: Duration,
    live_upcoming_hide: Duration,
    start_countdown_hide: Duration,
}

impl WindowUpdater {
    pub fn new(
        parser: TimeParser,
        nested_buffer: Duration,
        live_upcoming_hide: Duration,
        start_countdown_hide: Duration,
    ) -> Self {
        Self {
            parser,
            nested_buffer,
            live_upcoming_hide,
            start_countdown_hide,
        }
    }

    pub fn update(
        &self,
        doc: &mut Document,
        config: &PageConfig,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> WindowReport {
        let windows = config
            .windows
            .iter()
            .map(|w| self.update_window(doc, w, now))
            .collect();

        let nested_kept = config
            .nested
            .iter()
            .map(|list| self.update_nested(doc, list, config.live_upcoming, snapshot, now))
            .sum();

        let start_countdown = self.update_start_countdown_only(doc, config, snapshot, now);

        WindowReport {
            windows,
            nested_kept,
            start_countdown,
        }
    }

    /// Start countdown alone, for the faster overlay cadence
    pub fn update_start_countdown_only(
        &self,
        doc: &mut Document,
        config: &PageConfig,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> Option<String> {
        config
            .start_countdown
            .as_ref()
            .and_then(|sc| self.update_start_countdown(doc, sc, snapshot, now))
    }

    fn update_window(&self, doc: &mut Document, window: &SessionWindow, now: DateTime<Utc>) -> WindowResult {
        let cards = doc.query_all(window.node, attrs::AGENDA_ITEM);
        let candidates: Vec<Candidate> = cards
            .iter()
            .map(|&node| Candidate {
                node,
                start: doc.attr(node, attrs::START_TIME).and_then(|r| self.parser.parse(r)),
                end: doc.attr(node, attrs::END_TIME).and_then(|r| self.parser.parse(r)),
            })
            .collect();

        let selected = window.select(&candidates, now);
        for &card in &cards {
            let display = if selected.contains(&card) {
                Display::Default
            } else {
                Display::None
            };
            doc.set_display(card, display);
            if let Some(wrapper) = wrapper_within(doc, card, window.node) {
                doc.set_display(wrapper, display);
            }
        }

        let container = if selected.is_empty() {
            Display::None
        } else {
            Display::Default
        };
        doc.set_display(window.node, container);

        WindowResult {
            kind: window.kind,
            limit: window.limit,
            shown: selected
                .iter()
                .filter_map(|&n| doc.attr(n, attrs::AGENDA_ITEM).map(str::to_string))
                .collect(),
        }
    }

    fn update_nested(
        &self,
        doc: &mut Document,
        list: &NestedList,
        live_upcoming: Option<NodeId>,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> usize {
        let Some(parent) = snapshot.by_id(&list.parent_id) else {
            debug!(parent = %list.parent_id, "nested list parent not tracked");
            return 0;
        };
        let parent = parent.session.clone();

        let mut kept = 0;
        for child in doc.query_all(list.node, attrs::AGENDA_ITEM) {
            let Some(session) = read_session(doc, child, &self.parser) else {
                continue;
            };
            if session.follows_within(&parent, self.nested_buffer) {
                doc.set_display(child, Display::Default);
                kept += 1;
            } else {
                doc.set_display(child, Display::None);
            }
        }

        if let Some(el) = live_upcoming {
            let show = now - parent.end <= self.live_upcoming_hide && kept > 0;
            doc.set_display(el, if show { Display::Default } else { Display::None });
        }
        kept
    }

    fn update_start_countdown(
        &self,
        doc: &mut Document,
        config: &StartCountdownConfig,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> Option<String> {
        let next = snapshot
            .sessions
            .iter()
            .filter(|s| s.session.start > now)
            .min_by_key(|s| s.session.start);

        let Some(next) = next else {
            doc.set_display(config.node, Display::None);
            return None;
        };
        if next.session.start - now <= self.start_countdown_hide {
            doc.set_display(config.node, Display::None);
            return None;
        }

        let text = start_countdown_text(next.session.start, now);
        doc.set_display(config.node, Display::Default);
        doc.set_text(config.node, &text);

        if let (Some(cover), Some(img)) = (config.cover, doc.query_tag(next.session.node, "img")) {
            let src = doc.attr(img, attrs::SRC).unwrap_or("").to_string();
            let alt = doc
                .attr(img, attrs::ALT)
                .filter(|a| !a.is_empty())
                .unwrap_or(COVER_ALT)
                .to_string();
            doc.set_attr(cover, attrs::SRC, &src);
            doc.set_attr(cover, attrs::ALT, &alt);
        }
        Some(text)
    }
}

/// Nearest `.w-dyn-item` ancestor of `card` strictly inside `container`
fn wrapper_within(doc: &Document, card: NodeId, container: NodeId) -> Option<NodeId> {
    let mut current = doc.element(card)?.parent;
    while let Some(node) = current {
        if node == container {
            return None;
        }
        if doc.has_class(node, attrs::DYN_ITEM_CLASS) {
            return Some(node);
        }
        current = doc.element(node)?.parent;
    }
    None
}
