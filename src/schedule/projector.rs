use crate::datetime::{coarse_text, fine_text, shift_minutes, Breakdown, TimeCopy, ViewerZone};
use crate::dom::{attrs, Display, Document, NodeId};
use crate::models::{Phase, SessionState, Snapshot};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

fn group_attr(phase: Phase) -> &'static str {
    match phase {
        Phase::Before => attrs::BEFORE_SESSION,
        Phase::During => attrs::DURING_SESSION,
        Phase::After => attrs::AFTER_SESSION,
    }
}

/// Writes a session's phase into its subtree.
///
/// Every write goes through the document's compare-then-set helpers, so
/// applying an unchanged state is free.
#[derive(Debug, Clone)]
pub struct VisibilityProjector {
    zone: ViewerZone,
    applied: HashMap<NodeId, Phase>,
}

impl VisibilityProjector {
    pub fn new(zone: ViewerZone) -> Self {
        Self {
            zone,
            applied: HashMap::new(),
        }
    }

    pub fn zone(&self) -> &ViewerZone {
        &self.zone
    }

    /// Phase most recently written for a session root
    pub fn applied_phase(&self, node: NodeId) -> Option<Phase> {
        self.applied.get(&node).copied()
    }

    pub fn apply_all(&mut self, doc: &mut Document, snapshot: &Snapshot, now: DateTime<Utc>) {
        for state in &snapshot.sessions {
            self.apply(doc, state, now);
        }
    }

    pub fn apply(&mut self, doc: &mut Document, state: &SessionState, now: DateTime<Utc>) {
        let node = state.session.node;
        let end = state.session.end;

        for phase in Phase::ALL {
            let attr = group_attr(phase);
            for el in doc.query_all(node, attr) {
                let show = if phase == Phase::After {
                    after_visible(doc.attr(el, attr), end, now)
                } else {
                    phase == state.phase
                };
                doc.set_display(el, if show { Display::Default } else { Display::None });
            }
        }

        let live = if state.live { Display::Flex } else { Display::None };
        for el in doc.query_all(node, attrs::AGENDA_LIVE) {
            doc.set_display(el, live);
        }

        for phase in Phase::ALL {
            if phase != state.phase {
                doc.remove_class(node, phase.class_name());
            }
        }
        doc.add_class(node, state.phase.class_name());

        self.applied.insert(node, state.phase);
        self.write_countdowns(doc, state, state.phase, now);
    }

    /// One-second refresh of countdown digits. Uses the phase last applied by
    /// [`apply`](Self::apply), not a fresh classification.
    pub fn tick_countdowns(&self, doc: &mut Document, snapshot: &Snapshot, now: DateTime<Utc>) {
        for state in &snapshot.sessions {
            if let Some(phase) = self.applied_phase(state.session.node) {
                self.write_countdowns(doc, state, phase, now);
            }
        }
    }

    fn write_countdowns(&self, doc: &mut Document, state: &SessionState, phase: Phase, now: DateTime<Utc>) {
        let node = state.session.node;
        let start = state.session.start;

        let coarse = coarse_text(start, now);
        for el in doc.query_all(node, attrs::SESSION_COUNTDOWN) {
            doc.set_text(el, &coarse);
        }

        if phase != Phase::Before {
            return;
        }
        let fine = fine_text(start, now);
        let units = Breakdown::until(start, now);
        for el in doc.query_all(node, attrs::COUNTDOWN) {
            doc.set_text(el, &fine);
            if let Some(b) = units {
                doc.set_attr(el, attrs::UNIT_DAYS, &b.days.to_string());
                doc.set_attr(el, attrs::UNIT_HOURS, &b.hours.to_string());
                doc.set_attr(el, attrs::UNIT_MINUTES, &b.minutes.to_string());
                doc.set_attr(el, attrs::UNIT_SECONDS, &b.seconds.to_string());
            }
        }
    }

    /// Fill `[data-time-copy]` slots with start/end/date/zone in the viewer's zone
    pub fn render_time_copy(&self, doc: &mut Document, snapshot: &Snapshot) {
        for state in &snapshot.sessions {
            let copy = TimeCopy::render(state.session.start, state.session.end, &self.zone);
            for role in ["start", "end", "date", "tz"] {
                let Some(el) = doc.query_value(state.session.node, attrs::TIME_COPY, role) else {
                    continue;
                };
                if let Some(text) = copy.get(role) {
                    doc.set_text(el, text);
                }
            }
        }
    }

    pub fn forget(&mut self) {
        self.applied.clear();
    }
}

/// `[data-after-session=N]`: N > 0 minutes after the end, otherwise right after it
fn after_visible(raw: Option<&str>, end: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match raw.and_then(attrs::parse_int) {
        Some(minutes) if minutes > 0 => now >= shift_minutes(end, minutes),
        _ => now > end,
    }
}
