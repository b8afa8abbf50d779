use crate::datetime::TimeParser;
use crate::dom::{attrs, Document, NodeId};
use crate::models::{Phase, Session, SessionState, Snapshot, Transition};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info};

const UNTITLED: &str = "Untitled Session";

/// Build a [`Session`] from the attributes currently on `node`.
///
/// Returns `None` (and logs at debug) for a missing id, unparseable times,
/// or `start >= end`.
pub fn read_session(doc: &Document, node: NodeId, parser: &TimeParser) -> Option<Session> {
    let id = doc.attr(node, attrs::AGENDA_ITEM)?.trim();
    if id.is_empty() {
        debug!(node, "session without id skipped");
        return None;
    }

    let start = doc.attr(node, attrs::START_TIME).and_then(|raw| parser.parse(raw));
    let end = doc.attr(node, attrs::END_TIME).and_then(|raw| parser.parse(raw));
    let (Some(start), Some(end)) = (start, end) else {
        debug!(session = id, "missing or unparseable start/end, skipped");
        return None;
    };
    if start >= end {
        debug!(session = id, %start, %end, "start not before end, skipped");
        return None;
    }

    let title = doc
        .attr(node, attrs::AGENDA_TITLE)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED)
        .to_string();

    // the offset may sit on the root or on the first during-group element
    let during_offset_minutes = doc
        .attr(node, attrs::DURING_OFFSET)
        .and_then(attrs::parse_int)
        .or_else(|| {
            doc.query(node, attrs::DURING_SESSION)
                .and_then(|el| doc.attr(el, attrs::DURING_SESSION))
                .and_then(attrs::parse_int)
        });

    Some(Session {
        id: id.to_string(),
        title,
        node,
        start,
        end,
        during_offset_minutes,
    })
}

/// Owns the tracked session roots and the last phase seen for each.
///
/// Roots are discovered once (and again on [`SessionClock::discover`]); their
/// attributes are re-read on every poll so markup inserted or edited after load
/// is picked up.
#[derive(Debug, Clone)]
pub struct SessionClock {
    parser: TimeParser,
    tracked: Vec<NodeId>,
    last: HashMap<NodeId, Phase>,
    snapshot: Snapshot,
}

impl SessionClock {
    pub fn new(parser: TimeParser) -> Self {
        Self {
            parser,
            tracked: Vec::new(),
            last: HashMap::new(),
            snapshot: Snapshot::default(),
        }
    }

    pub fn parser(&self) -> &TimeParser {
        &self.parser
    }

    /// Scan the document for session roots. Phases of roots that are still
    /// present survive a re-scan.
    pub fn discover(&mut self, doc: &Document) -> usize {
        self.tracked = doc.query_all(doc.root(), attrs::AGENDA_ITEM);
        let tracked = &self.tracked;
        self.last.retain(|node, _| tracked.contains(node));
        info!(sessions = self.tracked.len(), "discovered session roots");
        self.tracked.len()
    }

    pub fn tracked(&self) -> &[NodeId] {
        &self.tracked
    }

    pub fn classify(session: &Session, now: DateTime<Utc>) -> Phase {
        session.phase_at(now)
    }

    /// Reclassify every tracked session against `now`.
    ///
    /// The whole snapshot is computed before anything is returned, so callers
    /// projecting it see one consistent instant across sessions.
    pub fn poll(&mut self, doc: &Document, now: DateTime<Utc>) -> Vec<Transition> {
        let mut sessions = Vec::with_capacity(self.tracked.len());
        let mut transitions = Vec::new();

        for &node in &self.tracked {
            let Some(session) = read_session(doc, node, &self.parser) else {
                continue;
            };
            let phase = Self::classify(&session, now);
            let previous = self.last.insert(node, phase);
            if previous != Some(phase) {
                if let Some(from) = previous {
                    info!(session = %session.id, %from, to = %phase, "phase changed");
                }
                transitions.push(Transition {
                    node,
                    id: session.id.clone(),
                    from: previous,
                    to: phase,
                });
            }
            let live = session.is_live_at(now);
            sessions.push(SessionState { session, phase, live });
        }

        self.snapshot = Snapshot {
            at: Some(now),
            sessions,
        };
        transitions
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn last_phase(&self, node: NodeId) -> Option<Phase> {
        self.last.get(&node).copied()
    }
}
