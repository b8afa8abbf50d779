use super::notifier::current_slug;
use crate::config::FeedbackConfig;
use crate::datetime::shift_minutes;
use crate::dom::{attrs, Document};
use crate::models::{BannerKind, OneShotBanner, Session, Snapshot};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

/// A banner revealed during one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannerEvent {
    pub kind: BannerKind,
    pub session_id: String,
    pub at: DateTime<Utc>,
}

/// Reveals the post-session banners for the page's own session, each at most once.
#[derive(Debug, Clone, Default)]
pub struct BannerWatcher {
    fired: HashSet<(String, BannerKind)>,
}

impl BannerWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fired(&self, session_id: &str, kind: BannerKind) -> bool {
        self.fired.contains(&(session_id.to_string(), kind))
    }

    pub fn check(
        &mut self,
        doc: &mut Document,
        banners: &[OneShotBanner],
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> Vec<BannerEvent> {
        let Some(current) = page_session(doc, snapshot) else {
            return Vec::new();
        };
        let since_end = now - current.end;

        let mut events = Vec::new();
        for banner in banners {
            let due = match banner.kind {
                BannerKind::Ended => since_end >= banner.delay,
                BannerKind::OnDemand => since_end > Duration::zero() && since_end >= banner.delay,
            };
            if !due || !self.fired.insert((current.id.clone(), banner.kind)) {
                continue;
            }
            doc.remove_class(banner.node, attrs::HIDE_CLASS);
            info!(session = %current.id, banner = banner.kind.label(), "banner revealed");
            events.push(BannerEvent {
                kind: banner.kind,
                session_id: current.id.clone(),
                at: now,
            });
        }
        events
    }

    /// Feedback banner follows the clock both ways. Returns whether it is showing.
    pub fn update_feedback(
        &self,
        doc: &mut Document,
        feedback: Option<&FeedbackConfig>,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(feedback) = feedback else {
            return false;
        };
        let show = page_session(doc, snapshot)
            .map(|s| now >= shift_minutes(s.end, feedback.minutes_before_end.saturating_neg()))
            .unwrap_or(false);
        if show {
            doc.remove_class(feedback.node, attrs::HIDE_CLASS);
        } else {
            doc.add_class(feedback.node, attrs::HIDE_CLASS);
        }
        show
    }

    /// Forget fired banners, used when the viewer moves to another page
    pub fn reset(&mut self) {
        self.fired.clear();
    }
}

fn page_session<'a>(doc: &Document, snapshot: &'a Snapshot) -> Option<&'a Session> {
    let slug = current_slug(doc.location())?;
    snapshot.by_id(&slug).map(|s| &s.session)
}
