use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Session the prompt points the viewer to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextSession {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivePrompt {
    /// Session whose end triggered the prompt
    pub ending_id: String,
    pub target: NextSession,
    pub total: i64,
    pub remaining: i64,
}

impl ActivePrompt {
    pub fn progress_percent(&self) -> i64 {
        if self.total <= 0 {
            return 100;
        }
        ((self.total - self.remaining).saturating_mul(100) / self.total).clamp(0, 100)
    }

    pub fn finished(&self) -> bool {
        self.remaining <= 0
    }
}

/// Result of one countdown step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptTick {
    Idle,
    Counting(i64),
    /// Countdown reached zero; carries the link when auto-navigation is on
    Finished(Option<String>),
}

/// The singleton "up next" overlay.
///
/// `shown` only ever grows: an id is claimed the first time its session enters
/// the lead window, whether or not a next session was found, so repeated polls
/// can never prompt twice for the same session.
#[derive(Debug, Clone)]
pub struct RedirectPrompt {
    pub lead_seconds: i64,
    pub auto_navigate: bool,
    shown: HashSet<String>,
    active: Option<ActivePrompt>,
    shows: u64,
}

impl RedirectPrompt {
    pub fn new(lead_seconds: i64, auto_navigate: bool) -> Self {
        Self {
            lead_seconds,
            auto_navigate,
            shown: HashSet::new(),
            active: None,
            shows: 0,
        }
    }

    /// Mark `id` as prompted; false if it already was
    pub fn claim(&mut self, id: &str) -> bool {
        self.shown.insert(id.to_string())
    }

    pub fn has_shown(&self, id: &str) -> bool {
        self.shown.contains(id)
    }

    pub fn show(&mut self, ending_id: &str, target: NextSession) -> &ActivePrompt {
        self.shows += 1;
        self.active.insert(ActivePrompt {
            ending_id: ending_id.to_string(),
            target,
            total: self.lead_seconds,
            remaining: self.lead_seconds,
        })
    }

    pub fn tick(&mut self) -> PromptTick {
        let auto = self.auto_navigate;
        let Some(active) = self.active.as_mut() else {
            return PromptTick::Idle;
        };
        if active.finished() {
            return PromptTick::Idle;
        }

        active.remaining -= 1;
        if active.finished() {
            PromptTick::Finished(auto.then(|| active.target.link.clone()))
        } else {
            PromptTick::Counting(active.remaining)
        }
    }

    pub fn cancel(&mut self) -> Option<ActivePrompt> {
        self.active.take()
    }

    pub fn active(&self) -> Option<&ActivePrompt> {
        self.active.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.active.is_some()
    }

    /// Number of times the overlay has been shown since page load
    pub fn show_count(&self) -> u64 {
        self.shows
    }
}

impl Default for RedirectPrompt {
    fn default() -> Self {
        Self::new(15, false)
    }
}
