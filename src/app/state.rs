use super::controller::{OverlayOutcome, PageController};
use crate::config::Keymap;
use crate::datetime::WallClock;
use crate::models::Transition;
use crate::schedule::Notice;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Entries kept for the activity ticker
const MAX_ACTIVITY: usize = 20;

/// One line in the activity ticker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub at: DateTime<Utc>,
    pub text: String,
}

pub struct AppState {
    pub controller: PageController,
    pub clock: Box<dyn WallClock>,
    pub keymap: Keymap,
    pub should_quit: bool,
    pub visible: bool,
    pub terminal_size: (u16, u16),

    // Activity ticker
    pub activity: VecDeque<ActivityEntry>,
    pub banner_offset: usize,

    /// Set when the prompt was just shown; cleared by the board once animated
    pub prompt_appeared: bool,
}

impl AppState {
    pub fn new(controller: PageController, clock: Box<dyn WallClock>, keymap: Keymap) -> Self {
        Self {
            controller,
            clock,
            keymap,
            should_quit: false,
            visible: true,
            terminal_size: (0, 0),
            activity: VecDeque::new(),
            banner_offset: 0,
            prompt_appeared: false,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn push_activity(&mut self, text: impl Into<String>) {
        let at = self.now();
        self.activity.push_front(ActivityEntry {
            at,
            text: text.into(),
        });
        self.activity.truncate(MAX_ACTIVITY);
    }

    pub fn record_transitions(&mut self, transitions: &[Transition]) {
        for t in transitions {
            if let Some(from) = t.from {
                self.push_activity(format!("{}: {} -> {}", t.id, from, t.to));
            }
        }
    }

    pub fn record_outcome(&mut self, outcome: &OverlayOutcome) {
        match &outcome.notice {
            Some(Notice::Shown(id)) => {
                self.prompt_appeared = true;
                self.push_activity(format!("up next: {}", id));
            }
            Some(Notice::Suppressed) => self.push_activity("no session follows; prompt skipped"),
            None => {}
        }
        for b in &outcome.banners {
            self.push_activity(format!("{} banner for {}", b.kind.label(), b.session_id));
        }
    }

    /// Scrolling text for the banner row
    pub fn banner_text(&self) -> String {
        if self.activity.is_empty() {
            return format!("  {}  ", self.controller.document().location());
        }
        let joined: Vec<&str> = self.activity.iter().map(|e| e.text.as_str()).collect();
        format!("  {}  ", joined.join("  •  "))
    }

    pub fn tick_animation(&mut self) {
        self.banner_offset = self.banner_offset.wrapping_add(1);
    }
}
