use crate::datetime::coarse_text;
use crate::models::{ActivePrompt, Phase};
use crate::schedule::{BannerEvent, WindowReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;

use super::controller::PageController;

#[derive(Debug, Clone, Serialize)]
pub struct SessionLine {
    pub id: String,
    pub title: String,
    pub phase: Phase,
    pub live: bool,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub countdown: String,
}

/// Everything `status` and `run` print, also serialized for `--json`
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub location: String,
    pub at: DateTime<Utc>,
    pub viewer_zone: String,
    pub zone_label: String,
    pub sessions: Vec<SessionLine>,
    pub windows: WindowReport,
    pub prompt: Option<ActivePrompt>,
    pub prompts_shown: u64,
    pub banners: Vec<BannerEvent>,
    pub feedback_visible: bool,
    pub navigations: Vec<String>,
    pub dom_writes: u64,
}

impl StatusReport {
    pub fn build(ctl: &PageController, now: DateTime<Utc>) -> Self {
        let sessions = ctl
            .snapshot()
            .sessions
            .iter()
            .map(|s| SessionLine {
                id: s.session.id.clone(),
                title: s.session.title.clone(),
                phase: s.phase,
                live: s.live,
                start: s.session.start,
                end: s.session.end,
                countdown: coarse_text(s.session.start, now),
            })
            .collect();

        let prompt = ctl.notifier().prompt();
        Self {
            location: ctl.document().location().to_string(),
            at: now,
            viewer_zone: ctl.zone().iana.clone(),
            zone_label: ctl.zone().abbreviation(),
            sessions,
            windows: ctl.windows().clone(),
            prompt: prompt.active().cloned(),
            prompts_shown: prompt.show_count(),
            banners: ctl.banner_log().to_vec(),
            feedback_visible: ctl.feedback_visible(),
            navigations: ctl.navigations().to_vec(),
            dom_writes: ctl.document().write_count(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.location);
        let _ = writeln!(
            out,
            "at {} (viewer {} / {})",
            self.at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.viewer_zone,
            self.zone_label
        );
        let _ = writeln!(out);

        if self.sessions.is_empty() {
            let _ = writeln!(out, "  no sessions");
        }
        for s in &self.sessions {
            let live = if s.live { " LIVE" } else { "" };
            let _ = writeln!(
                out,
                "  {:<7} {:<24} {:<32} {}{}",
                s.phase.as_str(),
                s.id,
                s.title,
                s.countdown,
                live
            );
        }

        for w in &self.windows.windows {
            let _ = writeln!(
                out,
                "\n  {:?} window (limit {}): {}",
                w.kind,
                w.limit,
                if w.shown.is_empty() { "hidden".to_string() } else { w.shown.join(", ") }
            );
        }
        if self.windows.nested_kept > 0 {
            let _ = writeln!(out, "  nested sessions kept: {}", self.windows.nested_kept);
        }
        if let Some(text) = &self.windows.start_countdown {
            let _ = writeln!(out, "  {}", text.trim_end());
        }

        if let Some(p) = &self.prompt {
            let _ = writeln!(
                out,
                "\n  up next: {} in {}s -> {}",
                p.target.title, p.remaining, p.target.link
            );
        }
        for b in &self.banners {
            let _ = writeln!(out, "  banner {} for {}", b.kind.label(), b.session_id);
        }
        if self.feedback_visible {
            let _ = writeln!(out, "  feedback banner visible");
        }
        for url in &self.navigations {
            let _ = writeln!(out, "  navigated to {}", url);
        }
        out
    }
}
