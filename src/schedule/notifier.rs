use crate::config::RedirectConfig;
use crate::datetime::shift_seconds;
use crate::dom::{attrs, Display, Document};
use crate::models::{NextSession, PromptTick, RedirectPrompt, Session, Snapshot};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

fn slug_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/sessions/([^/?#]+)").ok()).as_ref()
}

/// Session id of the page being viewed, taken from `/sessions/<id>` in the URL
pub fn current_slug(location: &str) -> Option<String> {
    slug_pattern()?
        .captures(location)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// `location` with its last path segment swapped for `id`
pub fn sibling_link(location: &str, id: &str) -> String {
    match location.rsplit_once('/') {
        Some((base, _)) => format!("{}/{}", base, id),
        None => id.to_string(),
    }
}

/// Earliest session starting within `buffer` (either side) of `ending.end`
pub fn resolve_next<'a>(
    snapshot: &'a Snapshot,
    ending: &Session,
    buffer: Duration,
) -> Option<&'a Session> {
    snapshot
        .sessions
        .iter()
        .map(|s| &s.session)
        .filter(|s| s.node != ending.node && s.id != ending.id)
        .filter(|s| (s.start - ending.end).abs() <= buffer)
        .min_by_key(|s| s.start)
}

/// Outcome of an overlay check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Prompt shown, pointing at the given session id
    Shown(String),
    /// Lead window reached but nothing starts right after; prompt suppressed
    Suppressed,
}

/// Watches the current page's session and raises the "up next" prompt
/// `lead_seconds` before it ends.
#[derive(Debug, Clone)]
pub struct TransitionNotifier {
    prompt: RedirectPrompt,
    buffer: Duration,
}

impl TransitionNotifier {
    pub fn new(config: Option<&RedirectConfig>, buffer: Duration) -> Self {
        let prompt = config
            .map(|c| RedirectPrompt::new(c.lead_seconds, c.auto_navigate))
            .unwrap_or_default();
        Self { prompt, buffer }
    }

    /// Take a re-read lead time and auto-navigate flag. Sessions that already
    /// prompted stay claimed.
    pub fn reconfigure(&mut self, config: Option<&RedirectConfig>, buffer: Duration) {
        if let Some(config) = config {
            self.prompt.lead_seconds = config.lead_seconds;
            self.prompt.auto_navigate = config.auto_navigate;
        }
        self.buffer = buffer;
    }

    pub fn prompt(&self) -> &RedirectPrompt {
        &self.prompt
    }

    /// Overlay starts hidden
    pub fn hide_overlay(&self, doc: &mut Document, config: Option<&RedirectConfig>) {
        if let Some(config) = config {
            doc.set_display(config.node, Display::None);
        }
    }

    pub fn check(
        &mut self,
        doc: &mut Document,
        config: Option<&RedirectConfig>,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> Option<Notice> {
        let config = config?;
        let slug = current_slug(doc.location())?;
        let current = &snapshot.by_id(&slug)?.session;

        let show_at = shift_seconds(current.end, self.prompt.lead_seconds.saturating_neg());
        if now < show_at || now >= current.end {
            return None;
        }
        if !self.prompt.claim(&current.id) {
            return None;
        }

        let Some(next) = resolve_next(snapshot, current, self.buffer) else {
            info!(session = %current.id, "no session follows, prompt suppressed");
            return Some(Notice::Suppressed);
        };

        let target = NextSession {
            id: next.id.clone(),
            title: next.title.clone(),
            start: next.start,
            link: sibling_link(doc.location(), &next.id),
        };
        self.render_shown(doc, config, &target);
        info!(session = %current.id, next = %target.id, lead = self.prompt.lead_seconds, "showing next-session prompt");

        let id = target.id.clone();
        self.prompt.show(&current.id, target);
        Some(Notice::Shown(id))
    }

    fn render_shown(&self, doc: &mut Document, config: &RedirectConfig, target: &NextSession) {
        if let Some(link) = config.link {
            doc.set_attr(link, attrs::HREF, &target.link);
            doc.set_display(link, Display::Default);
        }
        if let Some(title) = config.title {
            doc.set_text(title, &target.title);
            doc.set_display(title, Display::Default);
        }
        if let Some(progress) = config.progress {
            doc.set_style(progress, "width", "0%");
        }
        if let Some(count) = config.count {
            doc.set_text(count, &format!("{}S", self.prompt.lead_seconds));
        }
        doc.set_display(config.node, Display::Flex);
    }

    /// One second of the prompt countdown
    pub fn prompt_tick(&mut self, doc: &mut Document, config: Option<&RedirectConfig>) -> PromptTick {
        let tick = self.prompt.tick();
        let (Some(config), Some(active)) = (config, self.prompt.active()) else {
            return tick;
        };

        if matches!(tick, PromptTick::Counting(_) | PromptTick::Finished(_)) {
            if let Some(count) = config.count {
                doc.set_text(count, &format!("{}S", active.remaining.max(0)));
            }
            if let Some(progress) = config.progress {
                doc.set_style(progress, "width", &format!("{}%", active.progress_percent()));
            }
        }
        if let PromptTick::Finished(link) = &tick {
            debug!(auto = link.is_some(), "prompt countdown finished");
        }
        tick
    }

    /// Hide the prompt without navigating. Returns whether it was showing.
    pub fn cancel(&mut self, doc: &mut Document, config: Option<&RedirectConfig>) -> bool {
        let was_visible = self.prompt.cancel().is_some();
        self.hide_overlay(doc, config);
        if was_visible {
            info!("next-session prompt cancelled");
        }
        was_visible
    }

    /// Link of the visible prompt, for an explicit follow
    pub fn follow_link(&self) -> Option<String> {
        self.prompt.active().map(|a| a.target.link.clone())
    }
}
