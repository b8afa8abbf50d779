use crate::app::{Action, AppState};
use crate::models::PromptTick;
use crate::schedule::Notice;
use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

use super::controller::OverlayOutcome;
use super::timers::{TimerKind, Timers};

/// Initialise the page and start its timers
pub fn start_page(state: &mut AppState, timers: &mut Timers) {
    let now = state.now();
    let (transitions, outcome) = state.controller.init(now);
    state.record_transitions(&transitions);
    after_page_load(state, timers, &outcome);
}

fn after_page_load(state: &mut AppState, timers: &mut Timers, outcome: &OverlayOutcome) {
    let clock = state.controller.settings().clock.clone();
    timers.start_interval(TimerKind::Poll, Duration::from_secs(clock.poll_secs.max(1)), Action::Poll);
    timers.start_interval(
        TimerKind::Countdown,
        Duration::from_secs(clock.countdown_secs.max(1)),
        Action::CountdownTick,
    );
    timers.start_interval(
        TimerKind::OverlayCheck,
        Duration::from_secs(clock.overlay_check_secs.max(1)),
        Action::OverlayCheck,
    );
    timers.start_timeout(
        TimerKind::LoadDelay,
        Duration::from_millis(clock.load_delay_ms),
        Action::LoadSettled,
    );
    handle_outcome(state, timers, outcome);
}

fn handle_outcome(state: &mut AppState, timers: &mut Timers, outcome: &OverlayOutcome) {
    if let Some(Notice::Shown(_)) = outcome.notice {
        timers.start_interval(TimerKind::PromptCountdown, Duration::from_secs(1), Action::PromptTick);
    }
    state.record_outcome(outcome);
}

fn navigate(state: &mut AppState, timers: &mut Timers, url: &str) {
    timers.cancel_all();
    let now = state.now();
    let (transitions, outcome) = state.controller.navigate(url, now);
    state.push_activity(format!("navigated to {}", url));
    state.record_transitions(&transitions);
    after_page_load(state, timers, &outcome);
}

pub fn process_action(state: &mut AppState, action: Action, timers: &mut Timers) -> Result<()> {
    match action {
        Action::Quit => {
            timers.cancel_all();
            state.should_quit = true;
        }
        Action::Tick => {
            state.tick_animation();
        }
        Action::Resize(w, h) => {
            state.terminal_size = (w, h);
        }

        Action::Poll => {
            let now = state.now();
            let transitions = state.controller.poll(now);
            state.record_transitions(&transitions);
        }
        Action::CountdownTick => {
            let now = state.now();
            state.controller.countdown_tick(now);
        }
        Action::OverlayCheck => {
            let now = state.now();
            let outcome = state.controller.overlay_check(now);
            handle_outcome(state, timers, &outcome);
        }
        Action::LoadSettled => {
            state.controller.load_settled();
        }

        Action::PromptTick => match state.controller.prompt_tick() {
            PromptTick::Counting(remaining) => {
                debug!(remaining, "prompt countdown");
            }
            PromptTick::Finished(Some(link)) => {
                timers.cancel(TimerKind::PromptCountdown);
                info!(%link, "countdown finished, following link");
                navigate(state, timers, &link);
            }
            PromptTick::Finished(None) | PromptTick::Idle => {
                timers.cancel(TimerKind::PromptCountdown);
            }
        },
        Action::CancelPrompt => {
            timers.cancel(TimerKind::PromptCountdown);
            if state.controller.cancel_prompt() {
                state.push_activity("prompt cancelled");
            }
        }
        Action::FollowLink => {
            if let Some(link) = state.controller.follow_link() {
                navigate(state, timers, &link);
            }
        }
        Action::Navigate(url) => {
            navigate(state, timers, &url);
        }

        Action::Refresh => {
            timers.cancel_all();
            let now = state.now();
            let (transitions, outcome) = state.controller.refresh(now);
            state.push_activity("refreshed");
            state.record_transitions(&transitions);
            after_page_load(state, timers, &outcome);
        }
        Action::VisibilityChanged(visible) => {
            state.visible = visible;
            state.controller.set_hidden(!visible);
            if visible {
                // catch up on whatever happened while hidden
                let now = state.now();
                let transitions = state.controller.poll(now);
                state.record_transitions(&transitions);
                let outcome = state.controller.overlay_check(now);
                handle_outcome(state, timers, &outcome);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controller::PageController;
    use crate::config::{Keymap, Settings};
    use crate::datetime::{ShiftedClock, ViewerZone};
    use crate::dom::{attrs, Display, Document, Element, NodeId};
    use chrono::{DateTime, Utc};
    use tokio::sync::mpsc;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    fn page(auto: bool) -> (Document, NodeId) {
        let mut doc = Document::new("https://event.example.com/sessions/keynote");
        let root = doc.root();
        for (id, start, end) in [
            ("keynote", "2025-10-17 9:00", "2025-10-17 10:00"),
            ("panel", "2025-10-17 10:00:30", "2025-10-17 11:00"),
        ] {
            doc.append_child(
                root,
                Element::new("div")
                    .with_attr(attrs::AGENDA_ITEM, id)
                    .with_attr(attrs::START_TIME, start)
                    .with_attr(attrs::END_TIME, end),
            );
        }
        let overlay = doc.append_child(
            root,
            Element::new("div")
                .with_attr(attrs::NEXT_REDIRECT, "15")
                .with_attr(attrs::NEXT_REDIRECT_AUTO, if auto { "true" } else { "false" }),
        );
        doc.append_child(overlay, Element::new("a").with_attr(attrs::NEXT_REDIRECT_LINK, ""));
        (doc, overlay)
    }

    fn state(doc: Document, start: &str) -> AppState {
        let settings = Settings::default();
        let keymap = Keymap::from_table(&settings.keys);
        let controller = PageController::new(doc, settings, ViewerZone::new("UTC", 0));
        AppState::new(controller, Box::new(ShiftedClock::starting_at(at(start))), keymap)
    }

    /// Run the action loop for `secs` of paused time
    async fn run_for(
        state: &mut AppState,
        timers: &mut Timers,
        rx: &mut mpsc::UnboundedReceiver<Action>,
        secs: u64,
    ) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(secs);
        loop {
            tokio::select! {
                Some(action) = rx.recv() => process_action(state, action, timers).unwrap(),
                _ = tokio::time::sleep_until(deadline) => break,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_prompt_shown_once_and_auto_navigates() {
        let (doc, _) = page(true);
        let mut state = state(doc, "2025-10-17T09:59:00-07:00");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = Timers::new(tx);

        start_page(&mut state, &mut timers);
        run_for(&mut state, &mut timers, &mut rx, 80).await;

        assert_eq!(
            state.controller.navigations(),
            ["https://event.example.com/sessions/panel"]
        );
        assert_eq!(state.controller.document().location(), "https://event.example.com/sessions/panel");
        assert!(state.activity.iter().any(|e| e.text == "up next: panel"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_countdown_without_navigating() {
        let (doc, overlay) = page(true);
        let mut state = state(doc, "2025-10-17T09:59:40-07:00");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = Timers::new(tx);

        start_page(&mut state, &mut timers);
        run_for(&mut state, &mut timers, &mut rx, 12).await;
        assert_eq!(state.controller.document().display(overlay), Display::Flex);
        assert!(timers.is_running(TimerKind::PromptCountdown));

        process_action(&mut state, Action::CancelPrompt, &mut timers).unwrap();
        assert!(!timers.is_running(TimerKind::PromptCountdown));
        run_for(&mut state, &mut timers, &mut rx, 60).await;

        assert!(state.controller.navigations().is_empty());
        assert_eq!(state.controller.document().display(overlay), Display::None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_prompt_waits_for_follow() {
        let (doc, overlay) = page(false);
        let mut state = state(doc, "2025-10-17T09:59:40-07:00");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = Timers::new(tx);

        start_page(&mut state, &mut timers);
        run_for(&mut state, &mut timers, &mut rx, 40).await;
        assert!(state.controller.navigations().is_empty());
        assert_eq!(state.controller.document().display(overlay), Display::Flex);

        process_action(&mut state, Action::FollowLink, &mut timers).unwrap();
        assert_eq!(state.controller.navigations().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_cancels_timers() {
        let (doc, _) = page(false);
        let mut state = state(doc, "2025-10-17T08:00:00-07:00");
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut timers = Timers::new(tx);

        start_page(&mut state, &mut timers);
        assert!(timers.active() >= 3);
        process_action(&mut state, Action::Quit, &mut timers).unwrap();
        assert!(state.should_quit);
        assert_eq!(timers.active(), 0);
    }
}
