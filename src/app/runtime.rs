use crate::app::{Action, AppState};
use crate::tui;
use crate::tui::effects::EffectsManager;
use crate::tui::event::EventHandler;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use super::handler::{process_action, start_page};
use super::report::StatusReport;
use super::timers::Timers;

/// One pass over the page at the current instant, no timers
pub fn run_once(state: &mut AppState) -> StatusReport {
    let now = state.now();
    state.controller.init(now);
    state.controller.load_settled();
    state.controller.report(now)
}

/// Drive the page with real timers and no terminal UI. Stops after `limit`
/// (if any), on Ctrl-C, or when a quit is processed.
pub async fn run_headless(state: &mut AppState, limit: Option<Duration>) -> Result<StatusReport> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
    let mut timers = Timers::new(tx);
    start_page(state, &mut timers);
    info!(location = state.controller.document().location(), "running headless");

    let deadline = limit.map(|d| tokio::time::Instant::now() + d);
    loop {
        tokio::select! {
            Some(action) = rx.recv() => {
                process_action(state, action, &mut timers)?;
            }
            _ = sleep_until(deadline) => {
                info!("run time elapsed");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
        if state.should_quit {
            break;
        }
    }

    timers.cancel_all();
    Ok(state.controller.report(state.now()))
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

pub async fn run_tui(mut state: AppState) -> Result<()> {
    // Initialize terminal
    let mut terminal = tui::init()?;

    let size = terminal.size()?;
    state.terminal_size = (size.width, size.height);

    let mut events = EventHandler::new(state.keymap.clone());
    let mut timers = Timers::new(events.action_sender());
    start_page(&mut state, &mut timers);

    let mut effects = EffectsManager::new(state.controller.settings().board.animations);

    // Main loop
    let result = run_main_loop(&mut terminal, &mut state, &mut events, &mut timers, &mut effects).await;

    timers.cancel_all();
    // Restore terminal
    tui::restore()?;

    result
}

async fn run_main_loop(
    terminal: &mut tui::Terminal,
    state: &mut AppState,
    events: &mut EventHandler,
    timers: &mut Timers,
    effects: &mut EffectsManager,
) -> Result<()> {
    loop {
        // Draw UI with effects
        terminal.draw(|frame| tui::ui::draw(frame, state, effects))?;

        let action = events.next().await?;
        process_action(state, action, timers)?;

        if state.should_quit {
            break;
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
    use crate::dom::{attrs, Document, Element};
    use crate::models::Phase;
    use chrono::{DateTime, Utc};

    fn state(start: &str) -> AppState {
        let mut doc = Document::new("https://event.example.com/agenda");
        let root = doc.root();
        doc.append_child(
            root,
            Element::new("div")
                .with_attr(attrs::AGENDA_ITEM, "keynote")
                .with_attr(attrs::START_TIME, "2025-10-17 9:00")
                .with_attr(attrs::END_TIME, "2025-10-17 10:00"),
        );
        let now = DateTime::parse_from_rfc3339(start).unwrap().with_timezone(&Utc);
        let controller = PageController::new(doc, Settings::default(), ViewerZone::new("UTC", 0));
        AppState::new(controller, Box::new(ShiftedClock::starting_at(now)), Keymap::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_headless_run_crosses_start() {
        let mut state = state("2025-10-17T08:59:00-07:00");
        let report = run_headless(&mut state, Some(Duration::from_secs(95))).await.unwrap();

        assert_eq!(report.sessions[0].phase, Phase::During);
        assert!(report.sessions[0].live);
    }

    #[tokio::test]
    async fn test_run_once_reports_without_timers() {
        let mut state = state("2025-10-17T10:30:00-07:00");
        let report = run_once(&mut state);
        assert_eq!(report.sessions[0].phase, Phase::After);
    }
}
