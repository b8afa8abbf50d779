use crate::app::AppState;
use crate::tui::components::{banner, prompt_overlay, session_list, status_bar, windows_pane};
use crate::tui::effects::{EffectsManager, StartupAreas};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

pub fn draw(frame: &mut Frame, state: &mut AppState, effects: &mut EffectsManager) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Activity ticker
            Constraint::Min(3),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());
    let (banner_area, main_area, status_area) = (chunks[0], chunks[1], chunks[2]);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_area);
    let (sessions_area, windows_area) = (horizontal[0], horizontal[1]);

    session_list::render(frame, sessions_area, state);
    windows_pane::render(frame, windows_area, state);
    banner::render(frame, banner_area, state);
    status_bar::render(frame, status_area, state);

    let prompt_area = prompt_overlay::area(frame.area(), state);
    if let Some(area) = prompt_area {
        prompt_overlay::render(frame, area, state);
    }

    // Trigger startup animation on first draw
    effects.trigger_startup(&StartupAreas {
        sessions: sessions_area,
        windows: windows_area,
        activity: banner_area,
    });
    if state.prompt_appeared {
        state.prompt_appeared = false;
        if let Some(area) = prompt_area {
            effects.trigger_prompt(area);
        }
    }

    // Process and render effects (must be last to overlay on content)
    effects.process(frame);
}
