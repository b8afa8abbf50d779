use crate::app::AppState;
use crate::config::BoardCommand;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

/// Popup area for the prompt, `None` when it is not showing
pub fn area(frame_area: Rect, state: &AppState) -> Option<Rect> {
    state
        .controller
        .notifier()
        .prompt()
        .is_visible()
        .then(|| centered_rect(50, 9, frame_area))
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(active) = state.controller.notifier().prompt().active() else {
        return;
    };

    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(" Up next ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(1), // Link
            Constraint::Length(1), // Gauge
            Constraint::Min(1),    // Hints
        ])
        .split(inner);

    let title = Paragraph::new(Line::from(Span::styled(
        active.target.title.as_str(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let link = Paragraph::new(Line::from(Span::styled(
        active.target.link.as_str(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(link, chunks[1]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .percent(active.progress_percent().clamp(0, 100) as u16)
        .label(format!("{}S", active.remaining.max(0)));
    frame.render_widget(gauge, chunks[2]);

    let keys = |cmd| state.keymap.keys_for(cmd).join("/");
    let hints = Paragraph::new(Line::from(vec![
        Span::styled(format!("[{}]", keys(BoardCommand::Follow)), Style::default().fg(Color::Green)),
        Span::raw(" go now   "),
        Span::styled(format!("[{}]", keys(BoardCommand::Cancel)), Style::default().fg(Color::Red)),
        Span::raw(" stay"),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(hints, chunks[3]);
}

/// Centred rect `percent_x` wide and `height` rows tall
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
