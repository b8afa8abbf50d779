use crate::app::AppState;
use crate::config::BoardCommand;
use crate::models::Phase;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let snapshot = state.controller.snapshot();
    let now = state.now();
    let zone = state.controller.zone();
    let local = now.with_timezone(&zone.offset);

    let mode = if state.visible {
        Span::styled(
            " WATCHING ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            " HIDDEN ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
    };

    let left_text = vec![
        mode,
        Span::raw(" "),
        Span::styled(
            format!("{} {}", local.format("%H:%M:%S"), zone.abbreviation()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "  {} upcoming · {} live · {} ended",
                snapshot.count(Phase::Before),
                snapshot.sessions.iter().filter(|s| s.live).count(),
                snapshot.count(Phase::After),
            ),
            Style::default().fg(Color::Gray),
        ),
    ];

    let mut right_text = Vec::new();
    for cmd in [BoardCommand::Cancel, BoardCommand::Follow, BoardCommand::Refresh, BoardCommand::Quit] {
        let keys = state.keymap.keys_for(cmd);
        if keys.is_empty() {
            continue;
        }
        right_text.push(Span::styled(
            format!("[{}]", keys.join("/")),
            Style::default().fg(Color::Cyan),
        ));
        right_text.push(Span::styled(format!(" {}  ", cmd.label()), Style::default().fg(Color::Gray)));
    }

    let left_len: usize = left_text.iter().map(|s| s.content.chars().count()).sum();
    let right_len: usize = right_text.iter().map(|s| s.content.chars().count()).sum();
    let padding = area.width.saturating_sub(left_len as u16 + right_len as u16);

    let mut spans = left_text;
    spans.push(Span::raw(" ".repeat(padding as usize)));
    spans.extend(right_text);

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(paragraph, area);
}
