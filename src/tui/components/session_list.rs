use crate::app::AppState;
use crate::datetime::{coarse_text, fine_text, TimeCopy};
use crate::models::{Phase, SessionState};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

fn phase_style(phase: Phase) -> Style {
    match phase {
        Phase::Before => Style::default().fg(Color::Yellow),
        Phase::During => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Phase::After => Style::default().fg(Color::DarkGray),
    }
}

fn phase_icon(phase: Phase) -> &'static str {
    match phase {
        Phase::Before => "○",
        Phase::During => "●",
        Phase::After => "✓",
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Sessions ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let snapshot = state.controller.snapshot();
    if snapshot.sessions.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No sessions on this page",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(empty, inner_area);
        return;
    }

    let now = state.now();
    let items: Vec<ListItem> = snapshot
        .sessions
        .iter()
        .map(|s| create_session_item(state, s, now))
        .collect();

    frame.render_widget(List::new(items), inner_area);
}

fn create_session_item<'a>(state: &AppState, s: &'a SessionState, now: DateTime<Utc>) -> ListItem<'a> {
    let copy = TimeCopy::render(s.session.start, s.session.end, state.controller.zone());
    let style = phase_style(s.phase);

    let countdown = match s.phase {
        Phase::Before => format!("{}  ({})", coarse_text(s.session.start, now), fine_text(s.session.start, now)),
        Phase::During => "in progress".to_string(),
        Phase::After => "ended".to_string(),
    };

    let mut title_line = vec![
        Span::styled(format!("{} ", phase_icon(s.phase)), style),
        Span::styled(s.session.title.as_str(), style),
    ];
    if s.live {
        title_line.push(Span::raw(" "));
        title_line.push(Span::styled(
            " LIVE ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let detail = Line::from(vec![
        Span::styled(
            format!("  {} {}–{}{}", copy.date, copy.start, copy.end, copy.tz),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
        Span::styled(countdown, Style::default().fg(Color::DarkGray)),
    ]);

    ListItem::new(vec![Line::from(title_line), detail])
}
