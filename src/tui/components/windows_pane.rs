use crate::app::AppState;
use crate::models::WindowKind;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn header(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

/// Containers, start countdown and banner state
pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Page ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let report = state.controller.windows();
    let mut lines: Vec<Line> = Vec::new();

    if let Some(text) = &report.start_countdown {
        lines.push(Line::from(Span::styled(
            text.trim_end().to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    for w in &report.windows {
        let title = match w.kind {
            WindowKind::Upcoming => format!("Upcoming (max {})", w.limit),
            WindowKind::Live => format!("Live now (max {})", w.limit),
        };
        lines.push(header(&title));
        if w.shown.is_empty() {
            lines.push(Line::from(Span::styled("  hidden", Style::default().fg(Color::DarkGray))));
        }
        for id in &w.shown {
            let title = state
                .controller
                .snapshot()
                .by_id(id)
                .map(|s| s.session.title.clone())
                .unwrap_or_else(|| id.clone());
            lines.push(Line::from(format!("  {}", title)));
        }
    }

    if !state.controller.page().nested.is_empty() {
        lines.push(header("Up next in this track"));
        lines.push(Line::from(format!("  {} sessions kept", report.nested_kept)));
    }

    let banners = state.controller.banner_log();
    if !banners.is_empty() || state.controller.feedback_visible() {
        lines.push(header("Banners"));
        for b in banners {
            lines.push(Line::from(Span::styled(
                format!("  {} ({})", b.kind.label(), b.session_id),
                Style::default().fg(Color::Magenta),
            )));
        }
        if state.controller.feedback_visible() {
            lines.push(Line::from(Span::styled(
                "  feedback open",
                Style::default().fg(Color::Magenta),
            )));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No containers on this page",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
