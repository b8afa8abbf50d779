use crate::app::AppState;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Scrolling activity ticker
pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let width = area.width as usize;
    if width == 0 {
        return;
    }

    let text_chars: Vec<char> = state.banner_text().chars().collect();
    let text_len = text_chars.len();
    if text_len == 0 {
        return;
    }

    // Create the visible portion by rotating the text
    let offset = state.banner_offset / 2;
    let visible: String = (0..width)
        .map(|i| text_chars[(offset + i) % text_len])
        .collect();

    let colors = [
        Color::Magenta,
        Color::LightMagenta,
        Color::Cyan,
        Color::LightCyan,
        Color::Blue,
        Color::LightBlue,
    ];

    let spans: Vec<Span> = visible
        .chars()
        .enumerate()
        .map(|(i, ch)| {
            let color = colors[(i + state.banner_offset / 4) % colors.len()];
            Span::styled(
                ch.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )
        })
        .collect();

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}
