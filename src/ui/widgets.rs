use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

pub fn border_color(focused: bool) -> Color {
    if focused {
        Color::Yellow
    } else {
        Color::White
    }
}

pub fn field_block(title: String, focused: bool, bottom: Option<String>) -> Block<'static> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title(title);
    if let Some(bottom) = bottom {
        block = block.title_bottom(
            Line::from(Span::styled(bottom, Style::default().fg(Color::DarkGray))),
        );
    }
    block
}

/// Single-line input. Empty text renders the placeholder dimmed; masked
/// fields show one bullet per character.
pub fn input_field(
    title: String,
    text: &str,
    placeholder: &str,
    focused: bool,
    masked: bool,
    description: Option<String>,
) -> Paragraph<'static> {
    let line = if text.is_empty() {
        Line::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ))
    } else if masked {
        Line::from("*".repeat(text.chars().count()))
    } else {
        Line::from(text.to_string())
    };

    Paragraph::new(line).block(field_block(title, focused, description))
}

/// Closed-selection display: current choice plus a dropdown marker.
pub fn select_field(
    title: String,
    value: &str,
    focused: bool,
    description: Option<String>,
) -> Paragraph<'static> {
    let line = if value.is_empty() {
        Line::from(vec![
            Span::styled("Select…", Style::default().fg(Color::DarkGray)),
            Span::styled(" ▾", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(vec![
            Span::raw(value.to_string()),
            Span::styled(" ▾", Style::default().fg(Color::DarkGray)),
        ])
    };

    Paragraph::new(line).block(field_block(title, focused, description))
}

/// Cursor position for end-of-text editing inside a bordered field,
/// accounting for wide characters.
pub fn cursor_position(area: Rect, text: &str) -> (u16, u16) {
    let width = UnicodeWidthStr::width(text) as u16;
    let x = (area.x + 1 + width).min(area.x + area.width.saturating_sub(2));
    (x, area.y + 1)
}

pub fn method_span(method: &str) -> Span<'static> {
    let color = match method {
        "GET" => Color::Blue,
        "POST" => Color::Green,
        "PUT" => Color::Yellow,
        "PATCH" => Color::Cyan,
        "DELETE" => Color::Red,
        _ => Color::White,
    };
    Span::styled(
        method.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}
