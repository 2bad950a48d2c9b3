mod layout;
mod widgets;

use layout::{centered_rect, AppLayout, OutputLayout, RequestLayout};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, Panel, RequestField, SelectPopup};
use crate::explorer::ResponseState;
use crate::form::Control;
use crate::http::ResponseData;
use crate::snippet::SnippetLang;
use widgets::{border_color, cursor_position, input_field, method_span, select_field};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render(frame: &mut Frame, app: &mut App) {
    let full_area = frame.area();
    let layout = AppLayout::new(full_area, app.config.ui.sidebar_width, app.sidebar_visible);

    if app.sidebar_visible {
        render_sidebar(frame, app, layout.sidebar_area);
    }
    render_request_panel(frame, app, layout.request_area);

    let output = OutputLayout::new(layout.output_area);
    render_snippet_tabs(frame, app, output.tabs_area);
    render_snippet_panel(frame, app, output.snippet_area);
    render_response_panel(frame, app, output.response_area);
    render_status_bar(frame, app, layout.status_bar);

    if let Some(popup) = &app.select_popup {
        render_select_popup(frame, popup, full_area);
    }
    if app.show_help {
        render_help(frame, full_area);
    }
}

// --- Sidebar ---

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus.panel == Panel::Catalog;
    let items: Vec<ListItem> = app
        .catalog
        .endpoints
        .iter()
        .enumerate()
        .map(|(index, endpoint)| {
            let selected = index == app.selected_endpoint;
            let marker = if selected { "» " } else { "  " };
            let line = Line::from(vec![
                Span::raw(marker),
                method_span(endpoint.method.as_str()),
                Span::raw(" "),
                Span::raw(endpoint.title.clone()),
            ]);
            let item = ListItem::new(line);
            if selected {
                item.style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title("Endpoints");
    frame.render_widget(List::new(items).block(block), area);
}

// --- Request panel ---

fn render_request_panel(frame: &mut Frame, app: &mut App, area: Rect) {
    let fields = app.request_fields();
    let has_body = fields.contains(&RequestField::Body);
    let input_count = fields.len() - usize::from(has_body);
    let layout = RequestLayout::new(area, input_count, has_body);

    render_endpoint_header(frame, app, layout.header_area);

    let form_fields = app.form_fields();
    let focused_field = app.focused_field();
    let inserting = app.input_mode == InputMode::Insert;

    for (index, field) in fields.iter().take(input_count).enumerate() {
        let field_area = layout.field_areas[index];
        let focused = focused_field == Some(*field);

        match field {
            RequestField::Key => {
                let text = app.explorer.credentials.key.clone();
                frame.render_widget(
                    input_field("API Key".to_string(), &text, "API Key", focused, false, None),
                    field_area,
                );
                if focused && inserting {
                    let (x, y) = cursor_position(field_area, &text);
                    frame.set_cursor_position((x, y));
                }
            }
            RequestField::Secret => {
                let text = app.explorer.credentials.secret.clone();
                let masked = "*".repeat(text.chars().count());
                frame.render_widget(
                    input_field(
                        "API Secret".to_string(),
                        &text,
                        "API Secret",
                        focused,
                        true,
                        None,
                    ),
                    field_area,
                );
                if focused && inserting {
                    let (x, y) = cursor_position(field_area, &masked);
                    frame.set_cursor_position((x, y));
                }
            }
            RequestField::Param(param_index) => {
                let Some(form_field) = form_fields.get(*param_index) else {
                    continue;
                };
                let required = if form_field.required { " *" } else { "" };
                let title = format!(
                    "{}{} ({})",
                    form_field.name,
                    required,
                    form_field.location.as_str()
                );
                let description = (!form_field.description.is_empty())
                    .then(|| form_field.description.clone());
                let value = app.explorer.value(&form_field.name).to_string();

                match &form_field.control {
                    Control::Text { placeholder } => {
                        frame.render_widget(
                            input_field(title, &value, placeholder, focused, false, description),
                            field_area,
                        );
                        if focused && inserting {
                            let (x, y) = cursor_position(field_area, &value);
                            frame.set_cursor_position((x, y));
                        }
                    }
                    Control::Select { .. } => {
                        frame.render_widget(
                            select_field(title, &value, focused, description),
                            field_area,
                        );
                    }
                }
            }
            RequestField::Body => {}
        }
    }

    if let Some(body_area) = layout.body_area {
        let focused = focused_field == Some(RequestField::Body);
        app.body_editor.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color(focused)))
                .title("Body (JSON)"),
        );
        frame.render_widget(&app.body_editor, body_area);
    }
}

fn render_endpoint_header(frame: &mut Frame, app: &App, area: Rect) {
    let endpoint = &app.explorer.endpoint;
    let subtitle = if endpoint.description.is_empty() {
        endpoint.title.clone()
    } else {
        endpoint.description.clone()
    };
    let header = Paragraph::new(vec![
        Line::from(vec![
            method_span(endpoint.method.as_str()),
            Span::raw(" "),
            Span::styled(endpoint.path.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(Span::styled(subtitle, Style::default().fg(Color::DarkGray))),
    ]);
    frame.render_widget(header, area);
}

// --- Snippet panel ---

fn render_snippet_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (index, lang) in SnippetLang::ALL.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
        let style = if *lang == app.explorer.language {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(lang.label(), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_snippet_panel(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus.panel == Panel::Snippet;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title("Code");
    let snippet = Paragraph::new(app.explorer.snippet())
        .block(block)
        .scroll((app.snippet_scroll, 0));
    frame.render_widget(snippet, area);
}

// --- Response panel ---

fn response_lines(app: &App) -> Vec<Line<'static>> {
    match &app.explorer.response {
        ResponseState::Absent => match &app.explorer.endpoint.response_example {
            Some(example) => {
                let mut lines = vec![Line::from(Span::styled(
                    "Example response:",
                    Style::default().fg(Color::DarkGray),
                ))];
                let pretty = serde_json::to_string_pretty(example).unwrap_or_default();
                lines.extend(pretty.lines().map(|line| {
                    Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::DarkGray),
                    ))
                }));
                lines
            }
            None => vec![Line::from(Span::styled(
                "Press Enter in the request panel to send",
                Style::default().fg(Color::DarkGray),
            ))],
        },
        ResponseState::Loading => {
            let frame_char = SPINNER[(app.loading_tick as usize / 2) % SPINNER.len()];
            vec![Line::from(format!("{} Loading…", frame_char))]
        }
        ResponseState::Success(data) => {
            let mut lines = vec![status_line(data, Color::Green)];
            lines.extend(body_lines(data));
            lines
        }
        ResponseState::Error { message, response } => {
            let mut lines = vec![Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))];
            if let Some(data) = response {
                lines.extend(body_lines(data));
            }
            lines
        }
    }
}

fn status_line(data: &ResponseData, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        format!(
            "{} {} · {} ms",
            data.status, data.status_text, data.duration_ms
        ),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn body_lines(data: &ResponseData) -> Vec<Line<'static>> {
    data.display_body()
        .lines()
        .map(|line| Line::from(line.to_string()))
        .collect()
}

fn render_response_panel(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus.panel == Panel::Response;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title("Response");
    let paragraph = Paragraph::new(response_lines(app))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.response_scroll, 0));
    frame.render_widget(paragraph, area);
}

// --- Status bar ---

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode = match app.input_mode {
        InputMode::Normal => Span::styled(
            " NORMAL ",
            Style::default().fg(Color::Black).bg(Color::Blue),
        ),
        InputMode::Insert => Span::styled(
            " INSERT ",
            Style::default().fg(Color::Black).bg(Color::Green),
        ),
    };

    let text = match &app.status_message {
        Some(message) => message.clone(),
        None => {
            " Tab panels · j/k move · i edit · Enter send · h/l language · y copy · ? help · q quit"
                .to_string()
        }
    };

    let line = Line::from(vec![
        mode,
        Span::styled(text, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

// --- Popups ---

fn render_select_popup(frame: &mut Frame, popup: &SelectPopup, area: Rect) {
    let width = popup
        .options
        .iter()
        .map(|option| option.label.len() as u16)
        .max()
        .unwrap_or(10)
        .saturating_add(6)
        .max(20)
        .min(area.width);
    let height = (popup.options.len() as u16 + 2).min(area.height);
    let popup_area = centered_rect(area, width, height);

    let items: Vec<ListItem> = popup
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let style = if index == popup.index {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(
                format!(" {} ", option.label),
                style,
            )))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(popup.param.clone());

    frame.render_widget(Clear, popup_area);
    frame.render_widget(List::new(items).block(block), popup_area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from("Tab        cycle panels"),
        Line::from("j / k      move between fields"),
        Line::from("i          edit the focused field (Esc to stop)"),
        Line::from("Enter      send the request / pick a value"),
        Line::from("h / l      switch snippet language"),
        Line::from("y          copy the snippet to the clipboard"),
        Line::from("Ctrl+E     toggle the endpoint sidebar"),
        Line::from("?          toggle this help"),
        Line::from("q          quit"),
    ];
    let height = lines.len() as u16 + 2;
    let popup_area = centered_rect(area, 52, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title("Help");

    frame.render_widget(Clear, popup_area);
    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}
