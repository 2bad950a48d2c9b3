use ratatui::layout::{Constraint, Layout, Rect};

pub struct AppLayout {
    pub sidebar_area: Rect,
    pub request_area: Rect,
    pub output_area: Rect,
    pub status_bar: Rect,
}

impl AppLayout {
    pub fn new(area: Rect, sidebar_width: u16, sidebar_visible: bool) -> Self {
        let vertical = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

        let main_area = vertical[0];
        let status_bar = vertical[1];

        let sidebar_width = if sidebar_visible { sidebar_width } else { 0 };
        let with_sidebar = Layout::horizontal([
            Constraint::Length(sidebar_width),
            Constraint::Min(1),
        ])
        .split(main_area);

        let sidebar_area = with_sidebar[0];
        let content_area = with_sidebar[1];

        // Content splits into request form | snippet + response
        let horizontal = Layout::horizontal([
            Constraint::Percentage(45),
            Constraint::Percentage(55),
        ])
        .split(content_area);

        Self {
            sidebar_area,
            request_area: horizontal[0],
            output_area: horizontal[1],
            status_bar,
        }
    }
}

/// Right column: snippet pane (with its tab row) above the response pane.
pub struct OutputLayout {
    pub tabs_area: Rect,
    pub snippet_area: Rect,
    pub response_area: Rect,
}

impl OutputLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Percentage(45),
            Constraint::Min(5),
        ])
        .split(area);

        Self {
            tabs_area: chunks[0],
            snippet_area: chunks[1],
            response_area: chunks[2],
        }
    }
}

/// Request form: endpoint header, one 3-row box per input field, and the
/// body editor filling whatever is left (write methods only).
pub struct RequestLayout {
    pub header_area: Rect,
    pub field_areas: Vec<Rect>,
    pub body_area: Option<Rect>,
}

impl RequestLayout {
    pub fn new(area: Rect, field_count: usize, with_body: bool) -> Self {
        let mut constraints = vec![Constraint::Length(2)];
        constraints.extend(std::iter::repeat(Constraint::Length(3)).take(field_count));
        if with_body {
            constraints.push(Constraint::Min(5));
        } else {
            constraints.push(Constraint::Min(0));
        }

        let chunks = Layout::vertical(constraints).split(area);

        Self {
            header_area: chunks[0],
            field_areas: chunks[1..=field_count].to_vec(),
            body_area: with_body.then(|| chunks[field_count + 1]),
        }
    }
}

/// Centered popup rect for select lists and the help overlay.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}
