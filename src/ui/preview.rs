//! Preview area rendering

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::state::{AppState, FocusedWidget};
use crate::terminal_preview;

/// Render the preview area
pub fn render_preview(frame: &mut Frame, area: Rect, state: &AppState) {
    let is_focused = state.focus == FocusedWidget::Preview;

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let pan = state.preview.pan();
    let colors = state.capabilities.color_support.name();
    let title = if state.preview.has_source() && (pan.x != 0.0 || pan.y != 0.0) {
        format!(" Preview [{}] pan {:+.0},{:+.0} ", colors, pan.x, pan.y)
    } else {
        format!(" Preview [{}] ", colors)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    match state.preview_image {
        Some(ref image) => {
            let lines = terminal_preview::to_lines(image, inner.width, inner.height, &state.capabilities);
            render_preview_content(frame, inner, lines);
        }
        None => render_placeholder(frame, inner, state),
    }
}

/// Center the cell lines inside the preview area
fn render_preview_content(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let top_padding = area.height.saturating_sub(lines.len() as u16) / 2;
    let content_area = Rect {
        x: area.x,
        y: area.y + top_padding,
        width: area.width,
        height: area.height.saturating_sub(top_padding),
    };

    let widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(widget, content_area);
}

/// Render placeholder when no preview is available
fn render_placeholder(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = if state.source.is_none() {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "No photo loaded",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press [L] to load a photo",
                Style::default().fg(Color::Green),
            )),
            Line::from(Span::styled(
                "or start with --image <path>",
                Style::default().fg(Color::DarkGray),
            )),
        ]
    } else if state.status_is_error {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Preview unavailable",
                Style::default().fg(Color::Red),
            )),
            Line::from(""),
            Line::from(Span::styled(
                state.status_message.clone(),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "Try another font with [←/→]",
                Style::default().fg(Color::Green),
            )),
        ]
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Rendering preview...",
                Style::default().fg(Color::DarkGray),
            )),
        ]
    };

    let widget = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}
