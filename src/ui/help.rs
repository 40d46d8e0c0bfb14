//! Help overlay rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the help overlay
pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let overlay_width = (area.width as f32 * 0.7).min(70.0) as u16;
    let overlay_height = (area.height as f32 * 0.8).min(30.0) as u16;

    let overlay_area = centered_rect(overlay_width, overlay_height, area);

    // Clear background
    frame.render_widget(Clear, overlay_area);

    // Render help content
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let help_text = create_help_text();
    let widget = Paragraph::new(help_text).style(Style::default().fg(Color::White));

    frame.render_widget(widget, inner);
}

/// Create help text content
fn create_help_text() -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let key_style = Style::default().fg(Color::Green);
    let desc_style = Style::default().fg(Color::White);

    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<14}", key), key_style),
            Span::styled(desc, desc_style),
        ])
    };

    vec![
        Line::from(Span::styled("Global", section_style)),
        entry("Q", "Quit (saves style to config)"),
        entry("?", "Toggle help overlay"),
        entry("Tab", "Switch between settings and preview"),
        entry("L", "Load a photo"),
        entry("E", "Export the overlay as JPEG"),
        entry("Esc", "Cancel / Close overlay"),
        Line::from(""),
        Line::from(Span::styled("Activity", section_style)),
        entry("↑ ↓", "Navigate settings"),
        entry("Enter", "Edit distance / time / elevation"),
        entry("← →", "Change font, size or position"),
        entry("Shift+← →", "Change font size by 8px"),
        entry("+ -", "Change font size by 8px"),
        Line::from(""),
        Line::from(Span::styled("Preview", section_style)),
        entry("← → ↑ ↓", "Pan the photo"),
        entry("Shift+arrows", "Pan faster"),
        entry("Home", "Re-center the photo"),
        entry("C", "Fewer preview colors"),
        Line::from(""),
        Line::from(Span::styled(
            "       [Press ? or Esc to close]",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

/// Create a centered rectangle
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal_padding = area.width.saturating_sub(width) / 2;
    let vertical_padding = area.height.saturating_sub(height) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(vertical_padding),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(horizontal_padding),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}
