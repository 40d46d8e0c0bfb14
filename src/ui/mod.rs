//! UI module
//!
//! Contains all UI rendering components using Ratatui.

mod help;
mod preview;
mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::state::{AppState, FocusedWidget};

/// Main render function - draws the entire UI
pub fn render(frame: &mut Frame, state: &AppState) {
    let size = frame.area();

    if size.width < 40 || size.height < 15 {
        render_size_warning(frame, size);
        return;
    }

    // Title bar, content, status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(size);

    render_title_bar(frame, main_chunks[0], state);
    render_main_content(frame, main_chunks[1], state);
    render_status_bar(frame, main_chunks[2], state);

    if state.load_prompt_active {
        widgets::render_load_prompt(frame, size, state);
    }
    if state.show_help {
        help::render_help_overlay(frame, size);
    }
}

/// Render warning when terminal is too small
fn render_size_warning(frame: &mut Frame, area: Rect) {
    let warning = Paragraph::new("Terminal too small!\nMinimum: 40x15")
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(warning, area);
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let style_info = format!(
        "{} {}px {}",
        state.style.font.name(),
        state.style.font_size,
        state.style.anchor.name()
    );
    let used = " fitframe ".width() + "v1.0".width() + 3 + style_info.width() + 20;

    let title = Line::from(vec![
        Span::styled(
            " fitframe ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("v1.0", Style::default().fg(Color::DarkGray)),
        Span::raw(" │ "),
        Span::styled(style_info, Style::default().fg(Color::Yellow)),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled("[?]", Style::default().fg(Color::Green)),
        Span::raw(" Help  "),
        Span::styled("[Q]", Style::default().fg(Color::Red)),
        Span::raw(" Quit "),
    ]);

    let title_widget = Paragraph::new(title)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(title_widget, area);
}

/// Render the main content area
fn render_main_content(frame: &mut Frame, area: Rect, state: &AppState) {
    // Side-by-side if wide enough, stacked if narrow
    let (direction, constraints) = if area.width >= 80 {
        (
            Direction::Horizontal,
            [Constraint::Length(34), Constraint::Min(40)],
        )
    } else {
        (Direction::Vertical, [Constraint::Length(12), Constraint::Min(5)])
    };

    let chunks = Layout::default()
        .direction(direction)
        .constraints(constraints)
        .split(area);

    render_settings_panel(frame, chunks[0], state);
    preview::render_preview(frame, chunks[1], state);
}

/// Render the settings panel
fn render_settings_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let is_focused = state.focus == FocusedWidget::Settings;

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            " Activity ",
            Style::default().add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    widgets::render_settings(frame, inner, state, is_focused);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let status_color = if state.status_is_error {
        Color::Red
    } else {
        Color::White
    };

    let export_info = if state.exports_in_flight > 0 {
        format!("Exporting: {}", state.exports_in_flight)
    } else {
        format!("Export: {}", state.config.export.policy.name())
    };

    let file_info = state
        .input_file
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| format!(" │ {}", n.to_string_lossy()))
        .unwrap_or_default();

    let status_text = widgets::truncate_to_width(
        &state.status_message,
        (area.width as usize).saturating_sub(export_info.width() + file_info.width() + 3),
    );
    let spacing = (area.width as usize)
        .saturating_sub(status_text.width())
        .saturating_sub(export_info.width() + file_info.width())
        .saturating_sub(2);

    let status = Line::from(vec![
        Span::raw(" "),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw(" ".repeat(spacing)),
        Span::styled(export_info, Style::default().fg(Color::DarkGray)),
        Span::styled(file_info, Style::default().fg(Color::Blue)),
        Span::raw(" "),
    ]);

    let widget = Paragraph::new(status)
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossbeam_channel::unbounded;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::config::Config;
    use crate::error::{OverlayError, OverlayResult};
    use crate::fonts::{FontProvider, TextRasterizer};
    use crate::overlay::OverlayColors;
    use crate::params::FontFamily;
    use crate::terminal_capabilities::TerminalCapabilities;
    use crate::worker::ExportRequests;

    struct NoFonts;

    impl FontProvider for NoFonts {
        fn rasterizer(&self, family: FontFamily) -> OverlayResult<Arc<dyn TextRasterizer>> {
            Err(OverlayError::font_unavailable(family.key()))
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_draws_settings_and_placeholder() {
        let (tx, _rx) = unbounded();
        let mut state = AppState::new(
            Config::default(),
            TerminalCapabilities::default(),
            Arc::new(NoFonts),
            OverlayColors::default(),
            ExportRequests::new(tx),
        );

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, &state)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Distance"));
        assert!(text.contains("No photo loaded"));

        state.show_help = true;
        terminal.draw(|frame| render(frame, &state)).unwrap();
        assert!(buffer_text(&terminal).contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_small_terminal_warning() {
        let (tx, _rx) = unbounded();
        let state = AppState::new(
            Config::default(),
            TerminalCapabilities::default(),
            Arc::new(NoFonts),
            OverlayColors::default(),
            ExportRequests::new(tx),
        );
        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        terminal.draw(|frame| render(frame, &state)).unwrap();
        assert!(buffer_text(&terminal).contains("Terminal too small"));
    }
}
