//! Settings panel and load prompt widgets

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::state::{AppState, Setting};

/// Render the six overlay parameters plus the action keys
pub fn render_settings(frame: &mut Frame, area: Rect, state: &AppState, is_focused: bool) {
    let label_width = Setting::all()
        .iter()
        .map(|s| s.name().width())
        .max()
        .unwrap_or(0);
    // indicator, label, ": ", hint
    let value_width = (area.width as usize).saturating_sub(2 + label_width + 2 + 6);

    let mut lines = Vec::new();
    for (index, setting) in Setting::all().iter().enumerate() {
        let is_selected = index == state.selected_setting && is_focused;
        let editing = is_selected && state.editing;

        let mut value = state.setting_value(*setting);
        if editing {
            value.push('▌');
        } else if value.is_empty() {
            value = "-".to_string();
        }

        let hint = match setting {
            _ if !is_selected || editing => None,
            Setting::Font | Setting::Anchor => Some("[←/→]"),
            Setting::FontSize => Some("[+/-]"),
            _ => Some("[Enter]"),
        };

        lines.push(create_setting_line(
            setting.name(),
            label_width,
            &tail_to_width(&value, value_width),
            is_selected,
            editing,
            hint,
        ));
    }

    lines.push(Line::from(""));
    lines.push(create_action_line("[L]", "Load photo"));
    lines.push(create_action_line("[E]", "Export JPEG"));
    lines.push(create_action_line("[Tab]", "Focus preview / pan"));

    let widget = Paragraph::new(lines);
    frame.render_widget(widget, area);
}

/// Modal path prompt shown while loading a photo
pub fn render_load_prompt(frame: &mut Frame, area: Rect, state: &AppState) {
    let width = area.width.saturating_sub(8).min(70).max(20);
    let height = if state.load_prompt_error.is_some() { 5 } else { 4 };
    let prompt_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    };

    frame.render_widget(Clear, prompt_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(Span::styled(
            " Load photo ",
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(prompt_area);
    frame.render_widget(block, prompt_area);

    let input = format!("{}▌", state.load_prompt_input);
    let mut lines = vec![
        Line::from(Span::styled(
            tail_to_width(&input, inner.width as usize),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            "[Enter] load  [Esc] cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(ref err) = state.load_prompt_error {
        lines.push(Line::from(Span::styled(
            truncate_to_width(err, inner.width as usize),
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Cut `text` to at most `max` display columns, marking the cut with "…"
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Keep the end of `text` visible within `max` columns, for text being typed
pub fn tail_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut kept = Vec::new();
    let mut used = 0;
    for c in text.chars().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        kept.push(c);
        used += w;
    }
    std::iter::once('…').chain(kept.into_iter().rev()).collect()
}

/// Create a setting line with label, value, and optional hint
fn create_setting_line(
    label: &str,
    label_width: usize,
    value: &str,
    is_selected: bool,
    editing: bool,
    hint: Option<&str>,
) -> Line<'static> {
    let indicator = if is_selected { "▸" } else { " " };

    let label_style = if is_selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let value_style = if editing {
        Style::default().fg(Color::Green)
    } else if is_selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let padding = " ".repeat(label_width.saturating_sub(label.width()));
    let mut spans = vec![
        Span::styled(format!("{} ", indicator), Style::default().fg(Color::Cyan)),
        Span::styled(format!("{}{}: ", label, padding), label_style),
        Span::styled(value.to_string(), value_style),
    ];

    if let Some(hint_text) = hint {
        spans.push(Span::styled(
            format!(" {}", hint_text),
            Style::default().fg(Color::DarkGray),
        ));
    }

    Line::from(spans)
}

/// Create an action line (button-like)
fn create_action_line(key: &str, label: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key.to_string(), Style::default().fg(Color::Green)),
        Span::styled(format!(" {}", label), Style::default().fg(Color::White)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("Export failed: disk full", 10), "Export fa…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK character takes two columns
        let cut = truncate_to_width("距離距離距離", 5);
        assert_eq!(cut, "距離…");
        assert!(cut.width() <= 5);
    }

    #[test]
    fn test_tail_keeps_the_end() {
        assert_eq!(tail_to_width("/home/me/photos/run.jpg", 8), "…run.jpg");
        assert_eq!(tail_to_width("run.jpg", 8), "run.jpg");
    }
}
