//! Terminal capability detection
//!
//! Decides how the preview pane may draw: colors available and whether
//! block glyphs render.

use crossterm::terminal;
use std::env;

/// Colors the preview may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSupport {
    /// Luminance ramp only
    NoColor,
    /// ANSI 16
    Color16,
    /// xterm 256 palette
    Color256,
    #[default]
    TrueColor,
}

impl ColorSupport {
    pub fn name(&self) -> &'static str {
        match self {
            ColorSupport::NoColor => "mono",
            ColorSupport::Color16 => "16 colors",
            ColorSupport::Color256 => "256 colors",
            ColorSupport::TrueColor => "truecolor",
        }
    }

    /// Cycle used by the preview's color toggle
    pub fn next(&self) -> Self {
        match self {
            ColorSupport::TrueColor => ColorSupport::Color256,
            ColorSupport::Color256 => ColorSupport::Color16,
            ColorSupport::Color16 => ColorSupport::NoColor,
            ColorSupport::NoColor => ColorSupport::TrueColor,
        }
    }
}

/// What the preview pane can rely on
#[derive(Debug, Clone)]
pub struct TerminalCapabilities {
    pub color_support: ColorSupport,
    /// UTF-8 locale, so half-block cells can be drawn
    pub unicode: bool,
    pub size: (u16, u16),
}

impl Default for TerminalCapabilities {
    fn default() -> Self {
        Self {
            color_support: ColorSupport::TrueColor,
            unicode: true,
            size: (80, 24),
        }
    }
}

/// Detect terminal capabilities
pub fn detect_capabilities() -> TerminalCapabilities {
    TerminalCapabilities {
        color_support: detect_color_support(),
        unicode: detect_unicode(),
        size: terminal::size().unwrap_or((80, 24)),
    }
}

/// Color level from the usual environment hints; NO_COLOR always wins
fn detect_color_support() -> ColorSupport {
    if env::var_os("NO_COLOR").is_some() {
        return ColorSupport::NoColor;
    }
    let colorterm = env::var("COLORTERM").unwrap_or_default().to_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorSupport::TrueColor;
    }
    if env::var_os("WT_SESSION").is_some() {
        return ColorSupport::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_lowercase();
    color_support_for_term(&term, !colorterm.is_empty())
}

fn color_support_for_term(term: &str, has_colorterm: bool) -> ColorSupport {
    let modern = ["kitty", "alacritty", "iterm", "vte", "256color"];
    if modern.iter().any(|t| term.contains(t)) {
        return if has_colorterm {
            ColorSupport::TrueColor
        } else {
            ColorSupport::Color256
        };
    }
    if term.contains("screen") || term.contains("tmux") {
        ColorSupport::Color256
    } else if term.contains("xterm") || term.contains("linux") || term.contains("console") {
        ColorSupport::Color16
    } else if term == "dumb" {
        ColorSupport::NoColor
    } else {
        ColorSupport::Color256
    }
}

fn detect_unicode() -> bool {
    env::var("LC_ALL")
        .or_else(|_| env::var("LC_CTYPE"))
        .or_else(|_| env::var("LANG"))
        .map(|v| v.to_uppercase().contains("UTF"))
        .unwrap_or(cfg!(target_os = "windows") || env::var("WT_SESSION").is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_toggle_steps_down_then_wraps() {
        assert_eq!(ColorSupport::TrueColor.next(), ColorSupport::Color256);
        assert_eq!(ColorSupport::NoColor.next(), ColorSupport::TrueColor);
    }

    #[test]
    fn test_term_hints() {
        assert_eq!(color_support_for_term("xterm-256color", false), ColorSupport::Color256);
        assert_eq!(color_support_for_term("xterm-256color", true), ColorSupport::TrueColor);
        assert_eq!(color_support_for_term("linux", false), ColorSupport::Color16);
        assert_eq!(color_support_for_term("dumb", false), ColorSupport::NoColor);
    }

    #[test]
    fn test_capabilities_default() {
        let caps = TerminalCapabilities::default();
        assert_eq!(caps.color_support, ColorSupport::TrueColor);
        assert!(caps.unicode);
    }
}
