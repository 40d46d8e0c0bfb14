//! Preview pixels as terminal cells
//!
//! Each cell shows two stacked pixels with the upper half block: foreground
//! is the top pixel, background the bottom one. Terminals without color or
//! without block glyphs get a luminance ramp instead.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::color_space::{rgb_to_luminance, terminal_color};
use crate::terminal_capabilities::{ColorSupport, TerminalCapabilities};

const UPPER_HALF: &str = "▀";
const RAMP: &[u8] = b" .:-=+*#%@";

/// Cells needed to show `image` inside `cols` x `rows` without distortion
pub fn fit_cells(image: (u32, u32), cols: u16, rows: u16) -> (u16, u16) {
    let (w, h) = (image.0.max(1) as f32, image.1.max(1) as f32);
    // One cell is one pixel wide and two pixels tall
    let scale = (cols as f32 / w).min(rows as f32 * 2.0 / h);
    let cells_w = (w * scale).round().clamp(1.0, cols.max(1) as f32);
    let cells_h = (h * scale / 2.0).round().clamp(1.0, rows.max(1) as f32);
    (cells_w as u16, cells_h as u16)
}

/// Render `image` as styled lines fitting `cols` x `rows`
pub fn to_lines(
    image: &RgbaImage,
    cols: u16,
    rows: u16,
    caps: &TerminalCapabilities,
) -> Vec<Line<'static>> {
    if cols == 0 || rows == 0 || image.width() == 0 || image.height() == 0 {
        return Vec::new();
    }

    let (cells_w, cells_h) = fit_cells(image.dimensions(), cols, rows);
    let pixels = imageops::resize(
        image,
        cells_w as u32,
        cells_h as u32 * 2,
        FilterType::Triangle,
    );

    let half_blocks = caps.unicode && caps.color_support != ColorSupport::NoColor;
    (0..cells_h as u32)
        .map(|row| {
            let spans = (0..cells_w as u32)
                .map(|x| {
                    let top = *pixels.get_pixel(x, row * 2);
                    let bottom = *pixels.get_pixel(x, row * 2 + 1);
                    if half_blocks {
                        half_block(top, bottom, caps.color_support)
                    } else {
                        ramp_cell(top, bottom)
                    }
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect()
}

fn half_block(top: Rgba<u8>, bottom: Rgba<u8>, support: ColorSupport) -> Span<'static> {
    let mut style = Style::default();
    if let Some(fg) = terminal_color(top, support) {
        style = style.fg(fg);
    }
    if let Some(bg) = terminal_color(bottom, support) {
        style = style.bg(bg);
    }
    Span::styled(UPPER_HALF, style)
}

fn ramp_cell(top: Rgba<u8>, bottom: Rgba<u8>) -> Span<'static> {
    let lum = (rgb_to_luminance(top.0[0], top.0[1], top.0[2])
        + rgb_to_luminance(bottom.0[0], bottom.0[1], bottom.0[2]))
        / 2.0;
    let index = (lum * (RAMP.len() - 1) as f32).round() as usize;
    let c = RAMP[index.min(RAMP.len() - 1)] as char;
    Span::raw(c.to_string())
}
