//! Overlay layout
//!
//! Pure geometry shared by the preview and export renderers: where the
//! metric strip goes, how big its constants are at a given resolution, and
//! where each of the three items lands inside it.

use tracing::debug;

use crate::params::Anchor;

/// Gap between the overlay and the canvas edge, before scaling
pub const BASE_PADDING: f32 = 20.0;
/// Line height as a multiple of the font size
pub const LINE_HEIGHT_RATIO: f32 = 1.2;
/// Edge length of a metric icon, before scaling
pub const BASE_ICON_SIZE: f32 = 24.0;
/// Space between an icon's right edge and its text, before scaling
pub const BASE_ICON_GAP: f32 = 5.0;
/// Text outline thickness, before scaling
pub const BASE_OUTLINE_WIDTH: f32 = 2.0;
/// Shorter canvas side at which export constants start growing
pub const REFERENCE_EXTENT: f32 = 800.0;

/// Number of gaps shared out across the row: before each item plus the tail
const ROW_GAPS: f32 = 4.0;

/// Multiplier applied to layout constants for a full-resolution canvas.
///
/// Never below 1, so small images keep the literal sizes.
pub fn scale_factor(width: u32, height: u32) -> f32 {
    (width.min(height) as f32 / REFERENCE_EXTENT).max(1.0)
}

/// Pixel sizes for one render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub font_px: f32,
    pub padding: f32,
    pub icon_size: f32,
    pub icon_gap: f32,
    pub outline_width: f32,
}

impl LayoutMetrics {
    /// Sizes used as-is, as the preview does
    pub fn literal(font_size: u32) -> Self {
        Self::scaled(font_size, 1.0)
    }

    /// Sizes multiplied by `factor`, as the export does
    pub fn scaled(font_size: u32, factor: f32) -> Self {
        Self {
            font_px: font_size as f32 * factor,
            padding: BASE_PADDING * factor,
            icon_size: BASE_ICON_SIZE * factor,
            icon_gap: BASE_ICON_GAP * factor,
            outline_width: BASE_OUTLINE_WIDTH * factor,
        }
    }

    pub fn line_height(&self) -> f32 {
        self.font_px * LINE_HEIGHT_RATIO
    }
}

/// The overlay rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl OverlayRect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Vertical center line every item is aligned on
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn fits_within(&self, canvas_width: f32, canvas_height: f32) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width >= 0.0
            && self.height >= 0.0
            && self.right() <= canvas_width
            && self.bottom() <= canvas_height
    }
}

/// Place the overlay on a `canvas_width` x `canvas_height` canvas
pub fn solve_overlay(
    canvas_width: f32,
    canvas_height: f32,
    anchor: Anchor,
    metrics: &LayoutMetrics,
) -> OverlayRect {
    let padding = metrics.padding;
    let strip_height = metrics.line_height() + 2.0 * padding;

    let rect = match anchor {
        Anchor::Bottom => OverlayRect {
            x: padding,
            y: canvas_height - strip_height - padding,
            width: canvas_width - 2.0 * padding,
            height: strip_height,
        },
        Anchor::Top => OverlayRect {
            x: padding,
            y: padding,
            width: canvas_width - 2.0 * padding,
            height: strip_height,
        },
        Anchor::Left => OverlayRect {
            x: padding,
            y: padding,
            width: canvas_width / 4.0,
            height: canvas_height - 2.0 * padding,
        },
        Anchor::Right => {
            let width = canvas_width / 4.0;
            OverlayRect {
                x: canvas_width - width - padding,
                y: padding,
                width,
                height: canvas_height - 2.0 * padding,
            }
        }
    };

    debug!(
        anchor = anchor.name(),
        canvas_width, canvas_height, ?rect, "solved overlay rectangle"
    );
    rect
}

/// Where one metric is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPlacement {
    /// Left edge of the text
    pub text_x: f32,
    pub text_width: f32,
    /// Left edge of the icon; its right edge sits `icon_gap` before the text
    pub icon_x: f32,
}

/// The horizontal arrangement of the three metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayout {
    /// Negative when the texts are wider than the overlay
    pub spacing: f32,
    pub center_y: f32,
    pub items: [ItemPlacement; 3],
}

impl RowLayout {
    pub fn overlaps(&self) -> bool {
        self.spacing < 0.0
    }
}

/// Spread three measured texts across the overlay with equal gaps
pub fn distribute_row(rect: &OverlayRect, widths: [f32; 3], metrics: &LayoutMetrics) -> RowLayout {
    let total: f32 = widths.iter().sum();
    let spacing = (rect.width - total) / ROW_GAPS;

    let mut cursor = rect.x + spacing;
    let items = widths.map(|text_width| {
        let placement = ItemPlacement {
            text_x: cursor,
            text_width,
            icon_x: cursor - metrics.icon_gap - metrics.icon_size,
        };
        cursor += text_width + spacing;
        placement
    });

    RowLayout {
        spacing,
        center_y: rect.center_y(),
        items,
    }
}
