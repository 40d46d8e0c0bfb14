//! Overlay painting
//!
//! Turns a solved layout into pixels: optional backdrop, icons, and outlined
//! text. The export compositor and the preview renderer both paint through
//! here, so they share one pixel policy and differ only in the metrics they
//! pass in.

use image::imageops;
use image::{GrayImage, Rgba, RgbaImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use tracing::debug;

use crate::fonts::TextRasterizer;
use crate::icons::IconSet;
use crate::layout::{distribute_row, solve_overlay, LayoutMetrics, OverlayRect, RowLayout};
use crate::params::RenderParameters;

/// Colors used for the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayColors {
    pub fill: Rgba<u8>,
    pub outline: Rgba<u8>,
    /// Opacity of the black band behind the row; 0 disables it
    pub backdrop_opacity: f32,
}

impl Default for OverlayColors {
    fn default() -> Self {
        Self {
            fill: Rgba([255, 255, 255, 255]),
            outline: Rgba([0, 0, 0, 255]),
            backdrop_opacity: 0.0,
        }
    }
}

/// A fully measured overlay, ready to paint
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPlan {
    pub metrics: LayoutMetrics,
    pub rect: OverlayRect,
    pub row: RowLayout,
    pub labels: [String; 3],
}

/// Measure the labels and lay the overlay out on a canvas of the given size
pub fn plan_overlay(
    canvas_width: u32,
    canvas_height: u32,
    params: &RenderParameters,
    metrics: LayoutMetrics,
    text: &dyn TextRasterizer,
) -> OverlayPlan {
    let labels = params.metrics.labels();
    let rect = solve_overlay(
        canvas_width as f32,
        canvas_height as f32,
        params.style.anchor,
        &metrics,
    );
    let widths = [
        text.advance_width(&labels[0], metrics.font_px),
        text.advance_width(&labels[1], metrics.font_px),
        text.advance_width(&labels[2], metrics.font_px),
    ];
    let row = distribute_row(&rect, widths, &metrics);

    if row.overlaps() {
        debug!(spacing = row.spacing, "metric texts wider than overlay, items overlap");
    }

    OverlayPlan {
        metrics,
        rect,
        row,
        labels,
    }
}

/// Paint a planned overlay onto `canvas`
pub fn paint_overlay(
    canvas: &mut RgbaImage,
    plan: &OverlayPlan,
    text: &dyn TextRasterizer,
    icons: &IconSet,
    colors: &OverlayColors,
) {
    if colors.backdrop_opacity > 0.0 {
        blend_rect(canvas, &plan.rect, Rgba([0, 0, 0, 255]), colors.backdrop_opacity);
    }

    for (index, (item, label)) in plan.row.items.iter().zip(plan.labels.iter()).enumerate() {
        if let Some(icon) = icons.get(index) {
            let top = plan.row.center_y - icon.height() as f32 / 2.0;
            imageops::overlay(
                canvas,
                icon,
                item.icon_x.round() as i64,
                top.round() as i64,
            );
        }

        if !label.is_empty() {
            draw_outlined_text(
                canvas,
                text,
                label,
                plan.metrics.font_px,
                item.text_x,
                plan.row.center_y,
                plan.metrics.outline_width,
                colors,
            );
        }
    }
}

/// Draw `label` with its vertical middle on `center_y`: outline first, fill on top
#[allow(clippy::too_many_arguments)]
fn draw_outlined_text(
    canvas: &mut RgbaImage,
    text: &dyn TextRasterizer,
    label: &str,
    px: f32,
    x: f32,
    center_y: f32,
    outline_width: f32,
    colors: &OverlayColors,
) {
    let line_height = text.line_box_height(px);
    let top = center_y - line_height / 2.0;

    let radius = outline_width.round().clamp(0.0, u8::MAX as f32) as u8;
    // Room for the outline plus glyphs that overhang their advance box
    let margin = radius as f32 + (px * 0.25).ceil() + 2.0;
    let origin_x = (x - margin).floor();
    let origin_y = (top - margin).floor();
    let mask_width = (text.advance_width(label, px) + 2.0 * margin).ceil().max(1.0) as u32;
    let mask_height = (line_height + 2.0 * margin).ceil().max(1.0) as u32;

    let mut coverage = GrayImage::new(mask_width, mask_height);
    text.draw_coverage(&mut coverage, label, px, x - origin_x, top - origin_y);

    let (ox, oy) = (origin_x as i64, origin_y as i64);
    if radius > 0 {
        let stroke = dilate(&coverage, Norm::LInf, radius);
        blend_mask(canvas, &stroke, ox, oy, colors.outline);
    }
    blend_mask(canvas, &coverage, ox, oy, colors.fill);
}

/// Composite `color` through an 8-bit coverage mask placed at (`ox`, `oy`)
pub fn blend_mask(canvas: &mut RgbaImage, mask: &GrayImage, ox: i64, oy: i64, color: Rgba<u8>) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    for (mx, my, coverage) in mask.enumerate_pixels() {
        let cov = coverage.0[0];
        if cov == 0 {
            continue;
        }
        let (px, py) = (ox + mx as i64, oy + my as i64);
        if px < 0 || py < 0 || px >= cw || py >= ch {
            continue;
        }
        let alpha = (cov as u32 * color.0[3] as u32) as f32 / (255.0 * 255.0);
        blend_pixel(canvas.get_pixel_mut(px as u32, py as u32), color, alpha);
    }
}

/// Composite `color` at `opacity` over the part of `rect` inside the canvas
pub fn blend_rect(canvas: &mut RgbaImage, rect: &OverlayRect, color: Rgba<u8>, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    let x0 = rect.x.max(0.0).round() as u32;
    let y0 = rect.y.max(0.0).round() as u32;
    let x1 = (rect.right().round().max(0.0) as u32).min(canvas.width());
    let y1 = (rect.bottom().round().max(0.0) as u32).min(canvas.height());

    for y in y0..y1 {
        for x in x0..x1 {
            blend_pixel(canvas.get_pixel_mut(x, y), color, opacity);
        }
    }
}

fn blend_pixel(dst: &mut Rgba<u8>, color: Rgba<u8>, alpha: f32) {
    let inv = 1.0 - alpha;
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * alpha + dst.0[c] as f32 * inv).round() as u8;
    }
    dst.0[3] = (255.0 * alpha + dst.0[3] as f32 * inv).round() as u8;
}
