//! Preview renderer
//!
//! Live view of the overlay inside a fixed viewport. The photo is scaled to
//! cover the viewport and can be panned; the overlay is laid out against the
//! viewport with the user's literal sizes, no resolution scaling.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

use crate::fonts::TextRasterizer;
use crate::icons::{IconSet, IconSource};
use crate::layout::{LayoutMetrics, BASE_ICON_SIZE};
use crate::overlay::{paint_overlay, plan_overlay, OverlayColors};
use crate::params::{RenderParameters, SourceImage};

/// Size of the preview area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(600, 400)
    }
}

/// Translation of the displayed photo inside the viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanOffset {
    pub x: f32,
    pub y: f32,
}

impl PanOffset {
    pub const ZERO: PanOffset = PanOffset { x: 0.0, y: 0.0 };

    /// Limit the offset so an image of `displayed` size still covers the viewport
    pub fn clamped(self, displayed: (u32, u32), viewport: Viewport) -> Self {
        let (max_x, max_y) = pan_limits(displayed, viewport);
        Self {
            x: self.x.clamp(-max_x, max_x),
            y: self.y.clamp(-max_y, max_y),
        }
    }
}

/// Largest offset on each axis that keeps the viewport covered
pub fn pan_limits(displayed: (u32, u32), viewport: Viewport) -> (f32, f32) {
    (
        (displayed.0 as f32 - viewport.width as f32).max(0.0) / 2.0,
        (displayed.1 as f32 - viewport.height as f32).max(0.0) / 2.0,
    )
}

/// Factor that scales an image to cover the viewport, aspect ratio kept
pub fn cover_scale(image: (u32, u32), viewport: Viewport) -> f32 {
    let (w, h) = (image.0.max(1) as f32, image.1.max(1) as f32);
    (viewport.width as f32 / w).max(viewport.height as f32 / h)
}

/// Size of an image scaled to cover the viewport, aspect ratio kept
pub fn cover_size(image: (u32, u32), viewport: Viewport) -> (u32, u32) {
    let scale = cover_scale(image, viewport);
    (
        ((image.0.max(1) as f32 * scale).round() as u32).max(viewport.width),
        ((image.1.max(1) as f32 * scale).round() as u32).max(viewport.height),
    )
}

/// Whole source pixels covering `len` pixels from `start`, kept inside `0..limit`
fn source_span(start: f32, len: f32, limit: u32) -> (u32, u32) {
    let limit = limit.max(1);
    let first = (start.floor().max(0.0) as u32).min(limit - 1);
    let end = ((start + len).ceil().max(0.0) as u32).clamp(first + 1, limit);
    (first, end - first)
}

/// Icons at the preview's literal size
pub fn preview_icons(source: &IconSource, colors: &OverlayColors) -> IconSet {
    IconSet::load_blocking(source, BASE_ICON_SIZE as u32, colors.fill)
}

/// Holds the viewport, the pan offset and the photo
///
/// The cover-scaled photo is never materialised; each render crops the
/// visible window from the source and scales only that.
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    viewport: Viewport,
    pan: PanOffset,
    source: Option<Arc<SourceImage>>,
}

impl PreviewRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pan: PanOffset::ZERO,
            source: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pan(&self) -> PanOffset {
        self.pan
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Replace the photo; the pan offset starts over at (0, 0)
    pub fn set_source(&mut self, source: Option<Arc<SourceImage>>) {
        if let Some(ref s) = source {
            let cover = cover_size(s.dimensions(), self.viewport);
            debug!(from = ?s.dimensions(), to = ?cover, "preview cover");
        }
        self.source = source;
        self.pan = PanOffset::ZERO;
    }

    /// Change the viewport and re-clamp the pan
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.pan = self.pan.clamped(self.displayed_size(), viewport);
    }

    /// Move the photo by (`dx`, `dy`), stopping at the covering limits
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let moved = PanOffset {
            x: self.pan.x + dx,
            y: self.pan.y + dy,
        };
        self.pan = moved.clamped(self.displayed_size(), self.viewport);
    }

    /// Size of the photo as displayed
    pub fn displayed_size(&self) -> (u32, u32) {
        self.source
            .as_ref()
            .map(|s| cover_size(s.dimensions(), self.viewport))
            .unwrap_or((self.viewport.width, self.viewport.height))
    }

    /// Draw the current view, or `None` when no photo is loaded
    pub fn render(
        &self,
        params: &RenderParameters,
        text: &dyn TextRasterizer,
        icons: &IconSet,
        colors: &OverlayColors,
    ) -> Option<RgbaImage> {
        let source = self.source.as_ref()?;
        let Viewport { width, height } = self.viewport;

        // Viewport window in source pixels
        let (src_w, src_h) = source.dimensions();
        let scale = cover_scale((src_w, src_h), self.viewport);
        let view_x = ((src_w as f32 * scale - width as f32) / 2.0 - self.pan.x) / scale;
        let view_y = ((src_h as f32 * scale - height as f32) / 2.0 - self.pan.y) / scale;
        let (x, w) = source_span(view_x, width as f32 / scale, src_w);
        let (y, h) = source_span(view_y, height as f32 / scale, src_h);

        let window = imageops::crop_imm(source.pixels(), x, y, w, h).to_image();
        let mut canvas = imageops::resize(&window, width, height, FilterType::Triangle);

        let metrics = LayoutMetrics::literal(params.style.font_size);
        let plan = plan_overlay(width, height, params, metrics, text);
        paint_overlay(&mut canvas, &plan, text, icons, colors);
        Some(canvas)
    }
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Rgba};

    struct NoText;

    impl TextRasterizer for NoText {
        fn advance_width(&self, _text: &str, _px: f32) -> f32 {
            0.0
        }

        fn vertical_metrics(&self, px: f32) -> (f32, f32) {
            (px, 0.0)
        }

        fn draw_coverage(&self, _mask: &mut GrayImage, _text: &str, _px: f32, _x: f32, _top: f32) {}
    }

    fn wide_source() -> Arc<SourceImage> {
        let mut pixels = RgbaImage::from_pixel(1200, 400, Rgba([0, 0, 255, 255]));
        for y in 0..400 {
            for x in 0..600 {
                pixels.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            }
        }
        Arc::new(SourceImage::from_rgba(pixels))
    }

    #[test]
    fn test_cover_size() {
        let viewport = Viewport::new(600, 400);
        assert_eq!(cover_size((1200, 400), viewport), (1200, 400));
        assert_eq!(cover_size((300, 300), viewport), (600, 600));
        assert_eq!(cover_size((4000, 3000), viewport), (600, 450));
    }

    #[test]
    fn test_pan_is_clamped() {
        let mut preview = PreviewRenderer::new(Viewport::new(600, 400));
        preview.set_source(Some(wide_source()));
        preview.pan_by(1000.0, 50.0);
        assert_eq!(preview.pan(), PanOffset { x: 300.0, y: 0.0 });
        preview.pan_by(-2000.0, 0.0);
        assert_eq!(preview.pan().x, -300.0);
    }

    #[test]
    fn test_new_source_resets_pan() {
        let mut preview = PreviewRenderer::default();
        preview.set_source(Some(wide_source()));
        preview.pan_by(120.0, 0.0);
        assert_ne!(preview.pan(), PanOffset::ZERO);
        preview.set_source(Some(wide_source()));
        assert_eq!(preview.pan(), PanOffset::ZERO);
    }

    #[test]
    fn test_pan_moves_the_photo() {
        let mut preview = PreviewRenderer::new(Viewport::new(600, 400));
        preview.set_source(Some(wide_source()));
        let params = RenderParameters::default();
        let colors = OverlayColors::default();

        // Centered: the seam between the halves sits mid-viewport
        let centered = preview.render(&params, &NoText, &IconSet::empty(), &colors).unwrap();
        assert_eq!(centered.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(centered.get_pixel(590, 10).0, [0, 0, 255, 255]);

        // Panned fully left: only the blue half is visible
        preview.pan_by(-300.0, 0.0);
        let panned = preview.render(&params, &NoText, &IconSet::empty(), &colors).unwrap();
        assert_eq!(panned.get_pixel(10, 10).0, [0, 0, 255, 255]);
        assert_eq!(panned.dimensions(), (600, 400));
    }

    #[test]
    fn test_extreme_aspect_source_stays_small() {
        // 1x5000 covers a 600x400 viewport at 600x3000000
        let mut pixels = RgbaImage::from_pixel(1, 5000, Rgba([0, 255, 0, 255]));
        pixels.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let mut preview = PreviewRenderer::new(Viewport::new(600, 400));
        preview.set_source(Some(Arc::new(SourceImage::from_rgba(pixels))));
        assert_eq!(preview.displayed_size(), (600, 3_000_000));

        let params = RenderParameters::default();
        let colors = OverlayColors::default();
        let centered = preview.render(&params, &NoText, &IconSet::empty(), &colors).unwrap();
        assert_eq!(centered.dimensions(), (600, 400));
        assert_eq!(centered.get_pixel(300, 200).0, [0, 255, 0, 255]);

        // Panned to the top edge, the first source row fills the view
        preview.pan_by(0.0, 1.0e9);
        assert_eq!(preview.pan(), PanOffset { x: 0.0, y: 1_499_800.0 });
        let top = preview.render(&params, &NoText, &IconSet::empty(), &colors).unwrap();
        assert_eq!(top.dimensions(), (600, 400));
        assert_eq!(top.get_pixel(300, 200).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_source_span_stays_inside() {
        assert_eq!(source_span(300.0, 600.0, 1200), (300, 600));
        assert_eq!(source_span(-5.0, 10.0, 8), (0, 8));
        assert_eq!(source_span(20.0, 0.1, 8), (7, 1));
    }

    #[test]
    fn test_no_source_renders_nothing() {
        let preview = PreviewRenderer::default();
        let out = preview.render(
            &RenderParameters::default(),
            &NoText,
            &IconSet::empty(),
            &OverlayColors::default(),
        );
        assert!(out.is_none());
    }
}
