//! Export compositor
//!
//! Renders the final image at the photo's natural resolution: a 1:1 copy of
//! the source with the metric overlay painted on top, scaled so it keeps the
//! proportions the preview shows.

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage, RgbaImage};
use tracing::debug;

use crate::error::{OverlayError, OverlayResult};
use crate::fonts::TextRasterizer;
use crate::icons::IconSet;
use crate::layout::{scale_factor, LayoutMetrics};
use crate::overlay::{paint_overlay, plan_overlay, OverlayColors};
use crate::params::{OverlayStyle, RenderParameters, SourceImage};

/// Name every export is delivered under
pub const EXPORT_FILENAME: &str = "fitness_activity.jpg";

/// JPEG quality used unless configured otherwise
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Layout sizes for exporting a `width` x `height` image
pub fn export_metrics(width: u32, height: u32, style: &OverlayStyle) -> LayoutMetrics {
    LayoutMetrics::scaled(style.font_size, scale_factor(width, height))
}

/// A fresh surface holding a straight copy of the source pixels
pub fn allocate_surface(source: &SourceImage) -> OverlayResult<RgbaImage> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(OverlayError::surface(format!(
            "cannot allocate a {}x{} surface",
            width, height
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| {
            OverlayError::surface(format!("{}x{} surface is too large", width, height))
        })?;

    Ok(source.pixels().clone())
}

/// Composite the overlay onto a copy of `source`
pub fn compose(
    source: &SourceImage,
    params: &RenderParameters,
    text: &dyn TextRasterizer,
    icons: &IconSet,
    colors: &OverlayColors,
) -> OverlayResult<RgbaImage> {
    let mut surface = allocate_surface(source)?;
    let (width, height) = surface.dimensions();

    let metrics = export_metrics(width, height, &params.style);
    let plan = plan_overlay(width, height, params, metrics, text);
    debug!(
        width,
        height,
        font_px = metrics.font_px,
        spacing = plan.row.spacing,
        "compositing export"
    );

    paint_overlay(&mut surface, &plan, text, icons, colors);
    Ok(surface)
}

/// Composite a surface over opaque black, as a viewer shows transparent pixels
pub fn flatten_over_black(surface: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(surface.width(), surface.height(), |x, y| {
        let [r, g, b, a] = surface.get_pixel(x, y).0;
        let over = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        Rgb([over(r), over(g), over(b)])
    })
}

/// Encode a surface as baseline JPEG, flattened over black
pub fn encode_jpeg(surface: &RgbaImage, quality: u8) -> OverlayResult<Vec<u8>> {
    let rgb = flatten_over_black(surface);
    let mut bytes = Vec::with_capacity(rgb.as_raw().len() / 8);
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    encoder
        .encode_image(&rgb)
        .map_err(|e| OverlayError::encode(e.to_string()))?;
    Ok(bytes)
}
