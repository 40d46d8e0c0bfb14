//! Metric icons
//!
//! The ruler, clock and mountain glyphs drawn left of each metric. Icons are
//! either drawn procedurally or read from a directory of PNG files; a set of
//! three is loaded concurrently and any icon that fails is simply left out.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    draw_polygon_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use tracing::{debug, warn};

use crate::error::{OverlayError, OverlayResult};

/// Smallest icon edge worth drawing
const MIN_ICON_SIZE: u32 = 4;

/// Which metric an icon belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    Ruler,
    Clock,
    Mountain,
}

impl IconKind {
    /// In metric order: distance, time, elevation
    pub fn all() -> [IconKind; 3] {
        [IconKind::Ruler, IconKind::Clock, IconKind::Mountain]
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            IconKind::Ruler => "ruler.png",
            IconKind::Clock => "clock.png",
            IconKind::Mountain => "mountain.png",
        }
    }
}

/// Where icon pixels come from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IconSource {
    /// Drawn with vector primitives in the overlay's fill color
    #[default]
    Vector,
    /// `ruler.png`, `clock.png` and `mountain.png` inside a directory
    Directory(PathBuf),
    /// No icons at all
    Disabled,
}

impl IconSource {
    /// Load one icon at `size` x `size` pixels
    pub async fn load(
        &self,
        kind: IconKind,
        size: u32,
        color: Rgba<u8>,
    ) -> OverlayResult<RgbaImage> {
        match self {
            IconSource::Vector => Ok(draw_vector_icon(kind, size, color)),
            IconSource::Directory(dir) => {
                let path = dir.join(kind.file_name());
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| OverlayError::icon(format!("{}: {}", path.display(), e)))?;
                decode_icon(&path, &bytes, size)
            }
            IconSource::Disabled => Err(OverlayError::icon("icons disabled")),
        }
    }

    /// Same as [`IconSource::load`] without suspending, for the preview path
    pub fn load_blocking(
        &self,
        kind: IconKind,
        size: u32,
        color: Rgba<u8>,
    ) -> OverlayResult<RgbaImage> {
        match self {
            IconSource::Vector => Ok(draw_vector_icon(kind, size, color)),
            IconSource::Directory(dir) => {
                let path = dir.join(kind.file_name());
                let bytes = std::fs::read(&path)
                    .map_err(|e| OverlayError::icon(format!("{}: {}", path.display(), e)))?;
                decode_icon(&path, &bytes, size)
            }
            IconSource::Disabled => Err(OverlayError::icon("icons disabled")),
        }
    }
}

/// Up to three icons, in metric order
#[derive(Debug, Clone, Default)]
pub struct IconSet {
    icons: [Option<RgbaImage>; 3],
}

impl IconSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load all three icons concurrently and wait for every one of them.
    ///
    /// A failed icon is logged and left empty; its metric is drawn as text only.
    pub async fn load(source: &IconSource, size: u32, color: Rgba<u8>) -> Self {
        if *source == IconSource::Disabled {
            return Self::empty();
        }

        let [ruler, clock, mountain] = IconKind::all();
        let (ruler_icon, clock_icon, mountain_icon) = tokio::join!(
            source.load(ruler, size, color),
            source.load(clock, size, color),
            source.load(mountain, size, color),
        );

        Self {
            icons: [
                keep_or_skip(ruler, ruler_icon),
                keep_or_skip(clock, clock_icon),
                keep_or_skip(mountain, mountain_icon),
            ],
        }
    }

    pub fn load_blocking(source: &IconSource, size: u32, color: Rgba<u8>) -> Self {
        if *source == IconSource::Disabled {
            return Self::empty();
        }
        Self {
            icons: IconKind::all()
                .map(|kind| keep_or_skip(kind, source.load_blocking(kind, size, color))),
        }
    }

    /// Icon for the metric at `index` (0 = distance)
    pub fn get(&self, index: usize) -> Option<&RgbaImage> {
        self.icons.get(index).and_then(|icon| icon.as_ref())
    }

    pub fn loaded(&self) -> usize {
        self.icons.iter().filter(|icon| icon.is_some()).count()
    }
}

fn keep_or_skip(kind: IconKind, result: OverlayResult<RgbaImage>) -> Option<RgbaImage> {
    match result {
        Ok(icon) => Some(icon),
        Err(e) => {
            warn!(icon = ?kind, error = %e, "icon unavailable, drawing text only");
            None
        }
    }
}

fn decode_icon(path: &Path, bytes: &[u8], size: u32) -> OverlayResult<RgbaImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| OverlayError::icon(format!("{}: {}", path.display(), e)))?
        .into_rgba8();
    let size = size.max(1);
    debug!(path = %path.display(), size, "decoded icon");
    Ok(imageops::resize(&decoded, size, size, FilterType::Lanczos3))
}

/// Draw one of the built-in glyphs on a transparent square
pub fn draw_vector_icon(kind: IconKind, size: u32, color: Rgba<u8>) -> RgbaImage {
    let size = size.max(MIN_ICON_SIZE);
    let mut icon = RgbaImage::new(size, size);
    let s = size as f32;
    let stroke = (size / 12).max(1);

    match kind {
        IconKind::Ruler => {
            let top = (s * 0.3) as i32;
            let body_height = (s * 0.4).max(2.0) as u32;
            for inset in 0..stroke {
                let rect = Rect::at(inset as i32, top + inset as i32)
                    .of_size(size - 2 * inset, body_height.saturating_sub(2 * inset).max(1));
                draw_hollow_rect_mut(&mut icon, rect, color);
            }
            // Alternating long and short ticks hanging from the top edge
            let ticks = 5;
            for i in 1..ticks {
                let x = (s * i as f32 / ticks as f32) as i32;
                let len = if i % 2 == 0 { s * 0.22 } else { s * 0.14 };
                draw_filled_rect_mut(
                    &mut icon,
                    Rect::at(x, top).of_size(stroke, len.max(1.0) as u32),
                    color,
                );
            }
        }
        IconKind::Clock => {
            let center = (size as i32 / 2, size as i32 / 2);
            let radius = size as i32 / 2 - 1;
            for inset in 0..stroke as i32 {
                draw_hollow_circle_mut(&mut icon, center, (radius - inset).max(1), color);
            }
            let (cx, cy) = (center.0 as f32, center.1 as f32);
            let r = radius as f32;
            for offset in 0..stroke {
                let o = offset as f32;
                draw_line_segment_mut(&mut icon, (cx + o, cy), (cx + o, cy - r * 0.6), color);
                draw_line_segment_mut(&mut icon, (cx, cy + o), (cx + r * 0.45, cy + o), color);
            }
        }
        IconKind::Mountain => {
            let max = size as i32 - 1;
            let peaks = [
                Point::new(0, max),
                Point::new((s * 0.38) as i32, (s * 0.18) as i32),
                Point::new((s * 0.58) as i32, (s * 0.52) as i32),
                Point::new((s * 0.74) as i32, (s * 0.34) as i32),
                Point::new(max, max),
            ];
            draw_polygon_mut(&mut icon, &peaks, color);
        }
    }

    icon
}
