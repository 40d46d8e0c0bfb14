//! Rendering benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fitframe::compositor::{compose, encode_jpeg, DEFAULT_JPEG_QUALITY};
use fitframe::fonts::TextRasterizer;
use fitframe::icons::{IconSet, IconSource};
use fitframe::overlay::OverlayColors;
use fitframe::params::{Anchor, FontFamily, MetricSet, OverlayStyle, RenderParameters, SourceImage};
use fitframe::preview::{PreviewRenderer, Viewport};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use std::sync::Arc;

/// Solid box glyphs, so timings do not depend on installed fonts
struct BoxGlyphs;

impl TextRasterizer for BoxGlyphs {
    fn advance_width(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * px * 0.5
    }

    fn vertical_metrics(&self, px: f32) -> (f32, f32) {
        (px * 0.8, -px * 0.2)
    }

    fn draw_coverage(&self, mask: &mut GrayImage, text: &str, px: f32, x: f32, top: f32) {
        let advance = px * 0.5;
        for i in 0..text.chars().count() {
            let gx = (x + i as f32 * advance).max(0.0) as u32;
            let gy = (top + px * 0.1).max(0.0) as u32;
            for y in gy..(gy + (px * 0.7) as u32).min(mask.height()) {
                for x in gx..(gx + (advance * 0.8) as u32).min(mask.width()) {
                    mask.put_pixel(x, y, Luma([255]));
                }
            }
        }
    }
}

fn create_test_image(width: u32, height: u32) -> SourceImage {
    let mut img = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let r = ((x as f32 / width as f32) * 255.0) as u8;
        let g = ((y as f32 / height as f32) * 255.0) as u8;
        let b = (((x + y) as f32 / (width + height) as f32) * 255.0) as u8;
        *pixel = Rgba([r, g, b, 255]);
    }
    SourceImage::from_rgba(img)
}

fn params() -> RenderParameters {
    RenderParameters::new(
        MetricSet::new("42.2", "3:29:51", "412"),
        OverlayStyle::new(FontFamily::Arial, 32, Anchor::Bottom).unwrap_or_default(),
    )
}

fn benchmark_compose(c: &mut Criterion) {
    let colors = OverlayColors::default();
    let params = params();

    let mut group = c.benchmark_group("Export Compose");
    group.sample_size(20);

    for (w, h) in [(1920, 1080), (4000, 3000)] {
        let source = create_test_image(w, h);
        let icons = IconSet::load_blocking(&IconSource::Vector, 24, colors.fill);

        group.bench_function(format!("{}x{}", w, h), |b| {
            b.iter(|| {
                compose(
                    black_box(&source),
                    black_box(&params),
                    &BoxGlyphs,
                    &icons,
                    &colors,
                )
            })
        });
    }

    group.finish();
}

fn benchmark_encode(c: &mut Criterion) {
    let surface = create_test_image(1920, 1080).pixels().clone();

    let mut group = c.benchmark_group("JPEG Encode");
    group.sample_size(20);

    for quality in [75u8, DEFAULT_JPEG_QUALITY] {
        group.bench_function(format!("quality_{}", quality), |b| {
            b.iter(|| encode_jpeg(black_box(&surface), quality))
        });
    }

    group.finish();
}

fn benchmark_preview(c: &mut Criterion) {
    let colors = OverlayColors::default();
    let params = params();
    let icons = IconSet::load_blocking(&IconSource::Vector, 24, colors.fill);

    let mut preview = PreviewRenderer::new(Viewport::default());
    preview.set_source(Some(Arc::new(create_test_image(4000, 3000))));

    c.bench_function("preview_render", |b| {
        b.iter(|| preview.render(black_box(&params), &BoxGlyphs, &icons, &colors))
    });
}

criterion_group!(benches, benchmark_compose, benchmark_encode, benchmark_preview);
criterion_main!(benches);
