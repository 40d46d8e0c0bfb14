//! Asynchronous export pipeline
//!
//! One export runs as: icon loading (three concurrent loads, all awaited),
//! then font lookup, surface allocation with a 1:1 copy of the photo,
//! overlay painting and JPEG encoding on the blocking pool, and finally
//! delivery to a [`DownloadSink`], also off the runtime threads.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::spawn_blocking;
use tracing::{debug, info};

use crate::compositor::{compose, encode_jpeg, export_metrics, DEFAULT_JPEG_QUALITY, EXPORT_FILENAME};
use crate::download::DownloadSink;
use crate::error::{OverlayError, OverlayResult};
use crate::fonts::FontProvider;
use crate::icons::{IconSet, IconSource};
use crate::overlay::OverlayColors;
use crate::params::{RenderParameters, SourceImage};

/// Settings shared by every export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub jpeg_quality: u8,
    pub colors: OverlayColors,
    pub icons: IconSource,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            colors: OverlayColors::default(),
            icons: IconSource::default(),
        }
    }
}

/// One export request, captured at the moment it was made
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// `None` when no photo has been loaded yet
    pub source: Option<Arc<SourceImage>>,
    pub params: RenderParameters,
}

/// An encoded export that has not been delivered yet
#[derive(Debug, Clone)]
pub struct RenderedExport {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub icons_drawn: usize,
    started: Instant,
}

/// Outcome of a delivered export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub filename: String,
    pub location: String,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    pub icons_drawn: usize,
    pub elapsed: Duration,
}

/// Composite and encode an export.
///
/// Returns `Ok(None)` when the job has no source image; nothing is drawn or
/// delivered in that case.
pub async fn render_export(
    job: ExportJob,
    fonts: Arc<dyn FontProvider>,
    settings: &ExportSettings,
) -> OverlayResult<Option<RenderedExport>> {
    let Some(source) = job.source else {
        debug!("export requested with no image loaded");
        return Ok(None);
    };
    let started = Instant::now();

    let (width, height) = source.dimensions();
    let metrics = export_metrics(width, height, &job.params.style);
    let icon_px = metrics.icon_size.round().max(1.0) as u32;

    // Text is only drawn once every icon load has settled
    let icons = IconSet::load(&settings.icons, icon_px, settings.colors.fill).await;
    let icons_drawn = icons.loaded();

    let params = job.params;
    let colors = settings.colors;
    let quality = settings.jpeg_quality;
    let bytes = spawn_blocking(move || -> OverlayResult<Vec<u8>> {
        let text = fonts.rasterizer(params.style.font)?;
        let surface = compose(&source, &params, text.as_ref(), &icons, &colors)?;
        encode_jpeg(&surface, quality)
    })
    .await
    .map_err(|e| OverlayError::Other(anyhow::Error::new(e)))??;

    debug!(width, height, bytes = bytes.len(), icons_drawn, "export encoded");

    Ok(Some(RenderedExport {
        bytes,
        width,
        height,
        icons_drawn,
        started,
    }))
}

/// Hand an encoded export to the sink under [`EXPORT_FILENAME`]
pub async fn deliver(
    rendered: RenderedExport,
    sink: Arc<dyn DownloadSink>,
) -> OverlayResult<ExportReport> {
    let RenderedExport {
        bytes,
        width,
        height,
        icons_drawn,
        started,
    } = rendered;
    let size = bytes.len();

    let location = spawn_blocking(move || sink.deliver(EXPORT_FILENAME, &bytes))
        .await
        .map_err(|e| OverlayError::Other(anyhow::Error::new(e)))??;

    let report = ExportReport {
        filename: EXPORT_FILENAME.to_string(),
        location,
        width,
        height,
        bytes: size,
        icons_drawn,
        elapsed: started.elapsed(),
    };
    info!(
        location = %report.location,
        width,
        height,
        bytes = size,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "export delivered"
    );
    Ok(report)
}

/// Render and deliver in one go
pub async fn export_activity(
    job: ExportJob,
    fonts: Arc<dyn FontProvider>,
    sink: Arc<dyn DownloadSink>,
    settings: &ExportSettings,
) -> OverlayResult<Option<ExportReport>> {
    match render_export(job, fonts, settings).await? {
        Some(rendered) => deliver(rendered, sink).await.map(Some),
        None => Ok(None),
    }
}
