//! fitframe - fitness activity photo overlays
//!
//! Draws distance, moving time and elevation gain over a photo, with a
//! live terminal preview and full-resolution JPEG export.

pub mod color_space;
pub mod compositor;
pub mod config;
pub mod download;
pub mod error;
pub mod export;
pub mod fonts;
pub mod icons;
pub mod image_loader;
pub mod input;
pub mod layout;
pub mod logging;
pub mod overlay;
pub mod params;
pub mod preview;
pub mod state;
pub mod terminal_capabilities;
pub mod terminal_preview;
pub mod ui;
pub mod worker;

// Re-export commonly used types
pub use compositor::{compose, encode_jpeg, EXPORT_FILENAME};
pub use config::Config;
pub use download::{DirectorySink, DownloadSink, MemorySink};
pub use error::{OverlayError, OverlayResult};
pub use export::{export_activity, ExportJob, ExportReport, ExportSettings};
pub use fonts::{FontLibrary, FontProvider, TextRasterizer};
pub use params::{Anchor, FontFamily, MetricSet, OverlayStyle, RenderParameters, SourceImage};
pub use preview::{PreviewRenderer, Viewport};
pub use state::AppState;
