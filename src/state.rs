//! Application state management
//!
//! Single source of truth for the interactive front end: the six overlay
//! parameters, the loaded photo, the preview and the exports in flight.

use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use tracing::{info, warn};

use crate::config::Config;
use crate::export::{ExportJob, ExportReport};
use crate::fonts::FontProvider;
use crate::icons::{IconSet, IconSource};
use crate::overlay::OverlayColors;
use crate::params::{MetricSet, OverlayStyle, RenderParameters, SourceImage};
use crate::preview::{preview_icons, PreviewRenderer};
use crate::terminal_capabilities::TerminalCapabilities;
use crate::worker::{ExportRequests, WorkerResponse};

/// How far one arrow key press moves the preview, in viewport pixels
pub const PAN_STEP: f32 = 20.0;

/// Which widget is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedWidget {
    #[default]
    Settings,
    Preview,
}

impl FocusedWidget {
    pub fn next(&self) -> Self {
        match self {
            FocusedWidget::Settings => FocusedWidget::Preview,
            FocusedWidget::Preview => FocusedWidget::Settings,
        }
    }

    pub fn prev(&self) -> Self {
        self.next()
    }
}

/// Rows of the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Distance,
    MovingTime,
    Elevation,
    Font,
    FontSize,
    Anchor,
}

impl Setting {
    pub fn all() -> &'static [Setting] {
        &[
            Setting::Distance,
            Setting::MovingTime,
            Setting::Elevation,
            Setting::Font,
            Setting::FontSize,
            Setting::Anchor,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Setting::Distance => "Distance (km)",
            Setting::MovingTime => "Moving Time",
            Setting::Elevation => "Elevation (m)",
            Setting::Font => "Font",
            Setting::FontSize => "Font Size",
            Setting::Anchor => "Position",
        }
    }

    /// Free text, edited by typing
    pub fn is_text(&self) -> bool {
        matches!(self, Setting::Distance | Setting::MovingTime | Setting::Elevation)
    }
}

/// Main application state
pub struct AppState {
    // Navigation
    pub focus: FocusedWidget,
    pub show_help: bool,
    pub should_quit: bool,
    pub selected_setting: usize,
    pub editing: bool,

    // Render parameters
    pub metrics: MetricSet,
    pub style: OverlayStyle,

    // Photo and preview
    pub input_file: Option<PathBuf>,
    pub source: Option<Arc<SourceImage>>,
    pub preview: PreviewRenderer,
    pub preview_image: Option<RgbaImage>,
    preview_dirty: bool,
    fonts: Arc<dyn FontProvider>,
    colors: OverlayColors,
    icon_source: IconSource,
    icons: Option<IconSet>,

    // Status line
    pub status_message: String,
    pub status_is_error: bool,

    // Terminal info
    pub terminal_size: (u16, u16),
    pub capabilities: TerminalCapabilities,

    pub config: Config,

    // Interactive load prompt (when pressing [L])
    pub load_prompt_active: bool,
    pub load_prompt_input: String,
    pub load_prompt_error: Option<String>,

    // Exports
    pub exports_in_flight: usize,
    pub last_export: Option<ExportReport>,
    exports: ExportRequests,
}

impl AppState {
    pub fn new(
        config: Config,
        capabilities: TerminalCapabilities,
        fonts: Arc<dyn FontProvider>,
        colors: OverlayColors,
        exports: ExportRequests,
    ) -> Self {
        let terminal_size = capabilities.size;
        Self {
            focus: FocusedWidget::default(),
            show_help: false,
            should_quit: false,
            selected_setting: 0,
            editing: false,

            metrics: MetricSet::default(),
            style: config.style(),

            input_file: None,
            source: None,
            preview: PreviewRenderer::new(config.viewport()),
            preview_image: None,
            preview_dirty: true,
            fonts,
            colors,
            icon_source: config.icon_source(),
            icons: None,

            status_message: "Ready - Press [L] to load a photo, [?] for help".to_string(),
            status_is_error: false,

            terminal_size,
            capabilities,

            config,

            load_prompt_active: false,
            load_prompt_input: String::new(),
            load_prompt_error: None,

            exports_in_flight: 0,
            last_export: None,
            exports,
        }
    }

    /// Snapshot of the current parameters
    pub fn params(&self) -> RenderParameters {
        RenderParameters::new(self.metrics.clone(), self.style)
    }

    /// Update terminal size on resize
    pub fn set_terminal_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
    }

    /// Set status message
    pub fn set_status(&mut self, message: &str, is_error: bool) {
        self.status_message = message.to_string();
        self.status_is_error = is_error;
    }

    /// Replace the photo; the preview pan starts over
    pub fn set_source(&mut self, path: PathBuf, source: SourceImage) {
        let filename = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let (w, h) = source.dimensions();

        let source = Arc::new(source);
        self.preview.set_source(Some(Arc::clone(&source)));
        self.source = Some(source);
        self.input_file = Some(path);
        self.preview_dirty = true;

        self.load_prompt_active = false;
        self.load_prompt_input.clear();
        self.load_prompt_error = None;

        info!(file = %filename, width = w, height = h, "photo loaded");
        self.set_status(&format!("Loaded: {} ({}x{})", filename, w, h), false);
    }

    pub fn selected(&self) -> Setting {
        let all = Setting::all();
        all[self.selected_setting.min(all.len() - 1)]
    }

    pub fn next_setting(&mut self) {
        self.selected_setting = (self.selected_setting + 1) % Setting::all().len();
    }

    pub fn prev_setting(&mut self) {
        let count = Setting::all().len();
        self.selected_setting = (self.selected_setting + count - 1) % count;
    }

    pub fn setting_value(&self, setting: Setting) -> String {
        match setting {
            Setting::Distance => self.metrics.distance.clone(),
            Setting::MovingTime => self.metrics.moving_time.clone(),
            Setting::Elevation => self.metrics.elevation_gain.clone(),
            Setting::Font => self.style.font.name().to_string(),
            Setting::FontSize => format!("{} px", self.style.font_size),
            Setting::Anchor => self.style.anchor.name().to_string(),
        }
    }

    /// Step a choice setting forwards or backwards; `step` scales font size changes
    pub fn adjust_setting(&mut self, forward: bool, step: u32) {
        match self.selected() {
            Setting::Font => {
                self.style.font = if forward {
                    self.style.font.next()
                } else {
                    self.style.font.prev()
                };
            }
            Setting::FontSize => {
                let size = if forward {
                    self.style.font_size.saturating_add(step)
                } else {
                    self.style.font_size.saturating_sub(step)
                };
                self.style.font_size =
                    size.clamp(OverlayStyle::MIN_FONT_SIZE, OverlayStyle::MAX_FONT_SIZE);
            }
            Setting::Anchor => {
                self.style.anchor = if forward {
                    self.style.anchor.next()
                } else {
                    self.style.anchor.prev()
                };
            }
            _ => return,
        }
        self.preview_dirty = true;
    }

    /// Start typing into the selected metric field
    pub fn start_editing(&mut self) {
        if self.selected().is_text() {
            self.editing = true;
            self.set_status("Editing: type, then Enter or Esc", false);
        }
    }

    pub fn stop_editing(&mut self) {
        self.editing = false;
        self.set_status("Ready", false);
    }

    fn selected_field(&mut self) -> Option<&mut String> {
        match self.selected() {
            Setting::Distance => Some(&mut self.metrics.distance),
            Setting::MovingTime => Some(&mut self.metrics.moving_time),
            Setting::Elevation => Some(&mut self.metrics.elevation_gain),
            _ => None,
        }
    }

    pub fn edit_push(&mut self, c: char) {
        if let Some(field) = self.selected_field() {
            field.push(c);
            self.preview_dirty = true;
        }
    }

    pub fn edit_backspace(&mut self) {
        if let Some(field) = self.selected_field() {
            field.pop();
            self.preview_dirty = true;
        }
    }

    /// Step the preview down to fewer colors, for terminals that were misdetected
    pub fn cycle_color_support(&mut self) {
        self.capabilities.color_support = self.capabilities.color_support.next();
        let name = self.capabilities.color_support.name();
        self.set_status(&format!("Preview colors: {}", name), false);
    }

    /// Move the photo inside the preview viewport
    pub fn pan_preview(&mut self, dx: f32, dy: f32) {
        if !self.preview.has_source() {
            return;
        }
        let before = self.preview.pan();
        self.preview.pan_by(dx, dy);
        if self.preview.pan() != before {
            self.preview_dirty = true;
        }
    }

    /// Re-render the preview if anything it shows has changed
    pub fn refresh_preview(&mut self) {
        if !self.preview_dirty {
            return;
        }
        self.preview_dirty = false;

        if !self.preview.has_source() {
            self.preview_image = None;
            return;
        }

        let text = match self.fonts.rasterizer(self.style.font) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "preview font unavailable");
                self.preview_image = None;
                self.set_status(&e.to_string(), true);
                return;
            }
        };

        let icon_source = &self.icon_source;
        let colors = &self.colors;
        let icons = self.icons.get_or_insert_with(|| preview_icons(icon_source, colors));
        let params = RenderParameters::new(self.metrics.clone(), self.style);
        self.preview_image = self.preview.render(&params, text.as_ref(), icons, &self.colors);
    }

    /// Send the current photo and parameters to the export worker
    pub fn request_export(&mut self) {
        if self.source.is_none() {
            self.set_status("No photo loaded - Press [L] to load", false);
        }

        let job = ExportJob {
            source: self.source.clone(),
            params: self.params(),
        };
        if self.exports.export(job).is_err() {
            self.set_status("Export worker is not running", true);
            return;
        }
        self.exports_in_flight += 1;
        if self.source.is_some() {
            self.set_status("Exporting...", false);
        }
    }

    /// Handle response from the export worker
    pub fn handle_worker_response(&mut self, response: WorkerResponse) {
        self.exports_in_flight = self.exports_in_flight.saturating_sub(1);

        match response {
            WorkerResponse::Complete { report, .. } => {
                self.set_status(
                    &format!(
                        "Saved {} ({}x{}, {} KB) in {}ms",
                        report.location,
                        report.width,
                        report.height,
                        report.bytes / 1024,
                        report.elapsed.as_millis()
                    ),
                    false,
                );
                self.last_export = Some(report);
            }
            WorkerResponse::Skipped { .. } => {}
            WorkerResponse::Superseded { .. } => {
                if self.exports_in_flight == 0 {
                    self.set_status("Export replaced by a newer one", false);
                }
            }
            WorkerResponse::Error { message, .. } => {
                self.set_status(&format!("Export failed: {}", message), true);
            }
        }
    }

    /// Start the interactive load prompt (shows a modal for path input)
    pub fn start_load_prompt(&mut self) {
        self.load_prompt_active = true;
        self.load_prompt_input.clear();
        self.load_prompt_error = None;
        self.set_status("Enter image path and press Enter", false);
    }

    /// Cancel the interactive load prompt
    pub fn cancel_load_prompt(&mut self) {
        self.load_prompt_active = false;
        self.load_prompt_input.clear();
        self.load_prompt_error = None;
        self.set_status("Load cancelled", false);
    }

    /// Attempt to load the image from the prompt input
    pub fn submit_load_prompt(&mut self) {
        let input = self.load_prompt_input.trim();
        if input.is_empty() {
            self.load_prompt_error = Some("Path is empty".to_string());
            self.set_status("Path is empty", true);
            return;
        }

        let path = PathBuf::from(input);
        if !path.exists() {
            self.load_prompt_error = Some("File not found".to_string());
            self.set_status("File not found", true);
            return;
        }

        match crate::image_loader::load_image(&path) {
            Ok(source) => self.set_source(path, source),
            Err(e) => {
                self.load_prompt_error = Some(format!("Failed to load: {}", e));
                self.set_status(&format!("Failed to load: {}", e), true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{unbounded, Receiver};
    use image::Rgba;

    use crate::error::{OverlayError, OverlayResult};
    use crate::fonts::TextRasterizer;
    use crate::params::{Anchor, FontFamily};
    use crate::worker::WorkerMessage;

    struct NoFonts;

    impl FontProvider for NoFonts {
        fn rasterizer(&self, family: FontFamily) -> OverlayResult<Arc<dyn TextRasterizer>> {
            Err(OverlayError::font_unavailable(family.key()))
        }
    }

    fn state() -> (AppState, Receiver<WorkerMessage>) {
        let (tx, rx) = unbounded();
        let state = AppState::new(
            Config::default(),
            TerminalCapabilities::default(),
            Arc::new(NoFonts),
            OverlayColors::default(),
            ExportRequests::new(tx),
        );
        (state, rx)
    }

    fn photo() -> SourceImage {
        SourceImage::from_rgba(RgbaImage::from_pixel(1200, 400, Rgba([5, 5, 5, 255])))
    }

    #[test]
    fn test_setting_navigation_wraps() {
        let (mut state, _rx) = state();
        state.prev_setting();
        assert_eq!(state.selected(), Setting::Anchor);
        state.next_setting();
        assert_eq!(state.selected(), Setting::Distance);
    }

    #[test]
    fn test_editing_metrics() {
        let (mut state, _rx) = state();
        state.start_editing();
        assert!(state.editing);
        for c in "12.5".chars() {
            state.edit_push(c);
        }
        state.edit_backspace();
        assert_eq!(state.metrics.distance, "12.");
        assert_eq!(state.params().metrics.labels()[0], "12. km");
    }

    #[test]
    fn test_adjust_choices() {
        let (mut state, _rx) = state();
        state.selected_setting = 3;
        state.adjust_setting(true, 1);
        assert_eq!(state.style.font, FontFamily::Helvetica);

        state.selected_setting = 4;
        state.adjust_setting(false, 100);
        assert_eq!(state.style.font_size, OverlayStyle::MIN_FONT_SIZE);

        state.selected_setting = 5;
        state.adjust_setting(true, 1);
        assert_eq!(state.style.anchor, Anchor::Bottom.next());
    }

    #[test]
    fn test_new_photo_resets_pan() {
        let (mut state, _rx) = state();
        state.set_source(PathBuf::from("a.jpg"), photo());
        state.pan_preview(PAN_STEP * 3.0, 0.0);
        assert_eq!(state.preview.pan().x, 60.0);

        state.set_source(PathBuf::from("b.jpg"), photo());
        assert_eq!(state.preview.pan().x, 0.0);
        assert_eq!(state.input_file, Some(PathBuf::from("b.jpg")));
    }

    #[test]
    fn test_export_snapshots_parameters() {
        let (mut state, rx) = state();
        state.set_source(PathBuf::from("run.jpg"), photo());
        state.metrics.moving_time = "1:02:03".to_string();
        state.request_export();
        state.metrics.moving_time = "changed".to_string();

        match rx.try_recv().unwrap() {
            WorkerMessage::Export { id, job } => {
                assert_eq!(id, 1);
                assert_eq!(job.params.metrics.moving_time, "1:02:03");
                assert!(job.source.is_some());
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert_eq!(state.exports_in_flight, 1);
    }

    #[test]
    fn test_preview_reports_missing_font() {
        let (mut state, _rx) = state();
        state.set_source(PathBuf::from("run.jpg"), photo());
        state.refresh_preview();
        assert!(state.preview_image.is_none());
        assert!(state.status_is_error);
    }

    #[test]
    fn test_error_response_sets_status() {
        let (mut state, _rx) = state();
        state.exports_in_flight = 1;
        state.handle_worker_response(WorkerResponse::Error {
            id: 1,
            message: "disk full".to_string(),
        });
        assert_eq!(state.exports_in_flight, 0);
        assert!(state.status_is_error);
        assert!(state.status_message.contains("disk full"));
    }

    #[test]
    fn test_load_prompt_missing_file() {
        let (mut state, _rx) = state();
        state.start_load_prompt();
        state.load_prompt_input = "/nonexistent/fitframe/run.jpg".to_string();
        state.submit_load_prompt();
        assert_eq!(state.load_prompt_error.as_deref(), Some("File not found"));
    }
}
