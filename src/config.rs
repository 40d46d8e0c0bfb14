//! Configuration management
//!
//! Load and save user preferences to a TOML config file.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::color_space::{parse_hex_color, to_hex};
use crate::compositor::DEFAULT_JPEG_QUALITY;
use crate::export::ExportSettings;
use crate::fonts::{default_font_dirs, FontLibrary};
use crate::icons::IconSource;
use crate::overlay::OverlayColors;
use crate::params::{Anchor, FontFamily, OverlayStyle};
use crate::preview::Viewport;
use crate::worker::ExportPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub overlay: OverlayPreferences,
    pub fonts: FontPreferences,
    pub icons: IconPreferences,
    pub export: ExportPreferences,
    pub preview: PreviewPreferences,
    pub logging: LoggingConfig,
    /// File this config was read from; `save` writes back there
    #[serde(skip)]
    file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file, defaults when there is none
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let mut config: Config =
            toml::from_str(&contents).with_context(|| format!("Invalid config: {:?}", path))?;
        config.file = Some(path.to_path_buf());
        Ok(config)
    }

    /// Where `save` writes: the file it was loaded from, else the default path
    pub fn save_path(&self) -> Result<PathBuf> {
        match self.file {
            Some(ref path) => Ok(path.clone()),
            None => Self::config_path(),
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = self.save_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = project_dirs() {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            // Fallback to current directory
            Ok(PathBuf::from("fitframe.toml"))
        }
    }

    /// Overlay style, with the font size forced into range
    pub fn style(&self) -> OverlayStyle {
        let size = self
            .overlay
            .font_size
            .clamp(OverlayStyle::MIN_FONT_SIZE, OverlayStyle::MAX_FONT_SIZE);
        OverlayStyle {
            font: self.overlay.font,
            font_size: size,
            anchor: self.overlay.anchor,
        }
    }

    /// Remember the last-used style
    pub fn set_style(&mut self, style: OverlayStyle) {
        self.overlay.font = style.font;
        self.overlay.font_size = style.font_size;
        self.overlay.anchor = style.anchor;
    }

    pub fn colors(&self) -> Result<OverlayColors> {
        Ok(OverlayColors {
            fill: parse_hex_color(&self.overlay.fill_color).context("[overlay] fill_color")?,
            outline: parse_hex_color(&self.overlay.outline_color)
                .context("[overlay] outline_color")?,
            backdrop_opacity: self.overlay.backdrop_opacity.clamp(0.0, 1.0),
        })
    }

    pub fn icon_source(&self) -> IconSource {
        match (&self.icons.enabled, &self.icons.directory) {
            (false, _) => IconSource::Disabled,
            (true, Some(dir)) => IconSource::Directory(dir.clone()),
            (true, None) => IconSource::Vector,
        }
    }

    pub fn export_settings(&self) -> Result<ExportSettings> {
        Ok(ExportSettings {
            jpeg_quality: self.export.jpeg_quality.clamp(1, 100),
            colors: self.colors()?,
            icons: self.icon_source(),
        })
    }

    /// Font library over the configured directories, platform defaults after them
    pub fn font_library(&self) -> FontLibrary {
        let mut dirs = self.fonts.search_dirs.clone();
        dirs.extend(default_font_dirs());
        FontLibrary::new(dirs, self.fonts.overrides.clone())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .or_else(|| directories::UserDirs::new().and_then(|u| u.download_dir().map(PathBuf::from)))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.preview.width, self.preview.height)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "fitframe", "fitframe")
}

/// Per-user data directory, where the UI writes its log
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Overlay look
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayPreferences {
    pub font: FontFamily,
    pub font_size: u32,
    pub anchor: Anchor,
    pub fill_color: String,
    pub outline_color: String,
    pub backdrop_opacity: f32,
}

impl Default for OverlayPreferences {
    fn default() -> Self {
        let style = OverlayStyle::default();
        let colors = OverlayColors::default();
        Self {
            font: style.font,
            font_size: style.font_size,
            anchor: style.anchor,
            fill_color: to_hex(colors.fill),
            outline_color: to_hex(colors.outline),
            backdrop_opacity: colors.backdrop_opacity,
        }
    }
}

/// Where fonts are looked for
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FontPreferences {
    /// Searched before the platform font directories
    pub search_dirs: Vec<PathBuf>,
    /// Exact font file per family
    pub overrides: HashMap<FontFamily, PathBuf>,
}

/// Metric icons
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconPreferences {
    pub enabled: bool,
    /// Directory holding ruler.png, clock.png and mountain.png
    pub directory: Option<PathBuf>,
}

impl Default for IconPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
        }
    }
}

/// Export output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPreferences {
    /// Defaults to the user's download directory
    pub output_dir: Option<PathBuf>,
    pub jpeg_quality: u8,
    pub policy: ExportPolicy,
}

impl Default for ExportPreferences {
    fn default() -> Self {
        Self {
            output_dir: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            policy: ExportPolicy::default(),
        }
    }
}

/// Preview viewport, in pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewPreferences {
    pub width: u32,
    pub height: u32,
}

impl Default for PreviewPreferences {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            width: viewport.width,
            height: viewport.height,
        }
    }
}

/// Logging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "fitframe=debug"
    pub level: String,
    /// Log file for the interactive UI
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.overlay.font_size, 32);
        assert_eq!(config.overlay.fill_color, "#FFFFFF");
        assert_eq!(config.export.jpeg_quality, 95);
        assert_eq!(config.viewport(), Viewport::new(600, 400));
        assert_eq!(config.icon_source(), IconSource::Vector);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.overlay.font_size, config.overlay.font_size);
        assert_eq!(parsed.export.policy, config.export.policy);
    }

    #[test]
    fn test_partial_config() {
        let parsed: Config = toml::from_str(
            r##"
            [overlay]
            font = "verdana"
            anchor = "diagonal"
            fill_color = "#FF8000"

            [export]
            policy = "latest-wins"
            "##,
        )
        .unwrap();
        assert_eq!(parsed.overlay.font, FontFamily::Verdana);
        assert_eq!(parsed.overlay.anchor, Anchor::Bottom);
        assert_eq!(parsed.overlay.font_size, 32);
        assert_eq!(parsed.colors().unwrap().fill, Rgba([255, 128, 0, 255]));
        assert_eq!(parsed.export.policy, ExportPolicy::LatestWins);
    }

    #[test]
    fn test_bad_color_is_reported() {
        let mut config = Config::default();
        config.overlay.outline_color = "purple".to_string();
        assert!(config.colors().is_err());
    }

    #[test]
    fn test_icons_disabled() {
        let mut config = Config::default();
        config.icons.enabled = false;
        config.icons.directory = Some(PathBuf::from("/icons"));
        assert_eq!(config.icon_source(), IconSource::Disabled);
    }

    #[test]
    fn test_style_clamps_font_size() {
        let mut config = Config::default();
        config.overlay.font_size = 0;
        assert_eq!(config.style().font_size, OverlayStyle::MIN_FONT_SIZE);
    }

    #[test]
    fn test_save_writes_back_to_loaded_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[overlay]\nfont_size = 40\n").unwrap();

        let mut config = Config::load_from(&path).unwrap();
        assert_eq!(config.save_path().unwrap(), path);
        config.overlay.anchor = Anchor::Right;
        config.save().unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.overlay.font_size, 40);
        assert_eq!(reloaded.overlay.anchor, Anchor::Right);
    }

    #[test]
    fn test_default_config_saves_to_default_path() {
        let config = Config::default();
        assert_eq!(config.save_path().unwrap(), Config::config_path().unwrap());
    }
}
