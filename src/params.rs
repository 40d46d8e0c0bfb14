//! Render parameters
//!
//! The values the surrounding form hands to the renderers: the three metric
//! strings, the overlay style, and the source image itself.

use std::fmt;
use std::str::FromStr;

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, OverlayResult};

/// Font families offered for the overlay text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Arial,
    Helvetica,
    TimesNewRoman,
    Courier,
    Verdana,
}

impl FontFamily {
    /// Form value, e.g. `times-new-roman`
    pub fn key(&self) -> &'static str {
        match self {
            FontFamily::Arial => "arial",
            FontFamily::Helvetica => "helvetica",
            FontFamily::TimesNewRoman => "times-new-roman",
            FontFamily::Courier => "courier",
            FontFamily::Verdana => "verdana",
        }
    }

    /// Display label
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::Helvetica => "Helvetica",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Courier => "Courier",
            FontFamily::Verdana => "Verdana",
        }
    }

    pub fn all() -> &'static [FontFamily] {
        &[
            FontFamily::Arial,
            FontFamily::Helvetica,
            FontFamily::TimesNewRoman,
            FontFamily::Courier,
            FontFamily::Verdana,
        ]
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

impl FromStr for FontFamily {
    type Err = OverlayError;

    fn from_str(s: &str) -> OverlayResult<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        FontFamily::all()
            .iter()
            .copied()
            .find(|f| f.key() == wanted || f.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| OverlayError::invalid_parameter(format!("unknown font family '{}'", s)))
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where the metric strip sits on the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Anchor {
    #[default]
    Bottom,
    Top,
    Left,
    Right,
}

impl Anchor {
    /// Parse an anchor name. Anything unrecognised is treated as `bottom`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "top" => Anchor::Top,
            "left" => Anchor::Left,
            "right" => Anchor::Right,
            _ => Anchor::Bottom,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Anchor::Bottom => "bottom",
            Anchor::Top => "top",
            Anchor::Left => "left",
            Anchor::Right => "right",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Anchor::Bottom => Anchor::Top,
            Anchor::Top => Anchor::Left,
            Anchor::Left => Anchor::Right,
            Anchor::Right => Anchor::Bottom,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Anchor::Bottom => Anchor::Right,
            Anchor::Top => Anchor::Bottom,
            Anchor::Left => Anchor::Top,
            Anchor::Right => Anchor::Left,
        }
    }
}

impl From<String> for Anchor {
    fn from(value: String) -> Self {
        Anchor::from_name(&value)
    }
}

/// Font, size and placement of the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub font: FontFamily,
    /// Pixels before resolution scaling
    pub font_size: u32,
    pub anchor: Anchor,
}

impl OverlayStyle {
    pub const MIN_FONT_SIZE: u32 = 1;
    pub const MAX_FONT_SIZE: u32 = 512;

    pub fn new(font: FontFamily, font_size: u32, anchor: Anchor) -> OverlayResult<Self> {
        if !(Self::MIN_FONT_SIZE..=Self::MAX_FONT_SIZE).contains(&font_size) {
            return Err(OverlayError::invalid_parameter(format!(
                "font size must be between {} and {} pixels, got {}",
                Self::MIN_FONT_SIZE,
                Self::MAX_FONT_SIZE,
                font_size
            )));
        }
        Ok(Self {
            font,
            font_size,
            anchor,
        })
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font: FontFamily::Arial,
            font_size: 32,
            anchor: Anchor::Bottom,
        }
    }
}

/// The three activity metrics as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricSet {
    pub distance: String,
    pub moving_time: String,
    pub elevation_gain: String,
}

impl MetricSet {
    pub fn new(
        distance: impl Into<String>,
        moving_time: impl Into<String>,
        elevation_gain: impl Into<String>,
    ) -> Self {
        Self {
            distance: distance.into(),
            moving_time: moving_time.into(),
            elevation_gain: elevation_gain.into(),
        }
    }

    /// Strings as drawn, left to right: distance, time, elevation.
    ///
    /// Units are appended only to non-empty values so an empty field draws
    /// nothing at all.
    pub fn labels(&self) -> [String; 3] {
        [
            with_unit(&self.distance, "km"),
            self.moving_time.trim().to_string(),
            with_unit(&self.elevation_gain, "m"),
        ]
    }
}

fn with_unit(value: &str, unit: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        String::new()
    } else {
        format!("{} {}", value, unit)
    }
}

/// Everything one render needs besides the image, passed by value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderParameters {
    pub metrics: MetricSet,
    pub style: OverlayStyle,
}

impl RenderParameters {
    pub fn new(metrics: MetricSet, style: OverlayStyle) -> Self {
        Self { metrics, style }
    }
}

/// A decoded photo at its natural resolution
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl From<DynamicImage> for SourceImage {
    fn from(image: DynamicImage) -> Self {
        Self {
            pixels: image.into_rgba8(),
        }
    }
}
