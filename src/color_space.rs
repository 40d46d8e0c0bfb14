//! Color parsing and terminal color quantization
//!
//! Hex colors from the config file go through `palette`; preview pixels are
//! mapped down to whatever the terminal can display.

use std::str::FromStr;

use image::Rgba;
use palette::Srgb;
use ratatui::style::Color;

use crate::error::{OverlayError, OverlayResult};
use crate::terminal_capabilities::ColorSupport;

/// Parse `#RRGGBB`, `RRGGBB` or `#RGB` into an opaque pixel color
pub fn parse_hex_color(text: &str) -> OverlayResult<Rgba<u8>> {
    let rgb = Srgb::<u8>::from_str(text.trim())
        .map_err(|e| OverlayError::invalid_parameter(format!("color '{}': {}", text, e)))?;
    Ok(Rgba([rgb.red, rgb.green, rgb.blue, 255]))
}

/// `#RRGGBB` form of a pixel color, alpha ignored
pub fn to_hex(color: Rgba<u8>) -> String {
    let rgb = Srgb::new(color.0[0], color.0[1], color.0[2]);
    format!("#{:02X}{:02X}{:02X}", rgb.red, rgb.green, rgb.blue)
}

/// Perceptual luminance (0.0 to 1.0), ITU-R BT.709 coefficients
pub fn rgb_to_luminance(r: u8, g: u8, b: u8) -> f32 {
    0.2126 * (r as f32 / 255.0) + 0.7152 * (g as f32 / 255.0) + 0.0722 * (b as f32 / 255.0)
}

/// Quantize to the ANSI 256-color palette
pub fn quantize_to_ansi256(rgb: Srgb<u8>) -> u8 {
    let (r, g, b) = (rgb.red, rgb.green, rgb.blue);

    // Near-gray colors use the 24-step grayscale ramp (232-255)
    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_diff = (r as i16 - avg as i16)
        .abs()
        .max((g as i16 - avg as i16).abs())
        .max((b as i16 - avg as i16).abs());
    if gray_diff < 10 {
        let gray_index = (avg as f32 / 255.0 * 23.0).round() as u8;
        return 232 + gray_index;
    }

    // 6x6x6 color cube (16-231)
    let level = |c: u8| (c as f32 / 255.0 * 5.0).round() as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

/// Quantize to the ANSI 16-color palette
pub fn quantize_to_ansi16(rgb: Srgb<u8>) -> u8 {
    let luminance = rgb_to_luminance(rgb.red, rgb.green, rgb.blue);
    let (r, g, b) = (
        rgb.red as f32 / 255.0,
        rgb.green as f32 / 255.0,
        rgb.blue as f32 / 255.0,
    );

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };

    if saturation < 0.2 {
        return if luminance > 0.7 {
            15
        } else if luminance > 0.3 {
            7
        } else {
            0
        };
    }

    let base = if r >= g && r >= b {
        if g > b {
            3 // yellow
        } else {
            1 // red
        }
    } else if g >= r && g >= b {
        if b > r {
            6 // cyan
        } else {
            2 // green
        }
    } else if r > g {
        5 // magenta
    } else {
        4 // blue
    };

    if luminance > 0.5 {
        base + 8
    } else {
        base
    }
}

/// Closest color the terminal can show; `None` when it shows no color at all
pub fn terminal_color(pixel: Rgba<u8>, support: ColorSupport) -> Option<Color> {
    let rgb = Srgb::new(pixel.0[0], pixel.0[1], pixel.0[2]);
    match support {
        ColorSupport::NoColor => None,
        ColorSupport::Color16 => Some(Color::Indexed(quantize_to_ansi16(rgb))),
        ColorSupport::Color256 => Some(Color::Indexed(quantize_to_ansi256(rgb))),
        ColorSupport::TrueColor => Some(Color::Rgb(rgb.red, rgb.green, rgb.blue)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FFFFFF").unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(parse_hex_color("00ff80").unwrap(), Rgba([0, 255, 128, 255]));
        assert!(parse_hex_color("#GGGGGG").is_err());
        assert!(parse_hex_color("white").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let color = Rgba([18, 52, 86, 255]);
        assert_eq!(to_hex(color), "#123456");
        assert_eq!(parse_hex_color(&to_hex(color)).unwrap(), color);
    }

    #[test]
    fn test_luminance_range() {
        assert!(rgb_to_luminance(0, 0, 0).abs() < 0.01);
        assert!((rgb_to_luminance(255, 255, 255) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_ansi256_grayscale_and_cube() {
        let gray = quantize_to_ansi256(Srgb::new(128, 128, 128));
        assert!(gray >= 232);
        let red = quantize_to_ansi256(Srgb::new(255, 0, 0));
        assert_eq!(red, 16 + 36 * 5);
    }

    #[test]
    fn test_terminal_color_by_support() {
        let red = Rgba([255, 0, 0, 255]);
        assert_eq!(terminal_color(red, ColorSupport::NoColor), None);
        assert_eq!(
            terminal_color(red, ColorSupport::TrueColor),
            Some(Color::Rgb(255, 0, 0))
        );
        assert_eq!(terminal_color(red, ColorSupport::Color16), Some(Color::Indexed(1)));
    }
}
