//! Font resolution and text rasterization
//!
//! Maps the five overlay font families onto font files found on the system
//! and wraps the loaded faces behind [`TextRasterizer`], the seam both
//! renderers measure and draw text through.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_text_mut;
use tracing::{debug, info};

use crate::error::{OverlayError, OverlayResult};
use crate::params::FontFamily;

/// How deep below each search directory font files are looked for
const MAX_SEARCH_DEPTH: usize = 5;

/// Measures and rasterizes a single font face
pub trait TextRasterizer: Send + Sync {
    /// Advance width of `text` at `px` pixels, kerning included
    fn advance_width(&self, text: &str, px: f32) -> f32;

    /// `(ascent, descent)` at `px` pixels; descent is zero or negative
    fn vertical_metrics(&self, px: f32) -> (f32, f32);

    /// Add the coverage of `text` into `mask`, with the line box's top-left
    /// corner at (`x`, `top`)
    fn draw_coverage(&self, mask: &mut GrayImage, text: &str, px: f32, x: f32, top: f32);

    /// Height of one line box
    fn line_box_height(&self, px: f32) -> f32 {
        let (ascent, descent) = self.vertical_metrics(px);
        ascent - descent
    }
}

/// Hands out a rasterizer for a font family
pub trait FontProvider: Send + Sync {
    fn rasterizer(&self, family: FontFamily) -> OverlayResult<Arc<dyn TextRasterizer>>;
}

/// A loaded outline font
pub struct FontFace {
    font: FontVec,
    path: PathBuf,
}

impl FontFace {
    pub fn load(path: &Path) -> OverlayResult<Self> {
        let data = std::fs::read(path)?;
        let font = FontVec::try_from_vec_and_index(data, 0).map_err(|e| {
            OverlayError::font_unavailable(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self {
            font,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextRasterizer for FontFace {
    fn advance_width(&self, text: &str, px: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(px));
        let mut width = 0.0;
        let mut prev = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    fn vertical_metrics(&self, px: f32) -> (f32, f32) {
        let scaled = self.font.as_scaled(PxScale::from(px));
        (scaled.ascent(), scaled.descent())
    }

    fn draw_coverage(&self, mask: &mut GrayImage, text: &str, px: f32, x: f32, top: f32) {
        draw_text_mut(
            mask,
            Luma([255u8]),
            x.round() as i32,
            top.round() as i32,
            PxScale::from(px),
            &self.font,
            text,
        );
    }
}

/// Candidate file names for a family, most faithful first.
///
/// The named font comes first, followed by metric-compatible substitutes
/// commonly installed on Linux.
pub fn candidate_files(family: FontFamily) -> &'static [&'static str] {
    match family {
        FontFamily::Arial => &[
            "arial.ttf",
            "arialmt.ttf",
            "liberationsans-regular.ttf",
            "arimo-regular.ttf",
            "dejavusans.ttf",
        ],
        FontFamily::Helvetica => &[
            "helvetica.ttf",
            "helvetica.ttc",
            "nimbussans-regular.otf",
            "liberationsans-regular.ttf",
            "dejavusans.ttf",
        ],
        FontFamily::TimesNewRoman => &[
            "times new roman.ttf",
            "times.ttf",
            "timesnewroman.ttf",
            "liberationserif-regular.ttf",
            "tinos-regular.ttf",
            "dejavuserif.ttf",
        ],
        FontFamily::Courier => &[
            "courier new.ttf",
            "cour.ttf",
            "couriernew.ttf",
            "liberationmono-regular.ttf",
            "cousine-regular.ttf",
            "dejavusansmono.ttf",
        ],
        FontFamily::Verdana => &[
            "verdana.ttf",
            "dejavusans.ttf",
            "liberationsans-regular.ttf",
        ],
    }
}

/// Platform font directories plus the user's own font folders
pub fn default_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if cfg!(target_os = "windows") {
        dirs.push(PathBuf::from(r"C:\Windows\Fonts"));
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
    } else {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
    }

    if let Some(base) = directories::BaseDirs::new() {
        dirs.push(base.home_dir().join(".fonts"));
        dirs.push(base.data_dir().join("fonts"));
        if cfg!(target_os = "macos") {
            dirs.push(base.home_dir().join("Library/Fonts"));
        }
    }

    dirs
}

/// Resolves families to font files and caches the loaded faces
pub struct FontLibrary {
    search_dirs: Vec<PathBuf>,
    overrides: HashMap<FontFamily, PathBuf>,
    index: OnceLock<HashMap<String, PathBuf>>,
    faces: Mutex<HashMap<FontFamily, Arc<FontFace>>>,
}

impl FontLibrary {
    pub fn new(search_dirs: Vec<PathBuf>, overrides: HashMap<FontFamily, PathBuf>) -> Self {
        Self {
            search_dirs,
            overrides,
            index: OnceLock::new(),
            faces: Mutex::new(HashMap::new()),
        }
    }

    /// Path the family would be loaded from
    pub fn resolve(&self, family: FontFamily) -> OverlayResult<PathBuf> {
        if let Some(path) = self.overrides.get(&family) {
            return Ok(path.clone());
        }

        let index = self.index.get_or_init(|| build_index(&self.search_dirs));
        candidate_files(family)
            .iter()
            .find_map(|name| index.get(*name).cloned())
            .ok_or_else(|| {
                OverlayError::font_unavailable(format!(
                    "no font file for '{}' in {} search directories",
                    family.key(),
                    self.search_dirs.len()
                ))
            })
    }

    /// Loaded face for a family, read from disk on first use
    pub fn face(&self, family: FontFamily) -> OverlayResult<Arc<FontFace>> {
        let mut faces = self.faces.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(face) = faces.get(&family) {
            return Ok(Arc::clone(face));
        }

        let path = self.resolve(family)?;
        let face = Arc::new(FontFace::load(&path)?);
        info!(family = family.key(), path = %path.display(), "loaded overlay font");
        faces.insert(family, Arc::clone(&face));
        Ok(face)
    }
}

impl FontProvider for FontLibrary {
    fn rasterizer(&self, family: FontFamily) -> OverlayResult<Arc<dyn TextRasterizer>> {
        let face: Arc<dyn TextRasterizer> = self.face(family)?;
        Ok(face)
    }
}

/// Map of lowercase file name to the first path carrying it
fn build_index(dirs: &[PathBuf]) -> HashMap<String, PathBuf> {
    let mut index = HashMap::new();
    for dir in dirs {
        collect_font_files(dir, 0, &mut index);
    }
    debug!(files = index.len(), "indexed font files");
    index
}

fn collect_font_files(dir: &Path, depth: usize, index: &mut HashMap<String, PathBuf>) {
    if depth > MAX_SEARCH_DEPTH {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_font_files(&path, depth + 1, index);
        } else if is_font_file(&path) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                index.entry(name.to_lowercase()).or_insert(path.clone());
            }
        }
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "ttf" | "otf" | "ttc"))
        .unwrap_or(false)
}
