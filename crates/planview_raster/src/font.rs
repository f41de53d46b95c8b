//! Font loading for label text.

use std::path::Path;

use ab_glyph::FontArc;

use crate::RasterError;

/// Load a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> Result<FontArc, RasterError> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| RasterError::Font(format!("{}: {}", path.display(), e)))
}

/// Try a list of well-known system font locations.
///
/// Returns `None` when nothing usable is installed; callers fall back to
/// approximate metrics and skip glyph rasterization.
pub fn load_system_font() -> Option<FontArc> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arialbd.ttf",
    ];

    for candidate in CANDIDATES {
        match load_font(Path::new(candidate)) {
            Ok(font) => {
                log::debug!("Using system font {}", candidate);
                return Some(font);
            }
            Err(e) => log::trace!("Skipping font candidate: {}", e),
        }
    }

    log::warn!("No system font found; labels will be drawn without glyphs");
    None
}
