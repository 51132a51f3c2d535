//! Font registration for chart text.
//!
//! Plotters' `ab_glyph` backend only knows fonts that were registered by
//! name. One TrueType face is registered as `sans-serif` the first time a
//! chart is drawn. Without one, charts are drawn without text.

use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Family name every chart element asks for.
pub const FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Register a font once per process and report whether text can be drawn.
///
/// `preferred` is tried before the system locations. Only the first call's
/// preference matters.
pub fn ensure_font(preferred: Option<&Path>) -> bool {
    REGISTERED
        .get_or_init(|| {
            let found = preferred
                .map(Path::to_path_buf)
                .into_iter()
                .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
                .find(|path| try_register(path));
            match &found {
                Some(path) => log::debug!("chart font: {}", path.display()),
                None => log::warn!("no usable TrueType font found; charts will be drawn without text"),
            }
            found
        })
        .is_some()
}

fn try_register(path: &Path) -> bool {
    let Ok(bytes) = std::fs::read(path) else {
        return false;
    };
    // Plotters keeps registered font data for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match register_font(FAMILY, FontStyle::Normal, bytes) {
        Ok(()) => true,
        Err(_) => {
            log::debug!("{} is not a usable font", path.display());
            false
        }
    }
}
