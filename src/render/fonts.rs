//! Registers the TrueType font used for the chart title and axis labels.

use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Family name every text style in the chart asks for.
pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: [&str; 7] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<bool> = OnceLock::new();

/// Registers `preferred`, or the first system font found, once per process.
/// Returns false when no font could be registered; text is then skipped.
pub fn ensure_font(preferred: Option<&Path>) -> bool {
    *REGISTERED.get_or_init(|| {
        let candidates = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

        for path in candidates {
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    if preferred == Some(path.as_path()) {
                        warn!(path = %path.display(), error = %e, "cannot read font");
                    }
                    continue;
                }
            };
            // plotters keeps registered font data for the life of the process.
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
                Ok(()) => {
                    debug!(path = %path.display(), "registered chart font");
                    return true;
                }
                Err(_) => warn!(path = %path.display(), "not a usable TrueType font"),
            }
        }

        warn!("no TrueType font found; pass --font to draw the title and axis labels");
        false
    })
}
