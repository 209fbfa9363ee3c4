use std::path::{Path, PathBuf};

pub const BASE_SIZE: u32 = 80;
pub const MIN_SIZE: u32 = 30;
/// Usable width for a 1080px-wide output, margins included.
pub const LAYOUT_BUDGET: f64 = 950.0;
/// Average glyph advance as a fraction of the font size, measured for a bold
/// sans at display sizes.
const AVG_GLYPH_RATIO: f64 = 0.6;

/// Two-character marker callers use for explicit line breaks in caption text.
pub const LINE_BREAK_MARKER: &str = "\\n";

pub const CANDIDATE_FONTS: [&str; 3] = [
    "./static/Roboto-Bold.ttf",
    "./fonts/Roboto-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
];

/// Estimate a pixel font size for `text`. A positive override is returned
/// unchanged; size is then the caller's responsibility.
///
/// The estimate is pure and deterministic: width is approximated as
/// `chars * 0.6 * size`, and when that exceeds the layout budget the size is
/// rescaled with a safety margin and clamped to a readable floor. Multi-line
/// captions size by their longest line. The result never increases when the
/// text gets longer.
pub fn estimate(text: &str, override_px: Option<u32>) -> u32 {
    if let Some(px) = override_px {
        if px > 0 {
            return px;
        }
    }

    let chars = longest_line_chars(text);
    if chars == 0 {
        return BASE_SIZE;
    }

    let estimated_width = chars as f64 * AVG_GLYPH_RATIO * BASE_SIZE as f64;
    if estimated_width <= LAYOUT_BUDGET {
        return BASE_SIZE;
    }

    let rescaled = ((LAYOUT_BUDGET * 0.9) / (chars as f64 * AVG_GLYPH_RATIO)).floor() as u32;
    rescaled.max(MIN_SIZE)
}

fn longest_line_chars(text: &str) -> usize {
    text.split(LINE_BREAK_MARKER)
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
}

/// A font file chosen for drawtext. `fallback` is set when no candidate
/// existed and the first candidate path was kept anyway; callers warn or
/// reject on it.
#[derive(Debug, Clone)]
pub struct ResolvedFont {
    pub path: PathBuf,
    pub fallback: bool,
}

/// Pick the font file: an explicit path wins when it exists, otherwise the
/// first existing candidate, otherwise the first candidate with the fallback
/// flag set.
pub fn resolve_font(explicit: Option<&Path>) -> ResolvedFont {
    if let Some(path) = explicit {
        return ResolvedFont {
            path: path.to_path_buf(),
            fallback: !path.is_file(),
        };
    }

    for candidate in CANDIDATE_FONTS {
        let path = Path::new(candidate);
        if path.is_file() {
            return ResolvedFont {
                path: path.to_path_buf(),
                fallback: false,
            };
        }
    }

    ResolvedFont {
        path: PathBuf::from(CANDIDATE_FONTS[0]),
        fallback: true,
    }
}
