//! Stateless bar and spinner glyphs.
//!
//! A bar of `width` cells has `8 * width` distinct levels: each cell can be
//! empty, full, or filled by one of the seven fractional block glyphs.

/// Width of the bar in characters when `0` is requested.
pub const DEFAULT_WIDTH: usize = 40;
/// Blank (unfilled) cell.
pub const SPACE: &str = " ";
/// Fully filled cell.
pub const FULL: &str = "█";
/// Green foreground on grey background.
pub const COLOR: &str = "\x1b[32;47m";
/// SGR reset.
pub const RESET: &str = "\x1b[0m";
/// Erase from the cursor to the end of the screen.
pub const CLEAR_AFTER: &str = "\x1b[J";
/// Erase from the cursor to the end of the line.
pub const CLEAR_EOL: &str = "\x1b[K";
/// Start marker used instead of [`COLOR`] when colors or escapes are off.
pub const PLAIN_START: &str = "◅";
/// End marker used instead of [`RESET`] when colors or escapes are off.
pub const PLAIN_END: &str = "▻";
/// Spinner glyph shown once the progress is complete.
pub const DONE_SPINNER: &str = "✓ ";

/// 1/8th of a full block up to 7/8ths, indexed by the remainder.
pub const FRACTIONAL_BLOCKS: [&str; 8] = ["", "▏", "▎", "▍", "▌", "▋", "▊", "▉"];

/// Spinner animation, shared by every bar of a [`ScreenWriter`](crate::ScreenWriter).
pub const SPINNER_CHARS: [&str; 8] = ["⣾ ", "⣷ ", "⣯ ", "⣟ ", "⡿ ", "⢿ ", "⣻ ", "⣽ "];

/// Approximate completion check.
///
/// Byte counters accumulate floating point error, so anything above
/// `99.999` counts as done.
pub fn is_done(percent: f64) -> bool {
    percent > 99.999
}

/// Cell counts of a rendered bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cells {
    pub full: usize,
    /// Index into [`FRACTIONAL_BLOCKS`], `0` when there is no partial cell.
    pub remainder: usize,
    pub spaces: usize,
}

impl Cells {
    /// Splits `width` cells for `percent`, or `None` when `percent` is outside `[0, 100]`.
    pub fn compute(percent: f64, width: usize) -> Option<Cells> {
        if !(0.0..=100.0).contains(&percent) {
            return None;
        }
        let width = effective_width(width);
        let steps = (8.0 * width as f64 * percent / 100.0).round() as usize;
        let full = steps / 8;
        let remainder = steps % 8;
        let spaces = width - full - usize::from(remainder > 0);
        Some(Cells {
            full,
            remainder,
            spaces,
        })
    }
}

pub(crate) fn effective_width(width: usize) -> usize {
    if width == 0 {
        DEFAULT_WIDTH
    } else {
        width
    }
}

/// Renders the bar segment for `percent`.
///
/// Returns an empty string when `percent` is outside `[0, 100]` (unknown
/// progress); callers then show only the spinner and extra text.
pub fn render_bar(percent: f64, width: usize, use_colors: bool) -> String {
    let mut out = String::new();
    push_bar(&mut out, percent, width, use_colors);
    out
}

/// The ` 12.5%` text following the bar, empty for out of range input.
pub fn percent_text(percent: f64) -> String {
    if (0.0..=100.0).contains(&percent) {
        format!(" {percent:.1}%")
    } else {
        String::new()
    }
}

pub(crate) fn push_bar(out: &mut String, percent: f64, width: usize, use_colors: bool) {
    let Some(cells) = Cells::compute(percent, width) else {
        return;
    };
    let (start, end) = if use_colors {
        (COLOR, RESET)
    } else {
        (PLAIN_START, PLAIN_END)
    };
    out.push_str(start);
    for _ in 0..cells.full {
        out.push_str(FULL);
    }
    out.push_str(FRACTIONAL_BLOCKS[cells.remainder]);
    for _ in 0..cells.spaces {
        out.push_str(SPACE);
    }
    out.push_str(end);
}
