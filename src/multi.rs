use std::fmt::Write as _;

use crate::{
    raster::CLEAR_AFTER,
    writer::trace_dropped,
    Bar, ScreenWriter,
};

/// A group of bars drawn on consecutive screen rows, each redrawing its own
/// line independently of the others.
///
/// Bar `i` lives `i * (1 + extra_lines)` rows below the group's home row
/// (the first bar's line); the `extra_lines` rows above each bar are free
/// for [`Bar::write_above`]. The cursor rests on the home row between
/// redraws. Requires a terminal understanding ANSI cursor movement.
#[derive(Debug)]
pub struct MultiBar {
    screen: ScreenWriter,
    bars: Vec<Bar>,
    extra_lines: usize,
    no_ansi: bool,
}

impl MultiBar {
    /// Lays out `bars` (already created, for instance wrapped by auto
    /// progress readers) and reserves their screen rows.
    ///
    /// # Panics
    ///
    /// If `bars` is empty, or if the bars do not share one [`ScreenWriter`].
    pub fn new(extra_lines: usize, bars: Vec<Bar>) -> Self {
        assert!(!bars.is_empty(), "no bars to multi-bar");
        let screen = bars[0].writer();
        assert!(
            bars.iter().all(|b| b.screen().same_screen(&screen)),
            "multi-bar bars must share one screen writer"
        );
        let no_ansi = bars[0].no_ansi();
        let stride = 1 + extra_lines;
        let n = bars.len();
        let res = {
            let mut s = screen.lock();
            for (i, bar) in bars.iter().enumerate() {
                bar.state().lock().index = stride * i;
            }
            if no_ansi {
                Ok(())
            } else {
                // Clear below, make room for all the bars, then back up to the first one.
                let mut out = format!("\r{CLEAR_AFTER}");
                out.push_str(&"\n".repeat(n * stride - 1));
                push_up(&mut out, (n - 1) * stride);
                s.need_erase = false;
                s.write_raw(out.as_bytes())
            }
        };
        trace_dropped(res);
        tracing::debug!(bars = n, extra_lines, "multi-bar laid out");
        MultiBar {
            screen,
            bars,
            extra_lines,
            no_ansi,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn extra_lines(&self) -> usize {
        self.extra_lines
    }

    /// Appends `bar` below the existing ones.
    ///
    /// Rows for the new bar are reserved right away: the cursor goes down to
    /// the current last bar, newlines scroll in room for one more bar slot,
    /// and the cursor returns to the home row. Bars already in the group keep
    /// their offsets.
    ///
    /// # Panics
    ///
    /// If `bar` draws to a different [`ScreenWriter`] than the group.
    pub fn add(&mut self, bar: Bar) {
        assert!(
            bar.screen().same_screen(&self.screen),
            "multi-bar bars must share one screen writer"
        );
        let stride = 1 + self.extra_lines;
        let last = (self.bars.len() - 1) * stride;
        let index = self.bars.len() * stride;
        let res = {
            let mut s = self.screen.lock();
            bar.state().lock().index = index;
            if self.no_ansi {
                Ok(())
            } else {
                let mut out = String::from("\r");
                if last > 0 {
                    let _ = write!(out, "\x1b[{last}B");
                }
                out.push_str(&"\n".repeat(stride));
                push_up(&mut out, index);
                s.need_erase = false;
                s.write_raw(out.as_bytes())
            }
        };
        trace_dropped(res);
        tracing::debug!(index, bars = self.bars.len() + 1, "bar added to multi-bar");
        self.bars.push(bar);
    }

    /// Re-pads every prefix to the widest one plus a space, so that all
    /// spinners and bars start on the same column. Useful after [`add`](Self::add).
    pub fn prefixes_align(&self) {
        let _screen = self.screen.lock();
        let trimmed: Vec<String> = self
            .bars
            .iter()
            .map(|b| b.state().lock().prefix.trim_end().to_string())
            .collect();
        let padded = align(&trimmed);
        for (bar, prefix) in self.bars.iter().zip(padded) {
            bar.state().lock().prefix = prefix;
        }
    }

    /// Moves the cursor below the last bar so that regular output can resume.
    pub fn end(&self) {
        let res = {
            let mut s = self.screen.lock();
            let last = self.bars[self.bars.len() - 1].state().lock().index;
            let mut out = String::from("\r");
            if last > 0 && !self.no_ansi {
                let _ = write!(out, "\x1b[{last}B");
            }
            out.push('\n');
            s.need_erase = false;
            s.write_raw(out.as_bytes())
        };
        trace_dropped(res);
    }
}

fn push_up(out: &mut String, n: usize) {
    if n > 0 {
        let _ = write!(out, "\x1b[{n}A");
    }
}

#[cfg(feature = "unicode")]
fn text_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Pads each prefix to the longest plus one space.
pub(crate) fn align<S: AsRef<str>>(prefixes: &[S]) -> Vec<String> {
    let max = prefixes
        .iter()
        .map(|p| text_width(p.as_ref()))
        .max()
        .unwrap_or(0)
        + 1;
    prefixes
        .iter()
        .map(|p| {
            let p = p.as_ref();
            format!("{p}{}", " ".repeat(max - text_width(p)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{test_util::Capture, Config};

    fn config(capture: &Capture, extra_lines: usize) -> Config {
        Config::default()
            .with_screen(ScreenWriter::new(capture.clone()))
            .with_extra_lines(extra_lines)
            .with_update_interval(Duration::ZERO)
            .with_colors(false)
            .with_spinner(false)
            .with_width(2)
    }

    #[test]
    fn offsets_follow_extra_lines() {
        let capture = Capture::default();
        let mbar = config(&capture, 1).new_multi_bar_prefixes(&["b1", "longest prefix", "short", "b4"]);
        let offsets: Vec<usize> = mbar.bars().iter().map(Bar::index).collect();
        assert_eq!(offsets, [0, 2, 4, 6]);
        // 4 bars * 2 rows - 1 newlines, then back up to the first bar.
        assert_eq!(capture.contents(), format!("\r\x1b[J{}\x1b[6A", "\n".repeat(7)));
    }

    #[test]
    fn prefixes_are_aligned() {
        let capture = Capture::default();
        let mbar = config(&capture, 0).new_multi_bar_prefixes(&["a", "abc", ""]);
        let prefixes: Vec<String> = mbar.bars().iter().map(Bar::prefix).collect();
        assert_eq!(prefixes, ["a   ", "abc ", "    "]);
    }

    #[test]
    fn single_bar_reserves_nothing() {
        let capture = Capture::default();
        let _mbar = config(&capture, 0).new_multi_bar_prefixes(&["only"]);
        assert_eq!(capture.contents(), "\r\x1b[J");
    }

    #[test]
    fn frames_move_to_their_row_and_back() {
        let capture = Capture::default();
        let mbar = config(&capture, 1).new_multi_bar_prefixes(&["x", "y"]);
        capture.clear();
        mbar.bars()[1].progress(100.0);
        assert_eq!(capture.contents(), "\r\x1b[2By ◅██▻ 100.0%\x1b[2A");
        capture.clear();
        mbar.bars()[0].progress(0.0);
        assert_eq!(capture.contents(), "\rx ◅  ▻ 0.0%");
    }

    #[test]
    fn write_above_targets_the_row_above() {
        let capture = Capture::default();
        let mbar = config(&capture, 1).new_multi_bar_prefixes(&["a", "b", "c"]);
        capture.clear();
        mbar.bars()[0].write_above("zero");
        mbar.bars()[1].write_above("one");
        mbar.bars()[2].write_above("two");
        assert_eq!(
            capture.contents(),
            "\r\x1b[1Azero\n\r\x1b[1Bone\n\x1b[2A\r\x1b[3Btwo\n\x1b[4A"
        );
    }

    #[test]
    fn add_appends_below_and_reserves_rows() {
        let capture = Capture::default();
        let cfg = config(&capture, 1);
        let mut mbar = cfg.new_multi_bar_prefixes(&["first", "second"]);
        capture.clear();
        let extra = cfg.clone().with_prefix("late").new_bar();
        mbar.add(extra.clone());
        assert_eq!(extra.index(), 4);
        assert_eq!(capture.contents(), "\r\x1b[2B\n\n\x1b[4A");
        mbar.prefixes_align();
        let prefixes: Vec<String> = mbar.bars().iter().map(Bar::prefix).collect();
        assert_eq!(prefixes, ["first  ", "second ", "late   "]);
        let offsets: Vec<usize> = mbar.bars().iter().map(Bar::index).collect();
        assert_eq!(offsets, [0, 2, 4]);
    }

    #[test]
    fn end_moves_below_the_last_bar() {
        let capture = Capture::default();
        let mbar = config(&capture, 0).new_multi_bar_prefixes(&["a", "b", "c"]);
        capture.clear();
        mbar.end();
        assert_eq!(capture.contents(), "\r\x1b[2B\n");
    }

    #[test]
    fn no_ansi_group_uses_plain_lines() {
        let capture = Capture::default();
        let cfg = config(&capture, 1).with_no_ansi(true);
        let mut mbar = cfg.new_multi_bar_prefixes(&["a", "bb"]);
        assert_eq!(capture.contents(), "");
        mbar.add(cfg.clone().with_prefix("c").new_bar());
        assert_eq!(mbar.bars()[2].index(), 4);
        assert_eq!(capture.contents(), "");

        mbar.bars()[1].progress(50.0);
        mbar.bars()[1].write_above("note");
        mbar.end();
        assert_eq!(capture.contents(), "\rbb ◅█ ▻ 50.0%\rnote\n\r\n");
    }

    #[test]
    #[should_panic(expected = "no bars")]
    fn empty_group_panics() {
        let capture = Capture::default();
        let _ = config(&capture, 0).new_multi_bar(Vec::new());
    }

    #[test]
    #[should_panic(expected = "share one screen")]
    fn foreign_bar_is_rejected() {
        let capture = Capture::default();
        let mut mbar = config(&capture, 0).new_multi_bar_prefixes(&["a"]);
        let other = Config::default()
            .with_screen(ScreenWriter::new(Vec::new()))
            .new_bar();
        mbar.add(other);
    }
}
