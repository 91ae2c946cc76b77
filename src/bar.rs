use std::{
    fmt::Write as _,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::{
    raster::{self, is_done, CLEAR_EOL, DONE_SPINNER},
    writer::{trace_dropped, Screen},
    Config, ScreenWriter,
};

/// Renders the text shown after the percentage, given that percentage.
pub type ExtraFn = Arc<dyn Fn(f64) -> String + Send + Sync>;

pub(crate) struct BarState {
    pub(crate) prefix: String,
    /// Row relative to the top bar of a multi-bar group.
    pub(crate) index: usize,
    last_update: Option<Instant>,
    /// Percentage of the most recent update dropped by the rate limit.
    skipped: Option<f64>,
}

pub(crate) struct BarInner {
    screen: ScreenWriter,
    width: usize,
    use_colors: bool,
    spinner: bool,
    no_ansi: bool,
    update_interval: Duration,
    extra: Option<ExtraFn>,
    // Only locked while holding the screen lock.
    state: Mutex<BarState>,
}

/// One progress indicator.
///
/// `Bar` is a cheap handle: clones refer to the same indicator and may be
/// moved to other threads. All drawing goes through the bar's
/// [`ScreenWriter`], which keeps redraws and other output from tearing.
#[derive(Clone)]
pub struct Bar {
    inner: Arc<BarInner>,
}

impl Bar {
    pub(crate) fn new(cfg: &Config) -> Self {
        Bar {
            inner: Arc::new(BarInner {
                screen: cfg.screen.clone(),
                width: raster::effective_width(cfg.width),
                use_colors: cfg.use_colors && !cfg.no_ansi,
                spinner: cfg.spinner,
                no_ansi: cfg.no_ansi,
                update_interval: cfg.update_interval,
                extra: cfg.extra.clone(),
                state: Mutex::new(BarState {
                    prefix: cfg.prefix.clone(),
                    index: 0,
                    last_update: None,
                    skipped: None,
                }),
            }),
        }
    }

    /// Shows `percent` (0-100) on the bar's line, overwriting the previous frame.
    ///
    /// Out of range values (e.g. `-1` for an unknown total) draw only the
    /// prefix, spinner and extra text. Updates arriving faster than the
    /// configured interval are skipped unless they complete the bar or
    /// something else was written since the last frame.
    pub fn progress(&self, percent: f64) {
        self.progress_with(percent, self.own_extra());
    }

    pub(crate) fn progress_with(&self, percent: f64, extra: Option<&dyn Fn(f64) -> String>) {
        let done = is_done(percent);
        let res = {
            let mut screen = self.inner.screen.lock();
            let mut state = self.inner.state.lock();
            let interval = self.inner.update_interval;
            let now = Instant::now();
            if !interval.is_zero() && !done && screen.need_erase {
                if let Some(last) = state.last_update {
                    if now.duration_since(last) < interval {
                        state.skipped = Some(percent);
                        return;
                    }
                }
            }
            state.last_update = Some(now);
            state.skipped = None;
            self.draw(&mut screen, &state, percent, done, extra)
        };
        trace_dropped(res);
    }

    fn draw(
        &self,
        screen: &mut Screen,
        state: &BarState,
        percent: f64,
        done: bool,
        extra: Option<&dyn Fn(f64) -> String>,
    ) -> io::Result<()> {
        let inner = &*self.inner;
        let mut buf = std::mem::take(&mut screen.buf);
        buf.clear();
        buf.push_str(&self.move_down(state.index));
        buf.push_str(&state.prefix);
        if inner.spinner {
            let glyph = screen.next_spinner();
            buf.push_str(if done { DONE_SPINNER } else { glyph });
        }
        raster::push_bar(&mut buf, percent, inner.width, inner.use_colors);
        buf.push_str(&raster::percent_text(percent));
        if let Some(extra) = extra {
            buf.push_str(&extra(percent));
        }
        buf.push_str(&self.move_up(state.index));
        screen.buf = buf;
        screen.no_ansi = inner.no_ansi;
        screen.write_frame()
    }

    /// Changes the prefix while the bar is running; visible at the next frame.
    pub fn update_prefix(&self, prefix: impl Into<String>) {
        let _screen = self.inner.screen.lock();
        self.inner.state.lock().prefix = prefix.into();
    }

    pub fn prefix(&self) -> String {
        let _screen = self.inner.screen.lock();
        self.inner.state.lock().prefix.clone()
    }

    /// Row of this bar below the top bar of its multi-bar group.
    pub fn index(&self) -> usize {
        let _screen = self.inner.screen.lock();
        self.inner.state.lock().index
    }

    /// Writes `msg` on the line right above the bar, for multi-bars with
    /// extra lines. The cursor returns to the group's home row.
    pub fn write_above(&self, msg: &str) {
        let res = {
            let mut screen = self.inner.screen.lock();
            let index = self.inner.state.lock().index;
            if self.inner.no_ansi {
                screen.write_plain_all(format!("{msg}\n").as_bytes())
            } else {
                let mut out = String::from("\r");
                if index > 0 {
                    if index > 1 {
                        let _ = write!(out, "\x1b[{}B", index - 1);
                    }
                    out.push_str(msg);
                    out.push('\n');
                    out.push_str(&self.move_up(index));
                } else {
                    out.push_str("\x1b[1A");
                    out.push_str(msg);
                    out.push('\n');
                }
                screen.write_raw(out.as_bytes())
            }
        };
        trace_dropped(res);
    }

    /// Moves the cursor up `n` lines and clears that line. Without escapes
    /// this just issues a newline.
    pub fn move_cursor_up(&self, n: usize) {
        let res = {
            let mut screen = self.inner.screen.lock();
            if self.inner.no_ansi {
                screen.write_raw(b"\n")
            } else {
                let mut out = String::new();
                if n > 0 {
                    let _ = write!(out, "\x1b[{n}A");
                }
                out.push('\r');
                out.push_str(CLEAR_EOL);
                screen.write_raw(out.as_bytes())
            }
        };
        trace_dropped(res);
    }

    /// Ends the bar: flushes an update skipped by the rate limit, then
    /// writes a newline so the next output starts on a fresh line.
    pub fn end(&self) {
        self.end_with(self.own_extra());
    }

    fn own_extra(&self) -> Option<&dyn Fn(f64) -> String> {
        match &self.inner.extra {
            Some(extra) => Some(&**extra),
            None => None,
        }
    }

    pub(crate) fn end_with(&self, extra: Option<&dyn Fn(f64) -> String>) {
        let res = {
            let mut screen = self.inner.screen.lock();
            let mut state = self.inner.state.lock();
            let skipped = state.skipped.take();
            let res = match skipped {
                Some(percent) => {
                    state.last_update = Some(Instant::now());
                    self.draw(&mut screen, &state, percent, is_done(percent), extra)
                }
                None => Ok(()),
            };
            res.and(screen.end_line())
        };
        trace_dropped(res);
    }

    /// The screen writer to use for output interleaved with this bar.
    pub fn writer(&self) -> ScreenWriter {
        self.inner.screen.clone()
    }

    pub fn no_ansi(&self) -> bool {
        self.inner.no_ansi
    }

    pub(crate) fn screen(&self) -> &ScreenWriter {
        &self.inner.screen
    }

    pub(crate) fn state(&self) -> &Mutex<BarState> {
        &self.inner.state
    }

    pub(crate) fn move_up(&self, index: usize) -> String {
        if index == 0 || self.inner.no_ansi {
            return String::new();
        }
        format!("\x1b[{index}A")
    }

    /// Also the carriage return for single bars.
    pub(crate) fn move_down(&self, index: usize) -> String {
        if index == 0 || self.inner.no_ansi {
            return "\r".to_string();
        }
        format!("\r\x1b[{index}B")
    }
}

impl std::fmt::Debug for Bar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bar")
            .field("width", &self.inner.width)
            .field("use_colors", &self.inner.use_colors)
            .field("spinner", &self.inner.spinner)
            .field("no_ansi", &self.inner.no_ansi)
            .field("update_interval", &self.inner.update_interval)
            .finish_non_exhaustive()
    }
}
