//! Terminal progress bars that stay intact while other threads print.
//!
//! A [`ScreenWriter`] owns the output stream (usually stderr). Every bar
//! drawing to it, and every plain write made through it, happens under one
//! lock, so a log line never lands in the middle of a bar frame and a bar
//! frame never overwrites a log line: the status line is erased first.
//!
//! ```no_run
//! use std::io::Write;
//!
//! let cfg = progline::Config::default().with_prefix("work ");
//! let bar = cfg.new_bar();
//! let mut out = bar.writer();
//! for i in 0..=100 {
//!     if i % 25 == 0 {
//!         writeln!(out, "reached {i}").unwrap();
//!     }
//!     bar.progress(f64::from(i));
//! }
//! bar.end();
//! ```
//!
//! Several bars can share a region of the screen with [`MultiBar`], and
//! [`AutoProgressReader`] / [`AutoProgressWriter`] drive a bar from the
//! bytes going through any reader or writer.
//!
//! Drawing relies on a small ANSI subset (cursor up/down, erase line, erase
//! below, colors). [`Config::with_no_ansi`] switches to an escape-free
//! rendering for pipes and dumb terminals; this is never auto-detected.

use std::{sync::Arc, time::Duration};

mod auto;
mod bar;
mod error;
mod format;
mod multi;
pub mod raster;
mod writer;

pub use auto::{AutoProgress, AutoProgressReader, AutoProgressWriter, Closable};
pub use bar::{Bar, ExtraFn};
pub use error::{Error, Result};
pub use format::{human_bytes, human_duration};
pub use multi::MultiBar;
pub use raster::{is_done, render_bar, DEFAULT_WIDTH};
pub use writer::{Out, ScreenWriter, EXPECTED_MAX_LENGTH};

/// Default max refresh rate, so that progress updates don't slow down transfers.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(100);

const ENV_NO_COLOR: &str = "NO_COLOR";
const ENV_NO_ANSI: &str = "PROGLINE_NO_ANSI";
const ENV_WIDTH: &str = "PROGLINE_WIDTH";
const ENV_UPDATE_INTERVAL: &str = "PROGLINE_UPDATE_INTERVAL_MS";

/// Settings shared by the bars created from it.
///
/// Bars created from the same `Config` (or from clones of it) draw to the
/// same [`ScreenWriter`].
#[derive(Clone)]
pub struct Config {
    pub(crate) width: usize,
    pub(crate) use_colors: bool,
    pub(crate) spinner: bool,
    pub(crate) no_ansi: bool,
    pub(crate) prefix: String,
    pub(crate) update_interval: Duration,
    pub(crate) extra_lines: usize,
    pub(crate) extra: Option<ExtraFn>,
    pub(crate) screen: ScreenWriter,
}

impl Default for Config {
    /// Default width, colors and spinner on, 100ms update interval, writing
    /// to a new stderr [`ScreenWriter`].
    fn default() -> Self {
        Config {
            width: DEFAULT_WIDTH,
            use_colors: true,
            spinner: true,
            no_ansi: false,
            prefix: String::new(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            extra_lines: 0,
            extra: None,
            screen: ScreenWriter::stderr(),
        }
    }
}

impl Config {
    /// Defaults overridden by the environment: `NO_COLOR`, `PROGLINE_NO_ANSI`,
    /// `PROGLINE_WIDTH` and `PROGLINE_UPDATE_INTERVAL_MS`.
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env(|var| std::env::var(var).ok())
    }

    fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if lookup(ENV_NO_COLOR).is_some_and(|v| !v.is_empty()) {
            self.use_colors = false;
        }
        if let Some(value) = lookup(ENV_NO_ANSI) {
            self.no_ansi = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "" | "0" | "false" | "no" => false,
                _ => return Err(invalid(ENV_NO_ANSI, value)),
            };
        }
        if let Some(value) = lookup(ENV_WIDTH) {
            self.width = value
                .trim()
                .parse()
                .map_err(|_| invalid(ENV_WIDTH, value.clone()))?;
        }
        if let Some(value) = lookup(ENV_UPDATE_INTERVAL) {
            let ms: u64 = value
                .trim()
                .parse()
                .map_err(|_| invalid(ENV_UPDATE_INTERVAL, value.clone()))?;
            self.update_interval = Duration::from_millis(ms);
        }
        Ok(self)
    }

    /// Width of the bar in characters, `0` for [`DEFAULT_WIDTH`].
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Show a spinner in front of the bar.
    pub fn with_spinner(mut self, spinner: bool) -> Self {
        self.spinner = spinner;
        self
    }

    /// Avoid all escape sequences (non terminal output, tests). Implies no colors.
    pub fn with_no_ansi(mut self, no_ansi: bool) -> Self {
        self.no_ansi = no_ansi;
        self
    }

    /// Text shown before the spinner and bar, see also [`Bar::update_prefix`].
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Minimum time between two redraws, `Duration::ZERO` to draw every update.
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Lines left between bars of a [`MultiBar`], for [`Bar::write_above`].
    pub fn with_extra_lines(mut self, extra_lines: usize) -> Self {
        self.extra_lines = extra_lines;
        self
    }

    /// Text appended after the percentage.
    pub fn with_extra(mut self, extra: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        self.extra = Some(Arc::new(extra));
        self
    }

    pub fn with_screen(mut self, screen: ScreenWriter) -> Self {
        self.screen = screen;
        self
    }

    pub fn screen(&self) -> &ScreenWriter {
        &self.screen
    }

    pub fn new_bar(&self) -> Bar {
        Bar::new(self)
    }

    /// Sets up a multi-bar from already created bars, for instance bars
    /// driven by [`AutoProgressReader`]s.
    ///
    /// # Panics
    ///
    /// If `bars` is empty.
    pub fn new_multi_bar(&self, bars: Vec<Bar>) -> MultiBar {
        MultiBar::new(self.extra_lines, bars)
    }

    /// Creates one bar per prefix, prefixes padded to the same width.
    ///
    /// # Panics
    ///
    /// If `prefixes` is empty.
    pub fn new_multi_bar_prefixes<S: AsRef<str>>(&self, prefixes: &[S]) -> MultiBar {
        let bars = multi::align(prefixes)
            .into_iter()
            .map(|prefix| self.clone().with_prefix(prefix).new_bar())
            .collect();
        MultiBar::new(self.extra_lines, bars)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("width", &self.width)
            .field("use_colors", &self.use_colors)
            .field("spinner", &self.spinner)
            .field("no_ansi", &self.no_ansi)
            .field("prefix", &self.prefix)
            .field("update_interval", &self.update_interval)
            .field("extra_lines", &self.extra_lines)
            .field("extra", &self.extra.is_some())
            .finish()
    }
}

fn invalid(var: &'static str, value: String) -> Error {
    Error::InvalidEnv { var, value }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.width, DEFAULT_WIDTH);
        assert!(cfg.use_colors);
        assert!(cfg.spinner);
        assert!(!cfg.no_ansi);
        assert_eq!(cfg.update_interval, DEFAULT_UPDATE_INTERVAL);
    }

    #[test]
    fn env_overrides() {
        let cfg = Config::default()
            .merge_env(env(&[
                ("NO_COLOR", "1"),
                ("PROGLINE_NO_ANSI", "yes"),
                ("PROGLINE_WIDTH", " 20 "),
                ("PROGLINE_UPDATE_INTERVAL_MS", "0"),
            ]))
            .unwrap();
        assert!(!cfg.use_colors);
        assert!(cfg.no_ansi);
        assert_eq!(cfg.width, 20);
        assert!(cfg.update_interval.is_zero());
    }

    #[test]
    fn empty_no_color_is_ignored() {
        let cfg = Config::default().merge_env(env(&[("NO_COLOR", "")])).unwrap();
        assert!(cfg.use_colors);
    }

    #[test]
    fn invalid_env_values() {
        let err = Config::default()
            .merge_env(env(&[("PROGLINE_WIDTH", "wide")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEnv { var: "PROGLINE_WIDTH", .. }));
        assert_eq!(err.to_string(), "invalid value \"wide\" for PROGLINE_WIDTH");

        let err = Config::default()
            .merge_env(env(&[("PROGLINE_NO_ANSI", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEnv { var: "PROGLINE_NO_ANSI", .. }));
    }

    #[test]
    fn bars_share_the_config_screen() {
        let cfg = Config::default().with_screen(ScreenWriter::new(Vec::new()));
        let a = cfg.new_bar();
        let b = cfg.clone().with_prefix("b").new_bar();
        assert!(a.writer().same_screen(&b.writer()));
        assert!(a.writer().same_screen(cfg.screen()));
    }
}
