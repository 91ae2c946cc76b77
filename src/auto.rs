use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    time::{Duration, Instant},
};

use crate::{
    format::{format_duration, human_bytes, human_duration, round},
    raster::{is_done, CLEAR_EOL},
    Bar,
};

/// Streams that can be explicitly closed, surfacing errors a plain drop
/// would swallow.
///
/// The auto progress wrappers forward [`close`](Closable::close) to the
/// stream they wrap when it implements this trait. Wrappers around other
/// streams (`Stdin`, `Cursor`, ...) have no `close`: finalize them with
/// `end` or `into_inner`.
pub trait Closable {
    fn close(&mut self) -> io::Result<()>;
}

/// Flushes data and metadata to disk.
impl Closable for File {
    fn close(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

impl<W: Write> Closable for BufWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl<T: Closable + ?Sized> Closable for Box<T> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Byte counter driving a [`Bar`]: computes the percentage and the
/// transferred / elapsed / speed / remaining text.
#[derive(Debug)]
pub struct AutoProgress {
    bar: Bar,
    total: i64,
    current: i64,
    start: Instant,
    ended: bool,
}

impl AutoProgress {
    /// A negative or zero `total` means unknown: only the spinner and
    /// transfer counters are shown.
    pub fn new(bar: Bar, total: i64) -> Self {
        let mut progress = AutoProgress {
            bar,
            total,
            current: 0,
            start: Instant::now(),
            ended: false,
        };
        progress.update(0);
        progress
    }

    /// Records `n` more bytes and redraws (subject to the bar's rate limit).
    pub fn update(&mut self, n: usize) {
        if self.current == 0 {
            // Elapsed time starts with the first byte, not with the wrapper.
            self.start = Instant::now();
        }
        self.current = self
            .current
            .saturating_add(i64::try_from(n).unwrap_or(i64::MAX));
        if self.current > 0 || self.total > 0 {
            let percent = self.percent();
            self.bar
                .progress_with(percent, Some(&|p: f64| self.extra_text(p)));
        }
    }

    /// `-1` when the total is unknown.
    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            self.current as f64 * 100.0 / self.total as f64
        } else {
            -1.0
        }
    }

    pub fn current(&self) -> i64 {
        self.current
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn bar(&self) -> &Bar {
        &self.bar
    }

    /// Text shown after the bar for the current counters.
    pub fn extra_text(&self, percent: f64) -> String {
        if self.current == 0 {
            return format!(" {}/{}", self.current, self.total);
        }
        let elapsed = self.start.elapsed();
        let secs = elapsed.as_secs_f64();
        let speed = if secs > 0.0 {
            self.current as f64 / secs
        } else {
            0.0
        };
        if self.total <= 0 {
            return format!(
                " {}, {} elapsed, {}/s  ",
                human_bytes(self.current as f64),
                format_duration(round(elapsed, Duration::from_millis(1))),
                human_bytes(speed)
            );
        }
        if !is_done(percent) {
            let left = (self.total - self.current).max(0) as f64;
            let remaining = if speed > 0.0 {
                Duration::try_from_secs_f64(left / speed).unwrap_or(Duration::MAX)
            } else {
                Duration::ZERO
            };
            return format!(
                " {} out of {}, {} elapsed, {}/s, {} remaining  ",
                human_bytes(self.current as f64),
                human_bytes(self.total as f64),
                human_duration(elapsed),
                human_bytes(speed),
                human_duration(remaining)
            );
        }
        // Done: erase whatever a longer in-progress line left behind.
        let clear = if self.bar.no_ansi() {
            " ".repeat(40)
        } else {
            CLEAR_EOL.to_string()
        };
        format!(
            " {} in {}, {}/s{}",
            human_bytes(self.current as f64),
            human_duration(elapsed),
            human_bytes(speed),
            clear
        )
    }

    /// Flushes a skipped last update and ends the bar's line. Only the first
    /// call has an effect.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.bar.end_with(Some(&|p: f64| self.extra_text(p)));
    }
}

/// A reader updating a progress bar with every chunk read.
#[derive(Debug)]
pub struct AutoProgressReader<R> {
    progress: AutoProgress,
    inner: R,
}

impl<R: Read> AutoProgressReader<R> {
    /// Pass a non-positive `total` when the size is unknown.
    pub fn new(bar: Bar, inner: R, total: i64) -> Self {
        AutoProgressReader {
            progress: AutoProgress::new(bar, total),
            inner,
        }
    }
}

impl<R> AutoProgressReader<R> {
    pub fn progress(&self) -> &AutoProgress {
        &self.progress
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Ends the bar without closing the underlying reader.
    pub fn end(&mut self) {
        self.progress.end();
    }

    /// Ends the bar and gives back the underlying reader.
    pub fn into_inner(mut self) -> R {
        self.progress.end();
        self.inner
    }
}

impl<R: Read> Read for AutoProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.progress.update(n);
        }
        Ok(n)
    }
}

impl<R: Closable> Closable for AutoProgressReader<R> {
    fn close(&mut self) -> io::Result<()> {
        self.progress.end();
        self.inner.close()
    }
}

/// A writer updating a progress bar with every chunk written.
#[derive(Debug)]
pub struct AutoProgressWriter<W> {
    progress: AutoProgress,
    inner: W,
}

impl<W: Write> AutoProgressWriter<W> {
    /// Pass a non-positive `total` when the size is unknown.
    pub fn new(bar: Bar, inner: W, total: i64) -> Self {
        AutoProgressWriter {
            progress: AutoProgress::new(bar, total),
            inner,
        }
    }
}

impl<W> AutoProgressWriter<W> {
    pub fn progress(&self) -> &AutoProgress {
        &self.progress
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Ends the bar without closing the underlying writer.
    pub fn end(&mut self) {
        self.progress.end();
    }

    /// Ends the bar and gives back the underlying writer.
    pub fn into_inner(mut self) -> W {
        self.progress.end();
        self.inner
    }
}

impl<W: Write> Write for AutoProgressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.progress.update(n);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Closable> Closable for AutoProgressWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        self.progress.end();
        self.inner.close()
    }
}
