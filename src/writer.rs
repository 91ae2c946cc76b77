use std::{
    io::{self, Write},
    sync::Arc,
};

use parking_lot::{Mutex, MutexGuard};

use crate::raster::{CLEAR_EOL, SPINNER_CHARS};

/// Expected max length of a progress bar line, used for the initial frame
/// buffer capacity. Includes escape sequences and multi-byte glyphs.
pub const EXPECTED_MAX_LENGTH: usize = 256;

/// Anything a [`ScreenWriter`] can own as its physical output.
pub trait Out: Write + Send {}
impl<T: Write + Send> Out for T {}

pub(crate) struct Screen {
    out: Box<dyn Out>,
    /// Frame being assembled, reused across redraws.
    pub(crate) buf: String,
    /// Spinner phase, shared by every bar drawing here.
    count: usize,
    /// The last physical write was a status line that plain output must erase first.
    pub(crate) need_erase: bool,
    /// Escape mode of the bar that drew last.
    pub(crate) no_ansi: bool,
}

impl Screen {
    /// Next spinner glyph; the phase advances on every call.
    pub(crate) fn next_spinner(&mut self) -> &'static str {
        let glyph = SPINNER_CHARS[self.count];
        self.count = (self.count + 1) % SPINNER_CHARS.len();
        glyph
    }

    /// Writes the assembled frame in one piece and marks the line as needing erase.
    pub(crate) fn write_frame(&mut self) -> io::Result<()> {
        let res = self
            .out
            .write_all(self.buf.as_bytes())
            .and_then(|()| self.out.flush());
        self.buf.clear();
        self.need_erase = true;
        res
    }

    /// Raw write, bypassing the erase logic. Used for cursor movement.
    pub(crate) fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes).and_then(|()| self.out.flush())
    }

    fn erase_status(&mut self) -> io::Result<()> {
        if !self.need_erase {
            return Ok(());
        }
        self.need_erase = false;
        if self.no_ansi {
            // A bare carriage return is all we can do without escapes.
            self.out.write_all(b"\r")
        } else {
            self.out.write_all(b"\r")?;
            self.out.write_all(CLEAR_EOL.as_bytes())
        }
    }

    pub(crate) fn write_plain(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.erase_status()?;
        self.out.write(buf)
    }

    pub(crate) fn write_plain_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.erase_status()?;
        self.write_raw(buf)
    }

    pub(crate) fn end_line(&mut self) -> io::Result<()> {
        self.need_erase = false;
        self.write_raw(b"\n")
    }
}

/// The shared, lock-guarded owner of one physical output stream.
///
/// Every bar and multi-bar drawing to the same display region must share a
/// single `ScreenWriter` (it is a cheap handle, clone it). Writing to it
/// through [`io::Write`] first erases a progress line left on the current
/// row, so plain output never ends up glued to a stale bar.
///
/// Output written here works best when each write ends with a `\n`.
#[derive(Clone)]
pub struct ScreenWriter {
    inner: Arc<Mutex<Screen>>,
}

impl ScreenWriter {
    pub fn new(out: impl Out + 'static) -> Self {
        ScreenWriter {
            inner: Arc::new(Mutex::new(Screen {
                out: Box::new(out),
                buf: String::with_capacity(EXPECTED_MAX_LENGTH),
                count: 0,
                need_erase: false,
                no_ansi: false,
            })),
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Standalone spinner for when neither a total nor a percentage is known.
    pub fn spin(&self) {
        let res = {
            let mut screen = self.lock();
            let glyph = screen.next_spinner();
            let res = screen
                .write_raw(b"\r")
                .and_then(|()| screen.write_raw(glyph.as_bytes()));
            screen.need_erase = true;
            res
        };
        trace_dropped(res);
    }

    /// Whether both handles own the same physical output.
    pub fn same_screen(&self, other: &ScreenWriter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Screen> {
        self.inner.lock()
    }
}

impl Write for ScreenWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        (&*self).write_all(buf)
    }

    fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        (&*self).write_fmt(args)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}

impl Write for &ScreenWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write_plain(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock().write_plain_all(buf)
    }

    /// Formats first, so that a whole `writeln!` lands in one locked write.
    fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        let text = std::fmt::format(args);
        self.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().out.flush()
    }
}

impl std::fmt::Debug for ScreenWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenWriter").finish_non_exhaustive()
    }
}

#[cfg(feature = "tracing-subscriber")]
impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for ScreenWriter {
    type Writer = ScreenWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Progress output is fire and forget: a failed write must never abort the
/// transfer it decorates. Call only once the screen lock is released, a
/// subscriber may be writing through the same screen.
pub(crate) fn trace_dropped(res: io::Result<()>) {
    if let Err(err) = res {
        tracing::trace!(error = %err, "progress output write failed");
    }
}
