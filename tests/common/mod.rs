//! Helpers shared by the integration tests.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use progline::{Config, ScreenWriter};

/// In-memory sink that can be inspected while a `ScreenWriter` owns a clone.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A config drawing plain (`◅ ▻` delimited, no spinner) bars into `capture`.
pub fn plain_config(capture: &Capture, width: usize) -> Config {
    Config::default()
        .with_screen(ScreenWriter::new(capture.clone()))
        .with_colors(false)
        .with_spinner(false)
        .with_width(width)
}
