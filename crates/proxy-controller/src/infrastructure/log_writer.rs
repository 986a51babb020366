//! Log writer for a terminal in raw mode.
//!
//! Raw mode turns off the terminal's `\n` to `\r\n` translation, so plain
//! log lines would each start where the previous one ended.  While raw mode
//! is on, [`RawModeWriter`] writes `\r\n` for every bare `\n`.

use std::io::{self, Write};

use crossterm::terminal;

/// Wraps a writer (usually stderr) for use with `tracing_subscriber`.
pub struct RawModeWriter<W> {
    inner: W,
    raw_mode: fn() -> bool,
}

impl RawModeWriter<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> RawModeWriter<W> {
    /// Translates line endings whenever the terminal is in raw mode.
    pub fn new(inner: W) -> Self {
        Self::with_mode(inner, terminal_in_raw_mode)
    }

    /// Uses `raw_mode` to decide whether to translate line endings.
    pub fn with_mode(inner: W, raw_mode: fn() -> bool) -> Self {
        Self { inner, raw_mode }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for RawModeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !(self.raw_mode)() {
            return self.inner.write(buf);
        }
        for line in buf.split_inclusive(|&b| b == b'\n') {
            match line.split_last() {
                Some((b'\n', body)) if body.last() != Some(&b'\r') => {
                    self.inner.write_all(body)?;
                    self.inner.write_all(b"\r\n")?;
                }
                _ => self.inner.write_all(line)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn terminal_in_raw_mode() -> bool {
    terminal::is_raw_mode_enabled().unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(raw: fn() -> bool, input: &[u8]) -> Vec<u8> {
        let mut writer = RawModeWriter::with_mode(Vec::new(), raw);
        writer.write_all(input).unwrap();
        writer.into_inner()
    }

    #[test]
    fn test_raw_mode_adds_carriage_returns() {
        // Arrange / Act
        let out = written(|| true, b"first line\nsecond line\n");

        // Assert
        assert_eq!(out, b"first line\r\nsecond line\r\n");
    }

    #[test]
    fn test_raw_mode_keeps_existing_crlf() {
        assert_eq!(written(|| true, b"done\r\n\n"), b"done\r\n\r\n");
    }

    #[test]
    fn test_cooked_mode_passes_bytes_through() {
        assert_eq!(written(|| false, b"a\nb\n"), b"a\nb\n");
    }

    #[test]
    fn test_write_reports_input_length() {
        let mut writer = RawModeWriter::with_mode(Vec::new(), || true);
        assert_eq!(writer.write(b"x\ny\n").unwrap(), 4);
    }
}
