// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Tracing setup: stdout plus a per-run log file, with the OS username redacted

use chrono::Local;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

pub const REDACTED: &str = "[USERNAME_REDACTED]";

/// Current OS user name, if it can be determined
pub fn current_username() -> Option<String> {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.trim().is_empty())
}

/// Writer that replaces the username in everything written through it
pub struct RedactingWriter<W> {
    inner: W,
    username: Option<Arc<str>>,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, username: Option<Arc<str>>) -> Self {
        Self { inner, username }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.username {
            Some(name) => {
                let text = String::from_utf8_lossy(buf).replace(name.as_ref(), REDACTED);
                self.inner.write_all(text.as_bytes())?;
            }
            None => self.inner.write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Shared handle to the log file
#[derive(Clone)]
struct LogFile(Arc<File>);

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self.0).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self.0).flush()
    }
}

/// Log file name for a run started now, e.g. `Fri_Oct_17_09-30-00_2026-moodpack.txt`
pub fn log_file_name(name: &str) -> String {
    let stamp = Local::now()
        .format("%a %b %e %H:%M:%S %Y")
        .to_string()
        .replace(' ', "_")
        .replace(':', "-");
    format!("{}-{}.txt", stamp, name)
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `level`. Returns the path of the log file, or `None`
/// when the log directory could not be created and logging is stdout-only.
pub fn init_logging(logs_dir: &Path, name: &str, level: &str) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let username: Option<Arc<str>> = current_username().map(Arc::from);

    let stdout_name = username.clone();
    let stdout = move || RedactingWriter::new(io::stdout(), stdout_name.clone());

    let log_path = logs_dir.join(log_file_name(name));
    let file = std::fs::create_dir_all(logs_dir)
        .and_then(|_| File::create(&log_path))
        .map(|f| LogFile(Arc::new(f)));

    match file {
        Ok(file) => {
            let file_writer = move || RedactingWriter::new(file.clone(), username.clone());
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(stdout.and(file_writer))
                .init();
            Some(log_path)
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(stdout)
                .init();
            tracing::warn!("Could not open log file {:?}: {}", log_path, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_username() {
        let mut out = Vec::new();
        {
            let mut writer = RedactingWriter::new(&mut out, Some(Arc::from("alice")));
            writer.write_all(b"INFO: loading /home/alice/packs").unwrap();
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "INFO: loading /home/[USERNAME_REDACTED]/packs"
        );
    }

    #[test]
    fn test_passthrough_without_username() {
        let mut out = Vec::new();
        RedactingWriter::new(&mut out, None).write_all(b"plain").unwrap();
        assert_eq!(out, b"plain");
    }

    #[test]
    fn test_log_file_name_shape() {
        let name = log_file_name("moodpack");
        assert!(name.ends_with("-moodpack.txt"));
        assert!(!name.contains(' '));
        assert!(!name.contains(':'));
    }
}
