//! # Error Channel
//!
//! The single destination for every non-fatal failure of a run. Entries are
//! written one per line, either to stderr or to a file that is truncated when
//! the channel is opened.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::sink::{LogEntry, LogLevel, LoggerSink};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::Result;

enum Destination {
    Stderr,
    File {
        path: PathBuf,
        writer: Option<BufWriter<File>>,
    },
}

/// Line-oriented [`LoggerSink`] backed by stderr or a file
pub struct ErrorChannel {
    destination: Mutex<Destination>,
    reported: AtomicUsize,
}

impl ErrorChannel {
    /// Open the channel, truncating `path` when one is given
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::file(path),
            None => Ok(Self::stderr()),
        }
    }

    pub fn stderr() -> Self {
        Self {
            destination: Mutex::new(Destination::Stderr),
            reported: AtomicUsize::new(0),
        }
    }

    pub fn file(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            destination: Mutex::new(Destination::File {
                path: path.to_path_buf(),
                writer: Some(BufWriter::new(file)),
            }),
            reported: AtomicUsize::new(0),
        })
    }

    /// Number of entries recorded so far
    pub fn reported(&self) -> usize {
        self.reported.load(Ordering::SeqCst)
    }

    /// Flush and release the underlying file
    ///
    /// Safe to call more than once. Entries logged after closing a file
    /// channel fall back to stderr.
    pub fn close(&self) -> Result<()> {
        let mut destination = self.lock()?;
        match &mut *destination {
            Destination::Stderr => io::stderr().flush()?,
            Destination::File { writer, .. } => {
                if let Some(mut w) = writer.take() {
                    w.flush()?;
                }
            }
        }
        Ok(())
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, Destination>> {
        self.destination
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "error channel lock poisoned"))
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut destination = self.lock()?;
        match &mut *destination {
            Destination::File {
                writer: Some(w), ..
            } => {
                writeln!(w, "{}", line)?;
                w.flush()
            }
            Destination::File { path, writer: None } => {
                let mut err = io::stderr().lock();
                writeln!(err, "{} (channel {} closed)", line, path.display())
            }
            Destination::Stderr => {
                let mut err = io::stderr().lock();
                writeln!(err, "{}", line)
            }
        }
    }
}

#[async_trait]
impl LoggerSink for ErrorChannel {
    async fn log(&self, entry: LogEntry) -> BridgeResult<()> {
        if entry.level < self.min_level() {
            return Ok(());
        }
        self.write_line(&entry.to_line()).map_err(BridgeError::Io)?;
        self.reported.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn flush(&self) -> BridgeResult<()> {
        let mut destination = self.lock().map_err(BridgeError::Io)?;
        match &mut *destination {
            Destination::File {
                writer: Some(w), ..
            } => w.flush().map_err(BridgeError::Io),
            _ => io::stderr().flush().map_err(BridgeError::Io),
        }
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Warn
    }
}

impl Drop for ErrorChannel {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_file() -> PathBuf {
        std::env::temp_dir().join(format!("error-channel-{}.log", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_file_channel_writes_one_line_per_entry() {
        let path = scratch_file();
        let channel = ErrorChannel::open(Some(&path)).unwrap();

        channel
            .log(LogEntry::error("sync", "Failed to download item").with_field("item_id", "a1"))
            .await
            .unwrap();
        channel
            .log(LogEntry::warn("sync", "Folder not found").with_field("folder", "Sketches"))
            .await
            .unwrap();
        channel.close().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("item_id=a1"));
        assert!(lines[1].contains("folder=Sketches"));
        assert_eq!(channel.reported(), 2);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_file_channel_truncates_existing_file() {
        let path = scratch_file();
        std::fs::write(&path, "stale line\n").unwrap();

        let channel = ErrorChannel::open(Some(&path)).unwrap();
        channel.close().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_entries_below_warn_are_ignored() {
        let path = scratch_file();
        let channel = ErrorChannel::open(Some(&path)).unwrap();

        channel
            .log(LogEntry::new(LogLevel::Info, "sync", "progress"))
            .await
            .unwrap();
        channel.close().unwrap();

        assert_eq!(channel.reported(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_close_is_idempotent() {
        let channel = ErrorChannel::stderr();
        channel.close().unwrap();
        channel.close().unwrap();
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join(format!("missing-{}", Uuid::new_v4()))
            .join("errors.log");
        assert!(ErrorChannel::open(Some(&path)).is_err());
    }
}
