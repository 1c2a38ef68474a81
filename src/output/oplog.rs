//! Append-only operational log
//!
//! One line when a run starts and one line per newly stored listing. The file
//! is opened in append mode and never truncated.

use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%a %b %d %Y %H:%M:%S %z";

/// Handle to the operational log, owned by one run
#[derive(Debug)]
pub struct OperationLog {
    path: PathBuf,
    writer: LineWriter<File>,
}

impl OperationLog {
    /// Opens the log at `path` for appending, creating it if needed
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: LineWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records the start of a run
    pub fn record_run_start(&mut self, at: DateTime<Local>) -> io::Result<()> {
        writeln!(self.writer, "New scrape at: {}", at.format(TIMESTAMP_FORMAT))
    }

    /// Records a listing that was just stored
    pub fn record_new_entry(&mut self, url: &str, at: DateTime<Local>) -> io::Result<()> {
        writeln!(
            self.writer,
            "New entry added to database at {}. URL: {}",
            at.format(TIMESTAMP_FORMAT),
            url
        )
    }

    /// Flushes and closes the log
    pub fn close(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
