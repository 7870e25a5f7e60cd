//! Size-bounded rotating file sink.
//!
//! Semantics: once the active file would reach `max_bytes`, it is renamed to
//! `<path>.1`, existing backups shift up by one, the oldest beyond
//! `backup_count` is deleted, and a fresh file is opened. Total retained
//! bytes stay within `max_bytes * (backup_count + 1)`.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use super::registry::FILE_DATE_FORMAT;
use super::{Level, Record};
use crate::Result;

/// Plain-text file line. Never colored (see `colored.rs`: color is applied
/// to private copies of the console fields only).
pub fn format_file_line(record: &Record<'_>) -> String {
    let ts = record.timestamp.format(FILE_DATE_FORMAT);
    let mut line = format!(
        "[{ts}] [{:<8}] {}: {}",
        record.level.as_str(),
        record.logger,
        record.message
    );
    if let Some(detail) = record.detail {
        line.push('\n');
        line.push_str(detail);
    }
    line
}

struct WriterState {
    file: File,
    size: u64,
}

/// A rotating log file shared by interleaved writers.
///
/// Writes and rotation run under one mutex per sink, so two concurrent log
/// calls can never corrupt the file or double-rotate. Nothing is held across
/// an await point; emission is fire-and-forget.
pub struct RotatingFileSink {
    path: PathBuf,
    max_bytes: u64,
    backup_count: u32,
    level: Level,
    state: Mutex<WriterState>,
}

impl RotatingFileSink {
    /// Open (or create) the active file in append mode.
    ///
    /// Failure here is a configuration error the caller must treat as fatal:
    /// durable logs are a requirement, not best-effort.
    pub fn open(
        path: impl Into<PathBuf>,
        max_bytes: u64,
        backup_count: u32,
        level: Level,
    ) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            backup_count,
            level,
            state: Mutex::new(WriterState { file, size }),
        })
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Append one record, rotating first if it would push the active file
    /// past `max_bytes`. Write errors are swallowed; a log call must never
    /// take the process down.
    pub fn write_record(&self, record: &Record<'_>) {
        let mut line = format_file_line(record);
        line.push('\n');

        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let incoming = line.len() as u64;
        if self.max_bytes > 0 && state.size > 0 && state.size + incoming >= self.max_bytes {
            if self.do_rotate(&mut state).is_err() {
                return;
            }
        }
        if state.file.write_all(line.as_bytes()).is_ok() {
            state.size += incoming;
        }
    }

    fn do_rotate(&self, state: &mut WriterState) -> io::Result<()> {
        state.file.flush()?;

        if self.backup_count > 0 {
            let oldest = backup_path(&self.path, self.backup_count);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for i in (1..self.backup_count).rev() {
                let src = backup_path(&self.path, i);
                if src.exists() {
                    fs::rename(&src, backup_path(&self.path, i + 1))?;
                }
            }
            fs::rename(&self.path, backup_path(&self.path, 1))?;
            state.file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
        } else {
            // No backups kept: restart the active file in place.
            state.file = File::create(&self.path)?;
        }
        state.size = 0;
        Ok(())
    }
}

fn backup_path(path: &Path, n: u32) -> PathBuf {
    PathBuf::from(format!("{}.{n}", path.display()))
}
