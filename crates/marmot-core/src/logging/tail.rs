//! Reading back persisted logs for introspection (e.g. a `/logs` command).

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use crate::Result;

/// Read up to `max_bytes` from the end of a log file.
///
/// Truncation is strictly byte-based: the window's leading edge may split a
/// line or a multi-byte character (replaced lossily). Callers should render
/// an I/O failure here as "logs not available" rather than crashing.
pub fn read_log_tail(path: &Path, max_bytes: u64) -> Result<String> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let start = len.saturating_sub(max_bytes);
    file.seek(SeekFrom::Start(start))?;

    let mut buf = Vec::with_capacity((len - start) as usize);
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn tmp(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_nanos();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}"))
    }

    #[test]
    fn returns_whole_file_when_under_budget() {
        let path = tmp("tail-small");
        std::fs::write(&path, "line one\nline two\n").unwrap();
        let out = read_log_tail(&path, 4000).unwrap();
        assert_eq!(out, "line one\nline two\n");
    }

    #[test]
    fn truncates_from_the_end_by_bytes() {
        let path = tmp("tail-budget");
        std::fs::write(&path, "aaaaaaaaaa-THE-END").unwrap();
        let out = read_log_tail(&path, 8).unwrap();
        assert_eq!(out, "-THE-END");
    }

    #[test]
    fn split_multibyte_char_is_lossy_not_fatal() {
        let path = tmp("tail-utf8");
        // "é" is two bytes; a 3-byte window cuts it in half.
        std::fs::write(&path, "éok").unwrap();
        let out = read_log_tail(&path, 3).unwrap();
        assert!(out.ends_with("ok"));
        assert!(out.starts_with('\u{FFFD}'));
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = tmp("tail-missing");
        assert!(read_log_tail(&path, 100).is_err());
    }
}
