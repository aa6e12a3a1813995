//! Append-only JSON-lines audit writer
//!
//! Each entry is written as a single JSON line and flushed immediately. The
//! logger writes to any `io::Write` sink: a file, stderr, or an in-memory
//! buffer in tests.

use std::io::{BufRead, Write};

use crate::error::{StoreError, StoreResult};

use super::entry::AuditEntry;

/// Writes audit entries to a line-delimited JSON sink
pub struct AuditLogger<W: Write> {
    writer: W,
}

impl<W: Write> AuditLogger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Log an audit entry as one JSON line and flush
    pub fn log(&mut self, entry: &AuditEntry) -> StoreResult<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| StoreError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        writeln!(self.writer, "{}", json)
            .map_err(|e| StoreError::Io(format!("Failed to write audit entry: {}", e)))?;

        self.writer
            .flush()
            .map_err(|e| StoreError::Io(format!("Failed to flush audit log: {}", e)))
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

/// Read all audit entries from a JSON-lines source, oldest first
pub fn read_entries<R: BufRead>(reader: R) -> StoreResult<Vec<AuditEntry>> {
    let mut entries = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            StoreError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
            StoreError::Json(format!(
                "Failed to parse audit entry at line {}: {}",
                line_num + 1,
                e
            ))
        })?;

        entries.push(entry);
    }

    Ok(entries)
}

/// Read the most recent `count` entries
pub fn read_recent<R: BufRead>(reader: R, count: usize) -> StoreResult<Vec<AuditEntry>> {
    let mut entries = read_entries(reader)?;
    let start = entries.len().saturating_sub(count);
    Ok(entries.split_off(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CellId;
    use serde_json::json;
    use std::io;

    fn entry(month: i32) -> AuditEntry {
        AuditEntry::new(
            CellId::FilterMonth,
            json!(-1),
            json!(month),
            Some(format!("-1 -> {}", month)),
        )
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_log_and_read() {
        let mut logger = AuditLogger::new(Vec::new());
        logger.log(&entry(3)).unwrap();

        let entries = read_entries(logger.get_ref().as_slice()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].cell, CellId::FilterMonth);
        assert_eq!(entries[0].after, json!(3));
    }

    #[test]
    fn test_read_recent() {
        let mut logger = AuditLogger::new(Vec::new());
        for month in 1..=10 {
            logger.log(&entry(month)).unwrap();
        }

        let recent = read_recent(logger.get_ref().as_slice(), 3).unwrap();
        let months: Vec<_> = recent.iter().map(|e| e.after.clone()).collect();
        assert_eq!(months, vec![json!(8), json!(9), json!(10)]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut logger = AuditLogger::new(Vec::new());
        logger.log(&entry(1)).unwrap();
        let mut buffer = logger.get_ref().clone();
        buffer.extend_from_slice(b"\n   \n");

        assert_eq!(read_entries(buffer.as_slice()).unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_line_reports_position() {
        let err = read_entries("{}\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_write_failure() {
        let mut logger = AuditLogger::new(FailingWriter);
        let err = logger.log(&entry(1)).unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
    }
}
