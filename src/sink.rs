//! Diagnostic sinks.
//!
//! Task handlers trace their extraction state into a session's sink each time they pose a
//! follow-up question. The sink is opened once when the session starts and only appended to
//! afterwards.

use crate::error::{Error, Result};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Open (truncating) the diagnostic log at `path` and write a session header.
pub fn open_diagnostic_log(path: impl AsRef<Path>) -> Result<BufWriter<File>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let file = OpenOptions::new().create(true).write(true).truncate(true).open(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "# session started {}", Local::now().format("%Y-%m-%d %H:%M:%S")).map_err(|e| Error::io(path, e))?;
    writer.flush().map_err(|e| Error::io(path, e))?;

    tracing::debug!(path = %path.display(), "diagnostic log opened");
    Ok(writer)
}

/// In-memory sink whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for MemorySink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().map_err(|_| io::Error::other("memory sink poisoned"))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn memory_sink_clones_share_a_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        write!(writer, "slot=date").unwrap();
        assert_eq!(sink.contents(), "slot=date");
    }

    #[test]
    fn diagnostic_log_is_truncated_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log").join("extract_attr.log");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale\n").unwrap();

        let mut writer = open_diagnostic_log(&path).unwrap();
        writeln!(writer, "flight date=None").unwrap();
        writer.flush().unwrap();

        let mut text = String::new();
        File::open(&path).unwrap().read_to_string(&mut text).unwrap();
        assert!(text.starts_with("# session started "), "{text}");
        assert!(text.ends_with("flight date=None\n"), "{text}");
        assert!(!text.contains("stale"));
    }
}
