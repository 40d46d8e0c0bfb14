//! Download sinks
//!
//! Where a finished export is handed over to the user.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{OverlayError, OverlayResult};

/// Receives a finished file
pub trait DownloadSink: Send + Sync {
    /// Store `bytes` under `filename`; returns a description of where it went
    fn deliver(&self, filename: &str, bytes: &[u8]) -> OverlayResult<String>;
}

/// Writes downloads into a directory, replacing any earlier file of the same name
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> OverlayResult<String> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| OverlayError::delivery(format!("{}: {}", self.dir.display(), e)))?;

        // Each delivery gets its own temp file in the target directory; the
        // download only appears once `persist` renames it into place.
        let target = self.dir.join(filename);
        let mut staged = NamedTempFile::new_in(&self.dir)
            .map_err(|e| OverlayError::delivery(format!("{}: {}", self.dir.display(), e)))?;
        staged
            .write_all(bytes)
            .map_err(|e| OverlayError::delivery(format!("{}: {}", staged.path().display(), e)))?;
        staged
            .persist(&target)
            .map_err(|e| OverlayError::delivery(format!("{}: {}", target.display(), e.error)))?;

        debug!(path = %target.display(), bytes = bytes.len(), "download written");
        Ok(target.display().to_string())
    }
}

/// Keeps every delivery in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> OverlayResult<String> {
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.push((filename.to_string(), bytes.to_vec()));
        Ok(format!("memory:{}#{}", filename, files.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_sink_writes_and_replaces() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("downloads");
        let sink = DirectorySink::new(&dir);

        sink.deliver("fitness_activity.jpg", b"first").unwrap();
        let location = sink.deliver("fitness_activity.jpg", b"second").unwrap();

        assert!(location.ends_with("fitness_activity.jpg"));
        assert_eq!(std::fs::read(dir.join("fitness_activity.jpg")).unwrap(), b"second");
        let names: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["fitness_activity.jpg".to_string()]);
    }

    #[test]
    fn test_directory_sink_concurrent_deliveries() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = std::sync::Arc::new(DirectorySink::new(tmp.path()));

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let sink = sink.clone();
                std::thread::spawn(move || sink.deliver("fitness_activity.jpg", &[i; 4096]))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        // Whichever delivery landed last, the file is one delivery's bytes
        let bytes = std::fs::read(tmp.path().join("fitness_activity.jpg")).unwrap();
        assert_eq!(bytes.len(), 4096);
        assert!(bytes.iter().all(|b| *b == bytes[0]));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.deliver("a.jpg", b"1").unwrap();
        sink.deliver("b.jpg", b"22").unwrap();
        let files = sink.files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].0, "b.jpg");
        assert_eq!(files[1].1, b"22");
    }
}
