//! Local JSON export of finished traces.
//!
//! Every run writes its own timestamped file, so exports from
//! repeated runs of the same pipeline sit next to each other instead
//! of overwriting.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use traceboard_core::TraceData;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write trace file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode trace: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct JsonFileStorage {
    output_dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the trace as pretty-printed JSON and return the path.
    /// The file name carries the trace id and a UTC timestamp:
    /// `trace_{id}_{YYYYMMDD_HHMMSS}.json`.
    pub fn save_trace(&self, trace: &TraceData) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| StorageError::CreateDir {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let file_name = format!("trace_{}_{timestamp}.json", trace.trace_id);
        let path = self.output_dir.join(file_name);

        let body = serde_json::to_string_pretty(trace)?;
        fs::write(&path, body).map_err(|e| StorageError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::TraceRecorder;
    use serde_json::json;

    #[test]
    fn test_save_trace_writes_parseable_json() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("traces"));

        let mut trail = TraceRecorder::start("export demo");
        {
            let mut step = trail.step("search", "api_call");
            step.log_output(json!({ "count": 2 }));
        }
        trail.complete(json!({ "ok": true }));

        let path = storage.save_trace(&trail.export()).unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with(&format!("trace_{}_", trail.trace_id())));
        assert!(file_name.ends_with(".json"));

        let raw = fs::read_to_string(&path).unwrap();
        let parsed: TraceData = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.trace_id, trail.trace_id());
        assert_eq!(parsed.steps.len(), 1);
        assert_eq!(parsed.final_outcome, Some(json!({ "ok": true })));
    }

    #[test]
    fn test_save_trace_creates_nested_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = JsonFileStorage::new(&nested);

        let trail = TraceRecorder::start("nested");
        storage.save_trace(&trail.export()).unwrap();
        assert!(nested.is_dir());
    }
}
