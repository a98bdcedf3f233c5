//! Integration tests for the processor module
//!
//! Tests the complete pipeline over temporary capture directories, using an
//! in-memory source in place of NetCDF decoding.


use crate::error::{MplError, Result};
use crate::models::{Capture, ParticleClass};
use crate::source::ScanSource;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Source serving prepared captures keyed by file name
#[derive(Debug, Default)]
pub struct MockSource {
    captures: HashMap<String, Capture>,
    unreadable: Vec<String>,
    missing_field: HashMap<String, String>,
    loads: AtomicUsize,
}

impl MockSource {
    pub fn with_capture(mut self, file_name: &str, capture: Capture) -> Self {
        self.captures.insert(file_name.to_string(), capture);
        self
    }

    pub fn with_unreadable(mut self, file_name: &str) -> Self {
        self.unreadable.push(file_name.to_string());
        self
    }

    pub fn with_missing_field(mut self, file_name: &str, field: &str) -> Self {
        self.missing_field
            .insert(file_name.to_string(), field.to_string());
        self
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ScanSource for MockSource {
    fn load(&self, path: &Path) -> Result<Capture> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if self.unreadable.contains(&name) {
            return Err(MplError::FileAccess {
                path: path.to_path_buf(),
                reason: "NetCDF: Unknown file format".to_string(),
            });
        }
        if let Some(field) = self.missing_field.get(&name) {
            return Err(MplError::MissingField {
                path: path.to_path_buf(),
                field: field.clone(),
            });
        }
        self.captures
            .get(&name)
            .cloned()
            .ok_or_else(|| MplError::FileAccess {
                path: path.to_path_buf(),
                reason: "no such capture".to_string(),
            })
    }
}

/// A well-formed capture at the given UTC date and time
pub fn capture_at(date: &str, time: &str) -> Capture {
    let codes = [4, 4, 5, 5, 6, 0, 1, 2, 3, 7];
    Capture {
        date_yyyymmdd: date.to_string(),
        time_hhmmss: time.to_string(),
        particle_type: codes.iter().map(|&c| ParticleClass::from_code(c)).collect(),
        range_nrb: (1..=codes.len()).map(|i| i as f64 * 0.5).collect(),
        aod: 0.42,
        pbls: 1.35,
        detector_temperature: 23.5,
        clouds: vec![
            vec![3.0, 3.2, 3.5],
            vec![f64::NAN, f64::NAN, f64::NAN],
            vec![f64::NAN, f64::NAN, f64::NAN],
        ],
    }
}

/// Create empty capture files so discovery finds them
pub fn create_capture_dir(temp_dir: &TempDir, file_names: &[&str]) -> PathBuf {
    let dir = temp_dir.path().join("2024-10");
    fs::create_dir_all(&dir).unwrap();
    for name in file_names {
        fs::write(dir.join(name), b"").unwrap();
    }
    dir
}
