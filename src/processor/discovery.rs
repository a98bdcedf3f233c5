//! File discovery module for capture directories
//!
//! Lists the capture files of a flat observation directory, e.g. one month
//! of Mini-MPL scans.

use crate::error::{MplError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File discovery component for capture directories
#[derive(Debug)]
pub struct FileDiscovery {
    input_dir: PathBuf,
    extension: String,
    entry_count: usize,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(input_dir: PathBuf, extension: impl Into<String>) -> Self {
        Self {
            input_dir,
            extension: extension.into(),
            entry_count: 0,
        }
    }

    /// Number of directory entries seen by the last discovery, of any kind
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Discover capture files directly inside the input directory
    ///
    /// ```text
    /// 2024-10/
    ///   202410010000.nc
    ///   202410010015.nc
    ///   notes.txt        (ignored)
    ///   backup/          (ignored)
    /// ```
    ///
    /// Files are returned in path order.
    pub async fn discover_capture_files(&mut self) -> Result<Vec<PathBuf>> {
        if !fs::try_exists(&self.input_dir).await.unwrap_or(false) {
            return Err(MplError::DirectoryNotFound {
                path: self.input_dir.clone(),
            });
        }

        debug!("Searching for capture files in: {}", self.input_dir.display());

        let mut files = Vec::new();
        let mut entries = 0;
        let mut dir = fs::read_dir(&self.input_dir).await?;

        while let Some(entry) = dir.next_entry().await? {
            entries += 1;
            let path = entry.path();
            if !has_extension(&path, &self.extension) {
                continue;
            }
            // follows symlinks, unlike DirEntry::file_type
            if fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
                files.push(path);
            }
        }

        files.sort();
        self.entry_count = entries;
        debug!(
            "Found {} capture files among {} entries",
            files.len(),
            self.entry_count
        );

        Ok(files)
    }
}

/// Check if a path carries the given extension (case sensitive)
fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to create a capture directory with a few distractors
    fn create_capture_dir(temp_dir: &TempDir) -> PathBuf {
        let dir = temp_dir.path().join("2024-10");
        fs::create_dir_all(&dir).unwrap();

        fs::write(dir.join("202410051200.nc"), "scan").unwrap();
        fs::write(dir.join("202410050900.nc"), "scan").unwrap();
        fs::write(dir.join("202410051500.nc"), "scan").unwrap();

        // Not captures
        fs::write(dir.join("notes.txt"), "notes").unwrap();
        fs::write(dir.join("202410051800.NC"), "scan").unwrap();
        fs::create_dir_all(dir.join("archive.nc")).unwrap();
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("202410052100.nc"), "scan").unwrap();

        dir
    }

    #[tokio::test]
    async fn test_discover_capture_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = create_capture_dir(&temp_dir);

        let mut discovery = FileDiscovery::new(dir, "nc");
        let files = discovery.discover_capture_files().await.unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["202410050900.nc", "202410051200.nc", "202410051500.nc"]
        );
        assert_eq!(discovery.entry_count(), 7);
    }

    #[tokio::test]
    async fn test_discover_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let mut discovery = FileDiscovery::new(temp_dir.path().to_path_buf(), "nc");
        let files = discovery.discover_capture_files().await.unwrap();

        assert!(files.is_empty());
        assert_eq!(discovery.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_discover_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let mut discovery = FileDiscovery::new(missing.clone(), "nc");
        match discovery.discover_capture_files().await {
            Err(MplError::DirectoryNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected DirectoryNotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("scan.nc"), "nc"));
        assert!(has_extension(Path::new("/data/2024-10/scan.nc"), "nc"));
        assert!(!has_extension(Path::new("scan.nc4"), "nc"));
        assert!(!has_extension(Path::new("scan"), "nc"));
        assert!(!has_extension(Path::new("scan.NC"), "nc")); // Case sensitive
    }
}
