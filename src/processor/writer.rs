//! CSV writing module for result tables
//!
//! Serializes a [`ResultTable`] through polars, creating the output folder
//! on demand.

use crate::constants::OUTPUT_TIMESTAMP_FORMAT;
use crate::error::{MplError, Result};
use crate::table::ResultTable;

use polars::prelude::{CsvWriter, SerWriter};
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::{fs, task};
use tracing::debug;

/// CSV writer for result tables
#[derive(Debug, Clone)]
pub struct CsvTableWriter {
    output_path: PathBuf,
}

impl CsvTableWriter {
    /// Create a new CSV writer
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the table and return the number of data rows written
    ///
    /// The header is always written, so an empty table still yields the full
    /// column layout.
    pub async fn write(&self, table: &ResultTable) -> Result<usize> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut df = table.to_dataframe()?;
        let path = self.output_path.clone();

        let rows = task::spawn_blocking(move || -> Result<usize> {
            let mut file = File::create(&path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_datetime_format(Some(OUTPUT_TIMESTAMP_FORMAT.to_string()))
                .finish(&mut df)
                .map_err(|e| MplError::FileAccess {
                    path: path.clone(),
                    reason: format!("Failed to write CSV: {}", e),
                })?;
            Ok(df.height())
        })
        .await
        .map_err(|e| MplError::FileAccess {
            path: self.output_path.clone(),
            reason: format!("Failed to spawn CSV write task: {}", e),
        })??;

        debug!("Wrote {} rows to {}", rows, self.output_path.display());

        Ok(rows)
    }
}
