//! MPL Processor Library
//!
//! Converts a directory of Mini-MPL lidar captures (one NetCDF file per scan)
//! into a single time-ordered table of atmospheric composition.
//!
//! This library provides tools for:
//! - Reading captures through a pluggable [`ScanSource`] (NetCDF behind the
//!   `netcdf` feature)
//! - Per-class altitude statistics and particle class tallies
//! - AOD clamping and fixed-shape cloud layer extraction
//! - UTC to local time conversion with a fixed offset
//! - Per-file fault isolation: a bad capture is skipped, never half-written
//! - Writing the sorted table to CSV through polars

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod models;
pub mod processor;
pub mod source;
pub mod table;
pub mod timestamp;

// Re-export commonly used types
pub use config::{CloudLayerPolicy, MplConfig};
pub use error::{FailureKind, MplError, Result};
pub use models::{AggregatedRow, Capture, CloudLayer, HeightStats, ParticleClass, ParticleCounts};
pub use processor::{CaptureProcessor, build_row, writer::CsvTableWriter};
pub use source::ScanSource;
pub use table::ResultTable;
