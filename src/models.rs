//! Core data structures for capture processing.
//!
//! Defines particle classes, the in-memory capture, derived statistics,
//! the aggregated output row and processing statistics.

use crate::error::FailureKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Particle classification assigned per range bin by the lidar retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleClass {
    WaterCloud,
    MixedCloud,
    IceDustAsh,
    RainDust,
    Molecular,
    CleanAerosol,
    PollutedAerosol,
    Undefined,
}

impl ParticleClass {
    /// All classes in code order
    pub const ALL: [ParticleClass; 8] = [
        ParticleClass::WaterCloud,
        ParticleClass::MixedCloud,
        ParticleClass::IceDustAsh,
        ParticleClass::RainDust,
        ParticleClass::Molecular,
        ParticleClass::CleanAerosol,
        ParticleClass::PollutedAerosol,
        ParticleClass::Undefined,
    ];

    /// Map a raw lidar code; anything outside 0..=7 is `Undefined`
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ParticleClass::WaterCloud,
            1 => ParticleClass::MixedCloud,
            2 => ParticleClass::IceDustAsh,
            3 => ParticleClass::RainDust,
            4 => ParticleClass::Molecular,
            5 => ParticleClass::CleanAerosol,
            6 => ParticleClass::PollutedAerosol,
            _ => ParticleClass::Undefined,
        }
    }

    /// Map a code read as a float; NaN, infinities and fractional values
    /// match no class and become `Undefined`
    pub fn from_raw(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 {
            Self::from_code(value as i64)
        } else {
            ParticleClass::Undefined
        }
    }

    /// Lidar code of this class
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Contents of one capture file, owned by the step that processes it
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub date_yyyymmdd: String,
    pub time_hhmmss: String,
    pub particle_type: Vec<ParticleClass>,
    pub range_nrb: Vec<f64>,
    pub aod: f64,
    pub pbls: f64,
    pub detector_temperature: f64,
    /// Cloud layers as rows of (base, peak, top)
    pub clouds: Vec<Vec<f64>>,
}

/// Altitude statistics for one particle class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl HeightStats {
    pub const EMPTY: HeightStats = HeightStats {
        mean: f64::NAN,
        std_dev: f64::NAN,
    };

    pub fn is_empty(&self) -> bool {
        self.mean.is_nan() && self.std_dev.is_nan()
    }
}

/// Number of range bins per particle class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticleCounts([u32; 8]);

impl ParticleCounts {
    pub fn new(counts: [u32; 8]) -> Self {
        Self(counts)
    }

    pub fn get(&self, class: ParticleClass) -> u32 {
        self.0[class.code() as usize]
    }

    pub(crate) fn increment(&mut self, class: ParticleClass) {
        self.0[class.code() as usize] += 1;
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&c| c as u64).sum()
    }
}

/// One detected cloud layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudLayer {
    pub base: f64,
    pub peak: f64,
    pub top: f64,
}

impl CloudLayer {
    pub const EMPTY: CloudLayer = CloudLayer {
        base: f64::NAN,
        peak: f64::NAN,
        top: f64::NAN,
    };
}

/// Derived values for one successfully processed capture
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    /// Local time of acquisition
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub aod: f64,
    pub pbl: f64,
    pub counts: ParticleCounts,
    pub clean_aerosol: HeightStats,
    pub polluted_aerosol: HeightStats,
    pub water_cloud: HeightStats,
    pub mixed_cloud: HeightStats,
    pub molecular: HeightStats,
    pub ice_dust_ash: HeightStats,
    pub cloud_layers: [CloudLayer; 3],
}

/// A file that was skipped, with the reason
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub reason: String,
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    /// Entries of any kind directly inside the input directory
    pub directory_entries: usize,
    pub files_discovered: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_rows: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
    pub failures: Vec<FileFailure>,
}
