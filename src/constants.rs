//! Application constants for the MPL processor
//!
//! Field names of the Mini-MPL capture files, value bounds, defaults and
//! the output column layout.

// =============================================================================
// Capture Files
// =============================================================================

/// Extension of capture files produced by the lidar
pub const CAPTURE_FILE_EXTENSION: &str = "nc";

/// Variable names read from each capture file
pub mod fields {
    pub const DATE: &str = "date_yyyyMMdd";
    pub const TIME: &str = "time_hhmmss";
    pub const AOD: &str = "aod";
    pub const PARTICLE_TYPE: &str = "particle_type";
    pub const RANGE: &str = "range_nrb";
    pub const PBLS: &str = "pbls";
    pub const DETECTOR_TEMPERATURE: &str = "detector_temperature";
    pub const CLOUDS: &str = "clouds";
}

// =============================================================================
// Value Normalization
// =============================================================================

/// Lower bound of the valid AOD range
pub const AOD_MIN: f64 = 0.0;

/// Upper bound of the valid AOD range
pub const AOD_MAX: f64 = 2.0;

/// Number of cloud layers reported per capture
pub const CLOUD_LAYER_COUNT: usize = 3;

/// Values per cloud layer: base, peak, top
pub const CLOUD_LAYER_VALUES: usize = 3;

// =============================================================================
// Time Handling
// =============================================================================

/// Hours subtracted from UTC to obtain station local time (no DST)
pub const DEFAULT_UTC_OFFSET_HOURS: i64 = 3;

/// Pattern of the joined date and time fields
pub const CAPTURE_TIMESTAMP_FORMAT: &str = "%Y%m%d %H%M%S";

/// Timestamp format used in the CSV output
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Output
// =============================================================================

/// Default CSV output location
pub const DEFAULT_OUTPUT_PATH: &str = "outputs/output.csv";

/// Rows shown in the CLI preview
pub const PREVIEW_ROWS: usize = 5;

/// Output column names, in table order
pub mod columns {
    pub const TIMESTAMP: &str = "data_hora";
    pub const TEMPERATURE: &str = "temperatura";
    pub const AOD: &str = "aod";
    pub const PBL: &str = "clp";

    pub const CLEAN_AEROSOL: &str = "clean_aerossol";
    pub const CLEAN_AEROSOL_H_MEAN: &str = "clean_aero_h_mean";
    pub const CLEAN_AEROSOL_H_STD: &str = "clean_aero_h_std";
    pub const POLLUTED_AEROSOL: &str = "polluted_aerossol";
    pub const POLLUTED_AEROSOL_H_MEAN: &str = "pol_aero_h_mean";
    pub const POLLUTED_AEROSOL_H_STD: &str = "pol_aerossol_h_std";
    pub const WATER_CLOUD: &str = "water_cloud";
    pub const WATER_CLOUD_H_MEAN: &str = "wcloud_h_mean";
    pub const WATER_CLOUD_H_STD: &str = "wcloud_h_std";
    pub const MIXED_CLOUD: &str = "mixed_clouds";
    pub const MIXED_CLOUD_H_MEAN: &str = "mcloud_h_mean";
    pub const MIXED_CLOUD_H_STD: &str = "mcloud_h_std";
    pub const MOLECULAR: &str = "molecular";
    pub const MOLECULAR_H_MEAN: &str = "mol_h_mean";
    pub const MOLECULAR_H_STD: &str = "mol_h_std";
    pub const RAIN_DUST: &str = "rain_dust";
    pub const ICE_DUST_ASH: &str = "ice_dust_ash";
    pub const ICE_DUST_ASH_H_MEAN: &str = "ice_h_mean";
    pub const ICE_DUST_ASH_H_STD: &str = "ice_h_std";

    /// Cloud layer columns as (base, peak, top) per layer
    pub const CLOUD_LAYERS: [[&str; 3]; 3] = [
        ["cloud_base1", "cloud_peak1", "cloud_top1"],
        ["cloud_base2", "cloud_peak2", "cloud_top2"],
        ["cloud_base3", "cloud_peak3", "cloud_top3"],
    ];

    /// Columns printed by the CLI preview
    pub const PREVIEW: [&str; 3] = [TIMESTAMP, AOD, PBL];
}
