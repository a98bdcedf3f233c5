//! Per-capture derivations.
//!
//! Height statistics per particle class, class tallies, AOD clamping and
//! cloud layer extraction. All functions are pure over a borrowed capture.

use crate::config::CloudLayerPolicy;
use crate::constants::{AOD_MAX, AOD_MIN, CLOUD_LAYER_COUNT, CLOUD_LAYER_VALUES, fields};
use crate::error::{MplError, Result};
use crate::models::{Capture, CloudLayer, HeightStats, ParticleClass, ParticleCounts};
use std::path::PathBuf;

/// Mean and population standard deviation of the range of bins in `class`
///
/// Returns [`HeightStats::EMPTY`] (both NaN) when no bin matches.
pub fn particle_height(capture: &Capture, class: ParticleClass) -> HeightStats {
    let heights: Vec<f64> = capture
        .particle_type
        .iter()
        .zip(&capture.range_nrb)
        .filter(|(bin_class, _)| **bin_class == class)
        .map(|(_, &range)| range)
        .collect();

    if heights.is_empty() {
        return HeightStats::EMPTY;
    }

    let n = heights.len() as f64;
    let mean = heights.iter().sum::<f64>() / n;
    let variance = heights.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / n;

    HeightStats {
        mean,
        std_dev: variance.sqrt(),
    }
}

impl ParticleCounts {
    /// Count bins of every class in a capture
    pub fn tally(capture: &Capture) -> Self {
        let mut counts = ParticleCounts::default();
        for &class in &capture.particle_type {
            counts.increment(class);
        }
        counts
    }
}

/// Clamp a raw AOD into `[AOD_MIN, AOD_MAX]`; NaN passes through unchanged
pub fn normalize_aod(raw: f64) -> f64 {
    if raw < AOD_MIN {
        AOD_MIN
    } else if raw > AOD_MAX {
        AOD_MAX
    } else {
        raw
    }
}

/// Extract the three (base, peak, top) layers in source order
///
/// Under [`CloudLayerPolicy::Strict`] the matrix must be exactly 3x3. The
/// returned error carries an empty path; callers attach it with
/// [`MplError::with_path`].
pub fn extract_cloud_layers(
    clouds: &[Vec<f64>],
    policy: CloudLayerPolicy,
) -> Result<[CloudLayer; 3]> {
    if policy == CloudLayerPolicy::Strict {
        if clouds.len() != CLOUD_LAYER_COUNT {
            return Err(malformed_clouds(format!(
                "expected {} layers, found {}",
                CLOUD_LAYER_COUNT,
                clouds.len()
            )));
        }
        if let Some((index, layer)) = clouds
            .iter()
            .enumerate()
            .find(|(_, layer)| layer.len() != CLOUD_LAYER_VALUES)
        {
            return Err(malformed_clouds(format!(
                "layer {} has {} values, expected {}",
                index + 1,
                layer.len(),
                CLOUD_LAYER_VALUES
            )));
        }
    }

    let mut layers = [CloudLayer::EMPTY; 3];
    for (slot, row) in layers.iter_mut().zip(clouds) {
        let value = |i: usize| row.get(i).copied().unwrap_or(f64::NAN);
        *slot = CloudLayer {
            base: value(0),
            peak: value(1),
            top: value(2),
        };
    }
    Ok(layers)
}

fn malformed_clouds(reason: String) -> MplError {
    MplError::MalformedShape {
        path: PathBuf::new(),
        field: fields::CLOUDS.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture_with_bins(codes: &[i64], ranges: &[f64]) -> Capture {
        Capture {
            date_yyyymmdd: "20241005".to_string(),
            time_hhmmss: "120000".to_string(),
            particle_type: codes.iter().map(|&c| ParticleClass::from_code(c)).collect(),
            range_nrb: ranges.to_vec(),
            aod: 0.3,
            pbls: 1.2,
            detector_temperature: 25.0,
            clouds: vec![vec![f64::NAN; 3]; 3],
        }
    }

    #[test]
    fn test_particle_height_mean_and_population_std() {
        let capture = capture_with_bins(&[5, 5, 4, 5], &[1.0, 2.0, 10.0, 3.0]);
        let stats = particle_height(&capture, ParticleClass::CleanAerosol);

        assert!((stats.mean - 2.0).abs() < 1e-12);
        // population std of [1, 2, 3]
        assert!((stats.std_dev - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);

        let single = particle_height(&capture, ParticleClass::Molecular);
        assert_eq!(single.mean, 10.0);
        assert_eq!(single.std_dev, 0.0);
    }

    #[test]
    fn test_particle_height_absent_class_is_nan() {
        let capture = capture_with_bins(&[4, 4, 4], &[1.0, 2.0, 3.0]);
        let stats = particle_height(&capture, ParticleClass::WaterCloud);
        assert!(stats.mean.is_nan());
        assert!(stats.std_dev.is_nan());
        assert!(stats.is_empty());
    }

    #[test]
    fn test_out_of_range_codes_never_match_defined_classes() {
        let capture = capture_with_bins(&[9, -3, 5], &[1.0, 2.0, 3.0]);
        let stats = particle_height(&capture, ParticleClass::CleanAerosol);
        assert_eq!(stats.mean, 3.0);

        let counts = ParticleCounts::tally(&capture);
        assert_eq!(counts.get(ParticleClass::Undefined), 2);
    }

    #[test]
    fn test_tally_sums_to_sequence_length() {
        let codes: Vec<i64> = (0..250).map(|i| (i * 7 + 3) % 11).collect();
        let ranges: Vec<f64> = (0..250).map(|i| i as f64 * 0.03).collect();
        let capture = capture_with_bins(&codes, &ranges);

        let counts = ParticleCounts::tally(&capture);
        assert_eq!(counts.total(), capture.particle_type.len() as u64);

        let manual = codes.iter().filter(|&&c| c == 5).count() as u32;
        assert_eq!(counts.get(ParticleClass::CleanAerosol), manual);
    }

    #[test]
    fn test_tally_empty_profile() {
        let capture = capture_with_bins(&[], &[]);
        assert_eq!(ParticleCounts::tally(&capture).total(), 0);
    }

    #[test]
    fn test_normalize_aod_bounds() {
        assert_eq!(normalize_aod(-1.0), 0.0);
        assert_eq!(normalize_aod(3.0), 2.0);
        assert_eq!(normalize_aod(1.5), 1.5);
        assert_eq!(normalize_aod(0.0), 0.0);
        assert_eq!(normalize_aod(2.0), 2.0);
        assert_eq!(normalize_aod(f64::INFINITY), 2.0);
        assert_eq!(normalize_aod(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_normalize_aod_nan_passes_through() {
        assert!(normalize_aod(f64::NAN).is_nan());
    }

    #[test]
    fn test_extract_cloud_layers_keeps_source_order() {
        let clouds = vec![
            vec![3.0, 3.5, 4.0],
            vec![1.0, 1.5, 2.0],
            vec![f64::NAN, f64::NAN, f64::NAN],
        ];
        let layers = extract_cloud_layers(&clouds, CloudLayerPolicy::Strict).unwrap();

        assert_eq!(layers[0].base, 3.0);
        assert_eq!(layers[0].top, 4.0);
        assert_eq!(layers[1].peak, 1.5);
        assert!(layers[2].base.is_nan());
    }

    #[test]
    fn test_strict_policy_rejects_wrong_shape() {
        let two_layers = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let result = extract_cloud_layers(&two_layers, CloudLayerPolicy::Strict);
        match result {
            Err(MplError::MalformedShape { field, reason, .. }) => {
                assert_eq!(field, "clouds");
                assert!(reason.contains("found 2"));
            }
            _ => panic!("Expected MalformedShape error"),
        }

        let short_layer = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0], vec![7.0, 8.0, 9.0]];
        assert!(extract_cloud_layers(&short_layer, CloudLayerPolicy::Strict).is_err());
    }

    #[test]
    fn test_pad_policy_fills_missing_with_nan() {
        let clouds = vec![vec![1.0, 2.0, 3.0], vec![4.0]];
        let layers = extract_cloud_layers(&clouds, CloudLayerPolicy::PadWithNan).unwrap();

        assert_eq!(layers[0].peak, 2.0);
        assert_eq!(layers[1].base, 4.0);
        assert!(layers[1].peak.is_nan());
        assert!(layers[2].top.is_nan());

        let four = vec![vec![1.0, 2.0, 3.0, 9.0]; 4];
        let layers = extract_cloud_layers(&four, CloudLayerPolicy::PadWithNan).unwrap();
        assert_eq!(layers[2].top, 3.0);
    }
}
