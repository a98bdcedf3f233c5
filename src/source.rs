//! Capture file sources.
//!
//! A [`ScanSource`] turns one capture file into an owned [`Capture`]. The
//! pipeline only depends on the trait; reading Mini-MPL NetCDF files is done
//! by [`NetcdfSource`] when the `netcdf` feature is enabled.

use crate::error::Result;
use crate::models::Capture;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

/// Loads a single capture file
///
/// Implementations must release any file handle before returning, on both
/// the success and the error path.
pub trait ScanSource: Debug + Send + Sync {
    fn load(&self, path: &Path) -> Result<Capture>;
}

/// Source used by the command line tool
#[cfg(feature = "netcdf")]
pub fn default_source() -> Result<Arc<dyn ScanSource>> {
    Ok(Arc::new(NetcdfSource))
}

/// Source used by the command line tool
#[cfg(not(feature = "netcdf"))]
pub fn default_source() -> Result<Arc<dyn ScanSource>> {
    Err(crate::error::MplError::Configuration {
        message: "built without NetCDF support; rebuild with `--features netcdf`".to_string(),
    })
}

/// CF packing attributes of a numeric variable
///
/// Stored values equal to `_FillValue` or `missing_value` become NaN; the
/// rest are unpacked as `value * scale_factor + add_offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValueEncoding {
    pub fill_value: Option<f64>,
    pub missing_value: Option<f64>,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
}

impl ValueEncoding {
    pub fn decode(&self, mut values: Vec<f64>) -> Vec<f64> {
        let scale = self.scale_factor.unwrap_or(1.0);
        let offset = self.add_offset.unwrap_or(0.0);
        for value in &mut values {
            *value = if self.is_masked(*value) {
                f64::NAN
            } else {
                *value * scale + offset
            };
        }
        values
    }

    fn is_masked(&self, value: f64) -> bool {
        let matches = |sentinel: Option<f64>| match sentinel {
            Some(s) if s.is_nan() => value.is_nan(),
            Some(s) => value == s,
            None => false,
        };
        matches(self.fill_value) || matches(self.missing_value)
    }
}

#[cfg(feature = "netcdf")]
pub use self::nc::NetcdfSource;

#[cfg(feature = "netcdf")]
mod nc {
    use super::{ScanSource, ValueEncoding};
    use crate::constants::fields;
    use crate::error::{MplError, Result};
    use crate::models::{Capture, ParticleClass};
    use std::path::Path;
    use tracing::debug;

    /// Reads Mini-MPL NetCDF captures
    ///
    /// Every variable is read at the first record of its leading (time)
    /// dimension, which is the only record a capture holds.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NetcdfSource;

    impl ScanSource for NetcdfSource {
        fn load(&self, path: &Path) -> Result<Capture> {
            // Handle is dropped at the end of this scope on every path
            let file = netcdf::open(path).map_err(|e| MplError::FileAccess {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            let reader = CaptureReader { file: &file, path };

            let capture = Capture {
                date_yyyymmdd: reader.text(fields::DATE)?,
                time_hhmmss: reader.text(fields::TIME)?,
                particle_type: reader
                    .first_record(fields::PARTICLE_TYPE)?
                    .into_iter()
                    .map(ParticleClass::from_raw)
                    .collect(),
                range_nrb: reader.values(fields::RANGE)?,
                aod: reader.first_value(fields::AOD)?,
                pbls: reader.first_value(fields::PBLS)?,
                detector_temperature: reader.first_value(fields::DETECTOR_TEMPERATURE)?,
                clouds: reader.first_matrix(fields::CLOUDS)?,
            };

            debug!(
                "Loaded {}: {} range bins, {} cloud layers",
                path.display(),
                capture.range_nrb.len(),
                capture.clouds.len()
            );

            Ok(capture)
        }
    }

    struct CaptureReader<'a> {
        file: &'a netcdf::File,
        path: &'a Path,
    }

    impl<'a> CaptureReader<'a> {
        fn variable(&self, name: &str) -> Result<netcdf::Variable<'a>> {
            self.file
                .variable(name)
                .ok_or_else(|| MplError::MissingField {
                    path: self.path.to_path_buf(),
                    field: name.to_string(),
                })
        }

        fn access_error(&self, name: &str, e: netcdf::Error) -> MplError {
            MplError::FileAccess {
                path: self.path.to_path_buf(),
                reason: format!("reading '{}': {}", name, e),
            }
        }

        fn malformed(&self, name: &str, reason: String) -> MplError {
            MplError::MalformedShape {
                path: self.path.to_path_buf(),
                field: name.to_string(),
                reason,
            }
        }

        fn dims(var: &netcdf::Variable<'_>) -> Vec<usize> {
            var.dimensions().iter().map(|d| d.len()).collect()
        }

        fn encoding(var: &netcdf::Variable<'_>) -> ValueEncoding {
            ValueEncoding {
                fill_value: numeric_attribute(var, "_FillValue"),
                missing_value: numeric_attribute(var, "missing_value"),
                scale_factor: numeric_attribute(var, "scale_factor"),
                add_offset: numeric_attribute(var, "add_offset"),
            }
        }

        /// All values of a variable, flattened, with fill values masked and
        /// packing undone
        fn values(&self, name: &str) -> Result<Vec<f64>> {
            let var = self.variable(name)?;
            let raw = var
                .get_values::<f64, _>(..)
                .map_err(|e| self.access_error(name, e))?;
            Ok(Self::encoding(&var).decode(raw))
        }

        /// Values of the first record along the leading dimension
        fn first_record(&self, name: &str) -> Result<Vec<f64>> {
            let var = self.variable(name)?;
            let dims = Self::dims(&var);
            let values = self.values(name)?;
            let record_len = dims.iter().skip(1).product::<usize>().max(1);
            if dims.len() < 2 || values.len() < record_len {
                return Err(self.malformed(name, format!("unexpected dimensions {:?}", dims)));
            }
            Ok(values[..record_len].to_vec())
        }

        fn first_value(&self, name: &str) -> Result<f64> {
            self.values(name)?
                .first()
                .copied()
                .ok_or_else(|| self.malformed(name, "variable is empty".to_string()))
        }

        /// First record of a (record, rows, cols) variable as rows
        fn first_matrix(&self, name: &str) -> Result<Vec<Vec<f64>>> {
            let var = self.variable(name)?;
            let dims = Self::dims(&var);
            if dims.len() != 3 {
                let reason = format!("expected 3 dimensions, found {:?}", dims);
                return Err(self.malformed(name, reason));
            }
            let (rows, cols) = (dims[1], dims[2]);
            let values = self.values(name)?;
            if values.len() < rows * cols {
                let reason = format!("truncated data for dimensions {:?}", dims);
                return Err(self.malformed(name, reason));
            }
            Ok(values[..rows * cols]
                .chunks(cols.max(1))
                .map(<[f64]>::to_vec)
                .collect())
        }

        /// First record of a text variable, stored as NC_STRING or a char array
        fn text(&self, name: &str) -> Result<String> {
            let var = self.variable(name)?;
            if let Ok(value) = var.get_string([0usize]) {
                return Ok(value);
            }

            let dims = Self::dims(&var);
            let raw = var
                .get_raw_values(..)
                .map_err(|e| self.access_error(name, e))?;
            let width = dims.last().copied().unwrap_or(raw.len()).min(raw.len());
            let bytes: Vec<u8> = raw[..width].iter().copied().take_while(|&b| b != 0).collect();
            String::from_utf8(bytes).map_err(|e| self.malformed(name, e.to_string()))
        }
    }

    /// First element of a numeric attribute, if present
    fn numeric_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
        use netcdf::AttributeValue as A;

        match var.attribute_value(name)?.ok()? {
            A::Uchar(v) => Some(v as f64),
            A::Schar(v) => Some(v as f64),
            A::Ushort(v) => Some(v as f64),
            A::Short(v) => Some(v as f64),
            A::Uint(v) => Some(v as f64),
            A::Int(v) => Some(v as f64),
            A::Ulonglong(v) => Some(v as f64),
            A::Longlong(v) => Some(v as f64),
            A::Float(v) => Some(v as f64),
            A::Double(v) => Some(v),
            A::Shorts(v) => v.first().map(|&x| x as f64),
            A::Ints(v) => v.first().map(|&x| x as f64),
            A::Floats(v) => v.first().map(|&x| x as f64),
            A::Doubles(v) => v.first().copied(),
            _ => None,
        }
    }

}
