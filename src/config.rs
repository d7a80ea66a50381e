//! Run-level settings loaded from TOML.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! damping_ratio = 0.05
//! decimation = 16
//! soften = false
//!
//! [periods]
//! start = 0.003
//! end = 2.0
//! count = 1000
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::code::Nch433;
use crate::errors::{ConfigError, InputError, ResponseError};
use crate::mass::MassModel;
use crate::spectrum::{
    validate_damping, PeriodGrid, DEFAULT_PERIOD_COUNT, DEFAULT_PERIOD_END, DEFAULT_PERIOD_START,
};

/// Damping ratio used when none is configured.
pub const DEFAULT_DAMPING_RATIO: f64 = 0.05;
/// Decimation factor used when none is configured.
pub const DEFAULT_DECIMATION: usize = 16;

/// Evenly spaced period grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodRange {
    /// Shortest period in seconds.
    pub start: f64,
    /// Longest period in seconds.
    pub end: f64,
    /// Number of periods.
    pub count: usize,
}

impl Default for PeriodRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_PERIOD_START,
            end: DEFAULT_PERIOD_END,
            count: DEFAULT_PERIOD_COUNT,
        }
    }
}

impl PeriodRange {
    /// Expand the range into a [`PeriodGrid`].
    ///
    /// # Errors
    ///
    /// See [`PeriodGrid::linspace`].
    pub fn grid(&self) -> Result<PeriodGrid, ResponseError> {
        PeriodGrid::linspace(self.start, self.end, self.count)
    }
}

/// Design code classification plus the reduction factors of the structure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodeSettings {
    /// Site and occupancy classification.
    #[serde(flatten)]
    pub classification: Nch433,
    /// Response modification factor `R` for the base shear bounds.
    pub reduction_factor: f64,
    /// Spectral reduction factor `R*` for the design spectrum.
    pub spectral_reduction: f64,
}

/// Settings of one post-processing run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Damping ratio of every spectral oscillator.
    pub damping_ratio: f64,
    /// Keep every `decimation`-th sample before computing spectra.
    pub decimation: usize,
    /// Smooth spectra for display.
    pub soften: bool,
    /// Oscillator periods.
    pub periods: PeriodRange,
    /// Structural components used to lump level masses.
    pub mass: Option<MassModel>,
    /// Design code checks to run.
    pub code: Option<CodeSettings>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            damping_ratio: DEFAULT_DAMPING_RATIO,
            decimation: DEFAULT_DECIMATION,
            soften: false,
            periods: PeriodRange::default(),
            mass: None,
            code: None,
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when a value is out of range.
    ///
    /// # Examples
    /// ```
    /// use seismic_response::AnalysisConfig;
    ///
    /// let config = AnalysisConfig::from_toml_str("damping_ratio = 0.02\n[periods]\ncount = 50\n")?;
    /// assert_eq!(config.damping_ratio, 0.02);
    /// assert_eq!(config.periods.count, 50);
    /// assert_eq!(config.decimation, 16);
    /// # Ok::<(), seismic_response::ConfigError>(())
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise see
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Self::from_toml_str(&source)
    }

    /// Check every value against its admissible range.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidInput`] for the first offending field.
    pub fn validate(&self) -> Result<(), ResponseError> {
        validate_damping(self.damping_ratio)?;
        if self.decimation == 0 {
            return Err(InputError::ZeroDecimation.into());
        }
        if !(self.periods.start < self.periods.end || self.periods.count == 1) {
            return Err(InputError::Config {
                field: "periods",
                detail: format!(
                    "start {} must be below end {}",
                    self.periods.start, self.periods.end
                ),
            }
            .into());
        }
        self.periods.grid()?;
        if let Some(code) = &self.code {
            for (field, value) in [
                ("code.reduction_factor", code.reduction_factor),
                ("code.spectral_reduction", code.spectral_reduction),
            ] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(InputError::Config {
                        field,
                        detail: format!("must be positive (received {value})"),
                    }
                    .into());
                }
            }
        }
        if let Some(mass) = &self.mass {
            for component in &mass.components {
                component.validate()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Occupancy, SeismicZone, SoilCategory};

    #[test]
    fn empty_document_uses_defaults() {
        let config = AnalysisConfig::from_toml_str("").expect("defaults are valid");
        assert_eq!(config, AnalysisConfig::default());
        let grid = config.periods.grid().expect("valid grid");
        assert_eq!(grid, PeriodGrid::default());
    }

    #[test]
    fn full_document_is_parsed() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            damping_ratio = 0.03
            decimation = 4
            soften = true

            [periods]
            start = 0.05
            end = 3.0
            count = 60

            [mass]
            factor = 1.0

            [[mass.components]]
            name = "slab"
            kind = "slab"
            area = 400.0
            density = 2.5
            first_level = 1
            thickness = [0.15, 0.15]

            [code]
            zone = 3
            soil = "C"
            occupancy = 2
            reduction_factor = 7.0
            spectral_reduction = 5.0
            "#,
        )
        .expect("valid configuration");
        assert_eq!(config.decimation, 4);
        assert!(config.soften);
        assert_eq!(config.periods.count, 60);
        assert_eq!(config.mass.as_ref().map(|m| m.components.len()), Some(1));
        let code = config.code.expect("code section present");
        assert_eq!(
            code.classification,
            Nch433::new(SeismicZone::Three, SoilCategory::C, Occupancy::II)
        );
        assert_eq!(code.reduction_factor, 7.0);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            AnalysisConfig::from_toml_str("damping_ratio = 1.0"),
            Err(ConfigError::Invalid(ResponseError::InvalidInput(
                InputError::DampingOutOfRange(_)
            )))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml_str("decimation = 0"),
            Err(ConfigError::Invalid(ResponseError::InvalidInput(InputError::ZeroDecimation)))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml_str("[periods]\nstart = 2.0\nend = 1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml_str("soften = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn mass_components_are_checked_against_the_level_range() {
        let component = |first_level: &str, thickness: &str| {
            format!(
                "[[mass.components]]\nname = \"core\"\nkind = \"vertical\"\narea = 20.0\n\
                 density = 2.5\nfirst_level = {first_level}\nthickness = {thickness}\n"
            )
        };
        let config = AnalysisConfig::from_toml_str(&component("-2147483648", "[0.3]"))
            .expect("the lowest level is representable");
        let model = config.mass.expect("mass section present");
        let masses = model.lumped(i32::MIN, i32::MIN).expect("no level below the range");
        assert_eq!(masses.len(), 1);

        assert!(matches!(
            AnalysisConfig::from_toml_str(&component("2147483647", "[0.3, 0.3]")),
            Err(ConfigError::Invalid(ResponseError::InvalidInput(InputError::Config {
                field: "mass.components",
                ..
            })))
        ));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = AnalysisConfig::from_path("/nonexistent/seismic.toml").expect_err("no such file");
        assert!(error.to_string().contains("/nonexistent/seismic.toml"));
    }
}
