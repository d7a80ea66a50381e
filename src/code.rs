//! Seismic design checks of the Chilean code NCh433.
//!
//! Covers the elastic design spectrum, the static base shear with its lower and
//! upper bounds, and the inter-story drift limits of clauses 5.9.2 and 5.9.3.
//! See <https://en.wikipedia.org/wiki/Seismic_code> for background.

use serde::{Deserialize, Serialize};

use crate::drift::DriftProfile;
use crate::errors::{InputError, ResponseError};
use crate::geometry::{Direction, Level};

/// Gravitational acceleration in m/s².
pub const GRAVITY: f64 = 9.81;
/// Largest admissible drift measured at the center of mass.
pub const CENTER_DRIFT_LIMIT: f64 = 0.002;
/// Largest admissible excess of any corner drift over the center drift.
pub const TORSIONAL_DRIFT_LIMIT: f64 = 0.001;
/// Tolerance used when matching a reduction factor against the tabulated ones.
const REDUCTION_TOLERANCE: f64 = 1.0e-3;

/// Soil classification with its spectral shape parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoilCategory {
    /// Rock.
    A,
    /// Very dense or very firm soil.
    B,
    /// Dense or firm soil.
    C,
    /// Moderately dense or firm soil.
    D,
    /// Soil of low compactness.
    E,
}

/// Spectral shape parameters of a [`SoilCategory`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoilParameters {
    /// Soil amplification factor `S`.
    pub s: f64,
    /// Corner period `T0` of the design spectrum.
    pub t0: f64,
    /// Period `T'` of the seismic coefficient.
    pub t_prime: f64,
    /// Exponent `n` of the seismic coefficient.
    pub n: f64,
    /// Exponent `p` of the design spectrum.
    pub p: f64,
}

impl SoilCategory {
    /// Tabulated parameters of the category.
    #[must_use]
    pub const fn parameters(self) -> SoilParameters {
        let (s, t0, t_prime, n, p) = match self {
            SoilCategory::A => (0.9, 0.15, 0.2, 1.0, 2.0),
            SoilCategory::B => (1.0, 0.3, 0.35, 1.33, 1.5),
            SoilCategory::C => (1.05, 0.4, 0.45, 1.4, 1.6),
            SoilCategory::D => (1.2, 0.75, 0.85, 1.8, 1.0),
            SoilCategory::E => (1.3, 1.2, 1.35, 1.8, 1.0),
        };
        SoilParameters { s, t0, t_prime, n, p }
    }
}

/// Seismic zone, numbered 1 to 3 from the least to the most active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SeismicZone {
    /// Zone 1, `A0 = 0.2 g`.
    One,
    /// Zone 2, `A0 = 0.3 g`.
    Two,
    /// Zone 3, `A0 = 0.4 g`.
    Three,
}

impl SeismicZone {
    /// Effective peak ground acceleration `A0` in m/s².
    #[must_use]
    pub fn peak_ground_acceleration(self) -> f64 {
        let fraction = match self {
            SeismicZone::One => 0.2,
            SeismicZone::Two => 0.3,
            SeismicZone::Three => 0.4,
        };
        fraction * GRAVITY
    }
}

impl TryFrom<u8> for SeismicZone {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SeismicZone::One),
            2 => Ok(SeismicZone::Two),
            3 => Ok(SeismicZone::Three),
            _ => Err(InputError::CodeParameter(format!(
                "seismic zone {value} is not valid, expected 1, 2 or 3"
            ))),
        }
    }
}

impl From<SeismicZone> for u8 {
    fn from(value: SeismicZone) -> Self {
        match value {
            SeismicZone::One => 1,
            SeismicZone::Two => 2,
            SeismicZone::Three => 3,
        }
    }
}

/// Occupancy category, numbered 1 to 4 by consequence of failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Occupancy {
    /// Low-hazard structures.
    I,
    /// Ordinary buildings.
    II,
    /// Buildings with large occupancy.
    III,
    /// Essential facilities.
    IV,
}

impl Occupancy {
    /// Importance factor `I`.
    #[must_use]
    pub const fn importance(self) -> f64 {
        match self {
            Occupancy::I => 0.6,
            Occupancy::II => 1.0,
            Occupancy::III | Occupancy::IV => 1.2,
        }
    }
}

impl TryFrom<u8> for Occupancy {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Occupancy::I),
            2 => Ok(Occupancy::II),
            3 => Ok(Occupancy::III),
            4 => Ok(Occupancy::IV),
            _ => Err(InputError::CodeParameter(format!(
                "occupancy category {value} is not valid, expected 1, 2, 3 or 4"
            ))),
        }
    }
}

impl From<Occupancy> for u8 {
    fn from(value: Occupancy) -> Self {
        match value {
            Occupancy::I => 1,
            Occupancy::II => 2,
            Occupancy::III => 3,
            Occupancy::IV => 4,
        }
    }
}

/// Site and building classification under NCh433.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nch433 {
    /// Seismic zone of the site.
    pub zone: SeismicZone,
    /// Soil category of the site.
    pub soil: SoilCategory,
    /// Occupancy category of the building.
    pub occupancy: Occupancy,
}

impl Nch433 {
    /// Classify a building.
    #[must_use]
    pub const fn new(zone: SeismicZone, soil: SoilCategory, occupancy: Occupancy) -> Self {
        Self {
            zone,
            soil,
            occupancy,
        }
    }

    /// Effective peak ground acceleration `A0` in m/s².
    #[must_use]
    pub fn peak_ground_acceleration(&self) -> f64 {
        self.zone.peak_ground_acceleration()
    }

    /// Importance factor `I`.
    #[must_use]
    pub fn importance(&self) -> f64 {
        self.occupancy.importance()
    }

    /// Upper bound of the seismic coefficient for reduction factor `r`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::CodeParameter`] unless `r` is one of 2, 3, 4, 5.5, 6
    /// or 7.
    pub fn c_max(&self, r: f64) -> Result<f64, ResponseError> {
        const TABLE: [(f64, f64); 6] = [
            (2.0, 0.9),
            (3.0, 0.6),
            (4.0, 0.55),
            (5.5, 0.4),
            (6.0, 0.35),
            (7.0, 0.35),
        ];
        let factor = TABLE
            .iter()
            .find(|(tabulated, _)| (r - tabulated).abs() <= REDUCTION_TOLERANCE)
            .map(|&(_, factor)| factor)
            .ok_or_else(|| {
                InputError::CodeParameter(format!(
                    "reduction factor {r} is not tabulated, expected 2, 3, 4, 5.5, 6 or 7"
                ))
            })?;
        Ok(factor * self.soil.parameters().s * self.peak_ground_acceleration() / GRAVITY)
    }

    /// Seismic coefficient `C` for fundamental period `t_star`, clamped to
    /// `[A0 / 6g, Cmax]`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::CodeParameter`] when `t_star` is not positive or `r`
    /// is not tabulated.
    pub fn seismic_coefficient(&self, t_star: f64, r: f64) -> Result<f64, ResponseError> {
        if !(t_star.is_finite() && t_star > 0.0) {
            return Err(InputError::CodeParameter(format!(
                "fundamental period must be positive (received {t_star})"
            ))
            .into());
        }
        let ao = self.peak_ground_acceleration();
        let soil = self.soil.parameters();
        let c = 2.75 * ao / (GRAVITY * r) * (soil.t_prime / t_star).powf(soil.n);
        Ok(c.max(ao / 6.0 / GRAVITY).min(self.c_max(r)?))
    }

    /// Static base shear `Q = C · I · W` for seismic weight `weight`.
    ///
    /// # Errors
    ///
    /// See [`seismic_coefficient`](Self::seismic_coefficient).
    pub fn static_base_shear(&self, t_star: f64, r: f64, weight: f64) -> Result<f64, ResponseError> {
        Ok(self.seismic_coefficient(t_star, r)? * self.importance() * weight)
    }

    /// Smallest admissible base shear, `I · A0 · W / 6g`.
    #[must_use]
    pub fn min_base_shear(&self, weight: f64) -> f64 {
        self.importance() * self.peak_ground_acceleration() * weight / (6.0 * GRAVITY)
    }

    /// Largest required base shear, `I · Cmax · W`.
    ///
    /// # Errors
    ///
    /// See [`c_max`](Self::c_max).
    pub fn max_base_shear(&self, r: f64, weight: f64) -> Result<f64, ResponseError> {
        Ok(self.importance() * self.c_max(r)? * weight)
    }

    /// Compare a peak base shear against the code bounds.
    ///
    /// # Errors
    ///
    /// See [`c_max`](Self::c_max).
    pub fn check_base_shear(&self, peak: f64, r: f64, weight: f64) -> Result<ShearCheck, ResponseError> {
        Ok(check_base_shear(
            peak,
            self.min_base_shear(weight),
            self.max_base_shear(r, weight)?,
        ))
    }

    /// Elastic design spectrum reduced by `reduction` (the factor `R*`).
    ///
    /// # Errors
    ///
    /// Returns [`InputError::CodeParameter`] when a period is negative or
    /// `reduction` is not positive.
    ///
    /// # Examples
    /// ```
    /// use seismic_response::{Nch433, Occupancy, SeismicZone, SoilCategory};
    ///
    /// let code = Nch433::new(SeismicZone::Two, SoilCategory::B, Occupancy::II);
    /// let spectrum = code.design_spectrum(&[0.0], 1.0)?;
    /// assert!((spectrum.horizontal[0] - 0.3 * 9.81).abs() < 1e-12);
    /// # Ok::<(), seismic_response::ResponseError>(())
    /// ```
    pub fn design_spectrum(&self, periods: &[f64], reduction: f64) -> Result<DesignSpectrum, ResponseError> {
        if !(reduction.is_finite() && reduction > 0.0) {
            return Err(InputError::CodeParameter(format!(
                "spectral reduction factor must be positive (received {reduction})"
            ))
            .into());
        }
        if let Some(period) = periods.iter().find(|t| !(t.is_finite() && **t >= 0.0)) {
            return Err(InputError::CodeParameter(format!(
                "design spectrum period must be non-negative (received {period})"
            ))
            .into());
        }
        let soil = self.soil.parameters();
        let scale = soil.s * self.peak_ground_acceleration() * self.importance() / reduction;
        let horizontal: Vec<f64> = periods
            .iter()
            .map(|&t| {
                let ratio = t / soil.t0;
                scale * (1.0 + 4.5 * ratio.powf(soil.p)) / (1.0 + ratio.powi(3))
            })
            .collect();
        let vertical = horizontal.iter().map(|sa| 2.0 / 3.0 * sa).collect();
        Ok(DesignSpectrum {
            periods: periods.to_vec(),
            horizontal,
            vertical,
        })
    }
}

/// Reduced elastic design spectrum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignSpectrum {
    /// Periods in seconds.
    pub periods: Vec<f64>,
    /// Horizontal spectral acceleration in m/s².
    pub horizontal: Vec<f64>,
    /// Vertical spectral acceleration, two thirds of the horizontal one.
    pub vertical: Vec<f64>,
}

/// Outcome of comparing a peak base shear with the code bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShearCompliance {
    /// Peak below the minimum; design forces must be scaled up.
    BelowMinimum,
    /// Peak between the bounds.
    Within,
    /// Peak above the maximum; design forces may be scaled down.
    AboveMaximum,
}

/// Peak base shear with the bounds it was compared against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShearCheck {
    /// Peak base shear magnitude.
    pub peak: f64,
    /// Minimum code base shear.
    pub minimum: f64,
    /// Maximum code base shear.
    pub maximum: f64,
    /// Classification of `peak`.
    pub compliance: ShearCompliance,
}

/// Classify `peak` against `[minimum, maximum]`.
#[must_use]
pub fn check_base_shear(peak: f64, minimum: f64, maximum: f64) -> ShearCheck {
    let magnitude = peak.abs();
    let compliance = if magnitude < minimum {
        ShearCompliance::BelowMinimum
    } else if magnitude > maximum {
        ShearCompliance::AboveMaximum
    } else {
        ShearCompliance::Within
    };
    ShearCheck {
        peak: magnitude,
        minimum,
        maximum,
        compliance,
    }
}

/// Drift limits evaluated for one story.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoryDriftCheck {
    /// Lower level of the story.
    pub lower: Level,
    /// Upper level of the story.
    pub upper: Level,
    /// Center drift of the story.
    pub center: f64,
    /// Corner drift minus center drift.
    pub torsional_excess: f64,
    /// `true` when the center drift exceeds [`CENTER_DRIFT_LIMIT`].
    pub center_exceeded: bool,
    /// `true` when the excess exceeds [`TORSIONAL_DRIFT_LIMIT`].
    pub torsion_exceeded: bool,
}

/// Drift limits evaluated over a whole profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftCheck {
    /// Direction of the profile.
    pub direction: Direction,
    /// Per-story results from the base upward.
    pub stories: Vec<StoryDriftCheck>,
}

impl DriftCheck {
    /// Return `true` when no story exceeds either limit.
    #[must_use]
    pub fn passes(&self) -> bool {
        self.stories
            .iter()
            .all(|story| !(story.center_exceeded || story.torsion_exceeded))
    }

    /// Stories exceeding at least one limit.
    pub fn exceedances(&self) -> impl Iterator<Item = &StoryDriftCheck> + '_ {
        self.stories
            .iter()
            .filter(|story| story.center_exceeded || story.torsion_exceeded)
    }
}

/// Compare every story of `profile` with the drift limits.
#[must_use]
pub fn check_drift(profile: &DriftProfile) -> DriftCheck {
    let stories = profile
        .stories
        .iter()
        .map(|story| {
            let torsional_excess = story.torsional_excess();
            StoryDriftCheck {
                lower: story.lower,
                upper: story.upper,
                center: story.center,
                torsional_excess,
                center_exceeded: story.center > CENTER_DRIFT_LIMIT,
                torsion_exceeded: torsional_excess > TORSIONAL_DRIFT_LIMIT,
            }
        })
        .collect();
    DriftCheck {
        direction: profile.direction,
        stories,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::drift::StoryDrift;

    fn santiago() -> Nch433 {
        Nch433::new(SeismicZone::Two, SoilCategory::B, Occupancy::II)
    }

    #[test]
    fn c_max_follows_the_reduction_table() {
        let code = santiago();
        assert_relative_eq!(code.c_max(2.0).expect("tabulated"), 0.27, max_relative = 1.0e-12);
        assert_relative_eq!(code.c_max(5.5005).expect("tabulated"), 0.12, max_relative = 1.0e-12);
        assert!(matches!(
            code.c_max(5.0),
            Err(ResponseError::InvalidInput(InputError::CodeParameter(_)))
        ));
    }

    #[test]
    fn seismic_coefficient_is_clamped() {
        let code = santiago();
        // Very short periods hit the upper bound, very long ones the lower bound.
        assert_relative_eq!(
            code.seismic_coefficient(0.01, 7.0).expect("valid"),
            code.c_max(7.0).expect("tabulated")
        );
        assert_relative_eq!(code.seismic_coefficient(50.0, 7.0).expect("valid"), 0.05, max_relative = 1.0e-12);
        let free = code.seismic_coefficient(0.5, 7.0).expect("valid");
        assert_relative_eq!(free, 2.75 * 0.3 / 7.0 * 0.7_f64.powf(1.33), max_relative = 1.0e-12);
        assert!(code.seismic_coefficient(0.0, 7.0).is_err());
    }

    #[test]
    fn base_shear_bounds_scale_with_weight() {
        let code = santiago();
        let weight = 10_000.0;
        assert_relative_eq!(code.min_base_shear(weight), 500.0, max_relative = 1.0e-12);
        assert_relative_eq!(
            code.max_base_shear(7.0, weight).expect("tabulated"),
            1050.0,
            max_relative = 1.0e-12
        );
        let q = code.static_base_shear(0.5, 7.0, weight).expect("valid");
        assert!((500.0..=1050.0).contains(&q));
    }

    #[test]
    fn base_shear_is_classified() {
        assert_eq!(check_base_shear(-40.0, 50.0, 100.0).compliance, ShearCompliance::BelowMinimum);
        assert_eq!(check_base_shear(75.0, 50.0, 100.0).compliance, ShearCompliance::Within);
        assert_eq!(check_base_shear(-120.0, 50.0, 100.0).compliance, ShearCompliance::AboveMaximum);
        assert_eq!(check_base_shear(-120.0, 50.0, 100.0).peak, 120.0);
        let check = santiago().check_base_shear(700.0, 7.0, 10_000.0).expect("tabulated");
        assert_eq!(check.compliance, ShearCompliance::Within);
    }

    #[test]
    fn design_spectrum_starts_at_the_ground_acceleration() {
        let code = Nch433::new(SeismicZone::Three, SoilCategory::D, Occupancy::III);
        let spectrum = code.design_spectrum(&[0.0, 0.75, 2.0], 5.0).expect("valid");
        let scale = 1.2 * 0.4 * GRAVITY * 1.2 / 5.0;
        assert_relative_eq!(spectrum.horizontal[0], scale, max_relative = 1.0e-12);
        assert_relative_eq!(spectrum.horizontal[1], scale * 5.5 / 2.0, max_relative = 1.0e-12);
        for (h, v) in spectrum.horizontal.iter().zip(&spectrum.vertical) {
            assert_relative_eq!(*v, 2.0 / 3.0 * h, max_relative = 1.0e-12);
        }
        assert!(code.design_spectrum(&[-0.1], 5.0).is_err());
        assert!(code.design_spectrum(&[0.1], 0.0).is_err());
    }

    #[test]
    fn drift_limits_flag_center_and_torsion() {
        let profile = DriftProfile {
            direction: Direction::X,
            stories: vec![
                StoryDrift { lower: 0, upper: 1, center: 0.0015, corner: 0.0018 },
                StoryDrift { lower: 1, upper: 2, center: 0.0025, corner: 0.0026 },
                StoryDrift { lower: 2, upper: 3, center: 0.0010, corner: 0.0024 },
            ],
        };
        let check = check_drift(&profile);
        assert!(!check.passes());
        let flagged: Vec<Level> = check.exceedances().map(|story| story.lower).collect();
        assert_eq!(flagged, vec![1, 2]);
        assert!(check.stories[1].center_exceeded && !check.stories[1].torsion_exceeded);
        assert!(!check.stories[2].center_exceeded && check.stories[2].torsion_exceeded);
    }

    #[test]
    fn classification_round_trips_through_integers() {
        assert_eq!(SeismicZone::try_from(3_u8), Ok(SeismicZone::Three));
        assert!(SeismicZone::try_from(4_u8).is_err());
        assert_eq!(u8::from(Occupancy::III), 3);
        assert!(Occupancy::try_from(0_u8).is_err());
        let code: Nch433 = toml::from_str("zone = 2\nsoil = \"B\"\noccupancy = 2\n").expect("valid toml");
        assert_eq!(code, santiago());
    }
}
