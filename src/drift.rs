//! Inter-story drift ratios corrected for rigid rotation of the foundation.
//!
//! The drift between two stacked nodes at instant `t` is
//! `|tan(atan((upper - lower) / h) - rotation)|`, where `rotation` is the base
//! tilt along the same direction. Story summaries follow the usual code
//! practice: the *center* drift averages the four corners before taking the
//! peak over time, the *corner* drift takes the peak over every corner.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::building::Building;
use crate::errors::{InputError, ResponseError};
use crate::geometry::{Direction, Level};
use crate::series::{ensure_same_len, NodalRecords};

/// Reject `Z`, which has no drift.
fn ensure_horizontal(direction: Direction) -> Result<(), InputError> {
    if direction.is_horizontal() {
        Ok(())
    } else {
        Err(InputError::NonHorizontalDirection(direction))
    }
}

/// Rigid tilt of the base level over time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseRotation {
    /// No correction; the foundation is fixed.
    #[default]
    None,
    /// Tilt in radians per instant for drift along `x` and `y`.
    Estimated {
        /// Correction for drift along `X`.
        x: Vec<f64>,
        /// Correction for drift along `Y`.
        y: Vec<f64>,
    },
}

impl BaseRotation {
    /// Tilt implied by the vertical displacement of four base corners.
    ///
    /// `corners` are the `z` records in plan order (see
    /// [`StoryNodes`](crate::StoryNodes)); `spacing` holds the signed corner
    /// spacing `[x0 - x2, y0 - y1]`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::LengthMismatch`] when the records differ in length
    /// and [`InputError::DegenerateCorners`] when a spacing is zero.
    pub fn from_corners(corners: [&[f64]; 4], spacing: [f64; 2]) -> Result<Self, ResponseError> {
        for (direction, value) in Direction::HORIZONTAL.into_iter().zip(spacing) {
            if value == 0.0 || !value.is_finite() {
                return Err(InputError::DegenerateCorners {
                    level: 0,
                    direction,
                }
                .into());
            }
        }
        let len = corners[0].len();
        for corner in &corners[1..] {
            ensure_same_len(len, corner.len())?;
        }
        let [n0, n1, n2, n3] = corners;
        let x = (0..len)
            .map(|t| (((n0[t] - n2[t]) + (n1[t] - n3[t])) / 2.0 / spacing[0]).atan())
            .collect();
        let y = (0..len)
            .map(|t| (((n0[t] - n1[t]) + (n2[t] - n3[t])) / 2.0 / spacing[1]).atan())
            .collect();
        Ok(Self::Estimated { x, y })
    }

    /// Estimate the tilt of the base level of `building` from nodal displacements.
    ///
    /// Fixed-base buildings yield [`BaseRotation::None`].
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::MissingData`] when a base corner has no vertical
    /// record, plus the errors of [`from_corners`](Self::from_corners).
    pub fn estimate(
        building: &Building,
        displacements: &NodalRecords,
    ) -> Result<Self, ResponseError> {
        if !building.foundation().is_compliant() {
            warn!("fixed-base foundation, drift is not corrected for base rotation");
            return Ok(Self::None);
        }
        let base = building.level(0)?;
        let [a, b, c, d] = *base.nodes();
        let corners = [
            displacements.series(a, Direction::Z)?,
            displacements.series(b, Direction::Z)?,
            displacements.series(c, Direction::Z)?,
            displacements.series(d, Direction::Z)?,
        ];
        let spacing = [base.spacing(Direction::X)?, base.spacing(Direction::Y)?];
        debug!(foundation = ?building.foundation(), "estimating base rotation");
        Self::from_corners(corners, spacing)
    }

    /// Correction series for drift along `direction`, `None` when not estimated.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NonHorizontalDirection`] for `Z`.
    pub fn correction(&self, direction: Direction) -> Result<Option<&[f64]>, ResponseError> {
        ensure_horizontal(direction)?;
        Ok(match self {
            Self::None => None,
            Self::Estimated { x, y } => Some(match direction {
                Direction::X => x.as_slice(),
                _ => y.as_slice(),
            }),
        })
    }
}

/// Absolute drift ratio between two stacked nodes at every instant.
///
/// # Errors
///
/// Returns [`ResponseError::InvalidInput`] when the records differ in length,
/// `height` is not positive, or `direction` is `Z`.
///
/// # Examples
/// ```
/// use seismic_response::{drift_between_nodes, BaseRotation, Direction};
///
/// let upper = [0.0, 0.03, -0.06];
/// let lower = [0.0, 0.0, 0.0];
/// let drift = drift_between_nodes(&upper, &lower, 3.0, Direction::X, &BaseRotation::None)?;
/// assert!((drift[1] - 0.01).abs() < 1e-12);
/// assert!((drift[2] - 0.02).abs() < 1e-12);
/// # Ok::<(), seismic_response::ResponseError>(())
/// ```
pub fn drift_between_nodes(
    upper: &[f64],
    lower: &[f64],
    height: f64,
    direction: Direction,
    rotation: &BaseRotation,
) -> Result<Vec<f64>, ResponseError> {
    ensure_same_len(upper.len(), lower.len())?;
    if !(height.is_finite() && height > 0.0) {
        return Err(InputError::NonPositiveHeight(height).into());
    }
    let correction = rotation.correction(direction)?;
    if let Some(series) = correction {
        ensure_same_len(upper.len(), series.len())?;
    }

    Ok(upper
        .iter()
        .zip(lower)
        .enumerate()
        .map(|(t, (top, bottom))| {
            let angle = ((top - bottom) / height).atan();
            let tilt = correction.map_or(0.0, |series| series[t]);
            (angle - tilt).tan().abs()
        })
        .collect())
}

/// Peak drift summaries of one story.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoryDrift {
    /// Lower level of the story.
    pub lower: Level,
    /// Upper level of the story.
    pub upper: Level,
    /// Peak over time of the drift averaged across the four corners.
    pub center: f64,
    /// Peak over time and corners of the drift.
    pub corner: f64,
}

impl StoryDrift {
    /// Excess of the corner drift over the center drift, a measure of torsion.
    #[must_use]
    pub fn torsional_excess(&self) -> f64 {
        self.corner - self.center
    }
}

/// Story drifts from the base to the roof along one direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftProfile {
    /// Direction of the drift.
    pub direction: Direction,
    /// Summaries ordered from the lowest story upward.
    pub stories: Vec<StoryDrift>,
}

impl DriftProfile {
    /// Largest center drift of the profile.
    #[must_use]
    pub fn max_center(&self) -> f64 {
        self.stories.iter().map(|s| s.center).fold(0.0, f64::max)
    }

    /// Largest corner drift of the profile.
    #[must_use]
    pub fn max_corner(&self) -> f64 {
        self.stories.iter().map(|s| s.corner).fold(0.0, f64::max)
    }
}

/// Drift computations over the levels of one building run.
#[derive(Clone, Debug)]
pub struct DriftAggregator<'a> {
    /// Level layout and heights.
    building: &'a Building,
    /// Relative nodal displacements.
    displacements: &'a NodalRecords,
    /// Correction shared by every story.
    rotation: BaseRotation,
}

impl<'a> DriftAggregator<'a> {
    /// Bind displacements to a building, estimating the base rotation once.
    ///
    /// # Errors
    ///
    /// See [`BaseRotation::estimate`].
    pub fn new(building: &'a Building, displacements: &'a NodalRecords) -> Result<Self, ResponseError> {
        let rotation = BaseRotation::estimate(building, displacements)?;
        Ok(Self::with_rotation(building, displacements, rotation))
    }

    /// Bind displacements to a building with a precomputed base rotation.
    #[must_use]
    pub fn with_rotation(
        building: &'a Building,
        displacements: &'a NodalRecords,
        rotation: BaseRotation,
    ) -> Self {
        Self {
            building,
            displacements,
            rotation,
        }
    }

    /// Base rotation applied to every drift.
    #[must_use]
    pub fn rotation(&self) -> &BaseRotation {
        &self.rotation
    }

    /// Peak drifts of the story between `story` and `story + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::MissingData`] when either level or any of its
    /// corner records is absent, and [`ResponseError::InvalidInput`] for `Z`.
    pub fn story_drift(&self, story: Level, direction: Direction) -> Result<StoryDrift, ResponseError> {
        let height = self.building.height(story)?;
        self.drift_over(story, story + 1, height, direction)
    }

    /// Peak drifts from the base to the roof over the full roof elevation.
    ///
    /// # Errors
    ///
    /// See [`story_drift`](Self::story_drift).
    pub fn roof_drift(&self, direction: Direction) -> Result<StoryDrift, ResponseError> {
        let roof = self.building.roof();
        let height = self.building.span(0, roof)?;
        self.drift_over(0, roof, height, direction)
    }

    /// Story drifts for every story from the base to the roof.
    ///
    /// # Errors
    ///
    /// See [`story_drift`](Self::story_drift).
    pub fn drift_profile(&self, direction: Direction) -> Result<DriftProfile, ResponseError> {
        let stories = (0..self.building.roof())
            .map(|story| self.story_drift(story, direction))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DriftProfile { direction, stories })
    }

    /// Corner drifts between two levels summarised into a [`StoryDrift`].
    fn drift_over(
        &self,
        lower: Level,
        upper: Level,
        height: f64,
        direction: Direction,
    ) -> Result<StoryDrift, ResponseError> {
        ensure_horizontal(direction)?;
        let bottom = self.building.level(lower)?.nodes();
        let top = self.building.level(upper)?.nodes();

        let mut corners = Vec::with_capacity(4);
        for (&high, &low) in top.iter().zip(bottom) {
            corners.push(drift_between_nodes(
                self.displacements.series(high, direction)?,
                self.displacements.series(low, direction)?,
                height,
                direction,
                &self.rotation,
            )?);
        }

        let samples = self.displacements.samples();
        let center = (0..samples)
            .map(|t| corners.iter().map(|series| series[t]).sum::<f64>() / 4.0)
            .fold(0.0, f64::max);
        let corner = corners
            .iter()
            .flat_map(|series| series.iter().copied())
            .fold(0.0, f64::max);

        debug!(lower, upper, %direction, center, corner, "story drift");
        Ok(StoryDrift {
            lower,
            upper,
            center,
            corner,
        })
    }
}
