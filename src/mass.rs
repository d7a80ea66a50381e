//! Lumped seismic masses per level, built from structural component quantities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{InputError, MissingDataError, ResponseError};
use crate::geometry::Level;

/// Default scale applied to the component masses for finishes and live load.
pub const DEFAULT_MASS_FACTOR: f64 = 1.025;

/// Serde default for [`MassModel::factor`].
fn default_factor() -> f64 {
    DEFAULT_MASS_FACTOR
}

/// How a component distributes its mass over the levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Horizontal element lumped entirely at its own level.
    Slab,
    /// Wall, core or column segment split evenly between the levels it spans.
    Vertical,
}

/// Geometric and material constants of one structural component.
///
/// `thickness[j]` applies to level `first_level + j` for slabs, and to the
/// segment spanning `first_level + j - 1` to `first_level + j` for vertical
/// components. For columns `area` can hold the total column length and
/// `thickness` the cross-section area; only the product matters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuralComponent {
    /// Label used in diagnostics.
    pub name: String,
    /// Distribution rule.
    pub kind: ComponentKind,
    /// Plan or wall area.
    pub area: f64,
    /// Material density.
    pub density: f64,
    /// Level carrying the first entry of `thickness`.
    pub first_level: Level,
    /// Thickness per level or segment.
    pub thickness: Vec<f64>,
}

impl StructuralComponent {
    /// `(level, mass)` contributions of the component, before scaling.
    ///
    /// The lower half of a vertical segment starting at [`Level::MIN`] has no
    /// level to land on and is dropped like any other mass below the model.
    fn contributions(&self) -> impl Iterator<Item = (Level, f64)> + '_ {
        let unit = self.area * self.density;
        let kind = self.kind;
        let first = self.first_level;
        self.thickness
            .iter()
            .zip(0..)
            .filter_map(move |(thickness, offset)| {
                first.checked_add(offset).map(|level| (level, unit * thickness))
            })
            .flat_map(move |(level, mass)| match kind {
                ComponentKind::Slab => vec![(level, mass)],
                ComponentKind::Vertical => level
                    .checked_sub(1)
                    .map(|below| (below, mass / 2.0))
                    .into_iter()
                    .chain([(level, mass / 2.0)])
                    .collect(),
            })
    }

    /// Check that every quantity is finite and non-negative and that every
    /// level it loads fits the level index range.
    pub(crate) fn validate(&self) -> Result<(), InputError> {
        let invalid = |detail: String| InputError::Config {
            field: "mass.components",
            detail,
        };
        for (label, value) in [("area", self.area), ("density", self.density)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!(
                    "{label} of `{}` must be positive (received {value})",
                    self.name
                )));
            }
        }
        if let Some(value) = self
            .thickness
            .iter()
            .find(|value| !(value.is_finite() && **value >= 0.0))
        {
            return Err(invalid(format!(
                "thickness of `{}` must be non-negative (received {value})",
                self.name
            )));
        }
        let top = i32::try_from(self.thickness.len().saturating_sub(1))
            .ok()
            .and_then(|offset| self.first_level.checked_add(offset));
        if top.is_none() {
            return Err(invalid(format!(
                "`{}` starts at level {} and runs past level {}",
                self.name,
                self.first_level,
                Level::MAX
            )));
        }
        Ok(())
    }
}

/// Structural components of a building and the factor applied to their mass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MassModel {
    /// Scale applied to every lumped mass.
    #[serde(default = "default_factor")]
    pub factor: f64,
    /// Components contributing mass.
    #[serde(default)]
    pub components: Vec<StructuralComponent>,
}

impl Default for MassModel {
    fn default() -> Self {
        Self {
            factor: DEFAULT_MASS_FACTOR,
            components: Vec::new(),
        }
    }
}

impl MassModel {
    /// Lump the component masses onto the levels `lowest..=highest`.
    ///
    /// Vertical segments hand half their mass to each end level. Mass that
    /// falls below `lowest` rests on the ground and is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidInput`] when a component has an invalid
    /// quantity or places mass above `highest`, and
    /// [`InputError::NonPositiveMass`] when a modelled level ends up massless.
    ///
    /// # Examples
    /// ```
    /// use seismic_response::{ComponentKind, MassModel, StructuralComponent};
    ///
    /// let model = MassModel {
    ///     factor: 1.0,
    ///     components: vec![
    ///         StructuralComponent {
    ///             name: "slab".into(),
    ///             kind: ComponentKind::Slab,
    ///             area: 100.0,
    ///             density: 2.5,
    ///             first_level: 0,
    ///             thickness: vec![0.2, 0.2],
    ///         },
    ///         StructuralComponent {
    ///             name: "core".into(),
    ///             kind: ComponentKind::Vertical,
    ///             area: 10.0,
    ///             density: 2.5,
    ///             first_level: 1,
    ///             thickness: vec![0.4],
    ///         },
    ///     ],
    /// };
    /// let masses = model.lumped(0, 1)?;
    /// assert_eq!(masses.mass(0)?, 55.0);
    /// assert_eq!(masses.mass(1)?, 55.0);
    /// # Ok::<(), seismic_response::ResponseError>(())
    /// ```
    pub fn lumped(&self, lowest: Level, highest: Level) -> Result<LumpedMasses, ResponseError> {
        if !(self.factor.is_finite() && self.factor > 0.0) {
            return Err(InputError::Config {
                field: "mass.factor",
                detail: format!("must be positive (received {})", self.factor),
            }
            .into());
        }

        let mut masses: BTreeMap<Level, f64> = (lowest..=highest).map(|level| (level, 0.0)).collect();
        for component in &self.components {
            component.validate()?;
            for (level, mass) in component.contributions() {
                if level < lowest {
                    continue;
                }
                let slot = masses.get_mut(&level).ok_or_else(|| InputError::Config {
                    field: "mass.components",
                    detail: format!(
                        "`{}` places mass on level {level}, above the roof level {highest}",
                        component.name
                    ),
                })?;
                *slot += mass;
            }
            debug!(component = %component.name, "lumped component mass");
        }

        let masses = LumpedMasses::new(
            masses
                .into_iter()
                .map(|(level, mass)| (level, mass * self.factor))
                .collect(),
        )?;
        info!(total = masses.total(), levels = masses.len(), "lumped mass model");
        Ok(masses)
    }
}

/// Positive seismic mass at each level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LumpedMasses {
    /// Mass keyed by level.
    masses: BTreeMap<Level, f64>,
}

impl LumpedMasses {
    /// Wrap explicit level masses.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NonPositiveMass`] when a mass is not positive.
    pub fn new(masses: BTreeMap<Level, f64>) -> Result<Self, ResponseError> {
        if let Some((&level, &mass)) = masses
            .iter()
            .find(|(_, mass)| !(mass.is_finite() && **mass > 0.0))
        {
            return Err(InputError::NonPositiveMass { level, mass }.into());
        }
        Ok(Self { masses })
    }

    /// Mass lumped at `level`.
    ///
    /// # Errors
    ///
    /// Returns [`MissingDataError::Mass`] when the level carries no mass.
    pub fn mass(&self, level: Level) -> Result<f64, ResponseError> {
        self.masses
            .get(&level)
            .copied()
            .ok_or_else(|| MissingDataError::Mass(level).into())
    }

    /// `(level, mass)` pairs from the lowest level upward.
    pub fn iter(&self) -> impl Iterator<Item = (Level, f64)> + '_ {
        self.masses.iter().map(|(&level, &mass)| (level, mass))
    }

    /// Number of levels carrying mass.
    #[must_use]
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    /// Return `true` when no level carries mass.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// Total seismic mass of the building.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.masses.values().sum()
    }
}
