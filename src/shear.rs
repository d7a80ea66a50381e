//! Base shear histories from nodal reactions or from story inertia forces.
//!
//! Two interchangeable [`ShearMethod`]s are provided. [`ReactionSum`] adds the
//! recorded reactions of every restrained base node and is the natural choice
//! for fixed-base runs. [`MassWeighted`] adds `m · ā(t)` over every level,
//! where `ā` is the mean acceleration of the four level corners, and is used
//! when the base sits on a soil box and no reactions exist.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::building::Building;
use crate::errors::{MissingDataError, ResponseError};
use crate::geometry::Direction;
use crate::mass::LumpedMasses;
use crate::series::{NodalRecords, PeakStats};

/// Strategy turning nodal records into a base shear history.
pub trait ShearMethod {
    /// Short label used in logs and reports.
    fn name(&self) -> &'static str;

    /// Compute the base shear history in every direction.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::MissingData`] when a required record is absent.
    fn base_shear(&self) -> Result<BaseShear, ResponseError>;
}

/// Total force transmitted to the foundation over time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseShear {
    /// Sampling interval of the histories.
    time_step: f64,
    /// Histories in `[x, y, z]` order.
    components: [Vec<f64>; 3],
    /// Peak statistics in `[x, y, z]` order.
    peaks: [PeakStats; 3],
}

impl BaseShear {
    /// Wrap three equally long histories and summarise their peaks.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidInput`] when a history is empty.
    pub fn new(time_step: f64, components: [Vec<f64>; 3]) -> Result<Self, ResponseError> {
        let peaks = [
            PeakStats::of(&components[0])?,
            PeakStats::of(&components[1])?,
            PeakStats::of(&components[2])?,
        ];
        Ok(Self {
            time_step,
            components,
            peaks,
        })
    }

    /// Sampling interval in seconds.
    #[must_use]
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Shear history along `direction`.
    #[must_use]
    pub fn component(&self, direction: Direction) -> &[f64] {
        &self.components[direction.index()]
    }

    /// Peak statistics along `direction`.
    #[must_use]
    pub fn peak_stats(&self, direction: Direction) -> PeakStats {
        self.peaks[direction.index()]
    }

    /// Largest magnitude along `direction`.
    #[must_use]
    pub fn peak(&self, direction: Direction) -> f64 {
        self.peaks[direction.index()].abs_max
    }
}

/// Sum of the reactions of every recorded base node.
#[derive(Clone, Copy, Debug)]
pub struct ReactionSum<'a> {
    /// Reaction records of the restrained nodes.
    reactions: &'a NodalRecords,
}

impl<'a> ReactionSum<'a> {
    /// Use every node of `reactions`.
    #[must_use]
    pub fn new(reactions: &'a NodalRecords) -> Self {
        Self { reactions }
    }
}

impl ShearMethod for ReactionSum<'_> {
    fn name(&self) -> &'static str {
        "reaction sum"
    }

    fn base_shear(&self) -> Result<BaseShear, ResponseError> {
        if self.reactions.node_count() == 0 {
            return Err(MissingDataError::Reactions.into());
        }
        let samples = self.reactions.samples();
        let mut components = [vec![0.0; samples], vec![0.0; samples], vec![0.0; samples]];
        for node in self.reactions.nodes() {
            for direction in Direction::ALL {
                let record = self.reactions.series(node, direction)?;
                for (total, value) in components[direction.index()].iter_mut().zip(record) {
                    *total += value;
                }
            }
        }
        debug!(nodes = self.reactions.node_count(), "summed base reactions");
        let shear = BaseShear::new(self.reactions.time_step(), components)?;
        log_peaks(self.name(), &shear);
        Ok(shear)
    }
}

/// Sum of level masses times the mean corner acceleration of each level.
#[derive(Clone, Copy, Debug)]
pub struct MassWeighted<'a> {
    /// Level layout, sub-levels included.
    building: &'a Building,
    /// Absolute nodal accelerations.
    accelerations: &'a NodalRecords,
    /// Seismic mass of every level.
    masses: &'a LumpedMasses,
}

impl<'a> MassWeighted<'a> {
    /// Combine absolute accelerations with lumped masses.
    #[must_use]
    pub fn new(building: &'a Building, accelerations: &'a NodalRecords, masses: &'a LumpedMasses) -> Self {
        Self {
            building,
            accelerations,
            masses,
        }
    }
}

impl ShearMethod for MassWeighted<'_> {
    fn name(&self) -> &'static str {
        "mass weighted"
    }

    fn base_shear(&self) -> Result<BaseShear, ResponseError> {
        let samples = self.accelerations.samples();
        let mut components = [vec![0.0; samples], vec![0.0; samples], vec![0.0; samples]];
        for group in self.building.levels() {
            let mass = self.masses.mass(group.level())?;
            for direction in Direction::ALL {
                let mean = self.accelerations.story_mean(group, direction)?;
                for (total, value) in components[direction.index()].iter_mut().zip(mean.samples()) {
                    *total += mass * value;
                }
            }
        }
        debug!(levels = self.building.levels().len(), "summed story inertia forces");
        let shear = BaseShear::new(self.accelerations.time_step(), components)?;
        log_peaks(self.name(), &shear);
        Ok(shear)
    }
}

/// Report the peak shear of every direction.
fn log_peaks(method: &str, shear: &BaseShear) {
    info!(
        method,
        x = shear.peak(Direction::X),
        y = shear.peak(Direction::Y),
        z = shear.peak(Direction::Z),
        "base shear peaks"
    );
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::errors::InputError;
    use crate::geometry::{point, NodeId, Point};

    fn single_story() -> Building {
        let nodes: Vec<(NodeId, Point)> = (0..2u32)
            .flat_map(|k| {
                [(0.0, 0.0), (0.0, 6.0), (6.0, 0.0), (6.0, 6.0)]
                    .into_iter()
                    .enumerate()
                    .map(move |(c, (x, y))| (NodeId(4 * k + c as u32), point(x, y, 3.0 * f64::from(k))))
            })
            .collect();
        Building::from_coordinates(nodes, 1, 0).expect("valid building")
    }

    #[test]
    fn rigid_body_shear_is_total_mass_times_acceleration() {
        let building = single_story();
        let history: Vec<f64> = (0..500).map(|i| 0.3 * (i as f64 * 0.05).sin()).collect();
        let mut accelerations = NodalRecords::new(0.01).expect("valid step");
        for node in 0..8 {
            accelerations
                .insert(
                    NodeId(node),
                    [history.clone(), history.iter().map(|a| -a).collect(), vec![0.0; 500]],
                )
                .expect("consistent records");
        }
        let masses = LumpedMasses::new(BTreeMap::from([(0, 120.5), (1, 79.5)])).expect("positive");
        let shear = MassWeighted::new(&building, &accelerations, &masses)
            .base_shear()
            .expect("complete records");

        for (t, a) in history.iter().enumerate() {
            assert_abs_diff_eq!(shear.component(Direction::X)[t], 200.0 * a, epsilon = 1.0e-9);
            assert_abs_diff_eq!(shear.component(Direction::Y)[t], -200.0 * a, epsilon = 1.0e-9);
        }
        assert_eq!(shear.peak(Direction::Z), 0.0);
        let expected_peak = history.iter().fold(0.0_f64, |acc, a| acc.max(a.abs())) * 200.0;
        assert_abs_diff_eq!(shear.peak(Direction::X), expected_peak, epsilon = 1.0e-9);
    }

    #[test]
    fn missing_level_mass_is_reported() {
        let building = single_story();
        let mut accelerations = NodalRecords::new(0.01).expect("valid step");
        for node in 0..8 {
            accelerations
                .insert(NodeId(node), [vec![1.0], vec![1.0], vec![1.0]])
                .expect("consistent records");
        }
        let masses = LumpedMasses::new(BTreeMap::from([(0, 1.0)])).expect("positive");
        assert_eq!(
            MassWeighted::new(&building, &accelerations, &masses).base_shear(),
            Err(MissingDataError::Mass(1).into())
        );
    }

    #[test]
    fn reactions_are_summed_per_direction() {
        let reactions = NodalRecords::new(0.02)
            .expect("valid step")
            .with_node(NodeId(1), [vec![1.0, -2.0], vec![0.5, 0.5], vec![10.0, 10.0]])
            .expect("valid record")
            .with_node(NodeId(2), [vec![3.0, -4.0], vec![-0.5, 1.5], vec![10.0, 12.0]])
            .expect("valid record");
        let shear = ReactionSum::new(&reactions).base_shear().expect("reactions present");
        assert_eq!(shear.component(Direction::X), &[4.0, -6.0]);
        assert_eq!(shear.component(Direction::Y), &[0.0, 2.0]);
        assert_eq!(shear.component(Direction::Z), &[20.0, 22.0]);
        assert_eq!(shear.peak(Direction::X), 6.0);
        assert_eq!(shear.peak_stats(Direction::X).min, -6.0);
        assert_eq!(shear.time_step(), 0.02);
    }

    #[test]
    fn empty_reaction_set_is_missing_data() {
        let reactions = NodalRecords::new(0.02).expect("valid step");
        let method: &dyn ShearMethod = &ReactionSum::new(&reactions);
        assert_eq!(method.base_shear(), Err(MissingDataError::Reactions.into()));
        assert_eq!(method.name(), "reaction sum");
    }

    #[test]
    fn empty_histories_are_rejected() {
        assert_eq!(
            BaseShear::new(0.01, [Vec::new(), Vec::new(), Vec::new()]),
            Err(InputError::EmptySeries.into())
        );
    }
}
