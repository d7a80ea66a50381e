//! Uniformly sampled response histories and the per-node record tables built from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::building::StoryNodes;
use crate::errors::{InputError, MissingDataError, ResponseError};
use crate::geometry::{Direction, NodeId};
use crate::spectrum::{PeriodGrid, ResponseSpectrum};

/// Check that every sample is finite and that at least one is present.
pub(crate) fn validate_samples(samples: &[f64]) -> Result<(), InputError> {
    if samples.is_empty() {
        return Err(InputError::EmptySeries);
    }
    match samples.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(InputError::NonFiniteSample {
            index,
            value: samples[index],
        }),
        None => Ok(()),
    }
}

/// Check that a sampling interval is strictly positive and finite.
pub(crate) fn validate_time_step(time_step: f64) -> Result<(), InputError> {
    if time_step.is_finite() && time_step > 0.0 {
        Ok(())
    } else {
        Err(InputError::NonPositiveTimeStep(time_step))
    }
}

/// Check that two series taking part in one computation have the same length.
pub(crate) fn ensure_same_len(expected: usize, found: usize) -> Result<(), InputError> {
    if expected == found {
        Ok(())
    } else {
        Err(InputError::LengthMismatch { expected, found })
    }
}

/// Relative tolerance used when comparing sampling intervals.
const TIME_STEP_TOLERANCE: f64 = 1.0e-9;

/// Check that two records share a sampling interval.
pub(crate) fn ensure_same_time_step(expected: f64, found: f64) -> Result<(), InputError> {
    if (expected - found).abs() <= TIME_STEP_TOLERANCE * expected.abs().max(found.abs()) {
        Ok(())
    } else {
        Err(InputError::TimeStepMismatch { expected, found })
    }
}

/// Extreme values of a series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakStats {
    /// Largest signed value.
    pub max: f64,
    /// Smallest signed value.
    pub min: f64,
    /// Largest magnitude, `max(|max|, |min|)`.
    pub abs_max: f64,
}

impl PeakStats {
    /// Summarise a slice of samples.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptySeries`] when `samples` is empty.
    ///
    /// # Examples
    /// ```
    /// use seismic_response::PeakStats;
    ///
    /// let stats = PeakStats::of(&[0.2, -0.7, 0.5])?;
    /// assert_eq!(stats.max, 0.5);
    /// assert_eq!(stats.min, -0.7);
    /// assert_eq!(stats.abs_max, 0.7);
    /// # Ok::<(), seismic_response::ResponseError>(())
    /// ```
    pub fn of(samples: &[f64]) -> Result<Self, ResponseError> {
        if samples.is_empty() {
            return Err(InputError::EmptySeries.into());
        }
        let (max, min) = samples
            .iter()
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(max, min), &value| {
                (max.max(value), min.min(value))
            });
        Ok(Self {
            max,
            min,
            abs_max: max.abs().max(min.abs()),
        })
    }
}

/// An immutable, uniformly sampled history of one response component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Recorded values, one per time step.
    samples: Vec<f64>,
    /// Sampling interval in seconds.
    time_step: f64,
}

impl TimeSeries {
    /// Create a series from its samples and sampling interval.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidInput`] when `samples` is empty or holds a
    /// non-finite value, or when `time_step` is not strictly positive.
    ///
    /// # Examples
    /// ```
    /// use seismic_response::TimeSeries;
    ///
    /// let series = TimeSeries::new(vec![0.0, 0.1, -0.2], 0.01)?;
    /// assert_eq!(series.len(), 3);
    /// assert!((series.duration() - 0.03).abs() < 1.0e-12);
    /// # Ok::<(), seismic_response::ResponseError>(())
    /// ```
    pub fn new(samples: Vec<f64>, time_step: f64) -> Result<Self, ResponseError> {
        validate_time_step(time_step)?;
        validate_samples(&samples)?;
        Ok(Self { samples, time_step })
    }

    /// Recorded samples.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sampling interval in seconds.
    #[must_use]
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false`; a series holds at least one sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recorded duration, `len * time_step`.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 * self.time_step
    }

    /// Sample instants. The first sample is recorded at one time step.
    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        (1..=self.samples.len())
            .map(|step| step as f64 * self.time_step)
            .collect()
    }

    /// Keep every `jump`-th sample, starting with the first.
    ///
    /// The returned series carries the coarser step `jump * time_step`, so any
    /// integration performed on it uses the interval it was actually sampled at.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::ZeroDecimation`] when `jump` is zero.
    pub fn decimate(&self, jump: usize) -> Result<Self, ResponseError> {
        if jump == 0 {
            return Err(InputError::ZeroDecimation.into());
        }
        Ok(Self {
            samples: self.samples.iter().step_by(jump).copied().collect(),
            time_step: self.time_step * jump as f64,
        })
    }

    /// Extreme values of the series.
    #[must_use]
    pub fn peak_stats(&self) -> PeakStats {
        let (max, min) = self
            .samples
            .iter()
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(max, min), &value| {
                (max.max(value), min.min(value))
            });
        PeakStats {
            max,
            min,
            abs_max: max.abs().max(min.abs()),
        }
    }
}

/// Per-node records of one response quantity in the three global directions.
///
/// Every record in the table shares the same length and time step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodalRecords {
    /// Sampling interval shared by every record.
    time_step: f64,
    /// Samples per record, fixed by the first insertion.
    samples: usize,
    /// Records keyed by node, components in `[x, y, z]` order.
    records: BTreeMap<NodeId, [Vec<f64>; 3]>,
}

impl NodalRecords {
    /// Create an empty table sampled at `time_step`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NonPositiveTimeStep`] when `time_step` is not positive.
    pub fn new(time_step: f64) -> Result<Self, ResponseError> {
        validate_time_step(time_step)?;
        Ok(Self {
            time_step,
            samples: 0,
            records: BTreeMap::new(),
        })
    }

    /// Add or replace the `[x, y, z]` records of a node.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidInput`] when a component is empty, holds a
    /// non-finite value, or differs in length from the records already stored.
    pub fn insert(&mut self, node: NodeId, components: [Vec<f64>; 3]) -> Result<(), ResponseError> {
        let replaces_only_record = self.records.len() == 1 && self.records.contains_key(&node);
        let expected = if self.records.is_empty() || replaces_only_record {
            components[0].len()
        } else {
            self.samples
        };
        for component in &components {
            validate_samples(component)?;
            ensure_same_len(expected, component.len())?;
        }
        self.samples = expected;
        self.records.insert(node, components);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn with_node(mut self, node: NodeId, components: [Vec<f64>; 3]) -> Result<Self, ResponseError> {
        self.insert(node, components)?;
        Ok(self)
    }

    /// Sampling interval in seconds.
    #[must_use]
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Number of samples per record, zero for an empty table.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Number of recorded nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.records.len()
    }

    /// Recorded nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.records.keys().copied()
    }

    /// Record of `node` along `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`MissingDataError::NodeSeries`] when the node was never recorded.
    pub fn series(&self, node: NodeId, direction: Direction) -> Result<&[f64], ResponseError> {
        self.records
            .get(&node)
            .map(|components| components[direction.index()].as_slice())
            .ok_or_else(|| MissingDataError::NodeSeries { node, direction }.into())
    }

    /// Owned [`TimeSeries`] of `node` along `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`MissingDataError::NodeSeries`] when the node was never recorded.
    pub fn time_series(&self, node: NodeId, direction: Direction) -> Result<TimeSeries, ResponseError> {
        let samples = self.series(node, direction)?.to_vec();
        TimeSeries::new(samples, self.time_step)
    }

    /// Mean of the four corner records of a level along `direction`.
    ///
    /// For a rigid slab this is the motion of the slab center.
    ///
    /// # Errors
    ///
    /// Returns [`MissingDataError::NodeSeries`] when a corner was never recorded.
    pub fn story_mean(&self, story: &StoryNodes, direction: Direction) -> Result<TimeSeries, ResponseError> {
        let corners = story
            .nodes()
            .iter()
            .map(|&node| self.series(node, direction))
            .collect::<Result<Vec<_>, _>>()?;
        let mean = (0..self.samples)
            .map(|t| corners.iter().map(|series| series[t]).sum::<f64>() / 4.0)
            .collect();
        TimeSeries::new(mean, self.time_step)
    }

    /// Convert relative nodal accelerations to absolute ones by adding the input motion.
    ///
    /// The ground record may be longer than the nodal records; only its leading
    /// samples are used.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidInput`] when the time steps differ or the
    /// ground record is shorter than the nodal records.
    pub fn with_ground_motion(&self, ground: &GroundMotion) -> Result<Self, ResponseError> {
        ensure_same_time_step(self.time_step, ground.time_step())?;
        if ground.len() < self.samples {
            return Err(InputError::LengthMismatch {
                expected: self.samples,
                found: ground.len(),
            }
            .into());
        }
        let records = self
            .records
            .iter()
            .map(|(&node, components)| {
                let absolute = Direction::ALL.map(|direction| {
                    let input = ground.component(direction).samples();
                    components[direction.index()]
                        .iter()
                        .zip(input)
                        .map(|(relative, base)| relative + base)
                        .collect::<Vec<f64>>()
                });
                (node, absolute)
            })
            .collect();
        Ok(Self {
            time_step: self.time_step,
            samples: self.samples,
            records,
        })
    }
}

/// Input acceleration applied at the base of the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundMotion {
    /// Components in `[x (east), y (north), z (vertical)]` order.
    components: [TimeSeries; 3],
}

impl GroundMotion {
    /// Create a ground motion from three components sharing length and time step.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidInput`] when the components disagree in
    /// length or time step.
    pub fn new(east: TimeSeries, north: TimeSeries, vertical: TimeSeries) -> Result<Self, ResponseError> {
        for other in [&north, &vertical] {
            ensure_same_len(east.len(), other.len())?;
            ensure_same_time_step(east.time_step(), other.time_step())?;
        }
        Ok(Self {
            components: [east, north, vertical],
        })
    }

    /// Create a ground motion from raw samples, scaling every value by `factor`.
    ///
    /// `factor` converts the recorded units into the units used for the
    /// structural response, for example `9.81` for records in g.
    ///
    /// # Errors
    ///
    /// See [`GroundMotion::new`] and [`TimeSeries::new`].
    pub fn from_samples(
        east: Vec<f64>,
        north: Vec<f64>,
        vertical: Vec<f64>,
        time_step: f64,
        factor: f64,
    ) -> Result<Self, ResponseError> {
        let scale = |samples: Vec<f64>| samples.into_iter().map(|value| value * factor).collect();
        Self::new(
            TimeSeries::new(scale(east), time_step)?,
            TimeSeries::new(scale(north), time_step)?,
            TimeSeries::new(scale(vertical), time_step)?,
        )
    }

    /// Component along `direction`.
    #[must_use]
    pub fn component(&self, direction: Direction) -> &TimeSeries {
        &self.components[direction.index()]
    }

    /// Sampling interval in seconds.
    #[must_use]
    pub fn time_step(&self) -> f64 {
        self.components[0].time_step()
    }

    /// Samples per component.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components[0].len()
    }

    /// Always `false`; every component holds at least one sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components[0].is_empty()
    }

    /// Peak ground acceleration along `direction`.
    #[must_use]
    pub fn pga(&self, direction: Direction) -> PeakStats {
        self.component(direction).peak_stats()
    }

    /// Response spectra of the `[x, y, z]` components over `grid`.
    ///
    /// # Errors
    ///
    /// See [`compute_spectrum`](crate::compute_spectrum).
    pub fn spectra(
        &self,
        grid: &PeriodGrid,
        damping_ratio: f64,
    ) -> Result<[ResponseSpectrum; 3], ResponseError> {
        let [x, y, z] = Direction::ALL
            .map(|direction| ResponseSpectrum::of(self.component(direction), grid, damping_ratio));
        Ok([x?, y?, z?])
    }
}
