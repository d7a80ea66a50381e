//! Pseudo-acceleration response spectra of damped single-degree-of-freedom oscillators.
//!
//! Each oscillator is integrated with the exact solution of the equation of
//! motion under forcing that varies linearly between samples (the
//! piecewise-linear interpolation method, see
//! <https://en.wikipedia.org/wiki/Response_spectrum>). The spectral ordinate at a
//! period `T` is `ω² · max|u(t)|` with `ω = 2π / T`.

use std::f64::consts::PI;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::building::Building;
use crate::errors::{InputError, ResponseError};
use crate::geometry::{Direction, Level};
use crate::series::{validate_samples, validate_time_step, NodalRecords, TimeSeries};
use crate::smoothing::{SavitzkyGolay, DEFAULT_ORDER, DEFAULT_WINDOW};

/// Shortest period of the default grid in seconds.
pub const DEFAULT_PERIOD_START: f64 = 0.003;
/// Longest period of the default grid in seconds.
pub const DEFAULT_PERIOD_END: f64 = 2.0;
/// Number of periods in the default grid.
pub const DEFAULT_PERIOD_COUNT: usize = 1000;
/// Spectra with more points than this may be softened for display.
pub const SOFTEN_MIN_POINTS: usize = 50;

/// Check that every period is strictly positive and finite.
pub(crate) fn validate_periods(periods: &[f64]) -> Result<(), InputError> {
    if periods.is_empty() {
        return Err(InputError::EmptyPeriods);
    }
    match periods
        .iter()
        .position(|period| !(period.is_finite() && *period > 0.0))
    {
        Some(index) => Err(InputError::NonPositivePeriod {
            index,
            period: periods[index],
        }),
        None => Ok(()),
    }
}

/// Check that a damping ratio lies in `[0, 1)`.
pub(crate) fn validate_damping(damping_ratio: f64) -> Result<(), InputError> {
    if (0.0..1.0).contains(&damping_ratio) {
        Ok(())
    } else {
        Err(InputError::DampingOutOfRange(damping_ratio))
    }
}

/// Ordered oscillator periods shared by every spectrum of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodGrid {
    /// Periods in seconds.
    periods: Vec<f64>,
}

impl PeriodGrid {
    /// Wrap an explicit list of periods.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidInput`] when the list is empty or holds a
    /// period that is not strictly positive.
    pub fn new(periods: Vec<f64>) -> Result<Self, ResponseError> {
        validate_periods(&periods)?;
        Ok(Self { periods })
    }

    /// `count` evenly spaced periods from `start` to `end`, both included.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidInput`] when `count` is zero or either
    /// bound is not strictly positive.
    ///
    /// # Examples
    /// ```
    /// use seismic_response::PeriodGrid;
    ///
    /// let grid = PeriodGrid::linspace(0.5, 2.0, 4)?;
    /// assert_eq!(grid.periods(), &[0.5, 1.0, 1.5, 2.0]);
    /// # Ok::<(), seismic_response::ResponseError>(())
    /// ```
    pub fn linspace(start: f64, end: f64, count: usize) -> Result<Self, ResponseError> {
        let periods = match count {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (count - 1) as f64;
                (0..count)
                    .map(|idx| {
                        if idx == count - 1 {
                            end
                        } else {
                            start + step * idx as f64
                        }
                    })
                    .collect()
            }
        };
        Self::new(periods)
    }

    /// Periods in seconds.
    #[must_use]
    pub fn periods(&self) -> &[f64] {
        &self.periods
    }

    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Always `false`; a grid holds at least one period.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

impl Default for PeriodGrid {
    fn default() -> Self {
        let step = (DEFAULT_PERIOD_END - DEFAULT_PERIOD_START) / (DEFAULT_PERIOD_COUNT - 1) as f64;
        let mut periods: Vec<f64> = (0..DEFAULT_PERIOD_COUNT)
            .map(|idx| DEFAULT_PERIOD_START + step * idx as f64)
            .collect();
        periods[DEFAULT_PERIOD_COUNT - 1] = DEFAULT_PERIOD_END;
        Self { periods }
    }
}

/// Exact recursion coefficients for one oscillator and one sampling interval.
///
/// Displacement and velocity advance as
/// `u[i+1] = A u[i] + B v[i] + C p[i] + D p[i+1]` and
/// `v[i+1] = A1 u[i] + B1 v[i] + C1 p[i] + D1 p[i+1]` for unit mass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PiecewiseLinear {
    /// Displacement weight of `u[i]`.
    a: f64,
    /// Displacement weight of `v[i]`.
    b: f64,
    /// Displacement weight of `p[i]`.
    c: f64,
    /// Displacement weight of `p[i+1]`.
    d: f64,
    /// Velocity weight of `u[i]`.
    a1: f64,
    /// Velocity weight of `v[i]`.
    b1: f64,
    /// Velocity weight of `p[i]`.
    c1: f64,
    /// Velocity weight of `p[i+1]`.
    d1: f64,
}

impl PiecewiseLinear {
    /// Derive the coefficients for angular frequency `omega`.
    #[must_use]
    pub fn new(omega: f64, damping_ratio: f64, time_step: f64) -> Self {
        let h = time_step;
        let xi = damping_ratio;
        let root = (1.0 - xi * xi).sqrt();
        let omega_d = omega * root;
        let k = omega * omega;

        let sin = (omega_d * h).sin();
        let cos = (omega_d * h).cos();
        let e = (-xi * omega * h).exp();
        let ratio = 2.0 * xi / (omega * h);

        Self {
            a: e * (xi * sin / root + cos),
            b: e * (sin / omega_d),
            c: (ratio
                + e * (((1.0 - 2.0 * xi * xi) / (omega_d * h) - xi / root) * sin
                    - (1.0 + ratio) * cos))
                / k,
            d: (1.0 - ratio + e * ((2.0 * xi * xi - 1.0) * sin / (omega_d * h) + ratio * cos)) / k,
            a1: -e * (omega * sin / root),
            b1: e * (cos - xi * sin / root),
            c1: (-1.0 / h + e * ((omega / root + xi / (h * root)) * sin + cos / h)) / k,
            d1: (1.0 / h - e / h * (xi * sin / root + cos)) / k,
        }
    }

    /// Return `true` when every coefficient is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [
            self.a, self.b, self.c, self.d, self.a1, self.b1, self.c1, self.d1,
        ]
        .iter()
        .all(|value| value.is_finite())
    }

    /// Advance displacement and velocity across one interval.
    #[must_use]
    pub fn step(&self, u: f64, v: f64, force: f64, next_force: f64) -> (f64, f64) {
        (
            self.a * u + self.b * v + self.c * force + self.d * next_force,
            self.a1 * u + self.b1 * v + self.c1 * force + self.d1 * next_force,
        )
    }
}

/// Relative response history of one oscillator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SdofResponse {
    /// Relative displacement, one value per input sample.
    pub displacement: Vec<f64>,
    /// Relative velocity, one value per input sample.
    pub velocity: Vec<f64>,
}

/// Angular frequency of the oscillator with natural period `period`.
fn angular_frequency(period: f64) -> f64 {
    2.0 * PI / period
}

/// Validate the arguments shared by every oscillator integration.
fn validate_arguments(
    samples: &[f64],
    periods: &[f64],
    damping_ratio: f64,
    time_step: f64,
) -> Result<(), InputError> {
    validate_samples(samples)?;
    validate_periods(periods)?;
    validate_damping(damping_ratio)?;
    validate_time_step(time_step)
}

/// Integrate one oscillator over a base acceleration record.
///
/// Starts from rest; the forcing per unit mass is `-acceleration[i]`.
///
/// # Errors
///
/// Returns [`ResponseError::InvalidInput`] for malformed arguments and
/// [`ResponseError::NumericalInstability`] when the recursion yields non-finite values.
pub fn sdof_response(
    acceleration: &[f64],
    period: f64,
    damping_ratio: f64,
    time_step: f64,
) -> Result<SdofResponse, ResponseError> {
    validate_arguments(acceleration, &[period], damping_ratio, time_step)?;
    let coefficients = coefficients_for(period, damping_ratio, time_step)?;

    let mut displacement = vec![0.0; acceleration.len()];
    let mut velocity = vec![0.0; acceleration.len()];
    for i in 0..acceleration.len() - 1 {
        let (u, v) = coefficients.step(
            displacement[i],
            velocity[i],
            -acceleration[i],
            -acceleration[i + 1],
        );
        displacement[i + 1] = u;
        velocity[i + 1] = v;
    }
    let last = acceleration.len() - 1;
    if !(displacement[last].is_finite() && velocity[last].is_finite()) {
        return Err(ResponseError::instability(
            period,
            "oscillator response diverged",
        ));
    }
    Ok(SdofResponse {
        displacement,
        velocity,
    })
}

/// Coefficients for `period`, rejected when any of them is not finite.
fn coefficients_for(
    period: f64,
    damping_ratio: f64,
    time_step: f64,
) -> Result<PiecewiseLinear, ResponseError> {
    let coefficients = PiecewiseLinear::new(angular_frequency(period), damping_ratio, time_step);
    if coefficients.is_finite() {
        Ok(coefficients)
    } else {
        Err(ResponseError::instability(
            period,
            "recursion coefficients are not finite",
        ))
    }
}

/// Pseudo-spectral acceleration of one oscillator.
fn pseudo_acceleration(
    acceleration: &[f64],
    period: f64,
    damping_ratio: f64,
    time_step: f64,
) -> Result<f64, ResponseError> {
    let omega = angular_frequency(period);
    let coefficients = coefficients_for(period, damping_ratio, time_step)?;

    let (mut u, mut v) = (0.0_f64, 0.0_f64);
    let mut peak = 0.0_f64;
    for pair in acceleration.windows(2) {
        (u, v) = coefficients.step(u, v, -pair[0], -pair[1]);
        peak = peak.max(u.abs());
    }
    if !(u.is_finite() && v.is_finite()) {
        return Err(ResponseError::instability(
            period,
            "oscillator response diverged",
        ));
    }
    let value = omega * omega * peak;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ResponseError::instability(
            period,
            format!("spectral ordinate is {value}"),
        ))
    }
}

/// Compute the pseudo-acceleration spectrum of an acceleration record.
///
/// `time_step` must be the interval the samples are actually spaced at; after
/// decimating a record pass the decimated step, not the original one. Periods
/// are evaluated in parallel and returned in grid order, so repeated calls with
/// the same arguments give bit-identical results.
///
/// # Errors
///
/// Returns [`ResponseError::InvalidInput`] when the record is empty, a period is
/// not strictly positive, the damping ratio lies outside `[0, 1)` or the time
/// step is not positive, and [`ResponseError::NumericalInstability`] when an
/// ordinate is not finite.
///
/// # Examples
/// ```
/// use seismic_response::compute_spectrum;
///
/// let quiet = vec![0.0; 1000];
/// let spectrum = compute_spectrum(&quiet, &[0.1, 0.5, 1.0], 0.05, 0.02)?;
/// assert_eq!(spectrum.values(), &[0.0, 0.0, 0.0]);
/// # Ok::<(), seismic_response::ResponseError>(())
/// ```
pub fn compute_spectrum(
    acceleration: &[f64],
    periods: &[f64],
    damping_ratio: f64,
    time_step: f64,
) -> Result<ResponseSpectrum, ResponseError> {
    validate_arguments(acceleration, periods, damping_ratio, time_step)?;
    debug!(
        samples = acceleration.len(),
        periods = periods.len(),
        damping_ratio,
        time_step,
        "computing response spectrum"
    );

    let ordinates: Vec<Result<f64, ResponseError>> = periods
        .par_iter()
        .map(|&period| pseudo_acceleration(acceleration, period, damping_ratio, time_step))
        .collect();
    let values = ordinates.into_iter().collect::<Result<Vec<f64>, _>>()?;

    Ok(ResponseSpectrum {
        periods: periods.to_vec(),
        values,
        damping_ratio,
    })
}

/// Compute spectra for several channels over one grid.
///
/// Every channel is integrated at its own time step. Results keep the order of
/// `channels`.
///
/// # Errors
///
/// Returns the first error in channel order; see [`compute_spectrum`].
pub fn compute_spectra(
    channels: &[&TimeSeries],
    grid: &PeriodGrid,
    damping_ratio: f64,
) -> Result<Vec<ResponseSpectrum>, ResponseError> {
    let spectra: Vec<Result<ResponseSpectrum, ResponseError>> = channels
        .par_iter()
        .map(|series| ResponseSpectrum::of(series, grid, damping_ratio))
        .collect();
    spectra.into_iter().collect()
}

/// Response spectrum of the mean slab acceleration of one level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorSpectrum {
    /// Level of the slab.
    pub level: Level,
    /// Direction of the slab acceleration.
    pub direction: Direction,
    /// Pseudo-acceleration spectrum of the slab motion.
    pub spectrum: ResponseSpectrum,
}

/// Floor spectra of every level of `building` along `direction`.
///
/// Each level is represented by the mean of its four corner accelerations,
/// decimated by `decimation` before integration. `accelerations` should be
/// absolute; relative records give spectra of the structural response alone.
/// Results run from the lowest level to the roof.
///
/// # Errors
///
/// Returns [`MissingDataError::NodeSeries`](crate::MissingDataError::NodeSeries)
/// when a corner was not recorded, [`InputError::ZeroDecimation`] for a zero
/// jump, and otherwise see [`compute_spectrum`].
pub fn floor_spectra(
    building: &Building,
    accelerations: &NodalRecords,
    direction: Direction,
    grid: &PeriodGrid,
    damping_ratio: f64,
    decimation: usize,
) -> Result<Vec<FloorSpectrum>, ResponseError> {
    let motions = building
        .levels()
        .iter()
        .map(|story| accelerations.story_mean(story, direction)?.decimate(decimation))
        .collect::<Result<Vec<_>, _>>()?;
    let spectra = compute_spectra(&motions.iter().collect::<Vec<_>>(), grid, damping_ratio)?;
    debug!(levels = spectra.len(), %direction, "computed floor spectra");
    Ok(building
        .levels()
        .iter()
        .zip(spectra)
        .map(|(story, spectrum)| FloorSpectrum {
            level: story.level(),
            direction,
            spectrum,
        })
        .collect())
}

/// Pseudo-acceleration ordinates paired with the periods they were computed at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpectrum {
    /// Oscillator periods in seconds.
    periods: Vec<f64>,
    /// Pseudo-spectral accelerations, one per period.
    values: Vec<f64>,
    /// Damping ratio of every oscillator.
    damping_ratio: f64,
}

impl ResponseSpectrum {
    /// Spectrum of a [`TimeSeries`], integrated at the series' own time step.
    ///
    /// # Errors
    ///
    /// See [`compute_spectrum`].
    pub fn of(
        series: &TimeSeries,
        grid: &PeriodGrid,
        damping_ratio: f64,
    ) -> Result<Self, ResponseError> {
        compute_spectrum(
            series.samples(),
            grid.periods(),
            damping_ratio,
            series.time_step(),
        )
    }

    /// Oscillator periods in seconds.
    #[must_use]
    pub fn periods(&self) -> &[f64] {
        &self.periods
    }

    /// Pseudo-spectral accelerations in the units of the input record.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Damping ratio of every oscillator.
    #[must_use]
    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    /// Number of ordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false` for spectra produced by [`compute_spectrum`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(period, pseudo-acceleration)` pairs in grid order.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.periods.iter().copied().zip(self.values.iter().copied())
    }

    /// Period and value of the largest ordinate; the first one wins on ties.
    #[must_use]
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.pairs()
            .fold(None, |best: Option<(f64, f64)>, (period, value)| match best {
                Some((_, top)) if top >= value => best,
                _ => Some((period, value)),
            })
    }

    /// Apply a Savitzky-Golay filter to the ordinates.
    ///
    /// The raw spectrum is left untouched. Smoothed ordinates are clamped at zero
    /// so the result stays a valid pseudo-acceleration spectrum.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::SeriesShorterThanWindow`] when the spectrum has fewer
    /// points than the filter window.
    pub fn smoothed(&self, filter: &SavitzkyGolay) -> Result<Self, ResponseError> {
        let values = filter
            .smooth(&self.values)?
            .into_iter()
            .map(|value| value.max(0.0))
            .collect();
        Ok(Self {
            periods: self.periods.clone(),
            values,
            damping_ratio: self.damping_ratio,
        })
    }

    /// Display smoothing with the default 51-point cubic filter.
    ///
    /// Spectra with at most [`SOFTEN_MIN_POINTS`] ordinates are returned unchanged.
    ///
    /// # Errors
    ///
    /// See [`smoothed`](Self::smoothed).
    pub fn softened(&self) -> Result<Self, ResponseError> {
        if self.len() <= SOFTEN_MIN_POINTS {
            warn!(
                points = self.len(),
                "spectrum too short to soften, keeping raw ordinates"
            );
            return Ok(self.clone());
        }
        self.smoothed(&SavitzkyGolay::new(DEFAULT_WINDOW, DEFAULT_ORDER)?)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn quiet_record_has_a_flat_zero_spectrum() {
        let quiet = vec![0.0; 1000];
        let spectrum =
            compute_spectrum(&quiet, &[0.1, 0.5, 1.0], 0.05, 0.02).expect("valid arguments");
        assert_eq!(spectrum.values(), &[0.0, 0.0, 0.0]);
        assert_eq!(spectrum.periods(), &[0.1, 0.5, 1.0]);
    }

    #[test]
    fn repeated_evaluation_is_bit_identical() {
        let record: Vec<f64> = (0..800)
            .map(|i| (i as f64 * 0.37).sin() * (1.0 + (i as f64 * 0.011).cos()))
            .collect();
        let grid = PeriodGrid::default();
        let first = compute_spectrum(&record, grid.periods(), 0.05, 0.01).expect("valid");
        let second = compute_spectrum(&record, grid.periods(), 0.05, 0.01).expect("valid");
        let first_bits: Vec<u64> = first.values().iter().map(|v| v.to_bits()).collect();
        let second_bits: Vec<u64> = second.values().iter().map(|v| v.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
    }

    #[test]
    fn harmonic_record_peaks_at_its_own_period() {
        let forcing_period = 0.5;
        let time_step = 0.01;
        let record: Vec<f64> = (0..2000)
            .map(|i| (2.0 * PI * i as f64 * time_step / forcing_period).sin())
            .collect();
        let spectrum =
            compute_spectrum(&record, &[0.05, forcing_period, 2.0], 0.05, time_step)
                .expect("valid arguments");
        let values = spectrum.values();
        assert!(values[1] > 3.0 * values[0], "resonant ordinate {values:?}");
        assert!(values[1] > 3.0 * values[2], "resonant ordinate {values:?}");
        assert_eq!(spectrum.peak(), Some((forcing_period, values[1])));
    }

    #[test]
    fn constant_forcing_matches_closed_form_response() {
        // A step load is linear between samples, so the recursion is exact.
        let period = 1.0;
        let damping_ratio = 0.05;
        let time_step = 0.01;
        let record = vec![1.0; 300];
        let response =
            sdof_response(&record, period, damping_ratio, time_step).expect("valid arguments");

        let omega = angular_frequency(period);
        let root = (1.0 - damping_ratio * damping_ratio).sqrt();
        let omega_d = omega * root;
        for (i, &u) in response.displacement.iter().enumerate() {
            let t = i as f64 * time_step;
            let decay = (-damping_ratio * omega * t).exp();
            let expected = -(1.0
                - decay * ((omega_d * t).cos() + damping_ratio / root * (omega_d * t).sin()))
                / (omega * omega);
            assert_abs_diff_eq!(u, expected, epsilon = 1.0e-10);
        }
        for (i, &v) in response.velocity.iter().enumerate() {
            let t = i as f64 * time_step;
            let decay = (-damping_ratio * omega * t).exp();
            let expected = -decay * (omega_d * t).sin() / omega_d;
            assert_abs_diff_eq!(v, expected, epsilon = 1.0e-10);
        }
    }

    #[test]
    fn spectrum_uses_largest_displacement_magnitude() {
        let record: Vec<f64> = (0..400).map(|i| (i as f64 * 0.2).cos()).collect();
        let period = 0.7;
        let response = sdof_response(&record, period, 0.02, 0.02).expect("valid");
        let peak = response
            .displacement
            .iter()
            .fold(0.0_f64, |acc, u| acc.max(u.abs()));
        let omega = angular_frequency(period);
        let spectrum = compute_spectrum(&record, &[period], 0.02, 0.02).expect("valid");
        assert_abs_diff_eq!(spectrum.values()[0], omega * omega * peak, epsilon = 1.0e-12);
    }

    #[test]
    fn undamped_oscillators_are_supported() {
        let record: Vec<f64> = (0..200).map(|i| (i as f64 * 0.1).sin()).collect();
        let spectrum = compute_spectrum(&record, &[0.2, 1.0], 0.0, 0.01).expect("valid");
        assert!(spectrum.values().iter().all(|value| *value > 0.0));
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let record = vec![0.1; 10];
        assert_eq!(
            compute_spectrum(&record, &[0.5], 1.0, 0.01),
            Err(InputError::DampingOutOfRange(1.0).into())
        );
        assert_eq!(
            compute_spectrum(&record, &[0.5], -0.01, 0.01),
            Err(InputError::DampingOutOfRange(-0.01).into())
        );
        assert_eq!(
            compute_spectrum(&record, &[0.5, 0.0], 0.05, 0.01),
            Err(InputError::NonPositivePeriod {
                index: 1,
                period: 0.0
            }
            .into())
        );
        assert_eq!(
            compute_spectrum(&[], &[0.5], 0.05, 0.01),
            Err(InputError::EmptySeries.into())
        );
        assert_eq!(
            compute_spectrum(&record, &[], 0.05, 0.01),
            Err(InputError::EmptyPeriods.into())
        );
        assert_eq!(
            compute_spectrum(&record, &[0.5], 0.05, 0.0),
            Err(InputError::NonPositiveTimeStep(0.0).into())
        );
    }

    #[test]
    fn degenerate_periods_surface_as_instability() {
        let record = vec![1.0; 20];
        let error = compute_spectrum(&record, &[0.5, 1.0e-300], 0.05, 0.02)
            .expect_err("vanishing period cannot be resolved");
        assert!(matches!(
            error,
            ResponseError::NumericalInstability { period, .. } if period == 1.0e-300
        ));
    }

    #[test]
    fn overflowing_response_is_reported_as_divergence() {
        // A slow oscillator under the largest representable forcing gains
        // velocity faster than f64 can hold.
        let record = vec![f64::MAX; 1000];
        let error = sdof_response(&record, 1000.0, 0.05, 0.01).expect_err("response overflows");
        assert!(matches!(
            &error,
            ResponseError::NumericalInstability { period, detail }
                if *period == 1000.0 && detail.contains("diverged")
        ));
        let error =
            compute_spectrum(&record, &[1000.0], 0.05, 0.01).expect_err("ordinate overflows");
        assert!(matches!(
            &error,
            ResponseError::NumericalInstability { detail, .. } if detail.contains("diverged")
        ));
    }

    #[test]
    fn rigid_building_floors_see_the_ground_spectrum() {
        use crate::geometry::{point, NodeId};

        let record: Vec<f64> = (0..640).map(|i| (i as f64 * 0.05).sin()).collect();
        let mut corners = Vec::new();
        let mut accelerations = NodalRecords::new(0.005).expect("valid step");
        for level in 0..3_u32 {
            for (c, (x, y)) in [(0.0, 0.0), (0.0, 8.0), (10.0, 0.0), (10.0, 8.0)]
                .into_iter()
                .enumerate()
            {
                let node = NodeId(10 * level + c as u32);
                corners.push((node, point(x, y, 3.0 * f64::from(level))));
                accelerations
                    .insert(node, [record.clone(), vec![0.0; 640], vec![0.0; 640]])
                    .expect("valid node");
            }
        }
        let building = Building::from_coordinates(corners, 2, 0).expect("valid layout");
        let grid = PeriodGrid::linspace(0.05, 1.0, 20).expect("valid grid");
        let ground = TimeSeries::new(record, 0.005)
            .and_then(|series| series.decimate(2))
            .expect("valid series");
        let expected = ResponseSpectrum::of(&ground, &grid, 0.05).expect("valid");

        let floors = floor_spectra(&building, &accelerations, Direction::X, &grid, 0.05, 2)
            .expect("all corners recorded");
        assert_eq!(floors.iter().map(|floor| floor.level).collect::<Vec<_>>(), [0, 1, 2]);
        for floor in &floors {
            assert_eq!(floor.direction, Direction::X);
            for (value, reference) in floor.spectrum.values().iter().zip(expected.values()) {
                approx::assert_relative_eq!(*value, *reference, max_relative = 1.0e-12);
            }
        }
        assert!(matches!(
            floor_spectra(&building, &accelerations, Direction::X, &grid, 0.05, 0),
            Err(ResponseError::InvalidInput(InputError::ZeroDecimation))
        ));
    }

    #[test]
    fn default_grid_spans_the_design_range() {
        let grid = PeriodGrid::default();
        assert_eq!(grid.len(), DEFAULT_PERIOD_COUNT);
        assert_eq!(grid.periods()[0], DEFAULT_PERIOD_START);
        assert_eq!(grid.periods()[DEFAULT_PERIOD_COUNT - 1], DEFAULT_PERIOD_END);
        let linspace = PeriodGrid::linspace(
            DEFAULT_PERIOD_START,
            DEFAULT_PERIOD_END,
            DEFAULT_PERIOD_COUNT,
        )
        .expect("valid grid");
        assert_eq!(linspace, grid);
        assert!(PeriodGrid::linspace(0.0, 1.0, 5).is_err());
        assert!(PeriodGrid::linspace(0.1, 1.0, 0).is_err());
    }

    #[test]
    fn decimated_series_carry_their_own_step() {
        let fine = TimeSeries::new(
            (0..1600).map(|i| (i as f64 * 0.0025 * 2.0 * PI / 0.4).sin()).collect(),
            0.0025,
        )
        .expect("valid series");
        let coarse = fine.decimate(16).expect("valid jump");
        let grid = PeriodGrid::new(vec![0.4]).expect("valid grid");
        let explicit = compute_spectrum(coarse.samples(), grid.periods(), 0.05, 0.04)
            .expect("valid");
        let implicit = ResponseSpectrum::of(&coarse, &grid, 0.05).expect("valid");
        assert_eq!(explicit, implicit);
    }

    #[test]
    fn batch_spectra_keep_channel_order() {
        let loud = TimeSeries::new(vec![0.0, 1.0, -1.0, 0.5, 0.0], 0.02).expect("valid");
        let quiet = TimeSeries::new(vec![0.0; 5], 0.02).expect("valid");
        let grid = PeriodGrid::new(vec![0.1, 0.3]).expect("valid grid");
        let spectra = compute_spectra(&[&quiet, &loud], &grid, 0.05).expect("valid");
        assert_eq!(spectra.len(), 2);
        assert!(spectra[0].values().iter().all(|value| *value == 0.0));
        assert!(spectra[1].values().iter().any(|value| *value > 0.0));
    }

    #[test]
    fn softening_is_optional_and_keeps_the_raw_spectrum() {
        let record: Vec<f64> = (0..500).map(|i| (i as f64 * 0.3).sin()).collect();
        let grid = PeriodGrid::linspace(0.05, 2.0, 120).expect("valid grid");
        let raw = compute_spectrum(&record, grid.periods(), 0.05, 0.01).expect("valid");
        let soft = raw.softened().expect("long enough to soften");
        assert_eq!(soft.len(), raw.len());
        assert_eq!(soft.periods(), raw.periods());
        assert!(soft.values().iter().all(|value| *value >= 0.0));

        let short = compute_spectrum(&record, &[0.1, 0.2, 0.3], 0.05, 0.01).expect("valid");
        assert_eq!(short.softened().expect("short spectra pass through"), short);
    }
}
