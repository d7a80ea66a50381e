//! Error types produced while post-processing seismic response histories.

use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::{Direction, Level, NodeId};

/// Error returned when a response computation fails.
///
/// Every variant is raised at the point of detection. A computation that fails
/// never hands back a partially filled series.
#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    /// Returned when a numeric parameter or series is malformed or out of range.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    /// Returned when a required node, level or direction series is absent.
    #[error("missing data: {0}")]
    MissingData(#[from] MissingDataError),
    /// Returned when the oscillator recursion produced non-finite values.
    #[error("numerical instability at period {period} s: {detail}")]
    NumericalInstability {
        /// Oscillator period in seconds at which the recursion broke down.
        period: f64,
        /// Description of the non-finite quantity.
        detail: String,
    },
}

impl ResponseError {
    /// Creates a [`NumericalInstability`](ResponseError::NumericalInstability) error.
    pub fn instability(period: f64, detail: impl Into<String>) -> Self {
        Self::NumericalInstability {
            period,
            detail: detail.into(),
        }
    }
}

/// Reason a numeric input was rejected.
///
/// The variants carry the offending value so callers can present actionable
/// feedback to users.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InputError {
    /// Returned when a time series has no samples.
    #[error("time series is empty")]
    EmptySeries,
    /// Returned when a sample is NaN or infinite.
    #[error("sample {index} is not finite (received {value})")]
    NonFiniteSample {
        /// Position of the offending sample.
        index: usize,
        /// Rejected sample value.
        value: f64,
    },
    /// Returned when the sampling interval is zero, negative or not finite.
    #[error("time step must be positive (received {0})")]
    NonPositiveTimeStep(f64),
    /// Returned when the period grid has no entries.
    #[error("period grid is empty")]
    EmptyPeriods,
    /// Returned when a target period is zero, negative or not finite.
    #[error("period {index} must be positive (received {period})")]
    NonPositivePeriod {
        /// Position of the offending period in the grid.
        index: usize,
        /// Rejected period in seconds.
        period: f64,
    },
    /// Returned when the damping ratio lies outside `[0, 1)`.
    #[error("damping ratio must lie in [0, 1) (received {0})")]
    DampingOutOfRange(f64),
    /// Returned when two series taking part in one computation differ in length.
    #[error("series length mismatch: expected {expected} samples, found {found}")]
    LengthMismatch {
        /// Length of the reference series.
        expected: usize,
        /// Length of the offending series.
        found: usize,
    },
    /// Returned when two records taking part in one computation differ in time step.
    #[error("time step mismatch: expected {expected} s, found {found} s")]
    TimeStepMismatch {
        /// Time step of the reference record.
        expected: f64,
        /// Time step of the offending record.
        found: f64,
    },
    /// Returned when a story height is zero, negative or not finite.
    #[error("story height must be positive (received {0})")]
    NonPositiveHeight(f64),
    /// Returned when a supplied height disagrees with the node coordinates.
    #[error("height {supplied} between levels {lower} and {upper} disagrees with coordinates ({measured})")]
    InconsistentHeight {
        /// Lower level of the story.
        lower: Level,
        /// Upper level of the story.
        upper: Level,
        /// Height supplied by the caller.
        supplied: f64,
        /// Height measured from coordinates.
        measured: f64,
    },
    /// Returned when a computation that needs a horizontal axis receives `Z`.
    #[error("direction {0} is not horizontal")]
    NonHorizontalDirection(Direction),
    /// Returned when the number of nodes does not split into four corners per level.
    #[error("expected {expected} corner nodes for the level layout, found {found}")]
    NodeCount {
        /// Node count implied by the story and sub-level counts.
        expected: usize,
        /// Node count supplied.
        found: usize,
    },
    /// Returned when the story and sub-level counts do not fit the level index range.
    #[error("{stories} stories over {subs} sub-levels exceed the supported level range")]
    LevelRange {
        /// Stories above the base.
        stories: u32,
        /// Levels below the base.
        subs: u32,
    },
    /// Returned when a node is assigned to more than one level.
    #[error("node {0} belongs to more than one level")]
    DuplicateNode(NodeId),
    /// Returned when corner nodes of a level are not laid out on a rectangle.
    #[error("corner spacing of level {level} along {direction} is zero")]
    DegenerateCorners {
        /// Level whose corners collapse.
        level: Level,
        /// Axis with zero spacing.
        direction: Direction,
    },
    /// Returned when a lumped mass is zero, negative or not finite.
    #[error("mass at level {level} must be positive (received {mass})")]
    NonPositiveMass {
        /// Level carrying the mass.
        level: Level,
        /// Rejected mass.
        mass: f64,
    },
    /// Returned when a decimation factor of zero is requested.
    #[error("decimation factor must be at least 1")]
    ZeroDecimation,
    /// Returned when a smoothing window is unusable.
    #[error("smoothing window {window} must be odd and exceed polynomial order {order}")]
    InvalidWindow {
        /// Window length in samples.
        window: usize,
        /// Polynomial order.
        order: usize,
    },
    /// Returned when a series is shorter than the smoothing window.
    #[error("series of {len} samples is shorter than the smoothing window {window}")]
    SeriesShorterThanWindow {
        /// Series length.
        len: usize,
        /// Window length.
        window: usize,
    },
    /// Returned when a design-code parameter is outside its tabulated values.
    #[error("{0}")]
    CodeParameter(String),
    /// Returned when a configuration field holds an unusable value.
    #[error("configuration field `{field}` is invalid: {detail}")]
    Config {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the problem.
        detail: String,
    },
}

/// Description of the structural data that could not be found.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MissingDataError {
    /// Returned when a node has no record in the requested direction.
    #[error("node {node} has no {direction} record")]
    NodeSeries {
        /// Node that was looked up.
        node: NodeId,
        /// Direction that was requested.
        direction: Direction,
    },
    /// Returned when a level has no corner nodes in the building.
    #[error("level {0} is not part of the building")]
    Level(Level),
    /// Returned when a level has no lumped mass.
    #[error("level {0} has no lumped mass")]
    Mass(Level),
    /// Returned when a reaction record set contains no nodes.
    #[error("no base reaction records are available")]
    Reactions,
}

/// Error returned when loading an [`AnalysisConfig`](crate::AnalysisConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when the configuration file cannot be read.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// Returned when the configuration is not valid TOML for the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Returned when a parsed value is out of range.
    #[error("configuration rejected: {0}")]
    Invalid(#[from] ResponseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_convert_into_response_errors() {
        let error: ResponseError = InputError::DampingOutOfRange(1.0).into();
        assert_eq!(
            error,
            ResponseError::InvalidInput(InputError::DampingOutOfRange(1.0))
        );
        assert_eq!(
            error.to_string(),
            "invalid input: damping ratio must lie in [0, 1) (received 1)"
        );
    }

    #[test]
    fn missing_node_message_names_node_and_direction() {
        let error: ResponseError = MissingDataError::NodeSeries {
            node: NodeId(17),
            direction: Direction::Y,
        }
        .into();
        assert_eq!(error.to_string(), "missing data: node 17 has no y record");
    }
}
