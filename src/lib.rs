#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod building;
pub mod code;
pub mod config;
pub mod drift;
pub mod errors;
pub mod geometry;
pub mod mass;
pub mod series;
pub mod shear;
pub mod smoothing;
pub mod spectrum;

pub use building::{Building, StoryNodes};
pub use code::{
    check_base_shear, check_drift, DesignSpectrum, DriftCheck, Nch433, Occupancy, SeismicZone,
    ShearCheck, ShearCompliance, SoilCategory, SoilParameters, StoryDriftCheck, GRAVITY,
};
pub use config::{AnalysisConfig, CodeSettings, PeriodRange};
pub use drift::{drift_between_nodes, BaseRotation, DriftAggregator, DriftProfile, StoryDrift};
pub use errors::{ConfigError, InputError, MissingDataError, ResponseError};
pub use geometry::{point, Direction, Foundation, Level, NodeId, Point};
pub use mass::{ComponentKind, LumpedMasses, MassModel, StructuralComponent};
pub use series::{GroundMotion, NodalRecords, PeakStats, TimeSeries};
pub use shear::{BaseShear, MassWeighted, ReactionSum, ShearMethod};
pub use smoothing::SavitzkyGolay;
pub use spectrum::{
    compute_spectra, compute_spectrum, floor_spectra, sdof_response, FloorSpectrum, PeriodGrid,
    PiecewiseLinear, ResponseSpectrum, SdofResponse,
};
