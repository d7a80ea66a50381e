use serde::Serialize;
use seismic_response::{
    check_drift, compute_spectra, floor_spectra, AnalysisConfig, BaseRotation, Direction,
    DriftAggregator, DriftCheck, DriftProfile, FloorSpectrum, MassWeighted, PeakStats,
    ReactionSum, ResponseError, ResponseSpectrum, ShearCheck, ShearMethod, StoryDrift, GRAVITY,
};
use tracing::info;

use crate::conditions::{ShearBuildingProperties, SyntheticRun};

/// Design code results attached to a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeSummary {
    /// Seismic weight `W = g Σ m` in kN.
    pub weight: f64,
    /// Peak east base shear against the code bounds.
    pub shear: ShearCheck,
    /// Drift limits along `x` and `y`.
    pub drift: [DriftCheck; 2],
    /// Largest ordinate of the reduced horizontal design spectrum.
    pub design_peak: f64,
}

/// Summary of the results from the shear building post-processing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    /// Properties that generated the result, exposed for reporting.
    pub properties: ShearBuildingProperties,
    /// Peak ground acceleration of every input component.
    pub pga: [PeakStats; 3],
    /// Pseudo-acceleration spectra of the decimated input components.
    pub input_spectra: Vec<ResponseSpectrum>,
    /// Floor spectra of every level along `x`, then along `y`.
    pub floor_spectra: Vec<FloorSpectrum>,
    /// Whether the drifts were corrected for rigid rotation of the base.
    pub rotation_corrected: bool,
    /// Story drift profiles along `x` and `y`.
    pub drift: [DriftProfile; 2],
    /// Drift from the base to the roof along `x` and `y`.
    pub roof_drift: [StoryDrift; 2],
    /// Name of the base shear method that was applied.
    pub shear_method: &'static str,
    /// Peak base shear statistics in `[x, y, z]` order.
    pub base_shear: [PeakStats; 3],
    /// Total seismic mass in tonnes.
    pub total_mass: f64,
    /// Design code checks, when a classification was configured.
    pub code: Option<CodeSummary>,
}

/// Post-process one run: spectra of the input and of every floor, story drifts
/// and base shear.
///
/// Spectra are computed with the piecewise-linear exact recursion described at
/// <https://en.wikipedia.org/wiki/Response_spectrum>. Base shear comes from the
/// recorded reactions when the base was fixed and from story inertia forces
/// otherwise.
pub fn run_analysis(
    run: &SyntheticRun,
    config: &AnalysisConfig,
) -> Result<AnalysisSummary, ResponseError> {
    let grid = config.periods.grid()?;

    let [x, y, z] = Direction::ALL
        .map(|direction| run.ground.component(direction).decimate(config.decimation));
    let channels = [x?, y?, z?];
    let mut input_spectra = compute_spectra(
        &channels.iter().collect::<Vec<_>>(),
        &grid,
        config.damping_ratio,
    )?;

    let mut floors = Vec::new();
    for direction in Direction::HORIZONTAL {
        floors.extend(floor_spectra(
            &run.building,
            &run.accelerations,
            direction,
            &grid,
            config.damping_ratio,
            config.decimation,
        )?);
    }

    if config.soften {
        input_spectra = input_spectra
            .iter()
            .map(ResponseSpectrum::softened)
            .collect::<Result<_, _>>()?;
        for floor in &mut floors {
            floor.spectrum = floor.spectrum.softened()?;
        }
    }

    let aggregator = DriftAggregator::new(&run.building, &run.displacements)?;
    let rotation_corrected = matches!(aggregator.rotation(), BaseRotation::Estimated { .. });
    let drift = [
        aggregator.drift_profile(Direction::X)?,
        aggregator.drift_profile(Direction::Y)?,
    ];
    let roof_drift = [
        aggregator.roof_drift(Direction::X)?,
        aggregator.roof_drift(Direction::Y)?,
    ];

    let method: Box<dyn ShearMethod + '_> = match &run.reactions {
        Some(reactions) => Box::new(ReactionSum::new(reactions)),
        None => Box::new(MassWeighted::new(&run.building, &run.accelerations, &run.masses)),
    };
    let shear = method.base_shear()?;
    let base_shear = Direction::ALL.map(|direction| shear.peak_stats(direction));
    let total_mass = run.masses.total();

    let code = match &config.code {
        Some(settings) => {
            let weight = total_mass * GRAVITY;
            let check = settings.classification.check_base_shear(
                shear.peak(Direction::X),
                settings.reduction_factor,
                weight,
            )?;
            let design = settings
                .classification
                .design_spectrum(grid.periods(), settings.spectral_reduction)?;
            Some(CodeSummary {
                weight,
                shear: check,
                drift: [check_drift(&drift[0]), check_drift(&drift[1])],
                design_peak: design.horizontal.iter().copied().fold(0.0, f64::max),
            })
        }
        None => None,
    };

    info!(
        stories = run.properties.stories,
        method = method.name(),
        rotation_corrected,
        "analysis finished"
    );

    Ok(AnalysisSummary {
        properties: run.properties,
        pga: Direction::ALL.map(|direction| run.ground.pga(direction)),
        input_spectra,
        floor_spectra: floors,
        rotation_corrected,
        drift,
        roof_drift,
        shear_method: method.name(),
        base_shear,
        total_mass,
        code,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use seismic_response::{
        CodeSettings, Foundation, Nch433, Occupancy, PeriodRange, SeismicZone, SoilCategory,
    };

    use super::*;
    use crate::conditions::{default_mass_model, synthesize};

    fn small_config() -> AnalysisConfig {
        AnalysisConfig {
            periods: PeriodRange {
                start: 0.05,
                end: 2.0,
                count: 40,
            },
            code: Some(CodeSettings {
                classification: Nch433::new(SeismicZone::Three, SoilCategory::C, Occupancy::II),
                reduction_factor: 7.0,
                spectral_reduction: 5.0,
            }),
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn fixed_base_run_sums_reactions() {
        let properties = ShearBuildingProperties::new(4, 1, Foundation::FixedBase);
        let run = synthesize(properties, &default_mass_model(4, 1)).expect("valid run");
        let summary = run_analysis(&run, &small_config()).expect("analysis runs");

        assert_eq!(summary.shear_method, "reaction sum");
        assert!(!summary.rotation_corrected);
        assert_eq!(summary.input_spectra.len(), 3);
        assert_eq!(summary.drift[0].stories.len(), 4);
        assert!(summary.base_shear[0].abs_max > 0.0);

        // Roof drift of a linear mode shape equals every story drift.
        let story = summary.drift[0].stories[0].center;
        assert_relative_eq!(summary.roof_drift[0].center, story, max_relative = 1.0e-6);

        let code = summary.code.expect("code section configured");
        assert_relative_eq!(code.weight, summary.total_mass * GRAVITY);
        assert!(code.design_peak > 0.0);
    }

    #[test]
    fn compliant_run_weights_masses_and_corrects_rotation() {
        let properties = ShearBuildingProperties::new(3, 0, Foundation::AbsorbingBoundaries);
        let run = synthesize(properties, &default_mass_model(3, 0)).expect("valid run");
        let summary = run_analysis(&run, &AnalysisConfig::default()).expect("analysis runs");

        assert_eq!(summary.shear_method, "mass weighted");
        assert!(summary.rotation_corrected);
        assert!(summary.code.is_none());
        // Four levels along x and y.
        assert_eq!(summary.floor_spectra.len(), 8);
        assert!(summary.floor_spectra.iter().all(|floor| floor.spectrum.len() == 1000));
        let roof = &summary.floor_spectra[3];
        assert_eq!((roof.level, roof.direction), (3, Direction::X));
    }
}
