use std::fmt::Write;

use seismic_response::{Direction, ShearCompliance};

use crate::analysis::AnalysisSummary;

/// Render a textual summary of the shear building post-processing.
///
/// The report follows the usual order of a seismic review: shaking first, then
/// deformation (<https://en.wikipedia.org/wiki/Story_drift>), then forces.
#[must_use]
pub fn render_summary(summary: &AnalysisSummary) -> String {
    let mut output = String::new();
    let properties = &summary.properties;

    writeln!(
        &mut output,
        "Shear building with {} stories and {} basement levels ({:?}, T1 = {:.2} s)",
        properties.stories, properties.subs, properties.foundation, properties.fundamental_period
    )
    .expect("writing to string cannot fail");

    // Input shaking and where its spectrum peaks.
    for (direction, (pga, spectrum)) in Direction::ALL
        .into_iter()
        .zip(summary.pga.iter().zip(&summary.input_spectra))
    {
        let (period, value) = spectrum.peak().unwrap_or((0.0, 0.0));
        writeln!(
            &mut output,
            "Input {direction:?}: PGA = {:.3} m/s², peak Sa = {value:.3} m/s² at T = {period:.3} s",
            pga.abs_max
        )
        .expect("writing to string cannot fail");
    }

    // Floor spectra, level by level.
    writeln!(&mut output, "Floor spectra:").expect("writing to string cannot fail");
    for floor in &summary.floor_spectra {
        if let Some((period, value)) = floor.spectrum.peak() {
            writeln!(
                &mut output,
                "  {:?} level {:>3}: peak Sa = {value:.3} m/s² at T = {period:.3} s",
                floor.direction, floor.level
            )
            .expect("writing to string cannot fail");
        }
    }

    // Drift, story by story, with the corner excess as a measure of torsion.
    writeln!(
        &mut output,
        "Story drifts{}:",
        if summary.rotation_corrected {
            " (corrected for base rotation)"
        } else {
            ""
        }
    )
    .expect("writing to string cannot fail");
    for profile in &summary.drift {
        for story in &profile.stories {
            writeln!(
                &mut output,
                "  {:?} {:>3} -> {:>3}: center = {:.3e}, corner = {:.3e}",
                profile.direction, story.lower, story.upper, story.center, story.corner
            )
            .expect("writing to string cannot fail");
        }
    }
    for roof in &summary.roof_drift {
        writeln!(
            &mut output,
            "  roof drift {:>3} -> {:>3}: center = {:.3e}, corner = {:.3e}",
            roof.lower, roof.upper, roof.center, roof.corner
        )
        .expect("writing to string cannot fail");
    }

    writeln!(
        &mut output,
        "Base shear ({}), total mass {:.1} t: x = {:.1} kN, y = {:.1} kN, z = {:.1} kN",
        summary.shear_method,
        summary.total_mass,
        summary.base_shear[0].abs_max,
        summary.base_shear[1].abs_max,
        summary.base_shear[2].abs_max
    )
    .expect("writing to string cannot fail");

    if let Some(code) = &summary.code {
        let verdict = match code.shear.compliance {
            ShearCompliance::BelowMinimum => "below the minimum",
            ShearCompliance::Within => "within bounds",
            ShearCompliance::AboveMaximum => "above the maximum",
        };
        writeln!(
            &mut output,
            "Code base shear: {:.1} kN is {verdict} [{:.1}, {:.1}] kN (W = {:.1} kN)",
            code.shear.peak, code.shear.minimum, code.shear.maximum, code.weight
        )
        .expect("writing to string cannot fail");
        for check in &code.drift {
            let failing = check.exceedances().count();
            writeln!(
                &mut output,
                "Code drift {:?}: {}",
                check.direction,
                if check.passes() {
                    "all stories pass".to_string()
                } else {
                    format!("{failing} stories exceed a limit")
                }
            )
            .expect("writing to string cannot fail");
        }
        writeln!(
            &mut output,
            "Design spectrum plateau: {:.3} m/s²",
            code.design_peak
        )
        .expect("writing to string cannot fail");
    }

    output
}

#[cfg(test)]
mod tests {
    use seismic_response::{AnalysisConfig, Foundation};

    use super::*;
    use crate::analysis::run_analysis;
    use crate::conditions::{default_mass_model, synthesize, ShearBuildingProperties};

    #[test]
    fn report_mentions_every_section() {
        let properties = ShearBuildingProperties::new(2, 0, Foundation::Drm);
        let run = synthesize(properties, &default_mass_model(2, 0)).expect("valid run");
        let summary = run_analysis(&run, &AnalysisConfig::default()).expect("analysis runs");
        let report = render_summary(&summary);

        assert!(report.contains("Shear building with 2 stories"));
        assert!(report.contains("Input X: PGA"));
        assert!(report.contains("X level   2: peak Sa"));
        assert!(report.contains("Y level   0: peak Sa"));
        assert!(report.contains("corrected for base rotation"));
        assert!(report.contains("Base shear (mass weighted)"));
        assert!(!report.contains("Code base shear"));
    }
}
