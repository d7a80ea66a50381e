mod analysis;
mod cli;
mod conditions;
mod report;

use std::error::Error;

use analysis::run_analysis;
use clap::Parser;
use cli::Cli;
use conditions::{default_mass_model, synthesize, ShearBuildingProperties};
use report::render_summary;
use seismic_response::AnalysisConfig;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so the report on stdout stays machine readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Settings default to a 5 % damped spectrum over 0.003 to 2 s.
    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_path(path)?,
        None => AnalysisConfig::default(),
    };

    // Synthesize the response of a uniform shear building to harmonic ground
    // shaking. Each level sways in the first mode of the building, see
    // https://en.wikipedia.org/wiki/Modal_analysis.
    let properties = ShearBuildingProperties::new(cli.stories, cli.subs, cli.foundation.into());
    let mass_model = config
        .mass
        .clone()
        .unwrap_or_else(|| default_mass_model(cli.stories, cli.subs));
    let run = synthesize(properties, &mass_model)?;

    // Post-process the records the way a time-history review would.
    let summary = run_analysis(&run, &config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", render_summary(&summary));
    }

    Ok(())
}
