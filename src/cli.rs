use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use seismic_response::Foundation;

/// Command-line arguments of the demonstration binary.
#[derive(Debug, Parser)]
#[command(name = "seismic-response")]
#[command(about = "Spectra, drift and base shear of a synthetic shear building")]
#[command(version)]
pub struct Cli {
    /// TOML file with damping, period grid, mass model and code settings.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of stories above the base.
    #[arg(short, long, default_value_t = 5)]
    pub stories: u32,

    /// Number of basement levels.
    #[arg(long, default_value_t = 0)]
    pub subs: u32,

    /// Soil-structure configuration of the run.
    #[arg(short, long, value_enum, default_value_t = FoundationArg::FixedBase)]
    pub foundation: FoundationArg,

    /// Print the summary as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Foundation choices accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FoundationArg {
    /// Clamped base with recorded reactions.
    FixedBase,
    /// Soil box with absorbing boundaries.
    Absorbing,
    /// Soil box driven by the domain reduction method.
    Drm,
}

impl From<FoundationArg> for Foundation {
    fn from(value: FoundationArg) -> Self {
        match value {
            FoundationArg::FixedBase => Foundation::FixedBase,
            FoundationArg::Absorbing => Foundation::AbsorbingBoundaries,
            FoundationArg::Drm => Foundation::Drm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_fixed_five_story_building() {
        let cli = Cli::try_parse_from(["seismic-response"]).expect("defaults parse");
        assert_eq!(cli.stories, 5);
        assert_eq!(cli.subs, 0);
        assert_eq!(Foundation::from(cli.foundation), Foundation::FixedBase);
        assert!(cli.config.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn foundation_and_config_are_parsed() {
        let cli = Cli::try_parse_from([
            "seismic-response",
            "--config",
            "run.toml",
            "--foundation",
            "drm",
            "--subs",
            "2",
        ])
        .expect("valid arguments");
        assert_eq!(cli.config, Some(PathBuf::from("run.toml")));
        assert_eq!(Foundation::from(cli.foundation), Foundation::Drm);
        assert_eq!(cli.subs, 2);
    }
}
