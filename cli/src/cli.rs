use std::path::PathBuf;

use clap::Parser;
use step2mesh_core::units::LengthUnit;

#[derive(Parser)]
#[command(
    name = "step2mesh",
    about = "Decompose a labelled 2-D CAD model into meshable EM domains",
    version
)]
pub struct Cli {
    /// Scene file to import
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Directory receiving the model and area files
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Meshing option overrides as a JSON object, e.g. '{"Mesh.ElementOrder": 2}'
    #[arg(long, value_name = "JSON")]
    pub options: Option<String>,

    /// Length unit of the input coordinates (sets Mesh.ScalingFactor)
    #[arg(long, value_name = "UNIT")]
    pub unit: Option<LengthUnit>,

    /// Output format by file extension, repeatable
    #[arg(
        short,
        long = "format",
        value_name = "EXT",
        default_value = "json",
        action = clap::ArgAction::Append
    )]
    pub format: Vec<String>,

    /// Skip writing <case>.areas.json
    #[arg(long)]
    pub no_areas: bool,

    /// Log kernel-level decisions
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
