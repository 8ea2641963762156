use anyhow::Result;
use clap::Args;
use cyberrisk_lib::validation;

use crate::commands::args::SourceArgs;
use crate::output::{build_field_rows, emit, OutputFormat};

#[derive(Args)]
pub struct PredictArgs {
    /// Cyber exposure index, 0-1
    #[arg(long)]
    pub cei: f64,

    /// Global cybersecurity index, 0-100
    #[arg(long)]
    pub gci: f64,

    /// National cyber security index, 0-100
    #[arg(long)]
    pub ncsi: f64,

    /// Digital development level, 0-10
    #[arg(long)]
    pub ddl: f64,
}

pub async fn run(args: &PredictArgs, source: &SourceArgs, format: &OutputFormat) -> Result<()> {
    let request = validation::validate_indicators(args.cei, args.gci, args.ncsi, args.ddl)?;
    let prediction = source.client().predict(&request).await?;

    emit(build_field_rows(&prediction), &prediction, format)
}
