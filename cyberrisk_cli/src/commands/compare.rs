use anyhow::{bail, Result};
use clap::Args;
use cyberrisk_lib::comparison::aggregate_selection;
use cyberrisk_lib::{validation, ComparisonSet, MAX_COMPARISON};

use crate::commands::args::SourceArgs;
use crate::output::{build_aggregate_rows, emit, OutputFormat};

#[derive(Args)]
pub struct CompareArgs {
    /// Countries to compare (up to 8)
    #[arg(required = true)]
    pub countries: Vec<String>,
}

pub async fn run(args: &CompareArgs, source: &SourceArgs, format: &OutputFormat) -> Result<()> {
    let snapshot = source.load().await?;
    let store = snapshot.records();
    if store.is_empty() {
        bail!("no country data available to compare");
    }

    let mut selection = ComparisonSet::new();
    for input in &args.countries {
        let name = validation::validate_country(input, store)?;
        if selection.contains(&name) {
            eprintln!("'{}' is already selected", name);
        } else if !selection.insert(&name) {
            eprintln!(
                "Comparison is limited to {} countries; ignoring '{}'",
                MAX_COMPARISON, name
            );
        }
    }

    let compared = aggregate_selection(&store.all(), &selection);
    emit(build_aggregate_rows(&compared), &compared, format)
}
