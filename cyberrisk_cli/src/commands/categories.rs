use anyhow::Result;
use clap::Args;
use cyberrisk_lib::{aggregate, filter};

use crate::commands::args::{FilterArgs, SourceArgs};
use crate::output::{build_aggregate_rows, emit, OutputFormat};

#[derive(Args)]
pub struct CategoriesArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

pub async fn run(args: &CategoriesArgs, source: &SourceArgs, format: &OutputFormat) -> Result<()> {
    let snapshot = source.load().await?;
    let store = snapshot.records();
    let state = args.filter.to_filter(store)?;
    let records = filter::apply(store.records(), &state);
    let categories = aggregate::by_category(&records);

    let distribution = aggregate::risk_distribution(&records)
        .into_iter()
        .map(|(category, n)| format!("{} {}", category, n))
        .collect::<Vec<_>>();
    if !distribution.is_empty() {
        eprintln!("Distribution: {}", distribution.join(", "));
    }

    emit(build_aggregate_rows(&categories), &categories, format)
}
