use anyhow::Result;
use clap::Args;
use cyberrisk_lib::{aggregate, filter};

use crate::commands::args::{FilterArgs, SourceArgs};
use crate::output::{build_aggregate_rows, emit, OutputFormat};

#[derive(Args)]
pub struct RegionsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

pub async fn run(args: &RegionsArgs, source: &SourceArgs, format: &OutputFormat) -> Result<()> {
    let snapshot = source.load().await?;
    let store = snapshot.records();
    let state = args.filter.to_filter(store)?;
    let records = filter::apply(store.records(), &state);
    let regions = aggregate::by_region(&records);

    emit(build_aggregate_rows(&regions), &regions, format)
}
