use anyhow::Result;
use clap::Args;
use cyberrisk_lib::filter;

use crate::commands::args::{FilterArgs, SourceArgs};
use crate::output::{build_record_rows, emit, OutputFormat};

#[derive(Args)]
pub struct FilterCmdArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

pub async fn run(args: &FilterCmdArgs, source: &SourceArgs, format: &OutputFormat) -> Result<()> {
    let snapshot = source.load().await?;
    let store = snapshot.records();
    let state = args.filter.to_filter(store)?;
    let records = filter::apply(store.records(), &state);

    eprintln!("{} of {} countries match", records.len(), store.len());

    emit(build_record_rows(&records), &records, format)
}
