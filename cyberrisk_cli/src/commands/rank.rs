use anyhow::Result;
use clap::Args;
use cyberrisk_lib::{aggregate, filter, validation, TOP_K};

use crate::commands::args::{FilterArgs, SourceArgs};
use crate::output::{build_rank_rows, emit, OutputFormat};

#[derive(Args)]
pub struct RankArgs {
    /// Show the least risky countries instead of the riskiest
    #[arg(long)]
    pub bottom: bool,

    /// Number of countries to show
    #[arg(long, default_value_t = TOP_K)]
    pub limit: usize,

    #[command(flatten)]
    pub filter: FilterArgs,
}

pub async fn run(args: &RankArgs, source: &SourceArgs, format: &OutputFormat) -> Result<()> {
    let limit = validation::validate_top_k(args.limit)?;
    let snapshot = source.load().await?;
    let store = snapshot.records();
    let state = args.filter.to_filter(store)?;
    let records = filter::apply(store.records(), &state);

    let ranked = if args.bottom {
        aggregate::bottom_by_risk(&records, limit)
    } else {
        aggregate::top_by_risk(&records, limit)
    };

    emit(build_rank_rows(&ranked), &ranked, format)
}
