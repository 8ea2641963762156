use anyhow::{bail, Result};
use clap::Args;
use cyberrisk_lib::{Availability, ComparisonSet, DashboardView};

use crate::commands::args::{FilterArgs, SourceArgs};
use crate::output::{build_polygon_rows, build_unmatched_rows, emit, OutputFormat};

#[derive(Args)]
pub struct MapArgs {
    /// Only list polygons that matched no country, with the closest name
    #[arg(long)]
    pub unmatched: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

pub async fn run(args: &MapArgs, source: &SourceArgs, format: &OutputFormat) -> Result<()> {
    let snapshot = source.load().await?;
    if !snapshot.has_polygons() {
        bail!("no polygon data: pass --geo <file> or --geo-url <url>");
    }
    let reconciler = source.reconciler()?;
    let state = args.filter.to_filter(snapshot.records())?;
    let view = DashboardView::compute(&snapshot, &state, &ComparisonSet::new(), &reconciler);

    if view.availability == Availability::Partial {
        eprintln!("Country data unavailable; every polygon is shown as no data.");
    }
    let report = &view.report;
    eprintln!(
        "{} polygons: {} exact, {} alias, {} substring, {} unmatched, {} unnamed",
        report.polygons,
        report.exact,
        report.alias,
        report.substring,
        report.unmatched.len(),
        report.nameless
    );
    if !report.records_without_polygon.is_empty() {
        eprintln!(
            "Countries without a polygon: {}",
            report.records_without_polygon.join(", ")
        );
    }

    if args.unmatched {
        emit(build_unmatched_rows(&report.unmatched), &report.unmatched, format)
    } else {
        emit(build_polygon_rows(&view.polygons), &view.polygons, format)
    }
}
