mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::args::SourceArgs;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "cyberrisk")]
#[command(about = "Explore country-level cyber-risk indicators")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List countries matching the filter
    Filter(commands::filter::FilterCmdArgs),
    /// Indicator means per region
    Regions(commands::regions::RegionsArgs),
    /// Indicator means per risk category
    Categories(commands::categories::CategoriesArgs),
    /// Highest or lowest risk countries
    Rank(commands::rank::RankArgs),
    /// Side-by-side indicators for up to eight countries
    Compare(commands::compare::CompareArgs),
    /// Match map polygons to countries and show their colors
    Map(commands::map::MapArgs),
    /// Ask the risk service to score a set of indicators
    Predict(commands::predict::PredictArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cyberrisk=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    match &cli.command {
        Commands::Filter(args) => commands::filter::run(args, &cli.source, &format).await?,
        Commands::Regions(args) => commands::regions::run(args, &cli.source, &format).await?,
        Commands::Categories(args) => {
            commands::categories::run(args, &cli.source, &format).await?
        }
        Commands::Rank(args) => commands::rank::run(args, &cli.source, &format).await?,
        Commands::Compare(args) => commands::compare::run(args, &cli.source, &format).await?,
        Commands::Map(args) => commands::map::run(args, &cli.source, &format).await?,
        Commands::Predict(args) => commands::predict::run(args, &cli.source, &format).await?,
    }

    Ok(())
}
