mod commands;
mod logging;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::Context;

#[derive(Parser)]
#[command(name = "panchang", version)]
#[command(about = "Fetch, cache and browse Panchang (Hindu lunar calendar) data")]
struct Cli {
    /// Latitude of the observer, in degrees (defaults to [location] in config.toml)
    #[arg(long, global = true, allow_negative_numbers = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude of the observer, in degrees
    #[arg(long, global = true, allow_negative_numbers = true, requires = "lat")]
    lon: Option<f64>,

    /// Print the result as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show an arbitrary span of days
    Range {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day, inclusive (YYYY-MM-DD, defaults to --from)
        #[arg(long)]
        to: Option<String>,

        /// Skip the cache and fetch again
        #[arg(long)]
        refresh: bool,
    },
    /// Show one Gregorian month
    Month {
        year: i32,

        /// Month number (1-12) or name ("march", "Mar")
        month: String,
    },
    /// Show a whole Gregorian year
    Year { year: i32 },
    /// Show today's panchang in detail
    Today {
        /// Skip the cache and fetch again
        #[arg(long)]
        refresh: bool,
    },
    /// Check the provider credentials by requesting a token
    Auth,
    /// Remove every cached calendar batch
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Range { from, to, refresh } => {
            let ctx = Context::load(cli.lat, cli.lon, cli.json)?;
            commands::range::run(&ctx, &from, to.as_deref(), refresh).await
        }
        Commands::Month { year, month } => {
            let ctx = Context::load(cli.lat, cli.lon, cli.json)?;
            commands::month::run(&ctx, year, &month).await
        }
        Commands::Year { year } => {
            let ctx = Context::load(cli.lat, cli.lon, cli.json)?;
            commands::year::run(&ctx, year).await
        }
        Commands::Today { refresh } => {
            let ctx = Context::load(cli.lat, cli.lon, cli.json)?;
            commands::today::run(&ctx, refresh).await
        }
        Commands::Auth => commands::auth::run().await,
        Commands::ClearCache => commands::clear_cache::run().await,
    }
}
