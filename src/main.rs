use anyhow::{Context, Result};
use clap::Parser;
use market_data_fetcher::utils::parse_date_bound;
use market_data_fetcher::{Config, DateRange, FetchMode, Fetched, Fetcher, SqliteProvider};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Pull price history or company financials for one or more tickers
#[derive(Parser, Debug)]
#[command(name = "market-data-fetcher", version, about)]
struct Cli {
    /// Ticker symbols to fetch
    #[arg(required = true)]
    tickers: Vec<String>,

    /// minute, 5minutes, 15minutes, hour or daily
    #[arg(short, long, default_value = "daily")]
    granularity: String,

    /// Inclusive start, YYYY-MM-DD or YYYY-MM-DD HH:MM:SS
    #[arg(long)]
    start: Option<String>,

    /// Inclusive end, YYYY-MM-DD or YYYY-MM-DD HH:MM:SS
    #[arg(long)]
    end: Option<String>,

    /// Return one table for all tickers instead of one per ticker
    #[arg(long)]
    combine: bool,

    /// Fetch company financials instead of prices
    #[arg(long)]
    fundamentals: bool,

    /// Overrides DATABASE_PATH
    #[arg(long)]
    database: Option<String>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("market_data_fetcher=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    info!("💾 Using database at {}", config.database_path);

    let start = cli.start.as_deref().map(parse_date_bound).transpose()?;
    let end = cli.end.as_deref().map(parse_date_bound).transpose()?;
    let range = DateRange::from_timestamps(start, end);
    let mode = FetchMode::from(cli.combine);

    let fetcher = Fetcher::new(SqliteProvider::from_config(&config), cli.tickers)?;
    let fetched = if cli.fundamentals {
        fetcher.retrieve_fundamentals(mode)?
    } else {
        fetcher.retrieve_time_series_by_name(&cli.granularity, &range, mode)?
    };

    match fetched {
        Fetched::Combined(df) => println!("{}", df),
        Fetched::Separated(frames) => {
            for ticker in fetcher.tickers() {
                if let Some(df) = frames.get(ticker) {
                    println!("{}\n{}", ticker, df);
                }
            }
        }
    }

    Ok(())
}
