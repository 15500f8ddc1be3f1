use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use quotetrader::indicators::PivotAccumulator;
use quotetrader::settings::Settings;
use quotetrader::synthetic::{MarketScenario, SyntheticQuoteGenerator};
use quotetrader::{Instrument, Trader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quotetrader",
    about = "Pivot, hammer and dividend-window signals over daily quotes"
)]
struct Cli {
    /// Settings file (TOML). Defaults to ./quotetrader.toml if present.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Seed for the synthetic quote history.
    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,

    /// Number of days of synthetic history.
    #[arg(long, global = true, default_value_t = 90)]
    history: usize,

    /// First day of the synthetic history (YYYY-MM-DD).
    #[arg(long, global = true, default_value = "2024-01-01")]
    start: String,

    #[arg(long, global = true, value_enum, default_value_t = Scenario::Sideways)]
    scenario: Scenario,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print pivot support/resistance for the last day as JSON.
    Levels {
        /// Days before the last day to aggregate.
        #[arg(long, default_value_t = 10)]
        days: usize,
    },
    /// List the days that form a hammer or inverted hammer.
    Hammer,
    /// Walk the history day by day through the trader.
    Simulate,
}

#[derive(Clone, Copy, ValueEnum)]
enum Scenario {
    Uptrend,
    Downtrend,
    Sideways,
    Volatile,
}

impl From<Scenario> for MarketScenario {
    fn from(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Uptrend => MarketScenario::Uptrend,
            Scenario::Downtrend => MarketScenario::Downtrend,
            Scenario::Sideways => MarketScenario::Sideways,
            Scenario::Volatile => MarketScenario::Volatile,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    let start = NaiveDate::parse_from_str(&cli.start, "%Y-%m-%d")
        .with_context(|| format!("invalid start date '{}'", cli.start))?;

    let mut instrument = settings.instrument.build()?;
    SyntheticQuoteGenerator::new(cli.seed).fill(
        &mut instrument,
        cli.scenario.into(),
        start,
        cli.history,
    );

    let Some(last) = instrument.last_date() else {
        bail!("empty history, pass --history greater than 0");
    };

    tracing::info!(
        "📊 {} quotes for {} ({} to {})",
        instrument.len(),
        instrument.name(),
        start,
        last
    );

    match cli.command {
        Commands::Levels { days } => print_levels(&instrument, last, days),
        Commands::Hammer => print_hammers(&instrument, &settings),
        Commands::Simulate => simulate(instrument, &settings),
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quotetrader=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_levels(instrument: &Instrument, last: NaiveDate, days: usize) -> Result<()> {
    let period = instrument.support_for_period(last, days)?;

    let mut day = PivotAccumulator::new();
    day.feed(instrument.quote(last)?);

    let report = serde_json::json!({
        "instrument": instrument.name(),
        "date": last,
        "day": day.levels(),
        "period_days": days,
        "period": period.levels(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_hammers(instrument: &Instrument, settings: &Settings) -> Result<()> {
    let mut found = 0;
    for date in instrument.dates().skip(1) {
        let signal = match instrument.detect_hammer(date, &settings.hammer) {
            Ok(signal) => signal,
            Err(e) if e.is_missing_quote() => continue,
            Err(e) => return Err(e.into()),
        };

        if signal.is_hammer {
            found += 1;
            println!(
                "{}  {:<15} strength {:.2}",
                date,
                if signal.is_inverted { "inverted hammer" } else { "hammer" },
                signal.strength
            );
        }
    }

    tracing::info!("{} hammer days found", found);
    Ok(())
}

fn simulate(instrument: Instrument, settings: &Settings) -> Result<()> {
    let dates: Vec<NaiveDate> = instrument.dates().collect();
    let mut trader = Trader::new(settings.trader.clone());
    trader.track(instrument);

    let mut buys = 0;
    let mut sells = 0;
    for date in dates {
        match trader.decide_sell(date) {
            Ok(true) => sells += 1,
            Ok(false) => {}
            Err(e) if e.is_missing_quote() => continue,
            Err(e) => return Err(e.into()),
        }

        match trader.decide_buy(date) {
            Ok(true) => buys += 1,
            Ok(false) => {}
            // not enough history behind this date yet
            Err(e) if e.is_missing_quote() => continue,
            Err(e) => return Err(e.into()),
        }
    }

    println!("buys: {}, sells: {}, holding: {}", buys, sells, trader.is_holding());
    Ok(())
}
