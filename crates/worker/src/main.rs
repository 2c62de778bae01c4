use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aivest_core::config::Settings;
use aivest_core::market::indicators;
use aivest_core::market::{HttpJsonMarketData, MarketDataClient};
use aivest_core::orchestrator::Analyzer;
use aivest_core::report;
use aivest_core::sanitize::sanitize;

#[derive(Debug, Parser)]
#[command(name = "aivest_worker")]
struct Args {
    /// Ticker symbol for a stock analysis.
    #[arg(long, conflicts_with = "company")]
    symbol: Option<String>,

    /// Company name for a 401k benefits analysis.
    #[arg(long)]
    company: Option<String>,

    /// History period requested from the market data service.
    #[arg(long, default_value = "1y")]
    period: String,

    /// Also write the flat CSV report to this path.
    #[arg(long)]
    csv_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let outcome = run(&settings, &args).await;
    if let Err(err) = &outcome {
        sentry_anyhow::capture_anyhow(err);
    }
    outcome
}

async fn run(settings: &Settings, args: &Args) -> anyhow::Result<()> {
    // Fatal on missing or non-ASCII credential, before anything is fetched.
    let analyzer = Analyzer::from_settings(settings)?;

    match (&args.symbol, &args.company) {
        (Some(symbol), None) => run_stock(settings, &analyzer, symbol, args).await,
        (None, Some(company)) => run_retirement(&analyzer, company, args).await,
        _ => anyhow::bail!("provide exactly one of --symbol or --company"),
    }
}

async fn run_stock(
    settings: &Settings,
    analyzer: &Analyzer,
    symbol: &str,
    args: &Args,
) -> anyhow::Result<()> {
    let market = HttpJsonMarketData::from_settings(settings)?;
    let symbol = symbol.trim().to_ascii_uppercase();

    let Some(snapshot) = market.fetch(&symbol, &args.period).await? else {
        anyhow::bail!("no market data for symbol {symbol}; check the ticker and try again");
    };

    let company = snapshot.company_name().unwrap_or("Unknown").to_string();
    if let Some(technical) = indicators::technical_indicators(&snapshot.candles) {
        tracing::info!(
            sessions = snapshot.candles.len(),
            current_price = technical.current_price,
            "price history loaded"
        );
    }

    let analysis = analyzer.analyze_stock(&symbol, &snapshot.info).await;
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    if let Some(path) = &args.csv_out {
        std::fs::write(path, report::stock_analysis_csv(&company, &symbol, &analysis))?;
        tracing::info!(path = %path.display(), "stock analysis report written");
    }

    Ok(())
}

async fn run_retirement(analyzer: &Analyzer, company: &str, args: &Args) -> anyhow::Result<()> {
    let analysis = analyzer.analyze_retirement_plan(company).await;
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    if let Some(path) = &args.csv_out {
        std::fs::write(path, report::retirement_csv(company, &analysis))?;
        tracing::info!(
            path = %path.display(),
            company = %sanitize(company),
            "401k analysis report written"
        );
    }

    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
