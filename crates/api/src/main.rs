use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aivest_core::domain::analysis::AnalysisResult;
use aivest_core::domain::retirement::RetirementAnalysis;
use aivest_core::market::indicators::{self, TechnicalIndicators};
use aivest_core::market::{HttpJsonMarketData, MarketDataClient};
use aivest_core::orchestrator::Analyzer;
use aivest_core::report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = aivest_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Configuration errors are fatal here: a missing or non-ASCII credential
    // never degrades into a half-working service.
    let analyzer = Arc::new(Analyzer::from_settings(&settings)?);
    let market: Arc<dyn MarketDataClient> = Arc::new(HttpJsonMarketData::from_settings(&settings)?);

    let state = AppState { analyzer, market };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/stocks/:symbol/analysis", get(get_stock_analysis))
        .route("/stocks/:symbol/analysis.csv", get(get_stock_analysis_csv))
        .route("/stocks/:symbol/financials.csv", get(get_financials_csv))
        .route("/retirement/:company/analysis", get(get_retirement_analysis))
        .route(
            "/retirement/:company/analysis.csv",
            get(get_retirement_analysis_csv),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    analyzer: Arc<Analyzer>,
    market: Arc<dyn MarketDataClient>,
}

#[derive(Debug, Deserialize)]
struct AnalysisQuery {
    #[serde(default = "default_period")]
    period: String,
}

fn default_period() -> String {
    "1y".to_string()
}

#[derive(Debug, Serialize)]
struct StockAnalysisResponse {
    company: String,
    symbol: String,
    technical: Option<TechnicalIndicators>,
    analysis: AnalysisResult,
}

async fn get_stock_analysis(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<StockAnalysisResponse>, StatusCode> {
    let (company, symbol, technical, analysis) =
        run_stock_analysis(&state, &symbol, &query.period).await?;

    Ok(Json(StockAnalysisResponse {
        company,
        symbol,
        technical,
        analysis,
    }))
}

async fn get_stock_analysis_csv(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<([(header::HeaderName, &'static str); 1], String), StatusCode> {
    let (company, symbol, _, analysis) =
        run_stock_analysis(&state, &symbol, &query.period).await?;

    let body = report::stock_analysis_csv(&company, &symbol, &analysis);
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body))
}

async fn get_financials_csv(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<([(header::HeaderName, &'static str); 1], String), StatusCode> {
    let symbol = normalize_symbol(&symbol);
    let snapshot = fetch_snapshot(&state, &symbol, &query.period).await?;

    let body = report::financial_summary_csv(&snapshot.info);
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body))
}

async fn get_retirement_analysis(
    State(state): State<AppState>,
    Path(company): Path<String>,
) -> Json<RetirementAnalysis> {
    Json(state.analyzer.analyze_retirement_plan(&company).await)
}

async fn get_retirement_analysis_csv(
    State(state): State<AppState>,
    Path(company): Path<String>,
) -> ([(header::HeaderName, &'static str); 1], String) {
    let analysis = state.analyzer.analyze_retirement_plan(&company).await;
    let body = report::retirement_csv(&company, &analysis);
    ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body)
}

async fn run_stock_analysis(
    state: &AppState,
    symbol: &str,
    period: &str,
) -> Result<
    (
        String,
        String,
        Option<TechnicalIndicators>,
        AnalysisResult,
    ),
    StatusCode,
> {
    let symbol = normalize_symbol(symbol);
    let snapshot = fetch_snapshot(state, &symbol, period).await?;

    let company = snapshot.company_name().unwrap_or("Unknown").to_string();
    let technical = indicators::technical_indicators(&snapshot.candles);
    let analysis = state.analyzer.analyze_stock(&symbol, &snapshot.info).await;

    Ok((company, symbol, technical, analysis))
}

async fn fetch_snapshot(
    state: &AppState,
    symbol: &str,
    period: &str,
) -> Result<aivest_core::market::MarketSnapshot, StatusCode> {
    state
        .market
        .fetch(symbol, period)
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        // invalid symbol: analysis is not attempted
        .ok_or(StatusCode::NOT_FOUND)
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &aivest_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
