use crate::domain::analysis::AnalysisResult;
use crate::domain::retirement::RetirementAnalysis;
use crate::prompt::thousands;
use serde_json::{Map, Value};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flat one-row stock report. The column set is fixed; downstream tooling
/// keys on these exact headers.
pub fn stock_analysis_csv(company: &str, symbol: &str, result: &AnalysisResult) -> String {
    let rec = &result.investment_recommendation;
    let metrics = &result.ai_metrics;

    let header = [
        "Company",
        "Symbol",
        "AI Investment Recommendation",
        "AI Score",
        "AI Revenue Exposure %",
        "AI Partnerships",
        "AI Patents",
        "AI Investment Score",
        "Analysis Date",
    ];
    let row = [
        company.to_string(),
        symbol.to_string(),
        rec.action.as_str().to_string(),
        number(rec.ai_score),
        format!("{:.1}", metrics.ai_revenue_exposure),
        metrics.ai_partnerships.to_string(),
        metrics.ai_patents.to_string(),
        number(metrics.ai_investment_score),
        result.analysis_timestamp.format(TIMESTAMP_FORMAT).to_string(),
    ];

    render(&header, &row)
}

/// Flat one-row 401k report.
pub fn retirement_csv(company: &str, analysis: &RetirementAnalysis) -> String {
    let header = [
        "Company",
        "Match Percentage",
        "Vesting Period",
        "Roth Available",
        "Max Match Salary %",
        "Optimization Score",
        "Primary Recommendation",
        "Roth vs Traditional",
        "Annual Savings Potential",
        "Analysis Date",
    ];
    let row = [
        company.to_string(),
        number(analysis.overview.match_percentage),
        analysis.overview.vesting_period.clone(),
        analysis.overview.roth_available.to_string(),
        number(analysis.overview.max_match_salary_percent),
        number(analysis.recommendation.optimization_score),
        analysis.recommendation.primary_advice.clone(),
        analysis.roth_analysis.recommendation.as_str().to_string(),
        analysis.contribution_strategy.annual_savings_potential.clone(),
        analysis.analysis_timestamp.format(TIMESTAMP_FORMAT).to_string(),
    ];

    render(&header, &row)
}

/// Metric/value table over the raw info block; optional upstream fields
/// render as N/A.
pub fn financial_summary_csv(info: &Map<String, Value>) -> String {
    let price = |key: &str| match field(info, key) {
        Some(v) => format!("${v:.2}"),
        None => "N/A".to_string(),
    };

    let market_cap = match field(info, "marketCap").filter(|v| *v > 0.0) {
        Some(v) => format!("${:.2}B", v / 1e9),
        None => "N/A".to_string(),
    };
    let volume = match field(info, "volume") {
        Some(v) => thousands(v as u64),
        None => "N/A".to_string(),
    };
    let pe_ratio = match field(info, "trailingPE") {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    };
    let dividend_yield = match field(info, "dividendYield") {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "N/A".to_string(),
    };
    let beta = match field(info, "beta") {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    };

    let rows = [
        ("Current Price", price("currentPrice")),
        ("Previous Close", price("previousClose")),
        ("Day High", price("dayHigh")),
        ("Day Low", price("dayLow")),
        ("Volume", volume),
        ("Market Cap", market_cap),
        ("P/E Ratio", pe_ratio),
        ("EPS", price("trailingEps")),
        ("Dividend Yield", dividend_yield),
        ("Beta", beta),
    ];

    let mut out = String::from("Metric,Value\n");
    for (metric, value) in rows {
        out.push_str(&escape(metric));
        out.push(',');
        out.push_str(&escape(&value));
        out.push('\n');
    }
    out
}

fn field(info: &Map<String, Value>, key: &str) -> Option<f64> {
    info.get(key).and_then(Value::as_f64)
}

/// Scores print without a trailing `.0` so integers stay integers.
fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn render(header: &[&str], row: &[String]) -> String {
    debug_assert_eq!(header.len(), row.len());
    let mut out = String::new();
    out.push_str(
        &header
            .iter()
            .map(|h| escape(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    out.push('\n');
    out.push_str(
        &row.iter()
            .map(|f| escape(f))
            .collect::<Vec<_>>()
            .join(","),
    );
    out.push('\n');
    out
}

fn escape(fieldtext: &str) -> String {
    if fieldtext.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", fieldtext.replace('"', "\"\""))
    } else {
        fieldtext.to_string()
    }
}
