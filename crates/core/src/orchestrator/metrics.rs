use crate::domain::analysis::{AiMetrics, AiStrategy};

// Relative AI exposure weight per sector; anything unlisted gets the
// default.
const SECTOR_MULTIPLIERS: &[(&str, f64)] = &[
    ("Technology", 1.5),
    ("Communication Services", 1.2),
    ("Consumer Cyclical", 1.0),
    ("Healthcare", 1.1),
    ("Financial Services", 1.1),
    ("Industrials", 0.8),
    ("Consumer Defensive", 0.7),
];
const DEFAULT_MULTIPLIER: f64 = 0.8;

pub fn sector_multiplier(sector: &str) -> f64 {
    SECTOR_MULTIPLIERS
        .iter()
        .find(|(name, _)| *name == sector)
        .map_or(DEFAULT_MULTIPLIER, |(_, m)| *m)
}

/// Deterministic derivation from the AI-strategy stage output. No network
/// involved; this runs the same whether the stage generated or fell back.
pub fn derive(sector: &str, strategy: &AiStrategy) -> AiMetrics {
    let maturity = strategy.ai_maturity_score;
    let initiatives = strategy.ai_initiatives.len() as f64;
    let partnerships = strategy.partnerships.len();

    let exposure = (sector_multiplier(sector) * maturity * 2.0 + initiatives * 5.0).min(100.0);
    let exposure = (exposure * 10.0).round() / 10.0;

    let patents = ((maturity * 10.0).round() as i64 + partnerships as i64 * 5).max(0);

    AiMetrics {
        ai_revenue_exposure: exposure,
        ai_partnerships: partnerships as u32,
        ai_patents: patents as u32,
        ai_investment_score: maturity,
    }
}
