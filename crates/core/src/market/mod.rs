pub mod indicators;
mod provider;

pub use provider::{HttpJsonMarketData, MarketDataClient};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Everything the market data service returns for one symbol. The info
/// block stays a raw JSON map: the upstream field set is wide and loosely
/// typed, and the orchestrator extracts what it needs with defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub info: Map<String, Value>,
    pub candles: Vec<Candle>,
    #[serde(default)]
    pub quarterly_financials: Value,
    #[serde(default)]
    pub balance_sheet: Value,
    #[serde(default)]
    pub cash_flow: Value,
}

impl MarketSnapshot {
    /// Usable means the info block identifies the company and at least one
    /// session of price history came back.
    pub fn is_usable(&self) -> bool {
        let has_symbol = self
            .info
            .get("symbol")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        has_symbol && !self.candles.is_empty()
    }

    pub fn company_name(&self) -> Option<&str> {
        self.info
            .get("longName")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_expected_response_shape() {
        let v = json!({
            "info": {"symbol": "EXMP", "longName": "Example Corp", "sector": "Technology"},
            "candles": [
                {"date": "2026-08-03", "open": 10.0, "high": 11.0, "low": 9.5, "close": 10.5, "volume": 1000.0}
            ],
            "quarterly_financials": {},
        });

        let snapshot: MarketSnapshot = serde_json::from_value(v).unwrap();
        assert!(snapshot.is_usable());
        assert_eq!(snapshot.company_name(), Some("Example Corp"));
        assert_eq!(snapshot.candles[0].close, 10.5);
        assert!(snapshot.balance_sheet.is_null());
    }

    #[test]
    fn snapshot_without_history_is_not_usable() {
        let v = json!({
            "info": {"symbol": "EXMP", "longName": "Example Corp"},
            "candles": [],
        });
        let snapshot: MarketSnapshot = serde_json::from_value(v).unwrap();
        assert!(!snapshot.is_usable());
    }

    #[test]
    fn snapshot_without_symbol_is_not_usable() {
        let v = json!({
            "info": {"longName": "Example Corp"},
            "candles": [
                {"date": "2026-08-03", "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0, "volume": 1.0}
            ],
        });
        let snapshot: MarketSnapshot = serde_json::from_value(v).unwrap();
        assert!(!snapshot.is_usable());
    }
}
