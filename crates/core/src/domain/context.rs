use serde_json::{Map, Value};

/// Company descriptive fields derived from the market data info block.
/// Built once per analysis run; missing fields default instead of failing.
#[derive(Debug, Clone)]
pub struct CompanyContext {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub business_summary: String,
    pub market_cap: f64,
    pub employees: u64,
    pub revenue: f64,
    pub website: String,
    pub country: String,
}

impl CompanyContext {
    pub fn from_info(symbol: &str, info: &Map<String, Value>) -> Self {
        Self {
            symbol: symbol.trim().to_string(),
            name: text_field(info, "longName", "Unknown"),
            sector: text_field(info, "sector", "Unknown"),
            industry: text_field(info, "industry", "Unknown"),
            business_summary: text_field(info, "longBusinessSummary", ""),
            market_cap: numeric_field(info, "marketCap"),
            employees: info
                .get("fullTimeEmployees")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            revenue: numeric_field(info, "totalRevenue"),
            website: text_field(info, "website", ""),
            country: text_field(info, "country", "Unknown"),
        }
    }
}

fn text_field(info: &Map<String, Value>, key: &str, default: &str) -> String {
    info.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn numeric_field(info: &Map<String, Value>, key: &str) -> f64 {
    info.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn builds_from_complete_info() {
        let info = info(json!({
            "longName": "Example Corp",
            "sector": "Technology",
            "industry": "Software",
            "longBusinessSummary": "Makes things.",
            "marketCap": 2_500_000_000.0_f64,
            "fullTimeEmployees": 1234,
            "totalRevenue": 900_000_000.0_f64,
            "website": "https://example.com",
            "country": "United States",
        }));

        let ctx = CompanyContext::from_info("EXMP", &info);
        assert_eq!(ctx.name, "Example Corp");
        assert_eq!(ctx.sector, "Technology");
        assert_eq!(ctx.employees, 1234);
        assert_eq!(ctx.market_cap, 2_500_000_000.0);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let ctx = CompanyContext::from_info("EXMP", &Map::new());
        assert_eq!(ctx.name, "Unknown");
        assert_eq!(ctx.sector, "Unknown");
        assert_eq!(ctx.business_summary, "");
        assert_eq!(ctx.website, "");
        assert_eq!(ctx.market_cap, 0.0);
        assert_eq!(ctx.employees, 0);
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let info = info(json!({"longName": "   ", "sector": ""}));
        let ctx = CompanyContext::from_info("EXMP", &info);
        assert_eq!(ctx.name, "Unknown");
        assert_eq!(ctx.sector, "Unknown");
    }
}
