use crate::market::Candle;
use serde::Serialize;

const SMA_SHORT_WINDOW: usize = 20;
const SMA_LONG_WINDOW: usize = 50;
const RSI_WINDOW: usize = 14;
const VOLUME_WINDOW: usize = 20;
const CHANGE_LOOKBACK: usize = 30;

/// Basic technical readout over the price history. Windows that exceed the
/// available history yield None rather than a partial value.
#[derive(Debug, Clone, Serialize)]
pub struct TechnicalIndicators {
    pub current_price: f64,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub rsi_14: Option<f64>,
    pub volume_avg_20: f64,
    pub price_change_30d_percent: Option<f64>,
}

pub fn technical_indicators(candles: &[Candle]) -> Option<TechnicalIndicators> {
    let last = candles.last()?;
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let volume_tail = &candles[candles.len().saturating_sub(VOLUME_WINDOW)..];
    let volume_avg_20 =
        volume_tail.iter().map(|c| c.volume).sum::<f64>() / volume_tail.len() as f64;

    Some(TechnicalIndicators {
        current_price: last.close,
        sma_20: sma(&closes, SMA_SHORT_WINDOW),
        sma_50: sma(&closes, SMA_LONG_WINDOW),
        rsi_14: rsi(&closes, RSI_WINDOW),
        volume_avg_20,
        price_change_30d_percent: price_change(&closes, CHANGE_LOOKBACK),
    })
}

fn sma(closes: &[f64], window: usize) -> Option<f64> {
    if closes.len() < window {
        return None;
    }
    let tail = &closes[closes.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

/// Simplified RSI: mean gain over mean loss across the last `window`
/// deltas, not Wilder smoothing.
fn rsi(closes: &[f64], window: usize) -> Option<f64> {
    if closes.len() < window + 1 {
        return None;
    }

    let tail = &closes[closes.len() - (window + 1)..];
    let mut gain = 0.0;
    let mut loss = 0.0;
    for pair in tail.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gain += delta;
        } else {
            loss -= delta;
        }
    }

    let avg_gain = gain / window as f64;
    let avg_loss = loss / window as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

fn price_change(closes: &[f64], lookback: usize) -> Option<f64> {
    if closes.len() < lookback {
        return None;
    }
    let base = closes[closes.len() - lookback];
    if base == 0.0 {
        return None;
    }
    let current = *closes.last()?;
    Some((current - base) / base * 100.0)
}
