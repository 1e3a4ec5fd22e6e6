//! Technical summaries of candle series, one per timeframe, used to build
//! the advisory prompt.

use std::fmt;

use crate::models::{Candle, Interval};

/// How many of the most recent candles feed the summary.
const ANALYSIS_WINDOW: usize = 10;

/// Minimum candles required before a summary is meaningful.
const MIN_CANDLES: usize = 5;

/// Direction of the move across the analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Upward,
    Downward,
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Upward => "upward",
            Trend::Downward => "downward",
            Trend::Sideways => "sideways",
        };
        f.write_str(s)
    }
}

/// Key levels and trend for one timeframe.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeframeAnalysis {
    pub interval: Interval,
    /// Last close in the series.
    pub current_price: f64,
    /// Highest high over the window.
    pub high: f64,
    /// Lowest low over the window.
    pub low: f64,
    pub trend: Trend,
    /// Window range relative to the current price, in percent.
    pub volatility_pct: f64,
    pub avg_volume: f64,
    /// Last five closes, oldest first.
    pub recent_closes: Vec<f64>,
}

/// Summarize a candle series. Returns `None` when there is not enough data
/// to say anything useful.
pub fn analyze(candles: &[Candle], interval: Interval) -> Option<TimeframeAnalysis> {
    if candles.len() < MIN_CANDLES {
        return None;
    }

    let window = &candles[candles.len().saturating_sub(ANALYSIS_WINDOW)..];

    let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
    let current_price = *closes.last()?;
    let high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let avg_volume = window.iter().map(|c| c.volume).sum::<f64>() / window.len() as f64;

    let first_close = closes[0];
    let trend = if current_price > first_close {
        Trend::Upward
    } else if current_price < first_close {
        Trend::Downward
    } else {
        Trend::Sideways
    };

    let volatility_pct = if current_price > 0.0 {
        (high - low) / current_price * 100.0
    } else {
        0.0
    };

    let recent_closes = closes[closes.len().saturating_sub(5)..].to_vec();

    Some(TimeframeAnalysis {
        interval,
        current_price,
        high,
        low,
        trend,
        volatility_pct,
        avg_volume,
        recent_closes,
    })
}

impl TimeframeAnalysis {
    /// Render the block embedded into the advisory prompt.
    pub fn summary(&self) -> String {
        let closes = self
            .recent_closes
            .iter()
            .map(|c| format!("{c:.4}"))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{} Analysis:\n\
             - Trend: {}\n\
             - Volatility: {:.2}%\n\
             - 10-period High: ${:.4}\n\
             - 10-period Low: ${:.4}\n\
             - Recent closes: [{}]\n",
            self.interval, self.trend, self.volatility_pct, self.high, self.low, closes
        )
    }
}
