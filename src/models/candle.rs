//! Candlestick model for the Binance klines endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kline interval accepted by the Binance API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// One minute
    M1,
    /// Fifteen minutes
    M15,
    /// One hour
    H1,
    /// One week
    W1,
    /// One month
    Mo1,
}

impl Interval {
    /// The interval string the API expects (`1m`, `15m`, `1h`, `1w`, `1M`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M15 => "15m",
            Interval::H1 => "1h",
            Interval::W1 => "1w",
            Interval::Mo1 => "1M",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// When the candle opened.
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}
