//! Binance spot API client for live prices and historical candles.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::debug;

use crate::error::CalcError;
use crate::models::{Candle, Interval};

use super::types::PriceTicker;

const BINANCE_API_BASE: &str = "https://api.binance.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the public Binance spot endpoints (read-only, no credentials).
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    /// Create a new client with the default endpoint and timeout.
    pub fn new() -> Result<Self> {
        Self::with_base_url(BINANCE_API_BASE.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Fetch the current ticker price for a symbol such as `BTCUSDT`.
    pub async fn current_price(&self, symbol: &str) -> Result<Decimal, CalcError> {
        let url = format!("{}/api/v3/ticker/price?symbol={}", self.base_url, symbol);

        debug!(url = %url, "Fetching ticker price");

        let quote_err = |reason: String| CalcError::QuoteUnavailable {
            symbol: symbol.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| quote_err(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(quote_err(format!("{status} - {body}")));
        }

        let ticker: PriceTicker = response
            .json()
            .await
            .map_err(|e| quote_err(format!("failed to parse ticker response: {e}")))?;

        Ok(ticker.price)
    }

    /// Fetch historical klines, ordered oldest-first as Binance returns them.
    pub async fn klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: u32,
    ) -> Result<Vec<Candle>, CalcError> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url, symbol, interval, limit
        );

        debug!(url = %url, "Fetching klines");

        let series_err = |reason: String| CalcError::SeriesUnavailable {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| series_err(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(series_err(format!("{status} - {body}")));
        }

        // Each kline is a heterogeneous array:
        // [open_time, open, high, low, close, volume, close_time, ...]
        let klines: Vec<Vec<serde_json::Value>> = response
            .json()
            .await
            .map_err(|e| series_err(format!("failed to parse klines response: {e}")))?;

        // One bad row invalidates the whole series; a silently shortened
        // history would skew the analysis downstream.
        let mut candles = Vec::with_capacity(klines.len());
        for (i, row) in klines.iter().enumerate() {
            match parse_kline(row) {
                Some(candle) => candles.push(candle),
                None => return Err(series_err(format!("malformed kline row at index {i}"))),
            }
        }

        debug!(symbol = %symbol, interval = %interval, count = candles.len(), "Klines fetched");

        Ok(candles)
    }
}

/// Parse one kline row; `None` when the row is too short or mistyped.
fn parse_kline(kline: &Vec<serde_json::Value>) -> Option<Candle> {
    if kline.len() < 6 {
        return None;
    }

    Some(Candle {
        open_time: Utc.timestamp_millis_opt(kline[0].as_i64()?).single()?,
        open: kline[1].as_str()?.parse().ok()?,
        high: kline[2].as_str()?.parse().ok()?,
        low: kline[3].as_str()?.parse().ok()?,
        close: kline[4].as_str()?.parse().ok()?,
        volume: kline[5].as_str()?.parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpListener};
    use std::thread::JoinHandle;

    /// Serve exactly one canned HTTP response on an ephemeral local port.
    fn serve_once(status_line: &'static str, body: &'static str) -> (SocketAddr, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        (addr, handle)
    }

    #[test]
    fn test_parse_kline_row() {
        let row: Vec<serde_json::Value> = serde_json::from_str(
            r#"[1700000000000, "100.5", "110.0", "99.0", "105.25", "1234.5", 1700000059999]"#,
        )
        .unwrap();

        let candle = parse_kline(&row).unwrap();
        assert_eq!(candle.open_time.timestamp_millis(), 1700000000000);
        assert_eq!(candle.open, 100.5);
        assert_eq!(candle.high, 110.0);
        assert_eq!(candle.low, 99.0);
        assert_eq!(candle.close, 105.25);
        assert_eq!(candle.volume, 1234.5);
    }

    #[test]
    fn test_unreachable_endpoint_maps_to_typed_errors() {
        // Port 9 (discard) is closed on any sane host; the connection is
        // refused immediately and must surface as the typed taxonomy.
        let client = BinanceClient::with_base_url("http://127.0.0.1:9".to_string()).unwrap();

        let err = tokio_test::block_on(client.current_price("BTCUSDT")).unwrap_err();
        assert!(matches!(err, CalcError::QuoteUnavailable { .. }));

        let err =
            tokio_test::block_on(client.klines("BTCUSDT", Interval::H1, 10)).unwrap_err();
        assert!(matches!(err, CalcError::SeriesUnavailable { .. }));
    }

    #[test]
    fn test_klines_fails_on_any_malformed_row() {
        // First row is valid, second encodes OHLCV as numbers instead of
        // strings. The whole series must be rejected, not shortened.
        let body = concat!(
            r#"[[1700000000000,"100.5","110.0","99.0","105.25","1234.5",1700000059999],"#,
            r#"[1700000060000,100.5,110.0,99.0,105.25,1234.5,1700000119999]]"#,
        );
        let (addr, handle) = serve_once("HTTP/1.1 200 OK", body);

        let client = BinanceClient::with_base_url(format!("http://{addr}")).unwrap();
        let err = tokio_test::block_on(client.klines("BTCUSDT", Interval::M1, 2)).unwrap_err();
        handle.join().unwrap();

        match err {
            CalcError::SeriesUnavailable { reason, .. } => {
                assert!(reason.contains("index 1"), "unexpected reason: {reason}");
            }
            other => panic!("expected SeriesUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_kline_rejects_short_or_mistyped_rows() {
        let short: Vec<serde_json::Value> =
            serde_json::from_str(r#"[1700000000000, "100.5"]"#).unwrap();
        assert!(parse_kline(&short).is_none());

        // Numbers where strings are expected.
        let mistyped: Vec<serde_json::Value> =
            serde_json::from_str(r#"[1700000000000, 100.5, 110.0, 99.0, 105.25, 1234.5]"#)
                .unwrap();
        assert!(parse_kline(&mistyped).is_none());
    }
}
