//! Error taxonomy for the calculator and its external collaborators.

use thiserror::Error;

/// Errors surfaced by the core calculation and the API clients.
#[derive(Error, Debug)]
pub enum CalcError {
    /// Bad numeric arguments to the core calculation. Fatal to that call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The live price ticker could not be fetched or parsed. Not retried.
    #[error("quote unavailable for {symbol}: {reason}")]
    QuoteUnavailable { symbol: String, reason: String },

    /// The candlestick endpoint could not be fetched or parsed. Not retried.
    #[error("candle series unavailable for {symbol} ({interval}): {reason}")]
    SeriesUnavailable {
        symbol: String,
        interval: String,
        reason: String,
    },

    /// The advisory completion call failed outright (credentials, transport,
    /// or an API-level error).
    #[error("advisory service unavailable: {0}")]
    AdvisoryUnavailable(String),

    /// The advisory service answered but not with the expected JSON schema.
    /// Carries the raw text so callers can fall back to displaying it.
    #[error("advisory response did not match the expected schema")]
    AdvisoryMalformed { raw: String },
}
