//! Data models shared across the calculator and the API clients.

mod candle;

pub use candle::{Candle, Interval};
