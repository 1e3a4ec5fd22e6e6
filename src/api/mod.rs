//! API clients for the external collaborators: the Binance spot endpoints
//! and the OpenAI advisory service.

mod binance;
mod openai;
mod types;

pub use binance::BinanceClient;
pub use openai::{AdvisorClient, OPENAI_KEY_VAR};
pub use types::*;
