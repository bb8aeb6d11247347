mod classify;
mod symbols;

pub use classify::{analyze_market, extract_prices, is_crypto_market, market_id, time_left_ms};
pub use symbols::{extract_symbol, is_crypto_related};
