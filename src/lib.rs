//! crypto-scanner: periodic batch analysis of Polymarket crypto markets.
//!
//! Three entry points share this library:
//! - `scanner` fetches active markets, classifies the crypto-related ones,
//!   enriches them with Binance candles and stored price history, and writes
//!   the filtered/sorted opportunity document.
//! - `collect` appends one price snapshot per crypto market to the bounded
//!   per-market history store.
//! - `render` substitutes the opportunity array into the static HTML report.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod report;
pub mod store;
pub mod types;
