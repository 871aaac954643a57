//! # Dynamic Item Pricing with Persisted Market State
//!
//! A thread-safe pricing engine for shops whose item prices react to supply:
//! every purchase depletes stock and raises the price, every sale adds stock
//! and lowers it. Stock survives restarts through a small on-disk market
//! state.
//!
//! ## Pricing Model
//!
//! The unit price at stock `x` is `b * e^(-x/s)`, with `b` the base price and
//! `s` the spread (larger spread, slower price movement). The price of a trade
//! is the integral of the unit price over the stock range the trade covers:
//!
//! - buying `q` units at stock `x`: `s * (e^(-(x-q)/s) - e^(-x/s))`
//! - selling `q` units at stock `x`: `s * (e^(-x/s) - e^(-(x+q)/s))`
//!
//! The base price is folded into the stock counter once, as the offset
//! `-s * ln(b)`, so later queries only need the spread and the counter.
//!
//! ## Item Lifecycle
//!
//! Each item lives in a [`Registry`] entry that is created on first use and
//! only ever moves forward:
//!
//! - **Unpriced**: the host declared a zero base price; no dynamic pricing.
//! - **Stock-known**: stock was recovered from disk, the spread is not yet
//!   known.
//! - **Priced**: fully initialized; supports price queries and trades.
//!
//! Promotion from stock-known to priced happens on the first price query with
//! a nonzero base price. It reuses the existing counter, so no trade racing
//! with it can be lost.
//!
//! ## Concurrency
//!
//! - Creation and promotion are exclusive per key (`DashMap` entry locking)
//!   without serializing unrelated keys.
//! - Trades use a lock-free atomic add on the shared counter.
//! - Price queries on priced items read a counter snapshot and never block on
//!   I/O. Concurrent trades on one item may each be priced against a stock
//!   level the other is about to change.
//!
//! ## Persistence
//!
//! With `save-market-state` enabled, [`PricingService::open`] loads one file
//! per item from the `market-state` directory before returning, fanning out to
//! a bounded pool of worker threads from ten files upward, and
//! [`PricingService::close`] writes the stock and spread of every priced item
//! back.
//!
//! ## Example
//!
//! ```rust
//! use market_pricer::prelude::*;
//!
//! # fn main() -> Result<(), PricerError> {
//! let dir = std::env::temp_dir().join("market-pricer-doc");
//! let service = PricingService::with_config(PricerConfig::default(), &dir)?;
//!
//! let price = service.calculate_buy_price("DIAMOND", 1, 50.0, 20.0)?;
//! service.buy_item("DIAMOND", 1)?;
//! let after = service.calculate_sell_price("DIAMOND", 1, 50.0, 20.0)?;
//! assert!(after < price);
//!
//! service.close()?;
//! # Ok(())
//! # }
//! ```

pub mod pricer;

pub mod prelude;

pub use pricer::config::{
    CONFIG_FILE_NAME, DEFAULT_MARKET_STATE_DIR, DEFAULT_PARALLEL_IO_THRESHOLD, PricerConfig,
};
pub use pricer::formula;
pub use pricer::{
    ItemState, LoadReport, MarketStateStore, PriceProvider, PricedEntry, PricedItem,
    PricerError, PricingService, Registry, SaveReport, StockCounter, StockOnly,
};
