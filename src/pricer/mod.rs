//! Dynamic item pricing: formula, per-item lifecycle, registry and persistence.

/// Service configuration loaded from the data directory.
pub mod config;
pub mod error;
/// Exponential pricing function and its integral.
pub mod formula;
pub mod item;
/// Market-state load/save.
pub mod persistence;
pub mod registry;
/// Service lifecycle and the host-facing [`PriceProvider`] trait.
pub mod service;
mod stock;

pub use config::PricerConfig;
pub use error::PricerError;
pub use item::{ItemState, PricedItem, StockOnly};
pub use persistence::{LoadReport, MarketStateStore, SaveReport};
pub use registry::{PricedEntry, Registry};
pub use service::{PriceProvider, PricingService};
pub use stock::StockCounter;
