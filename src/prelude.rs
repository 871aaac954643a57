/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Prelude module that re-exports commonly used types and traits.
//!
//! ```rust
//! use market_pricer::prelude::*;
//! ```

// Service and host interface
pub use crate::pricer::service::{PriceProvider, PricingService};

// Registry and item lifecycle
pub use crate::pricer::item::{ItemState, PricedItem, StockOnly};
pub use crate::pricer::registry::{PricedEntry, Registry};

// Configuration and persistence
pub use crate::pricer::config::PricerConfig;
pub use crate::pricer::persistence::{LoadReport, MarketStateStore, SaveReport};

// Errors
pub use crate::pricer::error::PricerError;

// Pricing functions
pub use crate::pricer::formula::{buy_price, sell_price};
