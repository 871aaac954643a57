/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Pricing service lifecycle and the host-facing price provider interface.
//!
//! [`PricingService`] owns one [`Registry`] for its whole lifetime: it is
//! built by [`open`](PricingService::open), which loads persisted market state
//! and only returns once loading finished, and torn down by
//! [`close`](PricingService::close), which saves priced items and clears the
//! registry. Hosts talk to it through the [`PriceProvider`] trait.

use super::config::PricerConfig;
use super::error::PricerError;
use super::persistence::{LoadReport, MarketStateStore, SaveReport};
use super::registry::Registry;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

/// Dynamic price source consumed by a shop host.
///
/// The host's static buy price is used as the base price and its static sell
/// price as the spread. A trade must always be preceded by a price query for
/// the same item.
pub trait PriceProvider: Send + Sync {
    /// Price of buying `quantity` units of `item`.
    fn calculate_buy_price(
        &self,
        item: &str,
        quantity: u32,
        static_buy_price: f64,
        static_sell_price: f64,
    ) -> Result<f64, PricerError>;

    /// Price of selling `quantity` units of `item`.
    fn calculate_sell_price(
        &self,
        item: &str,
        quantity: u32,
        static_buy_price: f64,
        static_sell_price: f64,
    ) -> Result<f64, PricerError>;

    /// Record that `quantity` units of `item` were bought.
    fn buy_item(&self, item: &str, quantity: u32) -> Result<(), PricerError>;

    /// Record that `quantity` units of `item` were sold.
    fn sell_item(&self, item: &str, quantity: u32) -> Result<(), PricerError>;
}

/// A pricing registry bound to its configuration and market-state store.
#[derive(Debug)]
pub struct PricingService {
    config: PricerConfig,
    registry: Registry,
    store: MarketStateStore,
    closed: AtomicBool,
}

impl PricingService {
    /// Start a service for `data_dir`, reading `config.json` from it.
    ///
    /// A configuration that cannot be read is logged and replaced by the
    /// defaults, which leaves persistence disabled.
    ///
    /// # Errors
    ///
    /// [`PricerError::WorkerPanicked`] if the parallel load failed.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, PricerError> {
        let config = PricerConfig::load(&data_dir).unwrap_or_else(|e| {
            warn!("{e}; continuing with default configuration");
            PricerConfig::default()
        });
        Self::with_config(config, data_dir)
    }

    /// Start a service for `data_dir` with an explicit configuration.
    ///
    /// When persistence is enabled the market state is loaded before this
    /// returns, so no query can observe a partially loaded registry.
    ///
    /// # Errors
    ///
    /// [`PricerError::WorkerPanicked`] if the parallel load failed.
    pub fn with_config<P: AsRef<Path>>(
        config: PricerConfig,
        data_dir: P,
    ) -> Result<Self, PricerError> {
        let dir: PathBuf = data_dir.as_ref().join(&config.market_state_dir);
        let service = Self {
            store: MarketStateStore::new(dir, config.parallel_io_threshold),
            registry: Registry::new(),
            config,
            closed: AtomicBool::new(false),
        };
        let report = service.load()?;
        info!(
            "pricing service started with {} stock-only items",
            report.loaded
        );
        Ok(service)
    }

    /// Load persisted market state, or do nothing if persistence is disabled.
    fn load(&self) -> Result<LoadReport, PricerError> {
        if !self.config.save_market_state {
            return Ok(LoadReport::default());
        }
        self.store.load_into(&self.registry)
    }

    /// Save priced items (if persistence is enabled) and clear the registry.
    ///
    /// Only the first call has any effect; later calls return an empty report.
    ///
    /// # Errors
    ///
    /// [`PricerError::WorkerPanicked`] if the parallel save failed. The
    /// registry is cleared regardless.
    pub fn close(&self) -> Result<SaveReport, PricerError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(SaveReport::default());
        }
        let result = if self.config.save_market_state {
            self.store.save_from(&self.registry)
        } else {
            Ok(SaveReport::default())
        };
        self.registry.clear();
        info!("pricing service closed");
        result
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &PricerConfig {
        &self.config
    }

    /// The market-state directory used by this service.
    #[must_use]
    pub fn market_state_dir(&self) -> &Path {
        self.store.dir()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self, item: &str) -> Result<(), PricerError> {
        if self.is_closed() {
            error!("{item}: pricing service used after close");
            return Err(PricerError::Closed);
        }
        Ok(())
    }
}

impl PriceProvider for PricingService {
    fn calculate_buy_price(
        &self,
        item: &str,
        quantity: u32,
        static_buy_price: f64,
        static_sell_price: f64,
    ) -> Result<f64, PricerError> {
        self.ensure_open(item)?;
        self.registry
            .price_for_buy(item, quantity, static_buy_price, static_sell_price)
    }

    fn calculate_sell_price(
        &self,
        item: &str,
        quantity: u32,
        static_buy_price: f64,
        static_sell_price: f64,
    ) -> Result<f64, PricerError> {
        self.ensure_open(item)?;
        self.registry
            .price_for_sell(item, quantity, static_buy_price, static_sell_price)
    }

    fn buy_item(&self, item: &str, quantity: u32) -> Result<(), PricerError> {
        self.ensure_open(item)?;
        self.registry.apply_buy(item, quantity).map(|_| ())
    }

    fn sell_item(&self, item: &str, quantity: u32) -> Result<(), PricerError> {
        self.ensure_open(item)?;
        self.registry.apply_sell(item, quantity).map(|_| ())
    }
}
