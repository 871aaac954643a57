/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Concurrent item pricing registry.
//!
//! [`Registry`] maps item keys to their [`ItemState`] in a `DashMap`. Entries
//! are created lazily by the first price query for a key, or up front by the
//! market-state loader as stock-only entries.
//!
//! # Concurrency
//!
//! Creation and promotion go through `DashMap::entry`, which holds the write
//! lock of the key's shard for the whole decision, so two first queries for
//! the same key cannot both create a counter and a promotion cannot interleave
//! with a creation. Other shards stay available. Items already in a terminal
//! stage are served from a shared read lock.
//!
//! Trades clone the counter handle out of the map and mutate it with an atomic
//! add, independently of the shard locks. Prices computed concurrently with
//! trades on the same item are best-effort: each query sees some consistent
//! counter value, not necessarily the one the trade ends up applying to.

use super::error::PricerError;
use super::formula;
use super::item::{ItemState, PricedItem, StockOnly};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, error, trace};

/// Persistable view of one priced entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedEntry {
    /// Item key
    pub key: String,
    /// Stock with the base-price offset removed
    pub stock: f64,
    /// Spread in effect
    pub spread: f64,
}

/// Concurrent map from item key to pricing state.
#[derive(Debug, Default)]
pub struct Registry {
    items: DashMap<String, ItemState>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }

    /// Return the state of `key`, creating or promoting it first if needed.
    ///
    /// - absent: `Unpriced` when `base == 0`, otherwise `Priced` with a fresh
    ///   counter at `-spread * ln(base)`
    /// - `StockKnown` with `base > 0`: promoted to `Priced`, keeping its
    ///   counter and shifting it by the same offset
    /// - `Unpriced` or `Priced`: returned unchanged, whatever the arguments
    ///
    /// # Errors
    ///
    /// Returns [`PricerError::InvalidParameters`] when `base`/`spread` are
    /// outside the pricing function's domain and would be used to create or
    /// promote the item.
    pub fn resolve_or_create(
        &self,
        key: &str,
        base: f64,
        spread: f64,
    ) -> Result<ItemState, PricerError> {
        if let Some(existing) = self.items.get(key) {
            match existing.value() {
                ItemState::Unpriced | ItemState::Priced(_) => return Ok(existing.value().clone()),
                ItemState::StockKnown(_) => {}
            }
        }

        let state = match self.items.entry(key.to_owned()) {
            Entry::Vacant(vacant) => {
                checked_parameters(key, base, spread)?;
                let state = if base == 0.0 {
                    ItemState::Unpriced
                } else {
                    ItemState::Priced(PricedItem::from_base_and_spread(base, spread))
                };
                debug!("created {} item {key}", state.stage());
                vacant.insert(state).value().clone()
            }
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                if base > 0.0 && matches!(slot, ItemState::StockKnown(_)) {
                    checked_parameters(key, base, spread)?;
                    if let ItemState::StockKnown(partial) =
                        std::mem::replace(slot, ItemState::Unpriced)
                    {
                        if partial.recorded_spread().is_some_and(|recorded| recorded != spread) {
                            debug!("{key}: spread differs from the one saved with its stock");
                        }
                        let offset = formula::base_offset(base, spread);
                        *slot = ItemState::Priced(partial.promote(spread, offset));
                        debug!("promoted {key} to priced with spread {spread}");
                    }
                }
                slot.clone()
            }
        };
        Ok(state)
    }

    /// Price of buying `quantity` units of `key`.
    ///
    /// # Errors
    ///
    /// [`PricerError::NotPriced`] if the item resolves to `Unpriced` or
    /// `StockKnown`, [`PricerError::InvalidParameters`] for out-of-domain
    /// parameters.
    pub fn price_for_buy(
        &self,
        key: &str,
        quantity: u32,
        base: f64,
        spread: f64,
    ) -> Result<f64, PricerError> {
        let item = self.resolve_priced(key, base, spread)?;
        let price = item.buy_price(f64::from(quantity));
        trace!("buy price for {quantity} x {key}: {price}");
        Ok(price)
    }

    /// Price of selling `quantity` units of `key`.
    ///
    /// # Errors
    ///
    /// Same as [`price_for_buy`](Registry::price_for_buy).
    pub fn price_for_sell(
        &self,
        key: &str,
        quantity: u32,
        base: f64,
        spread: f64,
    ) -> Result<f64, PricerError> {
        let item = self.resolve_priced(key, base, spread)?;
        let price = item.sell_price(f64::from(quantity));
        trace!("sell price for {quantity} x {key}: {price}");
        Ok(price)
    }

    /// Add `quantity` to the stock of `key`, returning the new counter value.
    ///
    /// # Errors
    ///
    /// [`PricerError::UnknownItem`] if `key` was never priced,
    /// [`PricerError::NotPriced`] if it is not in the `Priced` stage.
    pub fn apply_buy(&self, key: &str, quantity: u32) -> Result<f64, PricerError> {
        let value = self.priced(key)?.buy(f64::from(quantity));
        trace!("{key}: bought {quantity}, counter now {value}");
        Ok(value)
    }

    /// Remove `quantity` from the stock of `key`, returning the new counter value.
    ///
    /// # Errors
    ///
    /// Same as [`apply_buy`](Registry::apply_buy).
    pub fn apply_sell(&self, key: &str, quantity: u32) -> Result<f64, PricerError> {
        let value = self.priced(key)?.sell(f64::from(quantity));
        trace!("{key}: sold {quantity}, counter now {value}");
        Ok(value)
    }

    /// Register stock recovered from persisted state.
    ///
    /// Returns `true` if an entry for `key` already existed and was replaced.
    pub fn insert_stock(&self, key: &str, stock: f64, recorded_spread: Option<f64>) -> bool {
        let state = ItemState::StockKnown(StockOnly::new(stock, recorded_spread));
        self.items.insert(key.to_owned(), state).is_some()
    }

    /// Snapshot of the state of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<ItemState> {
        self.items.get(key).map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All keys currently registered, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.items.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Key, real stock and spread of every `Priced` entry.
    pub fn priced_snapshot(&self) -> Vec<PricedEntry> {
        self.items
            .iter()
            .filter_map(|entry| {
                entry.value().as_priced().map(|item| PricedEntry {
                    key: entry.key().clone(),
                    stock: item.stock(),
                    spread: item.spread(),
                })
            })
            .collect()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.items.clear();
    }

    fn resolve_priced(&self, key: &str, base: f64, spread: f64) -> Result<PricedItem, PricerError> {
        match self.resolve_or_create(key, base, spread)? {
            ItemState::Priced(item) => Ok(item),
            other => Err(not_priced(key, &other)),
        }
    }

    fn priced(&self, key: &str) -> Result<PricedItem, PricerError> {
        let entry = self.items.get(key).ok_or_else(|| {
            error!("trade on {key} before any price query");
            PricerError::UnknownItem {
                key: key.to_owned(),
            }
        })?;
        match entry.value() {
            ItemState::Priced(item) => Ok(item.clone()),
            other => Err(not_priced(key, other)),
        }
    }
}

fn checked_parameters(key: &str, base: f64, spread: f64) -> Result<(), PricerError> {
    formula::validate(base, spread).inspect_err(|e| error!("{key}: {e}"))
}

#[cold]
fn not_priced(key: &str, state: &ItemState) -> PricerError {
    error!("{key} is {} and cannot be priced or traded", state.stage());
    PricerError::NotPriced {
        key: key.to_owned(),
        stage: state.stage(),
    }
}
