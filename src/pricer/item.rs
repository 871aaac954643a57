//! Per-item pricing lifecycle.
//!
//! An item moves through three stages and never back:
//!
//! ```text
//!   (absent) ──base == 0──────────────▶ Unpriced
//!   (absent) ──base > 0───────────────▶ Priced
//!   (loaded) ─▶ StockKnown ──first query with base > 0──▶ Priced
//! ```
//!
//! `StockKnown` and `Priced` share their counter through an `Arc`, and
//! promotion moves that `Arc` into the new state instead of copying the value.

use super::formula;
use super::stock::StockCounter;
use std::sync::Arc;

/// Stock recovered from persisted market state, waiting for its spread.
#[derive(Debug, Clone)]
pub struct StockOnly {
    counter: Arc<StockCounter>,
    recorded_spread: Option<f64>,
}

impl StockOnly {
    /// Wrap a recovered stock value.
    pub fn new(stock: f64, recorded_spread: Option<f64>) -> Self {
        Self {
            counter: Arc::new(StockCounter::new(stock)),
            recorded_spread,
        }
    }

    /// The recovered stock.
    #[must_use]
    pub fn stock(&self) -> f64 {
        self.counter.get()
    }

    /// Spread stored alongside the stock, if the file carried one.
    #[must_use]
    pub fn recorded_spread(&self) -> Option<f64> {
        self.recorded_spread
    }

    /// Consume the stock-only state and produce a priced one.
    ///
    /// The counter is reused and shifted by `offset`, so it ends up encoding
    /// both the recovered stock and the newly learned base price.
    pub(crate) fn promote(self, spread: f64, offset: f64) -> PricedItem {
        self.counter.add_and_get(offset);
        PricedItem {
            counter: self.counter,
            spread,
            offset,
        }
    }
}

/// A fully initialized item.
#[derive(Debug, Clone)]
pub struct PricedItem {
    counter: Arc<StockCounter>,
    spread: f64,
    offset: f64,
}

impl PricedItem {
    /// A fresh item at real stock zero for the given base price and spread.
    pub(crate) fn from_base_and_spread(base: f64, spread: f64) -> Self {
        let offset = formula::base_offset(base, spread);
        Self {
            counter: Arc::new(StockCounter::new(offset)),
            spread,
            offset,
        }
    }

    /// Price of buying `quantity` units at the current stock.
    #[must_use]
    pub fn buy_price(&self, quantity: f64) -> f64 {
        formula::buy_price(self.counter.get(), quantity, self.spread)
    }

    /// Price of selling `quantity` units at the current stock.
    #[must_use]
    pub fn sell_price(&self, quantity: f64) -> f64 {
        formula::sell_price(self.counter.get(), quantity, self.spread)
    }

    /// Add `quantity` to the stock, returning the new counter value.
    pub fn buy(&self, quantity: f64) -> f64 {
        self.counter.add_and_get(quantity)
    }

    /// Remove `quantity` from the stock, returning the new counter value.
    pub fn sell(&self, quantity: f64) -> f64 {
        self.counter.add_and_get(-quantity)
    }

    /// Raw counter value, including the base-price offset.
    #[must_use]
    pub fn counter_value(&self) -> f64 {
        self.counter.get()
    }

    /// Stock with the base-price offset removed.
    #[must_use]
    pub fn stock(&self) -> f64 {
        self.counter.get() - self.offset
    }

    #[must_use]
    pub fn spread(&self) -> f64 {
        self.spread
    }

    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub(crate) fn counter(&self) -> &Arc<StockCounter> {
        &self.counter
    }
}

/// Lifecycle stage of one item.
#[derive(Debug, Clone)]
pub enum ItemState {
    /// No dynamic pricing for this item.
    Unpriced,
    /// Stock known from persisted state, spread not yet known.
    StockKnown(StockOnly),
    /// Fully priced.
    Priced(PricedItem),
}

impl ItemState {
    /// Short stage name for logs and errors.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            ItemState::Unpriced => "unpriced",
            ItemState::StockKnown(_) => "stock-known",
            ItemState::Priced(_) => "priced",
        }
    }

    #[must_use]
    pub fn is_priced(&self) -> bool {
        matches!(self, ItemState::Priced(_))
    }

    /// The priced view of this state, if it has one.
    #[must_use]
    pub fn as_priced(&self) -> Option<&PricedItem> {
        match self {
            ItemState::Priced(item) => Some(item),
            ItemState::Unpriced | ItemState::StockKnown(_) => None,
        }
    }
}
