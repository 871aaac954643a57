//! Exponential pricing function and its closed-form integral.
//!
//! Prices follow `p(x) = b * e^(-x/s)` where `x` is the stock, `b` the base
//! price and `s` the spread. The cost of a trade is the area under `p` across
//! the stock range the trade moves through:
//!
//! - buying `q` units at stock `x` integrates over `[x - q, x]`
//! - selling `q` units at stock `x` integrates over `[x, x + q]`
//!
//! Because `b * e^(-x/s) = e^(-(x - s*ln b)/s)`, the base price is a constant
//! shift of the stock axis. [`base_offset`] computes that shift once; a counter
//! initialized with it lets every later query run on `spread` and the counter
//! value alone, so none of the functions here take a base price.

use super::error::PricerError;

/// Integral of `e^(-x/spread)` from `lower` to `upper`.
///
/// Equals `spread * (e^(-lower/spread) - e^(-upper/spread))`, positive
/// whenever `lower < upper`.
#[inline]
#[must_use]
pub fn integral(lower: f64, upper: f64, spread: f64) -> f64 {
    spread * ((-lower / spread).exp() - (-upper / spread).exp())
}

/// Price of buying `quantity` units when the (offset) stock is `stock`.
#[inline]
#[must_use]
pub fn buy_price(stock: f64, quantity: f64, spread: f64) -> f64 {
    // integrate forwards over the depleted range to stay positive
    integral(stock - quantity, stock, spread)
}

/// Price of selling `quantity` units when the (offset) stock is `stock`.
#[inline]
#[must_use]
pub fn sell_price(stock: f64, quantity: f64, spread: f64) -> f64 {
    integral(stock, stock + quantity, spread)
}

/// Stock-axis shift that folds `base` into the exponent: `-spread * ln(base)`.
///
/// Only meaningful for `base > 0`; see [`validate`].
#[inline]
#[must_use]
pub fn base_offset(base: f64, spread: f64) -> f64 {
    -spread * base.ln()
}

/// Checks that `base` and `spread` lie in the domain of the pricing function.
///
/// A zero base is accepted: it marks an item without dynamic pricing, and the
/// spread is not inspected in that case.
///
/// # Errors
///
/// Returns [`PricerError::InvalidParameters`] for a negative or non-finite
/// base, or, when `base > 0`, a non-positive or non-finite spread.
pub fn validate(base: f64, spread: f64) -> Result<(), PricerError> {
    if !base.is_finite() || base < 0.0 {
        return Err(PricerError::InvalidParameters {
            message: format!("base price must be finite and non-negative, got {base}"),
        });
    }
    if base > 0.0 && (!spread.is_finite() || spread <= 0.0) {
        return Err(PricerError::InvalidParameters {
            message: format!("spread must be finite and positive, got {spread}"),
        });
    }
    Ok(())
}
