//! Example of a full pricing session with persisted market state
//!
//! This example shows how to:
//! 1. Start a pricing service with market-state persistence enabled
//! 2. Quote and trade items through the PriceProvider interface
//! 3. Shut down, restart, and observe the stock carried across restarts

use market_pricer::prelude::{PriceProvider, PricerConfig, PricerError, PricingService};
use std::path::Path;
use tracing::{info, warn};

/// Static prices a shop host would declare for its items: (item, base, spread)
const CATALOGUE: [(&str, f64, f64); 4] = [
    ("DIAMOND", 120.0, 40.0),
    ("IRON_INGOT", 8.0, 64.0),
    ("BREAD", 2.5, 128.0),
    ("BEDROCK", 0.0, 0.0),
];

fn trade_session(service: &PricingService) -> Result<(), PricerError> {
    for (item, base, spread) in CATALOGUE {
        match service.calculate_buy_price(item, 1, base, spread) {
            Ok(price) => info!("{item}: buy 1 for {price:.4}"),
            Err(e) => {
                warn!("{item}: {e}");
                continue;
            }
        }
        service.buy_item(item, 16)?;
        let sell = service.calculate_sell_price(item, 1, base, spread)?;
        info!("{item}: after buying 16, sell 1 for {sell:.4}");
    }
    Ok(())
}

fn run(data_dir: &Path) -> Result<(), PricerError> {
    let service = PricingService::with_config(PricerConfig::persistent(), data_dir)?;
    trade_session(&service)?;
    let report = service.close()?;
    info!("first session saved {} items", report.written);

    let service = PricingService::with_config(PricerConfig::persistent(), data_dir)?;
    info!(
        "restarted with {} items waiting for their first quote",
        service.registry().len()
    );
    trade_session(&service)?;

    for entry in service.registry().priced_snapshot() {
        info!("{}: stock {:.2} (spread {})", entry.key, entry.stock, entry.spread);
    }
    service.close()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting market session example");

    let data_dir = tempfile::tempdir()?;
    run(data_dir.path())?;

    info!("Market session example completed");
    Ok(())
}
