#[cfg(test)]
mod tests_provider {
    use market_pricer::formula::{buy_price, sell_price};
    use market_pricer::{PriceProvider, PricerConfig, PricerError, PricingService};
    use std::sync::Arc;
    use std::thread;

    fn provider() -> (tempfile::TempDir, Arc<PricingService>) {
        let dir = tempfile::tempdir().unwrap_or_else(|_| panic!("tempdir"));
        let service = PricingService::with_config(PricerConfig::default(), dir.path())
            .unwrap_or_else(|_| panic!("open"));
        (dir, Arc::new(service))
    }

    #[test]
    fn end_to_end_prices_follow_stock() {
        let (_dir, service) = provider();
        let provider: &dyn PriceProvider = &*service;

        let buy = provider
            .calculate_buy_price("MELON", 1, 50.0, 20.0)
            .unwrap_or_else(|_| panic!("buy"));
        assert!((buy - 50.0 * buy_price(0.0, 1.0, 20.0)).abs() < 1e-9);
        assert!((buy - 51.271).abs() < 1e-3);

        let sell_before = provider
            .calculate_sell_price("MELON", 1, 50.0, 20.0)
            .unwrap_or_else(|_| panic!("sell"));
        assert!((sell_before - 50.0 * sell_price(0.0, 1.0, 20.0)).abs() < 1e-9);
        assert!((sell_before / 50.0 - 0.9754).abs() < 1e-4);

        provider
            .buy_item("MELON", 1)
            .unwrap_or_else(|_| panic!("apply"));
        let sell_after = provider
            .calculate_sell_price("MELON", 1, 50.0, 20.0)
            .unwrap_or_else(|_| panic!("sell"));
        assert!(sell_after < sell_before);
        assert!(sell_after > 0.0);
    }

    #[test]
    fn selling_raises_the_price() {
        let (_dir, service) = provider();
        let before = service
            .calculate_buy_price("PUMPKIN", 3, 10.0, 15.0)
            .unwrap_or_else(|_| panic!("price"));
        service
            .sell_item("PUMPKIN", 5)
            .unwrap_or_else(|_| panic!("sell"));
        let after = service
            .calculate_buy_price("PUMPKIN", 3, 10.0, 15.0)
            .unwrap_or_else(|_| panic!("price"));
        assert!(after > before);
    }

    #[test]
    fn unpriced_items_reject_price_queries() {
        let (_dir, service) = provider();
        let err = service.calculate_sell_price("STICK", 1, 0.0, 0.0);
        match err {
            Err(PricerError::NotPriced { key, stage }) => {
                assert_eq!(key, "STICK");
                assert_eq!(stage, "unpriced");
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(service.sell_item("STICK", 1).is_err());
    }

    #[test]
    fn provider_is_shareable_across_threads() {
        let (_dir, service) = provider();
        let provider: Arc<dyn PriceProvider> = service.clone();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let provider = Arc::clone(&provider);
                thread::spawn(move || {
                    for _ in 0..50 {
                        provider
                            .calculate_buy_price("HONEY", 1, 6.0, 30.0)
                            .unwrap_or_else(|_| panic!("price"));
                        provider
                            .buy_item("HONEY", 1)
                            .unwrap_or_else(|_| panic!("buy"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap_or_else(|_| panic!("join"));
        }

        let stock = service
            .registry()
            .get("HONEY")
            .and_then(|s| s.as_priced().map(|item| item.stock()))
            .unwrap_or_else(|| panic!("priced"));
        assert!((stock - 200.0).abs() < 1e-9);
    }
}
