#[cfg(test)]
mod tests_concurrency {
    use market_pricer::{ItemState, PricedItem, Registry};
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn counter_value(registry: &Registry, key: &str) -> f64 {
        registry
            .get(key)
            .and_then(|state| state.as_priced().map(PricedItem::counter_value))
            .unwrap_or_else(|| panic!("{key} should be priced"))
    }

    #[test]
    fn concurrent_first_queries_create_a_single_entry() {
        let registry = Arc::new(Registry::new());
        let barrier = Arc::new(Barrier::new(32));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry
                        .price_for_buy("ENDER_PEARL", 1, 25.0, 10.0)
                        .unwrap_or_else(|_| panic!("price"))
                })
            })
            .collect();

        let prices: Vec<f64> = handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| panic!("join")))
            .collect();

        assert_eq!(registry.len(), 1);
        // nobody traded, so every caller saw the same fresh counter
        assert!(prices.windows(2).all(|w| w[0] == w[1]));
        assert!((counter_value(&registry, "ENDER_PEARL") + 10.0 * 25.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn concurrent_buy_sell_pairs_net_to_zero() {
        let registry = Arc::new(Registry::new());
        registry.insert_stock("IRON_INGOT", 100.0, None);
        // base 1 means no offset, so the counter is the real stock
        registry
            .resolve_or_create("IRON_INGOT", 1.0, 10.0)
            .unwrap_or_else(|_| panic!("promote"));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..200 {
                        registry
                            .apply_buy("IRON_INGOT", 10)
                            .unwrap_or_else(|_| panic!("buy"));
                        registry
                            .apply_sell("IRON_INGOT", 10)
                            .unwrap_or_else(|_| panic!("sell"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap_or_else(|_| panic!("join"));
        }

        assert_eq!(counter_value(&registry, "IRON_INGOT"), 100.0);
    }

    #[test]
    fn trades_racing_with_resolves_are_not_lost() {
        let registry = Arc::new(Registry::new());
        registry.insert_stock("GLOWSTONE", 0.0, None);
        registry
            .resolve_or_create("GLOWSTONE", 1.0, 4.0)
            .unwrap_or_else(|_| panic!("promote"));

        let barrier = Arc::new(Barrier::new(9));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    registry
                        .apply_buy("GLOWSTONE", 1)
                        .unwrap_or_else(|_| panic!("buy"));
                }
            }));
        }
        // repeated resolves for a settled item must never replace the counter
        {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    let state = registry
                        .resolve_or_create("GLOWSTONE", 3.0, 9.0)
                        .unwrap_or_else(|_| panic!("resolve"));
                    assert!(matches!(state, ItemState::Priced(_)));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap_or_else(|_| panic!("join"));
        }

        assert_eq!(counter_value(&registry, "GLOWSTONE"), 800.0);
    }

    #[test]
    fn distinct_keys_are_independent() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let key = format!("ITEM_{i}");
                    registry
                        .price_for_sell(&key, 1, 2.0 + f64::from(i), 5.0)
                        .unwrap_or_else(|_| panic!("price"));
                    registry.apply_sell(&key, 3).unwrap_or_else(|_| panic!("sell"));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap_or_else(|_| panic!("join"));
        }

        assert_eq!(registry.len(), 16);
        for entry in registry.priced_snapshot() {
            assert!((entry.stock + 3.0).abs() < 1e-9, "{}: {}", entry.key, entry.stock);
        }
    }
}
