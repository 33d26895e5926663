use analytics::{max_drawdown_pct, sharpe_ratio};
use proptest::prelude::*;
use rust_decimal::Decimal;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn drawdown_is_bounded_for_positive_values(cents in prop::collection::vec(1i64..10_000_000, 1..200)) {
        let values: Vec<Decimal> = cents.iter().map(|c| Decimal::new(*c, 2)).collect();
        let drawdown = max_drawdown_pct(&values);
        prop_assert!(drawdown <= 0.0);
        prop_assert!(drawdown > -100.0);
    }

    #[test]
    fn sharpe_is_finite(cents in prop::collection::vec(1i64..10_000_000, 0..200)) {
        let values: Vec<Decimal> = cents.iter().map(|c| Decimal::new(*c, 2)).collect();
        prop_assert!(sharpe_ratio(&values).is_finite());
    }

    #[test]
    fn sorted_series_has_no_drawdown(mut cents in prop::collection::vec(0i64..10_000_000, 1..100)) {
        cents.sort_unstable();
        let values: Vec<Decimal> = cents.iter().map(|c| Decimal::new(*c, 2)).collect();
        prop_assert_eq!(max_drawdown_pct(&values), 0.0);
    }
}
