//! Tests for domain_valuation

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money};
use domain_valuation::{
    convert_from_base, convert_to_base, currency_to_has, has_to_currency, round_has, to_base,
    to_foreign, valuate, valuate_basis, KaratTable, Labor, MaterialBasis, PriceSide,
    PriceSnapshot, ValuationError,
};

fn snapshot() -> PriceSnapshot {
    PriceSnapshot::new(Utc::now(), dec!(2900.00), dec!(2950.00))
        .with_usd(dec!(42.50), dec!(42.80))
        .with_eur(dec!(46.10), dec!(46.55))
}

// ============================================================================
// Karat Table Tests
// ============================================================================

mod karat_table_tests {
    use super::*;

    #[test]
    fn test_standard_table_has_common_grades() {
        let table = KaratTable::standard();
        assert_eq!(table.len(), 6);
        for label in ["24K", "22K", "21K", "18K", "14K", "8K"] {
            let karat = table.by_label(label).unwrap();
            assert!(karat.fineness > Decimal::ZERO && karat.fineness <= Decimal::ONE);
        }
    }

    #[test]
    fn test_karat_with_invalid_fineness_rejected() {
        let err = domain_valuation::Karat::new("bad", dec!(0)).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidFineness { .. }));
        assert!(err.is_configuration());
    }
}

// ============================================================================
// Valuator Tests
// ============================================================================

mod valuator_tests {
    use super::*;

    #[test]
    fn test_22k_bracelet_per_gram_labor() {
        let karat = KaratTable::standard().by_label("22K").unwrap().clone();
        let v = valuate(dec!(100), karat.fineness, &Labor::per_gram(dec!(0.05))).unwrap();
        assert_eq!(v.material_has, dec!(91.6));
        assert_eq!(v.labor_has, dec!(5.0));
        assert_eq!(v.total_has, dec!(96.6));
    }

    #[test]
    fn test_negative_labor_rejected() {
        let err = valuate(dec!(5), dec!(0.585), &Labor::per_piece(dec!(-1))).unwrap_err();
        assert_eq!(err.field(), Some("labor"));
    }

    #[test]
    fn test_non_gold_zero_weight_allowed() {
        let basis = MaterialBasis::NonGold {
            weight_gram: Decimal::ZERO,
            purchase_has: dec!(3),
        };
        let v = valuate_basis(&basis, &Labor::per_piece(dec!(0.5))).unwrap();
        assert_eq!(v.total_has, dec!(3.5));
    }

    #[test]
    fn test_sale_and_purchase_sides_price_differently() {
        let s = snapshot();
        let bought = has_to_currency(dec!(10), &s, PriceSide::Buy);
        let sold = has_to_currency(dec!(10), &s, PriceSide::Sell);
        assert_eq!(bought.amount(), dec!(29000.00));
        assert_eq!(sold.amount(), dec!(29500.00));
        assert_eq!(bought.currency(), Currency::TRY);
    }

    #[test]
    fn test_currency_to_has_rejects_zero_price() {
        let s = PriceSnapshot::new(Utc::now(), Decimal::ZERO, dec!(2950));
        assert!(currency_to_has(dec!(100), &s, PriceSide::Buy).is_err());
    }

    #[test]
    fn test_currency_to_has_keeps_fixed_places() {
        let has = currency_to_has(dec!(1), &snapshot(), PriceSide::Sell).unwrap();
        assert_eq!(has, dec!(0.0003389831));

        // Differences against short amounts need no further rounding
        assert_eq!((dec!(50) - has) + has, dec!(50));
    }

    #[test]
    fn test_round_has_for_display() {
        let v = valuate(dec!(3.333), dec!(0.585), &Labor::none()).unwrap();
        assert_eq!(round_has(v.total_has), dec!(1.950));
    }
}

// ============================================================================
// Currency Converter Tests
// ============================================================================

mod currency_tests {
    use super::*;

    #[test]
    fn test_rate_42_50_scenario() {
        assert_eq!(to_base(dec!(100), dec!(42.50)).unwrap(), dec!(4250));
        assert_eq!(to_foreign(dec!(4250), dec!(42.50)).unwrap(), dec!(100));
    }

    #[test]
    fn test_convert_from_base_to_usd() {
        let usd = convert_from_base(dec!(4280), Currency::USD, &snapshot(), PriceSide::Sell).unwrap();
        assert_eq!(usd, Money::new(dec!(100), Currency::USD));
    }

    #[test]
    fn test_convert_to_base_records_rate() {
        let converted =
            convert_to_base(Money::new(dec!(20), Currency::USD), &snapshot(), PriceSide::Buy).unwrap();
        assert_eq!(converted.base.amount(), dec!(850.00));
        assert_eq!(converted.rate, Some(dec!(42.50)));
    }

    #[test]
    fn test_stale_snapshot() {
        let old = PriceSnapshot::new(Utc::now() - Duration::hours(2), dec!(2900), dec!(2950));
        assert!(old.ensure_fresh(Utc::now(), Duration::hours(1)).unwrap_err().is_configuration());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn weight() -> impl Strategy<Value = Decimal> {
        (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 3))
    }

    fn fineness() -> impl Strategy<Value = Decimal> {
        (1i64..=1000i64).prop_map(|n| Decimal::new(n, 3))
    }

    fn rate() -> impl Strategy<Value = Decimal> {
        (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 4))
    }

    proptest! {
        #[test]
        fn valuation_is_deterministic(w in weight(), f in fineness(), labor in 0i64..1000i64, per_piece in any::<bool>()) {
            let labor_value = Decimal::new(labor, 3);
            let labor = if per_piece { Labor::per_piece(labor_value) } else { Labor::per_gram(labor_value) };

            let first = valuate(w, f, &labor).unwrap();
            let second = valuate(w, f, &labor).unwrap();
            prop_assert_eq!(first, second);
            prop_assert_eq!(first.total_has, first.material_has + first.labor_has);
        }

        #[test]
        fn currency_round_trip(amount in -1_000_000_000i64..1_000_000_000i64, r in rate()) {
            let x = Decimal::new(amount, 2);
            let back = to_base(to_foreign(x, r).unwrap(), r).unwrap();
            prop_assert!((back - x).abs() < dec!(0.000001));
        }

        #[test]
        fn has_price_round_trip(has in 1i64..100_000_000i64) {
            let s = snapshot();
            let x = Decimal::new(has, 3);
            let money = has_to_currency(x, &s, PriceSide::Buy);
            let back = currency_to_has(money.amount(), &s, PriceSide::Buy).unwrap();
            prop_assert!((back - x).abs() < dec!(0.000001));
        }
    }
}
