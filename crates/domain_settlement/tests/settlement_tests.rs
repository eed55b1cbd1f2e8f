//! Tests for domain_settlement

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::PartyId;
use domain_settlement::{
    BalanceDelta, Imbalance, PartyBalance, PayerRole, SettlementError, SettlementOutcome,
    SettlementPolicy, SettlementRequest, SettlementResolver,
};

fn resolver() -> SettlementResolver {
    SettlementResolver::new(dec!(0.01)).unwrap()
}

// ============================================================================
// Resolver Tests
// ============================================================================

mod resolver_tests {
    use super::*;

    #[test]
    fn test_underpaid_with_discount() {
        let r = resolver()
            .resolve(dec!(1000), dec!(850), &SettlementRequest::discount())
            .unwrap();

        assert_eq!(r.outcome, SettlementOutcome::Discounted);
        assert_eq!(r.discount, dec!(150));
        assert_eq!(r.debt_or_credit, Decimal::ZERO);
        assert_eq!(r.collected, dec!(850));
        assert!(r.is_balanced());
    }

    #[test]
    fn test_underpaid_with_debt_or_credit() {
        let r = resolver()
            .resolve(dec!(1000), dec!(850), &SettlementRequest::debt_or_credit())
            .unwrap();

        assert_eq!(r.outcome, SettlementOutcome::Partial);
        assert_eq!(r.discount, Decimal::ZERO);
        assert_eq!(r.debt_or_credit, dec!(150));
        assert!(r.has_residual());
        assert!(r.is_balanced());
    }

    #[test]
    fn test_full_credit_carries_everything() {
        let r = resolver()
            .resolve(dec!(12.4), Decimal::ZERO, &SettlementRequest::full_credit())
            .unwrap();

        assert_eq!(r.outcome, SettlementOutcome::FullCredit);
        assert_eq!(r.debt_or_credit, dec!(12.4));
        assert_eq!(r.collected, Decimal::ZERO);
        assert_eq!(r.imbalance(), Imbalance::Underpaid);
        assert!(r.is_balanced());
    }

    #[test]
    fn test_full_credit_with_payment_rejected() {
        let err = resolver()
            .resolve(dec!(10), dec!(1), &SettlementRequest::full_credit())
            .unwrap_err();
        assert!(matches!(err, SettlementError::CreditWithPayment(_)));
        assert_eq!(err.field(), Some("payment"));
    }

    #[test]
    fn test_overpaid_with_discount_is_negative_discount() {
        let r = resolver()
            .resolve(dec!(100), dec!(104), &SettlementRequest::discount())
            .unwrap();

        assert_eq!(r.outcome, SettlementOutcome::Discounted);
        assert_eq!(r.discount, dec!(-4));
        assert_eq!(r.imbalance(), Imbalance::Overpaid);
        assert!(r.is_balanced());
    }

    #[test]
    fn test_overpaid_with_debt_or_credit_is_negative_residual() {
        let r = resolver()
            .resolve(dec!(100), dec!(104), &SettlementRequest::debt_or_credit())
            .unwrap();

        assert_eq!(r.outcome, SettlementOutcome::Partial);
        assert_eq!(r.debt_or_credit, dec!(-4));
        assert!(r.is_balanced());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let err = resolver()
            .resolve(dec!(-1), Decimal::ZERO, &SettlementRequest::discount())
            .unwrap_err();
        assert_eq!(err.field(), Some("expected_amount"));

        let err = resolver()
            .resolve(dec!(1), dec!(-1), &SettlementRequest::discount())
            .unwrap_err();
        assert_eq!(err.field(), Some("actual_amount"));
    }

    #[test]
    fn test_policy_recorded() {
        let r = resolver()
            .resolve(dec!(5), dec!(5), &SettlementRequest::debt_or_credit())
            .unwrap();
        assert_eq!(r.policy, SettlementPolicy::DebtOrCredit);
        assert_eq!(r.outcome, SettlementOutcome::FullySettled);
    }
}

// ============================================================================
// Balance Tests
// ============================================================================

mod balance_tests {
    use super::*;

    #[test]
    fn test_partial_sale_residual_moves_party_into_debt() {
        let party = PartyId::new();
        let r = resolver()
            .resolve(dec!(1000), dec!(850), &SettlementRequest::debt_or_credit())
            .unwrap();

        let delta = BalanceDelta::from_residual(party, PayerRole::Party, r.debt_or_credit);
        let balance = PartyBalance::zero(party).apply(&delta).unwrap();

        assert_eq!(balance.has_gold_balance, dec!(-150));
    }

    #[test]
    fn test_partial_purchase_residual_credits_party() {
        let party = PartyId::new();
        let r = resolver()
            .resolve(dec!(40), dec!(30), &SettlementRequest::debt_or_credit())
            .unwrap();

        let delta = BalanceDelta::from_residual(party, PayerRole::Shop, r.debt_or_credit);
        assert_eq!(delta.has_delta, dec!(10));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn request() -> impl Strategy<Value = SettlementRequest> {
        prop_oneof![
            Just(SettlementRequest::discount()),
            Just(SettlementRequest::debt_or_credit()),
        ]
    }

    proptest! {
        #[test]
        fn settlement_is_complete(
            expected in 0i64..100_000_000i64,
            actual in 0i64..100_000_000i64,
            tolerance in 0i64..10_000i64,
            request in request()
        ) {
            let expected = Decimal::new(expected, 4);
            let actual = Decimal::new(actual, 4);
            let resolver = SettlementResolver::new(Decimal::new(tolerance, 4)).unwrap();

            let r = resolver.resolve(expected, actual, &request).unwrap();

            prop_assert_eq!(r.discount + r.debt_or_credit + r.collected, r.expected);
            prop_assert_eq!(r.difference, expected - actual);
            if r.outcome == SettlementOutcome::FullySettled {
                prop_assert!(r.difference.abs() < resolver.tolerance() || r.difference.is_zero());
            }
        }

        #[test]
        fn full_credit_is_complete(expected in 0i64..100_000_000i64) {
            let expected = Decimal::new(expected, 4);
            let r = resolver().resolve(expected, Decimal::ZERO, &SettlementRequest::full_credit()).unwrap();
            prop_assert_eq!(r.debt_or_credit, expected);
            prop_assert!(r.is_balanced());
        }
    }
}
