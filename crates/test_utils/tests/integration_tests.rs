//! Integration Tests for the Valuation Engine
//!
//! These tests drive the transaction service against the in-memory
//! collaborators, covering workflows that span several transactions.

use std::sync::Arc;

use core_kernel::{Currency, EngineConfig, IdempotencyKey, KaratId, Money, PartyId, ProductId, ProductTypeId};
use domain_settlement::{PartyBalance, Payment, SettlementOutcome, SettlementRequest};
use domain_stock::{PoolKey, StockPoolBucket, TrackType, Unit};
use domain_transaction::{
    ErrorKind, ExchangeDirection, ExchangeOrder, ExpectedAmount, LineRequest, StockPort,
    TransactionRequest, TransactionType,
};
use domain_valuation::Labor;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use test_utils::*;

fn try_cash(amount: Decimal) -> Payment {
    Payment::cash(MoneyFixtures::try_amount(amount))
}

fn pool_purchase(product_type_id: ProductTypeId, weight: Decimal) -> LineRequest {
    LineRequest::PoolPurchase {
        product_type_id,
        karat_id: KaratFixtures::k22().id,
        weight_gram: weight,
        labor_per_gram: dec!(0.05),
    }
}

fn pool_sale(product_type_id: ProductTypeId, weight: Decimal) -> LineRequest {
    LineRequest::PoolSale {
        product_type_id,
        karat_id: KaratFixtures::k22().id,
        weight_gram: weight,
        labor_per_gram: dec!(0.06),
    }
}

mod purchase_to_sale_workflow {
    use super::*;

    /// Buys into an empty pool, then sells part of it at a profit
    #[tokio::test]
    async fn test_pool_purchase_then_sale() {
        init_test_tracing();
        let office = TestBackOffice::new();
        let service = office.service();
        let bracelets = ProductTypeId::new();

        // 100 g of 22K at 0.05 labor is 96.6 HAS, bought at 2900
        let purchase = service
            .submit(
                TransactionRequest::new(TransactionType::Purchase, try_cash(dec!(280140)))
                    .with_line(pool_purchase(bracelets, dec!(100))),
            )
            .await
            .expect("Purchase should be accepted");

        assert_settlement_complete(&purchase.outcome);
        assert_lines_sum_to_total(&purchase.outcome);
        office.stock.apply(&purchase.outcome).await.unwrap();

        // 40 g at 0.976 is 39.04 HAS, sold at 2950
        let sale = service
            .submit(
                TransactionRequest::new(TransactionType::Sale, try_cash(dec!(115168)))
                    .with_line(pool_sale(bracelets, dec!(40))),
            )
            .await
            .expect("Sale should be accepted");

        assert_eq!(sale.outcome.payload.settlement_outcome, Some(SettlementOutcome::FullySettled));
        assert_eq!(sale.outcome.payload.profit_has, Some(dec!(0.40)));
        office.stock.apply(&sale.outcome).await.unwrap();

        let pool = office
            .stock
            .get_stock_pool_info(bracelets, KaratFixtures::k22().id)
            .await
            .unwrap();
        assert_eq!(pool.total_weight_gram, dec!(60));
        assert_pool_average(&pool, dec!(0.966), 6);

        assert_eq!(office.sink.writes().await, 2);
        let stored = office.sink.get(sale.transaction_id).await.unwrap();
        assert_eq!(stored.type_code, TransactionType::Sale);
    }

    /// A purchase at a different cost moves the average
    #[tokio::test]
    async fn test_second_purchase_reaverages_pool() {
        let office = TestBackOffice::new();
        let key = PoolKey::new(ProductTypeId::new(), KaratFixtures::k22().id);
        office
            .stock
            .put_pool(StockPoolBucket::new(key, dec!(100), dec!(96.6)).unwrap())
            .await;

        // 50 g at 0.916 + 0.05 = 48.3 HAS at 2900
        let purchase = office
            .service()
            .submit(
                TransactionRequest::new(TransactionType::Purchase, try_cash(dec!(140070)))
                    .with_line(pool_purchase(key.product_type_id, dec!(50))),
            )
            .await
            .unwrap();

        let bucket = purchase.outcome.pool_updates[0].after();
        assert_eq!(bucket.total_weight_gram, dec!(150));
        assert_eq!(bucket.total_cost_has, dec!(144.9));
        assert_pool_average(&bucket, dec!(0.966), 6);
    }

    /// Two sales priced against the same pool read cannot both be written
    #[tokio::test]
    async fn test_second_stale_pool_sale_refused() {
        let office = TestBackOffice::new();
        let key = PoolKey::new(ProductTypeId::new(), KaratFixtures::k22().id);
        office
            .stock
            .put_pool(StockPoolBucket::new(key, dec!(10), dec!(9.66)).unwrap())
            .await;
        let service = office.service();

        // 6 g at 0.976 is 5.856 HAS at 2950
        let sell = || {
            TransactionRequest::new(TransactionType::Sale, try_cash(dec!(17275.2)))
                .with_line(pool_sale(key.product_type_id, dec!(6)))
        };
        let first = service.submit(sell()).await.unwrap();
        let second = service.submit(sell()).await.unwrap();

        office.stock.apply(&first.outcome).await.unwrap();
        let err = office.stock.apply(&second.outcome).await.unwrap_err();
        assert!(err.is_retryable());

        let pool = office.stock.get_stock_pool_info(key.product_type_id, key.karat_id).await.unwrap();
        assert_eq!(pool.total_weight_gram, dec!(4));

        // Re-reading shows the pool cannot cover the second sale
        let retry = service.submit(sell()).await.unwrap_err();
        assert_error_kind(&retry, ErrorKind::InsufficientStock, Some("weight_gram"));
    }

    /// Pool stock cannot be oversold
    #[tokio::test]
    async fn test_pool_oversale_rejected() {
        let office = TestBackOffice::new();
        let pool = StockFixtures::bracelet_pool();
        office.stock.put_pool(pool).await;

        let err = office
            .service()
            .submit(
                TransactionRequest::new(TransactionType::Sale, try_cash(dec!(1)))
                    .with_line(pool_sale(pool.key.product_type_id, dec!(150))),
            )
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::InsufficientStock, None);
        assert_eq!(office.sink.writes().await, 0);
    }
}

mod lot_workflow {
    use super::*;

    #[tokio::test]
    async fn test_fifo_lot_depletes_across_sales() {
        let office = TestBackOffice::new();
        let lot = StockFixtures::coin_lot();
        office.stock.put_product(lot.clone()).await;
        let service = office.service();

        let sell = |quantity: Decimal| {
            TransactionRequest::new(TransactionType::Sale, try_cash(dec!(5) * quantity * dec!(2950)))
                .with_line(LineRequest::LotSale { product_id: lot.id, quantity })
        };

        let first = service.submit(sell(dec!(3))).await.unwrap();
        assert_eq!(first.outcome.payload.expected_amount, dec!(15));
        assert_eq!(first.outcome.lot_updates[0].remaining_quantity(), dec!(7));
        office.stock.apply(&first.outcome).await.unwrap();

        let err = service.submit(sell(dec!(8))).await.unwrap_err();
        assert_error_kind(&err, ErrorKind::InsufficientStock, Some("quantity"));

        let rest = service.submit(sell(dec!(7))).await.unwrap();
        office.stock.apply(&rest.outcome).await.unwrap();

        let depleted = office.stock.get_product(lot.id).await.unwrap();
        assert!(!depleted.is_available());
    }

    #[tokio::test]
    async fn test_second_stale_lot_sale_refused() {
        let office = TestBackOffice::new();
        let lot = StockFixtures::coin_lot();
        office.stock.put_product(lot.clone()).await;
        let service = office.service();

        // 6 coins at 5 HAS is 30 HAS at 2950
        let sell = || {
            TransactionRequest::new(TransactionType::Sale, try_cash(dec!(88500)))
                .with_line(LineRequest::LotSale { product_id: lot.id, quantity: dec!(6) })
        };
        let first = service.submit(sell()).await.unwrap();
        let second = service.submit(sell()).await.unwrap();

        office.stock.apply(&first.outcome).await.unwrap();
        let err = office.stock.apply(&second.outcome).await.unwrap_err();
        assert!(err.is_retryable());

        let stored = office.stock.get_product(lot.id).await.unwrap();
        assert_eq!(stored.remaining_quantity, dec!(4));
    }

    #[tokio::test]
    async fn test_applying_to_removed_lot_is_conflict() {
        let office = TestBackOffice::new();
        let lot = StockFixtures::coin_lot();
        office.stock.put_product(lot.clone()).await;

        let outcome = office
            .service()
            .preview(
                &TransactionRequest::new(TransactionType::Sale, try_cash(dec!(14750)))
                    .with_line(LineRequest::LotSale { product_id: lot.id, quantity: Decimal::ONE }),
            )
            .await
            .unwrap();

        // A store that never held the lot
        let elsewhere = TestBackOffice::new();
        let err = elsewhere.stock.apply(&outcome).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_gram_lot_sale_carries_weight() {
        let office = TestBackOffice::new();
        let chain = TestLotBuilder::new()
            .in_grams()
            .with_quantity(dec!(20))
            .with_value(dec!(19.5))
            .build();
        office.stock.put_product(chain.clone()).await;

        let outcome = office
            .service()
            .preview(
                &TransactionRequest::new(TransactionType::Sale, try_cash(dec!(14381.25)))
                    .with_line(LineRequest::LotSale { product_id: chain.id, quantity: dec!(5) }),
            )
            .await
            .unwrap();

        // 0.975 HAS per gram
        assert_eq!(outcome.payload.lines[0].weight_gram, dec!(5));
        assert_eq!(outcome.payload.expected_amount, dec!(4.875));
        assert_eq!(outcome.payload.settlement_outcome, Some(SettlementOutcome::FullySettled));
    }

    #[tokio::test]
    async fn test_unknown_product_is_validation_error() {
        let office = TestBackOffice::new();

        let err = office
            .service()
            .submit(
                TransactionRequest::new(TransactionType::Sale, try_cash(dec!(1)))
                    .with_line(LineRequest::LotSale { product_id: ProductId::new(), quantity: Decimal::ONE }),
            )
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::Validation, Some("product_id"));
    }

    #[tokio::test]
    async fn test_item_purchase_values_lot() {
        let office = TestBackOffice::new();

        let outcome = office
            .service()
            .preview(
                &TransactionRequest::new(TransactionType::Purchase, try_cash(dec!(54578))).with_line(
                    LineRequest::ItemPurchase {
                        product_type_id: ProductTypeId::new(),
                        karat_id: Some(KaratFixtures::k22().id),
                        track_type: TrackType::Fifo,
                        unit: Unit::Piece,
                        quantity: dec!(10),
                        weight_gram: dec!(20),
                        labor: Labor::per_piece(dec!(0.5)),
                        purchase_has: None,
                    },
                ),
            )
            .await
            .unwrap();

        assert_eq!(outcome.payload.lines[0].unit_has, Some(dec!(1.882)));
        assert_settlement_complete(&outcome);
    }

    #[tokio::test]
    async fn test_gold_item_without_karat_rejected() {
        let office = TestBackOffice::new();

        let err = office
            .service()
            .preview(
                &TransactionRequest::new(TransactionType::Purchase, try_cash(dec!(1))).with_line(
                    LineRequest::ItemPurchase {
                        product_type_id: ProductTypeId::new(),
                        karat_id: None,
                        track_type: TrackType::Unique,
                        unit: Unit::Piece,
                        quantity: Decimal::ONE,
                        weight_gram: dec!(3),
                        labor: Labor::none(),
                        purchase_has: None,
                    },
                ),
            )
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::Validation, Some("karat_id"));
    }
}

mod party_balance_workflow {
    use super::*;

    /// A receipt of scrap gold pays down what the party owes
    #[tokio::test]
    async fn test_receipt_pays_down_debt() {
        let office = TestBackOffice::new();
        let party = IdFixtures::party_id();
        office.parties.put(PartyBalance::new(party, dec!(-1000))).await;

        let receipt = office
            .service()
            .submit(
                TransactionRequest::new(
                    TransactionType::Receipt,
                    Payment::none(Currency::TRY).with_gold(dec!(850), Decimal::ONE),
                )
                .with_party(party)
                .with_expected(ExpectedAmount::Has(dec!(1000)))
                .with_settlement(SettlementRequest::debt_or_credit()),
            )
            .await
            .unwrap();

        let outcome = receipt.outcome;
        assert_eq!(outcome.payload.settlement_outcome, Some(SettlementOutcome::Partial));
        assert_eq!(outcome.payload.debt_or_credit_has, dec!(150));

        let balance = outcome.party_balance.unwrap();
        assert_eq!(balance.has_gold_balance, dec!(-150));
        assert!(balance.party_owes_shop());
    }

    /// A sale on full credit puts the whole value on the party's balance
    #[tokio::test]
    async fn test_credit_sale_then_receipt() {
        let office = TestBackOffice::new();
        let party = IdFixtures::party_id();
        let ring = StockFixtures::ring();
        office.parties.put(PartyBalance::zero(party)).await;
        office.stock.put_product(ring.clone()).await;
        let service = office.service();

        let sale = service
            .submit(
                TransactionRequest::new(TransactionType::Sale, Payment::none(Currency::TRY))
                    .with_line(LineRequest::LotSale { product_id: ring.id, quantity: Decimal::ONE })
                    .with_party(party)
                    .with_settlement(SettlementRequest::full_credit()),
            )
            .await
            .unwrap();
        let owed = sale.outcome.party_balance.unwrap();
        assert_eq!(owed.has_gold_balance, dec!(-3.4));
        office.parties.put(owed).await;

        // 3.4 HAS at the 2900 buy price
        let receipt = service
            .submit(
                TransactionRequest::new(TransactionType::Receipt, try_cash(dec!(9860)))
                    .with_party(party)
                    .with_expected(ExpectedAmount::Has(dec!(3.4))),
            )
            .await
            .unwrap();

        assert_eq!(receipt.outcome.payload.settlement_outcome, Some(SettlementOutcome::FullySettled));
        assert_eq!(receipt.outcome.party_balance.unwrap().has_gold_balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_hurda_shortfall_owed_to_seller() {
        let office = TestBackOffice::new();
        let party = IdFixtures::party_id();
        office.parties.put(PartyBalance::zero(party)).await;

        // 10 g of 14K is 5.85 HAS; 14500 TRY at 2900 covers 5
        let hurda = office
            .service()
            .submit(
                TransactionRequest::new(TransactionType::Hurda, try_cash(dec!(14500)))
                    .with_line(LineRequest::Scrap { karat_id: KaratFixtures::k14().id, weight_gram: dec!(10) })
                    .with_party(party)
                    .with_settlement(SettlementRequest::debt_or_credit()),
            )
            .await
            .unwrap();

        let balance = hurda.outcome.party_balance.unwrap();
        assert_eq!(balance.has_gold_balance, dec!(0.85));
        assert!(balance.shop_owes_party());
    }

    #[tokio::test]
    async fn test_unknown_party_is_validation_error() {
        let office = TestBackOffice::new();

        let err = office
            .service()
            .submit(
                TransactionRequest::new(TransactionType::Payment, try_cash(dec!(100)))
                    .with_party(PartyId::new()),
            )
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::Validation, Some("party_id"));
    }
}

mod currency_workflow {
    use super::*;

    #[tokio::test]
    async fn test_exchange_records_rate() {
        let office = TestBackOffice::new();

        let exchange = office
            .service()
            .submit(
                TransactionRequest::new(TransactionType::Exchange, Payment::none(Currency::TRY))
                    .with_exchange(ExchangeOrder {
                        direction: ExchangeDirection::ShopBuys,
                        foreign: MoneyFixtures::usd_100(),
                    }),
            )
            .await
            .unwrap();

        let payload = office.sink.get(exchange.transaction_id).await.unwrap();
        assert_eq!(payload.expected_amount, dec!(4250));
        assert_eq!(payload.exchange_rate, Some(dec!(42.50)));
        assert!(payload.settlement_outcome.is_none());
    }

    #[tokio::test]
    async fn test_new_snapshot_applies_to_next_transaction() {
        let office = TestBackOffice::with_snapshot(Some(SnapshotFixtures::round()));
        let ring = StockFixtures::ring();
        office.stock.put_product(ring.clone()).await;
        let service = office.service();

        let request = TransactionRequest::new(TransactionType::Sale, Payment::cash(Money::new(dec!(212.5), Currency::USD)))
            .with_line(LineRequest::LotSale { product_id: ring.id, quantity: Decimal::ONE });

        let before = service.preview(&request).await.unwrap();
        assert_eq!(before.payload.settlement_outcome, Some(SettlementOutcome::FullySettled));

        office
            .prices
            .publish(TestSnapshotBuilder::new().with_gold(dec!(2000), dec!(2600)).with_usd(dec!(40), dec!(50)).build())
            .await;

        let after = service.preview(&request).await.unwrap();
        assert_eq!(after.payload.has_price_used, Some(dec!(2600)));
        assert_eq!(after.payload.settlement_outcome, Some(SettlementOutcome::Discounted));
        assert_settlement_complete(&after);
    }

    #[tokio::test]
    async fn test_unquoted_currency_is_configuration_error() {
        let office = TestBackOffice::with_snapshot(Some(TestSnapshotBuilder::new().without_eur().build()));
        let ring = StockFixtures::ring();
        office.stock.put_product(ring.clone()).await;

        let err = office
            .service()
            .submit(
                TransactionRequest::new(TransactionType::Sale, Payment::cash(Money::new(dec!(100), Currency::EUR)))
                    .with_line(LineRequest::LotSale { product_id: ring.id, quantity: Decimal::ONE }),
            )
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::Configuration, None);
    }
}

mod service_guarantees {
    use super::*;

    #[tokio::test]
    async fn test_resubmission_is_idempotent() {
        let office = TestBackOffice::new();
        let service = office.service();
        let request = TransactionRequest::new(TransactionType::Hurda, try_cash(dec!(16965)))
            .with_line(LineRequest::Scrap { karat_id: KaratFixtures::k14().id, weight_gram: dec!(10) })
            .with_idempotency_key(IdempotencyKey::new_v7());

        let first = service.submit(request.clone()).await.unwrap();
        let second = service.submit(request).await.unwrap();

        assert_eq!(first.transaction_id, second.transaction_id);
        assert_eq!(office.sink.writes().await, 1);
    }

    #[tokio::test]
    async fn test_preview_writes_nothing() {
        let office = TestBackOffice::new();

        office
            .service()
            .preview(
                &TransactionRequest::new(TransactionType::Hurda, try_cash(dec!(16965)))
                    .with_line(LineRequest::Scrap { karat_id: KaratFixtures::k14().id, weight_gram: dec!(10) }),
            )
            .await
            .unwrap();

        assert_eq!(office.sink.writes().await, 0);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_configuration_error() {
        let office = TestBackOffice::with_snapshot(None);

        let err = office
            .service()
            .submit(TransactionRequest::new(TransactionType::Payment, try_cash(dec!(100))).with_party(PartyId::new()))
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::Configuration, None);
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_stale_snapshot_is_configuration_error() {
        let office = TestBackOffice::new();
        let service = office.service_with(EngineConfig {
            max_snapshot_age_secs: Some(300),
            ..EngineConfig::default()
        });

        let err = service
            .submit(
                TransactionRequest::new(TransactionType::Hurda, try_cash(dec!(16965)))
                    .with_line(LineRequest::Scrap { karat_id: KaratFixtures::k14().id, weight_gram: dec!(10) }),
            )
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::Configuration, None);
    }

    #[tokio::test]
    async fn test_unknown_karat_is_validation_error() {
        let office = TestBackOffice::new();

        let err = office
            .service()
            .preview(
                &TransactionRequest::new(TransactionType::Hurda, try_cash(dec!(1)))
                    .with_line(LineRequest::Scrap { karat_id: KaratId::new(), weight_gram: dec!(10) }),
            )
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::Validation, Some("karat"));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_are_independent() {
        let office = TestBackOffice::new();
        let service = Arc::new(office.service());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .submit(
                            TransactionRequest::new(TransactionType::Hurda, try_cash(dec!(16965))).with_line(
                                LineRequest::Scrap { karat_id: KaratFixtures::k14().id, weight_gram: dec!(10) },
                            ),
                        )
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(office.sink.writes().await, 8);
    }
}
