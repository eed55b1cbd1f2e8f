//! Tests for strongly typed identifiers

use core_kernel::{KaratId, ProductId, ProductTypeId, PartyId, TransactionId, IdempotencyKey};
use uuid::Uuid;

#[test]
fn test_new_generates_unique_ids() {
    assert_ne!(ProductId::new(), ProductId::new());
}

#[test]
fn test_prefixes() {
    assert_eq!(KaratId::prefix(), "KRT");
    assert_eq!(ProductId::prefix(), "PRD");
    assert_eq!(ProductTypeId::prefix(), "PTP");
    assert_eq!(PartyId::prefix(), "PTY");
    assert_eq!(TransactionId::prefix(), "TXN");
    assert_eq!(IdempotencyKey::prefix(), "IDEM");
}

#[test]
fn test_from_str_round_trip() {
    let original = PartyId::new();
    let parsed: PartyId = original.to_string().parse().unwrap();
    assert_eq!(original, parsed);
}

#[test]
fn test_from_str_rejects_garbage() {
    assert!("PTY-not-a-uuid".parse::<PartyId>().is_err());
}

#[test]
fn test_json_serialization_is_transparent() {
    let uuid = Uuid::new_v4();
    let key = IdempotencyKey::from_uuid(uuid);
    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(json, format!("\"{}\"", uuid));
    let back: IdempotencyKey = serde_json::from_str(&json).unwrap();
    assert_eq!(back, key);
}

#[test]
fn test_fixed_ids_are_stable() {
    assert_eq!(KaratId::from_u128(22), KaratId::from_u128(22));
    assert_ne!(KaratId::from_u128(22), KaratId::from_u128(24));
}
