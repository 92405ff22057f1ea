//! Tests for comparators and the sales record layout
//!
//! These tests verify:
//! - Numeric and byte comparators, including signed and float edge cases
//! - Combinators (reversed, then)
//! - Run-time key descriptions and probe encoding
//! - Date ordering and parsing
//! - Sales record encoding and the sales comparators

use std::cmp::Ordering;

use linksort::compare::{
    compare_bytes, compare_dates, compare_f64_le, compare_i32_le, compare_i64_le,
    compare_sales_by_date_then_product, compare_sales_by_order_date,
    compare_sales_by_product_key, compare_u32_le, compare_u64_le, reversed, then, KeyKind,
    KeySpec,
};
use linksort::record::{
    Date, SaleRecord, DELIVERY_DATE_OFFSET, ORDER_DATE_OFFSET, PRODUCT_KEY_OFFSET,
    SALE_RECORD_SIZE,
};
use linksort::SortError;

// =============================================================================
// Helper Functions
// =============================================================================

fn sale(date: Date, product_key: u16) -> Vec<u8> {
    SaleRecord {
        order_date: date,
        product_key,
        ..SaleRecord::default()
    }
    .encode()
    .unwrap()
}

// =============================================================================
// Numeric Comparator Tests
// =============================================================================

#[test]
fn test_u32_little_endian() {
    assert_eq!(compare_u32_le(&1u32.to_le_bytes(), &256u32.to_le_bytes()), Ordering::Less);
    assert_eq!(compare_u32_le(&7u32.to_le_bytes(), &7u32.to_le_bytes()), Ordering::Equal);
    assert_eq!(compare_u32_le(&u32::MAX.to_le_bytes(), &0u32.to_le_bytes()), Ordering::Greater);
}

#[test]
fn test_signed_comparators() {
    assert_eq!(compare_i32_le(&(-1i32).to_le_bytes(), &1i32.to_le_bytes()), Ordering::Less);
    assert_eq!(compare_i64_le(&i64::MIN.to_le_bytes(), &0i64.to_le_bytes()), Ordering::Less);
    // Unsigned reading of the same bytes flips the order
    assert_eq!(compare_u64_le(&(-1i64).to_le_bytes(), &1i64.to_le_bytes()), Ordering::Greater);
}

#[test]
fn test_f64_total_order() {
    let neg_zero = (-0.0f64).to_le_bytes();
    let zero = 0.0f64.to_le_bytes();
    let nan = f64::NAN.to_le_bytes();
    let inf = f64::INFINITY.to_le_bytes();

    assert_eq!(compare_f64_le(&neg_zero, &zero), Ordering::Less);
    assert_eq!(compare_f64_le(&inf, &nan), Ordering::Less);
    assert_eq!(compare_f64_le(&nan, &nan), Ordering::Equal);
    assert_eq!(compare_f64_le(&1.5f64.to_le_bytes(), &(-2.5f64).to_le_bytes()), Ordering::Greater);
}

#[test]
fn test_short_records_read_as_zero() {
    assert_eq!(compare_u32_le(&[1], &[1, 0, 0, 0]), Ordering::Equal);
    assert_eq!(compare_u64_le(&[], &[0, 0, 0, 0, 0, 0, 0, 1]), Ordering::Less);
}

#[test]
fn test_bytes_lexicographic() {
    assert_eq!(compare_bytes(b"abc", b"abd"), Ordering::Less);
    assert_eq!(compare_bytes(b"b", b"abc"), Ordering::Greater);
    assert_eq!(compare_bytes(b"same", b"same"), Ordering::Equal);
}

// =============================================================================
// Combinator Tests
// =============================================================================

#[test]
fn test_reversed() {
    let descending = reversed(compare_u32_le);
    assert_eq!(descending(&1u32.to_le_bytes(), &2u32.to_le_bytes()), Ordering::Greater);
    assert_eq!(descending(&2u32.to_le_bytes(), &2u32.to_le_bytes()), Ordering::Equal);
}

#[test]
fn test_then_breaks_ties() {
    let first = KeySpec::numeric(KeyKind::U32, 0).comparator();
    let second = KeySpec::numeric(KeyKind::U32, 4).comparator();
    let both = then(first, second);

    let record = |a: u32, b: u32| {
        let mut bytes = a.to_le_bytes().to_vec();
        bytes.extend_from_slice(&b.to_le_bytes());
        bytes
    };

    assert_eq!(both(&record(1, 9), &record(2, 0)), Ordering::Less);
    assert_eq!(both(&record(1, 9), &record(1, 3)), Ordering::Greater);
    assert_eq!(both(&record(1, 3), &record(1, 3)), Ordering::Equal);
}

// =============================================================================
// KeySpec Tests
// =============================================================================

#[test]
fn test_key_kind_from_str() {
    assert_eq!("u32".parse::<KeyKind>().unwrap(), KeyKind::U32);
    assert_eq!("I64".parse::<KeyKind>().unwrap(), KeyKind::I64);
    assert_eq!("str".parse::<KeyKind>().unwrap(), KeyKind::Bytes);
    assert!(matches!("u128".parse::<KeyKind>(), Err(SortError::Config(_))));
}

#[test]
fn test_key_spec_numeric_at_offset() {
    let spec = KeySpec::numeric(KeyKind::I32, 4);
    let a = [0xFF, 0xFF, 0xFF, 0xFF, 1, 0, 0, 0];
    let b = [0, 0, 0, 0, 0xFE, 0xFF, 0xFF, 0xFF];

    assert_eq!(spec.width(), 4);
    assert_eq!(spec.compare(&a, &b), Ordering::Greater);
    assert_eq!(spec.descending(true).compare(&a, &b), Ordering::Less);
}

#[test]
fn test_key_spec_bytes_stop_at_nul() {
    let spec = KeySpec::bytes(0, 6);

    assert_eq!(spec.compare(b"ab\0xyz", b"ab\0qrs"), Ordering::Equal);
    assert_eq!(spec.compare(b"ab\0\0\0\0", b"abc\0\0\0"), Ordering::Less);
}

#[test]
fn test_encode_key_numeric() {
    let spec = KeySpec::numeric(KeyKind::U64, 8);
    let probe = spec.encode_key("513", 16).unwrap();

    assert_eq!(probe.len(), 16);
    assert_eq!(&probe[..8], &[0u8; 8]);
    assert_eq!(&probe[8..], &513u64.to_le_bytes());
}

#[test]
fn test_encode_key_bytes_truncates() {
    let spec = KeySpec::bytes(2, 3);
    let probe = spec.encode_key("abcdef", 6).unwrap();

    assert_eq!(probe, b"\0\0abc\0".to_vec());
}

#[test]
fn test_encode_key_errors() {
    let spec = KeySpec::numeric(KeyKind::U32, 2);

    assert!(matches!(spec.encode_key("1", 4), Err(SortError::Config(_))));
    assert!(matches!(spec.encode_key("x", 8), Err(SortError::Config(_))));
    assert!(matches!(
        KeySpec::bytes(0, 0).encode_key("a", 4),
        Err(SortError::Config(_))
    ));
}

#[test]
fn test_encode_key_huge_offset() {
    let spec = KeySpec::numeric(KeyKind::U64, usize::MAX - 2);
    assert!(matches!(spec.encode_key("1", 8), Err(SortError::Config(_))));

    let spec = KeySpec::bytes(usize::MAX, 4);
    assert!(matches!(spec.encode_key("a", 8), Err(SortError::Config(_))));
}

// =============================================================================
// Date Tests
// =============================================================================

#[test]
fn test_date_orders_year_month_day() {
    let a = Date::new(31, 12, 2019);
    let b = Date::new(1, 1, 2020);
    let c = Date::new(2, 1, 2020);

    assert_eq!(compare_dates(&a, &b), Ordering::Less);
    assert_eq!(compare_dates(&c, &b), Ordering::Greater);
    assert_eq!(compare_dates(&b, &Date::new(1, 1, 2020)), Ordering::Equal);
}

#[test]
fn test_date_parse_and_display() {
    let date: Date = "07/03/2021".parse().unwrap();

    assert_eq!(date, Date::new(7, 3, 2021));
    assert_eq!(date.to_string(), "07/03/2021");
}

#[test]
fn test_date_parse_rejects_invalid() {
    assert!("29/02/2021".parse::<Date>().is_err());
    assert!("31/04/2020".parse::<Date>().is_err());
    assert!("00/01/2020".parse::<Date>().is_err());
    assert!("2020-01-01".parse::<Date>().is_err());
    assert!("aa/01/2020".parse::<Date>().is_err());
    assert!("29/02/2020".parse::<Date>().is_ok());
}

// =============================================================================
// Sales Record Tests
// =============================================================================

#[test]
fn test_sale_encodes_to_fixed_size() {
    let mut record = SaleRecord {
        order_number: 366_000,
        line_item: 2,
        order_date: Date::new(1, 1, 2016),
        delivery_date: Date::new(9, 1, 2016),
        customer_key: 1_234_567,
        store_key: 42,
        product_key: 1_304,
        quantity: 3,
        currency_code: [0; 4],
    };
    record.set_currency("EUR");

    let bytes = record.encode().unwrap();

    assert_eq!(bytes.len(), SALE_RECORD_SIZE);
    assert_eq!(Date::read_at(&bytes, ORDER_DATE_OFFSET), record.order_date);
    assert_eq!(Date::read_at(&bytes, DELIVERY_DATE_OFFSET), record.delivery_date);
    assert_eq!(
        u16::from_le_bytes([bytes[PRODUCT_KEY_OFFSET], bytes[PRODUCT_KEY_OFFSET + 1]]),
        1_304
    );
    assert_eq!(SaleRecord::decode(&bytes).unwrap(), record);
    assert_eq!(record.currency(), "EUR");
}

#[test]
fn test_sale_decode_rejects_wrong_length() {
    let result = SaleRecord::decode(&[0u8; 30]);
    assert!(matches!(result, Err(SortError::Serialization(_))));
}

#[test]
fn test_sales_comparators() {
    let early = sale(Date::new(5, 6, 2019), 900);
    let late = sale(Date::new(4, 6, 2020), 100);
    let late_other = sale(Date::new(4, 6, 2020), 200);

    assert_eq!(compare_sales_by_order_date(&early, &late), Ordering::Less);
    assert_eq!(compare_sales_by_order_date(&late, &late_other), Ordering::Equal);
    assert_eq!(compare_sales_by_product_key(&early, &late), Ordering::Greater);
    assert_eq!(compare_sales_by_date_then_product(&late, &late_other), Ordering::Less);
    assert_eq!(compare_sales_by_date_then_product(&late_other, &early), Ordering::Greater);
}
