//! Tests for binary point and range search
//!
//! These tests verify:
//! - Every present key is found, absent keys are not
//! - Empty and single-record stores
//! - Range expansion over duplicate runs, including the whole store
//! - Searches on sales records keyed by date

use std::fs;
use std::path::{Path, PathBuf};

use linksort::compare::{compare_sales_by_order_date, compare_u32_le};
use linksort::record::{Date, SaleRecord, SALE_RECORD_SIZE};
use linksort::search::{search_point, search_range, MatchRange};
use linksort::store::{RecordReader, RecordWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sorted.dat");
    (temp_dir, path)
}

fn open_u32_store(path: &Path, values: &[u32]) -> RecordReader {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    fs::write(path, bytes).unwrap();
    RecordReader::open(path, 4).unwrap()
}

fn key(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

fn sale_on(day: u8, month: u8, year: u16, order_number: u64) -> SaleRecord {
    SaleRecord {
        order_number,
        order_date: Date::new(day, month, year),
        ..SaleRecord::default()
    }
}

// =============================================================================
// Point Search Tests
// =============================================================================

#[test]
fn test_point_finds_every_key() {
    let (_temp, path) = setup_temp_store();
    let values: Vec<u32> = (0..50).map(|i| i * 3).collect();
    let mut reader = open_u32_store(&path, &values);

    for (index, value) in values.iter().enumerate() {
        let found = search_point(&mut reader, &key(*value), &compare_u32_le).unwrap();
        assert_eq!(found, Some(index as u64));
    }
}

#[test]
fn test_point_missing_keys() {
    let (_temp, path) = setup_temp_store();
    let mut reader = open_u32_store(&path, &[10, 20, 30, 40]);

    for missing in [0u32, 15, 35, 41, u32::MAX] {
        let found = search_point(&mut reader, &key(missing), &compare_u32_le).unwrap();
        assert_eq!(found, None, "key {}", missing);
    }
}

#[test]
fn test_point_empty_store() {
    let (_temp, path) = setup_temp_store();
    let mut reader = open_u32_store(&path, &[]);

    assert_eq!(search_point(&mut reader, &key(1), &compare_u32_le).unwrap(), None);
}

#[test]
fn test_point_single_record() {
    let (_temp, path) = setup_temp_store();
    let mut reader = open_u32_store(&path, &[7]);

    assert_eq!(search_point(&mut reader, &key(7), &compare_u32_le).unwrap(), Some(0));
    assert_eq!(search_point(&mut reader, &key(6), &compare_u32_le).unwrap(), None);
    assert_eq!(search_point(&mut reader, &key(8), &compare_u32_le).unwrap(), None);
}

#[test]
fn test_point_lands_inside_duplicate_run() {
    let (_temp, path) = setup_temp_store();
    let mut reader = open_u32_store(&path, &[1, 2, 2, 2, 2, 3]);

    let found = search_point(&mut reader, &key(2), &compare_u32_le).unwrap().unwrap();
    assert!((1..=4).contains(&found));
}

// =============================================================================
// Range Search Tests
// =============================================================================

#[test]
fn test_range_duplicate_run() {
    let (_temp, path) = setup_temp_store();
    let mut reader = open_u32_store(&path, &[1, 2, 2, 2, 2, 3, 4]);

    let range = search_range(&mut reader, &key(2), &compare_u32_le).unwrap();

    assert_eq!(range, Some(MatchRange { start: 1, end: 4 }));
    assert_eq!(range.unwrap().len(), 4);
}

#[test]
fn test_range_all_equal() {
    let (_temp, path) = setup_temp_store();
    let mut reader = open_u32_store(&path, &[5; 9]);

    let range = search_range(&mut reader, &key(5), &compare_u32_le).unwrap().unwrap();

    assert_eq!(range.start, 0);
    assert_eq!(range.end, 8);
    assert_eq!(range.len(), 9);
}

#[test]
fn test_range_unique_key() {
    let (_temp, path) = setup_temp_store();
    let mut reader = open_u32_store(&path, &[1, 2, 3]);

    let range = search_range(&mut reader, &key(3), &compare_u32_le).unwrap().unwrap();

    assert_eq!(range, MatchRange { start: 2, end: 2 });
    assert_eq!(range.len(), 1);
    assert!(range.contains(2));
    assert!(!range.contains(1));
}

#[test]
fn test_range_missing_key() {
    let (_temp, path) = setup_temp_store();
    let mut reader = open_u32_store(&path, &[1, 1, 3, 3]);

    assert_eq!(search_range(&mut reader, &key(2), &compare_u32_le).unwrap(), None);
}

#[test]
fn test_range_empty_store() {
    let (_temp, path) = setup_temp_store();
    let mut reader = open_u32_store(&path, &[]);

    assert_eq!(search_range(&mut reader, &key(2), &compare_u32_le).unwrap(), None);
}

#[test]
fn test_range_runs_at_both_edges() {
    let (_temp, path) = setup_temp_store();
    let mut reader = open_u32_store(&path, &[0, 0, 0, 5, 9, 9]);

    let low = search_range(&mut reader, &key(0), &compare_u32_le).unwrap().unwrap();
    let high = search_range(&mut reader, &key(9), &compare_u32_le).unwrap().unwrap();

    assert_eq!(low, MatchRange { start: 0, end: 2 });
    assert_eq!(high, MatchRange { start: 4, end: 5 });
}

// =============================================================================
// Sales Search Tests
// =============================================================================

#[test]
fn test_range_sales_by_order_date() {
    let (_temp, path) = setup_temp_store();
    let sales = [
        sale_on(1, 1, 2020, 1),
        sale_on(15, 3, 2020, 2),
        sale_on(15, 3, 2020, 3),
        sale_on(15, 3, 2020, 4),
        sale_on(2, 4, 2020, 5),
        sale_on(1, 1, 2021, 6),
    ];

    let mut writer = RecordWriter::create(&path, SALE_RECORD_SIZE).unwrap();
    for sale in &sales {
        writer.append(&sale.encode().unwrap()).unwrap();
    }
    writer.finish(false).unwrap();

    let mut reader = RecordReader::open(&path, SALE_RECORD_SIZE).unwrap();
    let probe = sale_on(15, 3, 2020, 0).encode().unwrap();

    let range = search_range(&mut reader, &probe, &compare_sales_by_order_date).unwrap();
    assert_eq!(range, Some(MatchRange { start: 1, end: 3 }));

    let absent = sale_on(16, 3, 2020, 0).encode().unwrap();
    assert_eq!(search_point(&mut reader, &absent, &compare_sales_by_order_date).unwrap(), None);
}
