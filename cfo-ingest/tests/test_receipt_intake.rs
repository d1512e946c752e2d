use anyhow::{Result, bail};
use cfo_core::{Category, Store};
use cfo_finance::{Categorizer, CategorizerConfig, RemoteClassifier, Source, cash_runway, split_bills};
use cfo_ingest::{ImageKind, ReceiptIntake, TextExtractor};
use chrono::NaiveDate;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR fake body";

struct FixedText(&'static str);

impl TextExtractor for FixedText {
    fn extract_text(&self, _image_bytes: &[u8]) -> Result<String> {
        Ok(self.0.to_string())
    }
}

struct BrokenOcr;

impl TextExtractor for BrokenOcr {
    fn extract_text(&self, _image_bytes: &[u8]) -> Result<String> {
        bail!("tesseract failed: exit status 1")
    }
}

struct Offline;

impl RemoteClassifier for Offline {
    fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        bail!("connection refused")
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

/// Scan -> classify -> store -> read back -> metrics, with keyword classification.
#[test]
fn test_receipt_flows_into_dashboard_metrics() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::new(tmp.path().join("data"));
    let categorizer = Categorizer::new(CategorizerConfig::default());

    let ocr = FixedText("CITY GROCERY\nMilk 3.49\nTOTAL 100.00");
    let out = ReceiptIntake::new(&ocr, &categorizer, &store)
        .ingest(PNG, date())
        .unwrap();

    assert_eq!(out.kind, ImageKind::Png);
    assert_eq!(out.source, Source::Keyword { fallback: None });
    assert_eq!(out.expense.category, Category::Food);
    // first two-decimal amount on the receipt, not the total
    assert_eq!(out.expense.amount, 3.49);
    assert_eq!(out.expense.date, date());

    let stored = store.load_expenses().unwrap();
    assert_eq!(stored, vec![out.expense.clone()]);

    let roommates = vec!["Alex".to_string(), "Maya".to_string()];
    let rows = split_bills(&stored, &roommates);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].roommate, "You");
    assert_eq!(rows[2].share, 1.16);

    // mean 3.49 -> burn 13.96 -> 1000 / 13.96 = 71.63..
    assert_eq!(cash_runway(&stored, 1000.0), 71.6);
}

#[test]
fn test_remote_outage_still_stores_expense() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::new(tmp.path());
    let categorizer = Categorizer::new(CategorizerConfig::default()).with_remote(Box::new(Offline));

    let ocr = FixedText("Uber *TRIP 23.10");
    let out = ReceiptIntake::new(&ocr, &categorizer, &store)
        .ingest(PNG, date())
        .unwrap();

    assert_eq!(out.expense.category, Category::Transport);
    assert!(matches!(out.source, Source::Keyword { fallback: Some(_) }));
    assert_eq!(store.load_expenses().unwrap().len(), 1);
}

#[test]
fn test_saved_correction_is_used_on_next_scan() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::new(tmp.path());
    let text = "Starbucks Receipt\nLatte 5.25";

    store.save_correction(text, Category::Food).unwrap();
    let categorizer = Categorizer::new(CategorizerConfig::default())
        .with_corrections(store.load_corrections().unwrap());

    let ocr = FixedText(text);
    let out = ReceiptIntake::new(&ocr, &categorizer, &store)
        .ingest(PNG, date())
        .unwrap();

    assert_eq!(out.expense.category, Category::Food);
    assert!(matches!(out.source, Source::Correction { .. }));
}

#[test]
fn test_rejected_inputs_store_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::new(tmp.path().join("data"));
    let categorizer = Categorizer::new(CategorizerConfig::default());

    let ocr = FixedText("rent 950.00");
    let intake = ReceiptIntake::new(&ocr, &categorizer, &store);
    assert!(intake.ingest(b"%PDF-1.7", date()).is_err());

    let intake = ReceiptIntake::new(&BrokenOcr, &categorizer, &store);
    let err = intake.ingest(PNG, date()).unwrap_err();
    assert!(format!("{err:#}").contains("tesseract failed"));

    assert!(store.load_expenses().unwrap().is_empty());
    assert!(!store.dir().exists());
}
