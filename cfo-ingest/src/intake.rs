//! Receipt intake: image -> OCR text -> classification + amount -> stored Expense.

use anyhow::{Context, Result};
use cfo_core::{Expense, Store};
use cfo_finance::{Categorizer, Source, extract_amount};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::info;

use crate::ocr::TextExtractor;
use crate::types::ImageKind;

/// Outcome of one scanned receipt
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedReceipt {
    pub expense: Expense,
    pub source: Source,
    pub kind: ImageKind,
}

pub struct ReceiptIntake<'a> {
    extractor: &'a dyn TextExtractor,
    categorizer: &'a Categorizer,
    store: &'a Store,
}

impl<'a> ReceiptIntake<'a> {
    pub fn new(
        extractor: &'a dyn TextExtractor,
        categorizer: &'a Categorizer,
        store: &'a Store,
    ) -> Self {
        Self {
            extractor,
            categorizer,
            store,
        }
    }

    /// Run the full pipeline for one image and append the expense to the store.
    pub fn ingest(&self, image_bytes: &[u8], date: NaiveDate) -> Result<IngestedReceipt> {
        let kind = ImageKind::detect(image_bytes)?;
        let text = self
            .extractor
            .extract_text(image_bytes)
            .context("extract receipt text")?;

        let (expense, source) = build_expense(&text, self.categorizer, date);
        self.store.save_expense(&expense)?;

        info!(
            category = %expense.category,
            amount = expense.amount,
            source = ?source,
            "receipt stored"
        );
        Ok(IngestedReceipt {
            expense,
            source,
            kind,
        })
    }
}

/// Classify text and read its amount, without touching storage
pub fn build_expense(text: &str, categorizer: &Categorizer, date: NaiveDate) -> (Expense, Source) {
    let classification = categorizer.categorize_and_analyze(text);
    let amount = extract_amount(text);
    let expense = Expense::new(
        text,
        classification.category,
        amount,
        classification.insight,
        date,
    );
    (expense, classification.source)
}

/// Today's calendar date in `tz`
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}
