//! cfo-ingest: receipt image intake (format check, OCR, classification, storage).

pub mod intake;
pub mod ocr;
pub mod types;

pub use intake::{IngestedReceipt, ReceiptIntake, build_expense, today_in};
pub use ocr::{TesseractCli, TextExtractor};
pub use types::ImageKind;
