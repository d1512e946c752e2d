//! cfo-finance: amount extraction, receipt categorization, and dashboard metrics

pub mod amount;
pub mod categorizer;
pub mod category_rules;
pub mod metrics;
pub mod summary;

pub use amount::extract_amount;
pub use categorizer::{
    Categorizer, CategorizerConfig, Classification, RemoteClassifier, Source,
};
pub use category_rules::{keyword_category, keyword_insight};
pub use metrics::{Share, cash_runway, split_bills, total_spent};
pub use summary::{CategoryShare, CategoryTotal, cash_flow_by_category, top_categories};
