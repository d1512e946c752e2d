//! Record types for receipts, reminders and expense categories

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An expense captured from a scanned receipt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    /// OCR text the expense was built from
    pub raw_text: String,
    pub category: Category,
    /// Non-negative amount; 0.0 when no amount could be read
    pub amount: f64,
    /// Short observation about the expense
    pub insight: String,
    /// Day the receipt was recorded (YYYY-MM-DD)
    pub date: NaiveDate,
}

/// A manually entered payment reminder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reminder {
    pub name: String,
    pub due: NaiveDate,
    pub amount: f64,
}

/// Expense categories, in keyword-rule priority order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Housing,
    Transport,
    Food,
    Education,
    Subscription,
    Misc,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Housing,
        Category::Transport,
        Category::Food,
        Category::Education,
        Category::Subscription,
        Category::Misc,
    ];

    /// Label as stored on disk and shown to users
    pub fn label(&self) -> &'static str {
        match self {
            Category::Housing => "Housing",
            Category::Transport => "Transport",
            Category::Food => "Food",
            Category::Education => "Education",
            Category::Subscription => "Subscription",
            Category::Misc => "Misc",
        }
    }

    /// Lenient label match used for model replies and stored corrections.
    ///
    /// Case-insensitive, ignores surrounding punctuation/markdown, and accepts
    /// plural forms ("Subscriptions").
    pub fn from_label(label: &str) -> Option<Category> {
        let cleaned = label
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        let singular = cleaned.strip_suffix('s').unwrap_or(&cleaned);
        Category::ALL
            .into_iter()
            .find(|c| {
                let l = c.label().to_lowercase();
                l == cleaned || l == singular
            })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_label(s).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown category '{s}' (expected one of: Housing, Transport, Food, Education, Subscription, Misc)"
            )
        })
    }
}

impl Expense {
    /// Create a new Expense
    pub fn new(
        raw_text: impl Into<String>,
        category: Category,
        amount: f64,
        insight: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            raw_text: raw_text.into(),
            category,
            amount,
            insight: insight.into(),
            date,
        }
    }
}

impl Reminder {
    pub fn new(name: impl Into<String>, due: NaiveDate, amount: f64) -> Self {
        Self {
            name: name.into(),
            due,
            amount,
        }
    }

    /// Days until due, negative once overdue
    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.due - today).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_json_shape() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let e = Expense::new("FRESH GROCERY 12.99", Category::Food, 12.99, "Weekly shop.", date);
        let v: serde_json::Value = serde_json::to_value(&e).unwrap();
        assert_eq!(v["category"], "Food");
        assert_eq!(v["date"], "2026-10-18");
        assert_eq!(v["amount"], 12.99);
        assert_eq!(v["raw_text"], "FRESH GROCERY 12.99");
    }

    #[test]
    fn test_category_from_label() {
        assert_eq!(Category::from_label("Food"), Some(Category::Food));
        assert_eq!(Category::from_label(" **transport** "), Some(Category::Transport));
        assert_eq!(Category::from_label("Subscriptions."), Some(Category::Subscription));
        assert_eq!(Category::from_label("Entertainment"), None);
        assert!("housing".parse::<Category>().is_ok());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn test_reminder_days_until() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let r = Reminder::new("Rent", NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(), 950.0);
        assert_eq!(r.days_until(today), 14);
    }
}
