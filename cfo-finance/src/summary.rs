//! Per-category aggregates behind the dashboard charts.

use cfo_core::{Category, Expense};
use serde::Serialize;

use crate::metrics::total_spent;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: f64,
    /// Number of expenses in the category
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub amount: f64,
    /// Fraction of total spending, 0.0..=1.0
    pub fraction: f64,
}

/// Cash flow by category, in order of first appearance.
/// `None` when there are no expenses (nothing to chart).
pub fn cash_flow_by_category(expenses: &[Expense]) -> Option<Vec<CategoryTotal>> {
    if expenses.is_empty() {
        return None;
    }

    let mut totals: Vec<CategoryTotal> = Vec::new();
    for e in expenses {
        match totals.iter_mut().find(|t| t.category == e.category) {
            Some(t) => {
                t.amount += e.amount;
                t.count += 1;
            }
            None => totals.push(CategoryTotal {
                category: e.category,
                amount: e.amount,
                count: 1,
            }),
        }
    }
    Some(totals)
}

/// Top spending categories with their share of the total, largest first.
/// `None` when there are no expenses.
pub fn top_categories(expenses: &[Expense]) -> Option<Vec<CategoryShare>> {
    let totals = cash_flow_by_category(expenses)?;
    let grand_total = total_spent(expenses);

    let mut shares: Vec<CategoryShare> = totals
        .into_iter()
        .map(|t| CategoryShare {
            category: t.category,
            amount: t.amount,
            fraction: if grand_total > 0.0 {
                t.amount / grand_total
            } else {
                0.0
            },
        })
        .collect();

    // stable sort keeps first-appearance order for ties
    shares.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    Some(shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn e(category: Category, amount: f64) -> Expense {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        Expense::new("receipt", category, amount, "", date)
    }

    #[test]
    fn test_empty_has_no_chart() {
        assert!(cash_flow_by_category(&[]).is_none());
        assert!(top_categories(&[]).is_none());
    }

    #[test]
    fn test_cash_flow_groups_in_first_seen_order() {
        let xs = vec![
            e(Category::Food, 10.0),
            e(Category::Housing, 900.0),
            e(Category::Food, 5.5),
        ];
        let totals = cash_flow_by_category(&xs).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, Category::Food);
        assert_eq!(totals[0].amount, 15.5);
        assert_eq!(totals[0].count, 2);
        assert_eq!(totals[1].category, Category::Housing);
    }

    #[test]
    fn test_top_categories_sorted_with_fractions() {
        let xs = vec![
            e(Category::Food, 25.0),
            e(Category::Housing, 75.0),
        ];
        let shares = top_categories(&xs).unwrap();
        assert_eq!(shares[0].category, Category::Housing);
        assert_eq!(shares[0].fraction, 0.75);
        assert_eq!(shares[1].fraction, 0.25);
    }

    #[test]
    fn test_zero_total_has_zero_fractions() {
        let shares = top_categories(&[e(Category::Misc, 0.0)]).unwrap();
        assert_eq!(shares[0].fraction, 0.0);
    }
}
