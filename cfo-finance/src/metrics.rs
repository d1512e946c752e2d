//! Derived dashboard metrics: cash runway and equal bill split.

use cfo_core::Expense;
use serde::Serialize;

/// Weeks per month used to project the average receipt into a monthly burn
pub const WEEKS_PER_MONTH: f64 = 4.0;

/// Name of the row representing the user in a bill split
pub const SELF_NAME: &str = "You";

/// Months `balance` lasts at the current burn rate.
///
/// Monthly burn is the mean expense amount times four. Returns 0.0 for no
/// expenses and `f64::INFINITY` when the burn is exactly zero; otherwise the
/// result is rounded to one decimal place.
pub fn cash_runway(expenses: &[Expense], balance: f64) -> f64 {
    if expenses.is_empty() {
        return 0.0;
    }
    let mean = total_spent(expenses) / expenses.len() as f64;
    let monthly_burn = mean * WEEKS_PER_MONTH;
    if monthly_burn == 0.0 {
        return f64::INFINITY;
    }
    round_to(balance / monthly_burn, 1)
}

/// One row of a bill split
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub roommate: String,
    pub share: f64,
}

/// Split the total of all expenses equally between `roommates` and the user.
///
/// One row per roommate in input order, then a final [`SELF_NAME`] row; every
/// row carries the same share. With no roommates the user carries the whole
/// total. Who actually paid is not considered.
pub fn split_bills(expenses: &[Expense], roommates: &[String]) -> Vec<Share> {
    let total = total_spent(expenses);
    let per_person = if roommates.is_empty() {
        total
    } else {
        round_to(total / (roommates.len() + 1) as f64, 2)
    };

    roommates
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(SELF_NAME))
        .map(|name| Share {
            roommate: name.to_string(),
            share: per_person,
        })
        .collect()
}

/// Sum of all expense amounts (0.0 when empty)
pub fn total_spent(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfo_core::Category;
    use chrono::NaiveDate;

    fn expenses(amounts: &[f64]) -> Vec<Expense> {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        amounts
            .iter()
            .map(|a| Expense::new("receipt", Category::Misc, *a, "", date))
            .collect()
    }

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_runway_from_mean() {
        // mean 100 -> burn 400 -> 1000 / 400
        assert_eq!(cash_runway(&expenses(&[50.0, 150.0]), 1000.0), 2.5);
    }

    #[test]
    fn test_runway_rounds_to_one_decimal() {
        // burn 4 * 30 = 120 -> 1000 / 120 = 8.333..
        assert_eq!(cash_runway(&expenses(&[30.0]), 1000.0), 8.3);
    }

    #[test]
    fn test_runway_zero_burn_is_infinite() {
        let r = cash_runway(&expenses(&[0.0, 0.0]), 1000.0);
        assert!(r.is_infinite() && r.is_sign_positive());
    }

    #[test]
    fn test_runway_empty_is_zero() {
        assert_eq!(cash_runway(&[], 1000.0), 0.0);
    }

    #[test]
    fn test_split_with_roommates() {
        let rows = split_bills(&expenses(&[100.0, 200.0]), &names(&["Alex", "Maya"]));
        assert_eq!(
            rows,
            vec![
                Share { roommate: "Alex".into(), share: 100.0 },
                Share { roommate: "Maya".into(), share: 100.0 },
                Share { roommate: "You".into(), share: 100.0 },
            ]
        );
    }

    #[test]
    fn test_split_alone() {
        let rows = split_bills(&expenses(&[300.0]), &[]);
        assert_eq!(rows, vec![Share { roommate: "You".into(), share: 300.0 }]);
    }

    #[test]
    fn test_split_rounds_to_cents() {
        let rows = split_bills(&expenses(&[100.0]), &names(&["Alex", "Maya"]));
        assert!(rows.iter().all(|r| r.share == 33.33));
    }

    #[test]
    fn test_split_no_expenses() {
        let rows = split_bills(&[], &names(&["Alex"]));
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.share == 0.0));
    }
}
