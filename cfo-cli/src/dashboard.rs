//! Plain-text dashboard: metrics, category charts, insights, reminders, split.

use cfo_core::{Expense, Reminder};
use cfo_finance::{
    CategoryShare, CategoryTotal, Share, cash_flow_by_category, cash_runway, split_bills,
    top_categories, total_spent,
};
use chrono::NaiveDate;

const BAR_WIDTH: usize = 30;

pub struct DashboardInput<'a> {
    pub expenses: &'a [Expense],
    pub reminders: &'a [Reminder],
    pub roommates: &'a [String],
    pub balance: f64,
    pub income: f64,
    pub today: NaiveDate,
}

pub fn render_dashboard(input: &DashboardInput) -> String {
    let mut s = String::new();
    s.push_str("# Dashboard\n\n");

    if input.expenses.is_empty() {
        s.push_str("No expenses yet. Scan receipts to get started!\n");
        return s;
    }

    s.push_str(&format!("Income:          ${:.2}\n", input.income));
    s.push_str(&format!("Total expenses:  ${:.2}\n", total_spent(input.expenses)));
    s.push_str(&format!(
        "Cash runway:     {}\n\n",
        format_runway(cash_runway(input.expenses, input.balance))
    ));

    if let Some(totals) = cash_flow_by_category(input.expenses) {
        s.push_str("## Cash flow by category\n\n");
        s.push_str(&render_bar_chart(&totals));
        s.push('\n');
    }

    if let Some(shares) = top_categories(input.expenses) {
        s.push_str("## Top spending categories\n\n");
        s.push_str(&render_shares(&shares));
        s.push('\n');
    }

    s.push_str("## Insights\n\n");
    for e in input.expenses {
        s.push_str(&format!("- {} (${:.2}): {}\n", e.category, e.amount, e.insight));
    }
    s.push('\n');

    s.push_str("## Payment reminders\n\n");
    s.push_str(&render_reminders(input.reminders, input.today));
    s.push('\n');

    s.push_str("## Split bills\n\n");
    s.push_str(&render_split(&split_bills(input.expenses, input.roommates)));
    s
}

pub fn format_runway(months: f64) -> String {
    if months.is_infinite() {
        "unlimited (no spending recorded)".to_string()
    } else {
        format!("{months} months")
    }
}

pub fn render_bar_chart(totals: &[CategoryTotal]) -> String {
    let max = totals.iter().map(|t| t.amount).fold(0.0_f64, f64::max);
    let mut s = String::new();
    for t in totals {
        let len = if max > 0.0 {
            ((t.amount / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        s.push_str(&format!(
            "{:<12} {:<width$} ${:.2}\n",
            t.category.label(),
            "#".repeat(len),
            t.amount,
            width = BAR_WIDTH
        ));
    }
    s
}

pub fn render_shares(shares: &[CategoryShare]) -> String {
    let mut s = String::new();
    for sh in shares {
        s.push_str(&format!(
            "{:<12} {:>5.1}%  ${:.2}\n",
            sh.category.label(),
            sh.fraction * 100.0,
            sh.amount
        ));
    }
    s
}

pub fn render_reminders(reminders: &[Reminder], today: NaiveDate) -> String {
    if reminders.is_empty() {
        return "No reminders added yet.\n".to_string();
    }
    let mut s = String::new();
    s.push_str(&format!("{:<20} {:<12} {:>10}  {}\n", "Name", "Due", "Amount", "When"));
    for r in reminders {
        let days = r.days_until(today);
        let when = match days {
            d if d < 0 => format!("overdue by {} days", -d),
            0 => "today".to_string(),
            d => format!("in {d} days"),
        };
        s.push_str(&format!(
            "{:<20} {:<12} {:>10.2}  {}\n",
            r.name,
            r.due.to_string(),
            r.amount,
            when
        ));
    }
    s
}

pub fn render_split(rows: &[Share]) -> String {
    let mut s = String::new();
    s.push_str(&format!("{:<20} {:>10}\n", "Roommate", "Share"));
    for r in rows {
        s.push_str(&format!("{:<20} {:>10.2}\n", r.roommate, r.share));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfo_core::Category;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn sample() -> Vec<Expense> {
        vec![
            Expense::new("rent 200.00", Category::Housing, 200.0, "Rent is due.", today()),
            Expense::new("grocery 100.00", Category::Food, 100.0, "Weekly shop.", today()),
        ]
    }

    #[test]
    fn test_empty_dashboard() {
        let input = DashboardInput {
            expenses: &[],
            reminders: &[],
            roommates: &[],
            balance: 3000.0,
            income: 3000.0,
            today: today(),
        };
        let out = render_dashboard(&input);
        assert!(out.contains("No expenses yet."));
        assert!(!out.contains("Split bills"));
    }

    #[test]
    fn test_full_dashboard_sections() {
        let expenses = sample();
        let roommates = vec!["Alex".to_string(), "Maya".to_string()];
        let input = DashboardInput {
            expenses: &expenses,
            reminders: &[],
            roommates: &roommates,
            balance: 3000.0,
            income: 3000.0,
            today: today(),
        };
        let out = render_dashboard(&input);
        assert!(out.contains("Total expenses:  $300.00"));
        // mean 150 -> burn 600 -> 5 months
        assert!(out.contains("Cash runway:     5 months"));
        assert!(out.contains("- Housing ($200.00): Rent is due."));
        assert!(out.contains("No reminders added yet."));
        assert!(out.contains("You"));
        assert!(out.contains("100.00"));
    }

    #[test]
    fn test_bar_chart_scales_to_largest() {
        let totals = cash_flow_by_category(&sample()).unwrap();
        let chart = render_bar_chart(&totals);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[0].matches('#').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_reminder_when_column() {
        let reminders = vec![
            Reminder::new("Rent", NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(), 950.0),
            Reminder::new("Phone", today(), 40.0),
            Reminder::new("Gym", NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(), 25.0),
        ];
        let out = render_reminders(&reminders, today());
        assert!(out.contains("in 14 days"));
        assert!(out.contains("today"));
        assert!(out.contains("overdue by 3 days"));
    }

    #[test]
    fn test_format_runway() {
        assert_eq!(format_runway(f64::INFINITY), "unlimited (no spending recorded)");
        assert_eq!(format_runway(2.5), "2.5 months");
    }
}
