//! Pure aggregation over fetched ledger rows.
//!
//! Nothing here touches the store: callers fetch the summary rows once and
//! recompute these views as often as they like. The reference date is passed
//! in so the window math stays deterministic.

use chrono::{Datelike, Days, NaiveDate};
use db::models::expense::{ExpenseSummaryRow, ExpenseType};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

const UNCATEGORIZED: &str = "Uncategorized";
const UNCATEGORIZED_COLOR: &str = "#888888";

/// Which slice of the ledger to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS, Default)]
#[serde(rename_all = "lowercase", tag = "window")]
pub enum TimeWindow {
    #[default]
    All,
    #[serde(rename = "7days")]
    Last7Days,
    #[serde(rename = "month")]
    ThisMonth,
    Range {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct LedgerSummary {
    pub total_expenses: f64,
    pub total_income: f64,
    pub net_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct CategoryTotal {
    pub name: String,
    pub color: String,
    pub amount: f64,
}

/// Keep only the rows inside the window. A range with either bound missing
/// filters nothing.
pub fn filter_window(
    rows: &[ExpenseSummaryRow],
    window: TimeWindow,
    today: NaiveDate,
) -> Vec<ExpenseSummaryRow> {
    let keep: Box<dyn Fn(&ExpenseSummaryRow) -> bool> = match window {
        TimeWindow::All => Box::new(|_| true),
        TimeWindow::Last7Days => {
            let cutoff = today - Days::new(7);
            Box::new(move |row| row.date >= cutoff)
        }
        TimeWindow::ThisMonth => {
            let first = today.with_day(1).unwrap_or(today);
            Box::new(move |row| row.date >= first)
        }
        TimeWindow::Range { from, to } => match (from, to) {
            (Some(from), Some(to)) => Box::new(move |row| row.date >= from && row.date <= to),
            _ => Box::new(|_| true),
        },
    };
    rows.iter().filter(|row| keep(row)).cloned().collect()
}

/// Income and expense totals plus the resulting balance.
pub fn summarize(rows: &[ExpenseSummaryRow]) -> LedgerSummary {
    let total_expenses = total_of(rows, ExpenseType::Expense);
    let total_income = total_of(rows, ExpenseType::Income);
    LedgerSummary {
        total_expenses,
        total_income,
        net_balance: total_income - total_expenses,
    }
}

fn total_of(rows: &[ExpenseSummaryRow], kind: ExpenseType) -> f64 {
    rows.iter()
        .filter(|row| row.expense_type == kind)
        .map(|row| row.amount)
        .sum()
}

/// Per-category totals for one transaction kind, largest first. Rows with no
/// category fall into "Uncategorized".
pub fn totals_by_category(rows: &[ExpenseSummaryRow], kind: ExpenseType) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for row in rows.iter().filter(|row| row.expense_type == kind) {
        let name = row.category_name.as_deref().unwrap_or(UNCATEGORIZED);
        match totals.iter_mut().find(|t| t.name == name) {
            Some(total) => total.amount += row.amount,
            None => totals.push(CategoryTotal {
                name: name.to_string(),
                color: row
                    .category_color
                    .clone()
                    .unwrap_or_else(|| UNCATEGORIZED_COLOR.to_string()),
                amount: row.amount,
            }),
        }
    }
    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    totals
}

/// Share of `total`, as a percentage; zero when there is no total.
pub fn percentage(amount: f64, total: f64) -> f64 {
    if total > 0.0 { amount / total * 100.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(amount: f64, kind: ExpenseType, category: Option<&str>, date: NaiveDate) -> ExpenseSummaryRow {
        ExpenseSummaryRow {
            amount,
            date,
            expense_type: kind,
            category_name: category.map(str::to_string),
            category_color: category.map(|_| "#ff0000".to_string()),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    #[test]
    fn totals_and_net_balance() {
        let rows = vec![
            row(10.0, ExpenseType::Expense, Some("Food"), day(1)),
            row(5.0, ExpenseType::Income, Some("Gift"), day(2)),
        ];
        let summary = summarize(&rows);
        assert_eq!(summary.total_expenses, 10.0);
        assert_eq!(summary.total_income, 5.0);
        assert_eq!(summary.net_balance, -5.0);
    }

    #[test]
    fn percentage_is_zero_when_total_is_zero() {
        assert_eq!(percentage(10.0, 0.0), 0.0);
        assert_eq!(percentage(25.0, 100.0), 25.0);
    }

    #[test]
    fn seven_day_window_keeps_recent_rows() {
        let rows = vec![
            row(1.0, ExpenseType::Expense, None, day(20)),
            row(2.0, ExpenseType::Expense, None, day(13)),
            row(4.0, ExpenseType::Expense, None, day(12)),
        ];
        let filtered = filter_window(&rows, TimeWindow::Last7Days, day(20));
        let amounts: Vec<f64> = filtered.iter().map(|r| r.amount).collect();
        // Cutoff is an inclusive >= of today minus seven days.
        assert_eq!(amounts, vec![1.0, 2.0]);
    }

    #[test]
    fn month_window_starts_at_the_first() {
        let rows = vec![
            row(1.0, ExpenseType::Expense, None, day(1)),
            row(2.0, ExpenseType::Expense, None, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
        ];
        let filtered = filter_window(&rows, TimeWindow::ThisMonth, day(15));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].amount, 1.0);
    }

    #[test]
    fn range_window_is_inclusive_and_ignores_open_ranges() {
        let rows = vec![
            row(1.0, ExpenseType::Expense, None, day(5)),
            row(2.0, ExpenseType::Expense, None, day(10)),
            row(3.0, ExpenseType::Expense, None, day(15)),
        ];
        let bounded = filter_window(
            &rows,
            TimeWindow::Range {
                from: Some(day(5)),
                to: Some(day(10)),
            },
            day(20),
        );
        assert_eq!(bounded.len(), 2);

        let open = filter_window(
            &rows,
            TimeWindow::Range {
                from: Some(day(5)),
                to: None,
            },
            day(20),
        );
        assert_eq!(open.len(), 3);
    }

    #[test]
    fn category_totals_group_sort_and_default() {
        let rows = vec![
            row(3.0, ExpenseType::Expense, Some("Food"), day(1)),
            row(7.0, ExpenseType::Expense, Some("Transport"), day(2)),
            row(2.0, ExpenseType::Expense, Some("Food"), day(3)),
            row(1.0, ExpenseType::Expense, None, day(4)),
            row(50.0, ExpenseType::Income, Some("Salary"), day(5)),
        ];
        let totals = totals_by_category(&rows, ExpenseType::Expense);
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0].name, "Transport");
        assert_eq!(totals[0].amount, 7.0);
        assert_eq!(totals[1].name, "Food");
        assert_eq!(totals[1].amount, 5.0);
        assert_eq!(totals[2].name, "Uncategorized");
        assert_eq!(totals[2].color, "#888888");

        let income = totals_by_category(&rows, ExpenseType::Income);
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].amount, 50.0);
    }
}
