//! Aggregates shown on the dashboard and in reports.
//!
//! All figures are computed from the expense list already in memory.
//! Days are UTC calendar days.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::Expense;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryTotal {
    pub(crate) name: String,
    pub(crate) amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DailyTotal {
    pub(crate) day: NaiveDate,
    pub(crate) amount: Decimal,
}

impl DailyTotal {
    /// Short chart label, e.g. `Jan 5`.
    pub(crate) fn label(&self) -> String {
        self.day.format("%b %-d").to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) total: Decimal,
    pub(crate) average_per_day: Decimal,
    pub(crate) by_category: Vec<CategoryTotal>,
    pub(crate) daily: Vec<DailyTotal>,
    pub(crate) count: usize,
}

impl Summary {
    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }
}

pub(crate) fn total(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}

/// Per-category sums, in the order each category first appears.
pub(crate) fn by_category(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for expense in expenses {
        match index.get(expense.category.as_str()) {
            Some(&i) => totals[i].amount += expense.amount,
            None => {
                index.insert(&expense.category, totals.len());
                totals.push(CategoryTotal {
                    name: expense.category.clone(),
                    amount: expense.amount,
                });
            }
        }
    }
    totals
}

/// Per-day sums, oldest day first.
pub(crate) fn daily(expenses: &[Expense]) -> Vec<DailyTotal> {
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for expense in expenses {
        *days.entry(expense.day()).or_default() += expense.amount;
    }
    days.into_iter()
        .map(|(day, amount)| DailyTotal { day, amount })
        .collect()
}

/// Total spend divided by the number of distinct days with spending.
pub(crate) fn average_per_day(expenses: &[Expense]) -> Decimal {
    average_over(total(expenses), daily(expenses).len())
}

fn average_over(total: Decimal, days: usize) -> Decimal {
    if days == 0 {
        return Decimal::ZERO;
    }
    total / Decimal::from(days)
}

pub(crate) fn summarize(expenses: &[Expense]) -> Summary {
    let total = total(expenses);
    let daily = daily(expenses);
    let average_per_day = average_over(total, daily.len());
    Summary {
        total,
        average_per_day,
        by_category: by_category(expenses),
        daily,
        count: expenses.len(),
    }
}

#[cfg(test)]
mod tests;
