#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{parse_date, Expense};

fn make_expense(amount: Decimal, category: &str, date: &str) -> Expense {
    Expense {
        id: format!("{category}-{date}"),
        amount,
        category: category.into(),
        description: String::new(),
        date: parse_date(date).unwrap(),
    }
}

fn sample() -> Vec<Expense> {
    vec![
        make_expense(dec!(250), "Food", "2024-01-15T09:00:00Z"),
        make_expense(dec!(40.50), "Transport", "2024-01-14T18:30:00Z"),
        make_expense(dec!(120), "Food", "2024-01-14T12:00:00Z"),
        make_expense(dec!(999.99), "Shopping", "2023-12-31T23:59:59Z"),
    ]
}

fn day(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── total ─────────────────────────────────────────────────────

#[test]
fn test_total() {
    assert_eq!(total(&sample()), dec!(1410.49));
}

#[test]
fn test_total_empty() {
    assert_eq!(total(&[]), Decimal::ZERO);
}

// ── by_category ───────────────────────────────────────────────

#[test]
fn test_by_category_first_appearance_order() {
    let cats = by_category(&sample());
    let names: Vec<&str> = cats.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Food", "Transport", "Shopping"]);
    assert_eq!(cats[0].amount, dec!(370));
    assert_eq!(cats[1].amount, dec!(40.50));
    assert_eq!(cats[2].amount, dec!(999.99));
}

#[test]
fn test_by_category_is_case_sensitive() {
    let expenses = vec![
        make_expense(dec!(1), "Food", "2024-01-01"),
        make_expense(dec!(2), "food", "2024-01-01"),
    ];
    assert_eq!(by_category(&expenses).len(), 2);
}

// ── daily ─────────────────────────────────────────────────────

#[test]
fn test_daily_sorted_chronologically_across_years() {
    let days = daily(&sample());
    let keys: Vec<_> = days.iter().map(|d| d.day).collect();
    assert_eq!(keys, vec![day(2023, 12, 31), day(2024, 1, 14), day(2024, 1, 15)]);
    assert_eq!(days[1].amount, dec!(160.50));
}

#[test]
fn test_daily_groups_by_utc_day() {
    let expenses = vec![
        make_expense(dec!(10), "Food", "2024-03-02T23:30:00-05:00"),
        make_expense(dec!(5), "Food", "2024-03-03T01:00:00Z"),
    ];
    let days = daily(&expenses);
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].day, day(2024, 3, 3));
    assert_eq!(days[0].amount, dec!(15));
}

#[test]
fn test_daily_label() {
    let d = DailyTotal {
        day: day(2024, 1, 5),
        amount: dec!(1),
    };
    assert_eq!(d.label(), "Jan 5");
}

// ── average_per_day ───────────────────────────────────────────

#[test]
fn test_average_divides_by_distinct_days() {
    // 1410.49 over 3 distinct days
    let avg = average_per_day(&sample());
    assert_eq!(avg.round_dp(2), dec!(470.16));
}

#[test]
fn test_average_empty_is_zero() {
    assert_eq!(average_per_day(&[]), Decimal::ZERO);
}

#[test]
fn test_average_over_no_days_is_zero() {
    assert_eq!(average_over(dec!(12.50), 0), Decimal::ZERO);
    assert_eq!(average_over(dec!(100.25), 2), dec!(50.125));
}

#[test]
fn test_average_single_day() {
    let expenses = vec![
        make_expense(dec!(30), "Food", "2024-01-01T08:00:00Z"),
        make_expense(dec!(20), "Food", "2024-01-01T20:00:00Z"),
    ];
    assert_eq!(average_per_day(&expenses), dec!(50));
}

// ── summarize ─────────────────────────────────────────────────

#[test]
fn test_summarize_matches_parts() {
    let expenses = sample();
    let summary = summarize(&expenses);
    assert_eq!(summary.total, total(&expenses));
    assert_eq!(summary.average_per_day, average_per_day(&expenses));
    assert_eq!(summary.by_category, by_category(&expenses));
    assert_eq!(summary.daily, daily(&expenses));
    assert_eq!(summary.count, 4);
    assert!(!summary.is_empty());
}

#[test]
fn test_summarize_empty() {
    let summary = summarize(&[]);
    assert!(summary.is_empty());
    assert_eq!(summary, Summary::default());
}
