use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "flexible_date")]
    pub date: DateTime<Utc>,
}

impl Expense {
    /// Calendar day of the expense in UTC.
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Description, or `fallback` when the user left it blank.
    pub fn description_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.description.trim().is_empty() {
            fallback
        } else {
            &self.description
        }
    }
}

/// Body of `POST /expenses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    #[serde(serialize_with = "iso_day")]
    pub date: NaiveDate,
}

impl NewExpense {
    /// Build a new expense from raw form input.
    ///
    /// Amount, category and date are required. Amount must parse as a number.
    pub fn from_form(
        amount: &str,
        category: &str,
        description: &str,
        date: &str,
    ) -> Result<Self, FormError> {
        let (amount, category, date) = (amount.trim(), category.trim(), date.trim());
        if amount.is_empty() || category.is_empty() || date.is_empty() {
            return Err(FormError::MissingFields);
        }
        let amount = amount
            .parse::<Decimal>()
            .map_err(|_| FormError::InvalidAmount(amount.to_string()))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(date.to_string()))?;
        Ok(Self {
            amount,
            category: category.to_string(),
            description: description.trim().to_string(),
            date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please fill all required fields")]
    MissingFields,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` (midnight UTC).
fn flexible_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn iso_day<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
}
