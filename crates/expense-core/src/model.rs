//! Expense rows and the form they are built from

use crate::error::ExpenseError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the `expenses` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub user_id: String,
    pub amount: f64,
    pub category: String,
    pub note: Option<String>,
    /// Serialized as `YYYY-MM-DD`
    pub date: Option<NaiveDate>,
}

/// Raw field values as submitted by the expense form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpenseForm {
    pub amount: String,
    pub category: String,
    pub note: String,
    pub date: String,
}

impl ExpenseForm {
    pub fn new(amount: &str, category: &str, note: &str, date: &str) -> Self {
        Self {
            amount: amount.to_string(),
            category: category.to_string(),
            note: note.to_string(),
            date: date.to_string(),
        }
    }

    /// Validate the fields and build the row to insert for `user_id`
    pub fn parse(&self, user_id: &str) -> Result<Expense, ExpenseError> {
        Ok(Expense {
            user_id: user_id.to_string(),
            amount: parse_amount(&self.amount)?,
            category: parse_category(&self.category)?,
            note: non_empty(&self.note),
            date: parse_date(&self.date)?,
        })
    }
}

fn parse_amount(raw: &str) -> Result<f64, ExpenseError> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ExpenseError::Validation("Amount must be a number".into()))?;

    if !amount.is_finite() {
        return Err(ExpenseError::Validation("Amount must be a number".into()));
    }
    if amount < 0.0 {
        return Err(ExpenseError::Validation("Amount cannot be negative".into()));
    }
    Ok(amount)
}

fn parse_category(raw: &str) -> Result<String, ExpenseError> {
    non_empty(raw).ok_or_else(|| ExpenseError::Validation("Category is required".into()))
}

/// Empty means "no date"; anything else must be what a date input submits
fn parse_date(raw: &str) -> Result<Option<NaiveDate>, ExpenseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ExpenseError::Validation(format!("Invalid date: {} (expected YYYY-MM-DD)", raw)))
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
