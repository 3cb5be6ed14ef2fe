//! Sign-up / sign-in input checks
//!
//! Checked locally so an obviously bad form never reaches the service.

use crate::error::ExpenseError;
use serde::Serialize;

/// Minimum password length accepted by the hosted auth service
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Result<Self, ExpenseError> {
        let email = email.trim();
        validate_email(email).map_err(ExpenseError::Validation)?;

        if password.is_empty() {
            return Err(ExpenseError::Validation("Password is required".into()));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ExpenseError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

/// Basic shape check for an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();

    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Email must contain @".to_string());
    };

    if local.is_empty() {
        return Err("Email local part cannot be empty".to_string());
    }
    if domain.contains('@') {
        return Err("Invalid email format".to_string());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Email domain must contain a dot".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err("Email cannot contain spaces".to_string());
    }

    Ok(())
}
