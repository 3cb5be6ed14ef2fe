//! Hosted service settings
//!
//! The browser app gets these as constructor arguments; the CLI reads them
//! from the environment (a `.env` file is loaded first by the binary).

use crate::error::ExpenseError;

pub const URL_VAR: &str = "EXPENSE_SERVICE_URL";
pub const ANON_KEY_VAR: &str = "EXPENSE_SERVICE_ANON_KEY";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Project base URL, without a trailing slash
    pub url: String,
    /// Public anon key, sent as `apikey` on every request
    pub anon_key: String,
}

impl ServiceConfig {
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ExpenseError> {
        let url = url.trim().trim_end_matches('/');
        let anon_key = anon_key.trim();

        if url.is_empty() {
            return Err(ExpenseError::Config("service URL is empty".into()));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ExpenseError::Config(format!(
                "service URL must be http(s): {}",
                url
            )));
        }
        if anon_key.is_empty() {
            return Err(ExpenseError::Config("anon key is empty".into()));
        }

        Ok(Self {
            url: url.to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    pub fn from_env() -> Result<Self, ExpenseError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ExpenseError> {
        let url = lookup(URL_VAR)
            .ok_or_else(|| ExpenseError::Config(format!("{} is not set", URL_VAR)))?;
        let anon_key = lookup(ANON_KEY_VAR)
            .ok_or_else(|| ExpenseError::Config(format!("{} is not set", ANON_KEY_VAR)))?;
        Self::new(&url, &anon_key)
    }

    /// Absolute URL for a path like `/auth/v1/signup`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }
}
