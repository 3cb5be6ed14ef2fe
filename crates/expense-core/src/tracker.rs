//! Expense tracker state behind the sign-in and expense forms
//!
//! Every action resolves to a `Feedback` the front-end can display directly;
//! failures never escape as errors.

use crate::client::HostedClient;
use crate::credentials::Credentials;
use crate::error::ExpenseError;
use crate::model::ExpenseForm;
use crate::session::AuthSession;
use crate::transport::HttpTransport;
use serde::Serialize;
use std::cell::RefCell;
use tracing::{info, warn};

pub const SIGN_UP_OK: &str = "Sign-up successful!";
pub const SIGN_IN_OK: &str = "Logged in!";
pub const SIGN_OUT_OK: &str = "Logged out";
pub const EXPENSE_ADDED: &str = "Expense added!";

/// Message to show plus whether the tracker section should be visible
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Feedback {
    pub message: String,
    pub tracker_visible: bool,
}

pub struct ExpenseTracker<T> {
    client: HostedClient<T>,
    session: RefCell<Option<AuthSession>>,
    clock: fn() -> i64,
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl<T: HttpTransport> ExpenseTracker<T> {
    pub fn new(client: HostedClient<T>) -> Self {
        Self {
            client,
            session: RefCell::new(None),
            clock: unix_now,
        }
    }

    /// Replace the wall clock used for token expiry checks
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.borrow().is_some()
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.session.borrow().clone()
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Feedback {
        let result = match Credentials::new(email, password) {
            Ok(credentials) => self.client.sign_up(&credentials).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                info!("sign-up accepted");
                self.feedback(SIGN_UP_OK)
            }
            Err(e) => self.feedback(&e.to_string()),
        }
    }

    /// The tracker only becomes visible once the service accepts the login.
    /// Any previous session is dropped first, so a failed attempt leaves the
    /// tracker signed out.
    pub async fn sign_in(&self, email: &str, password: &str) -> Feedback {
        let previous = self.session.borrow_mut().take();
        if let Some(previous) = previous {
            info!(user_id = previous.user_id(), "dropping previous session");
        }

        let result = match Credentials::new(email, password) {
            Ok(credentials) => self.client.sign_in(&credentials).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(session) => {
                info!(user_id = session.user_id(), "signed in");
                *self.session.borrow_mut() = Some(session);
                self.feedback(SIGN_IN_OK)
            }
            Err(e) => self.feedback(&e.to_string()),
        }
    }

    /// Always ends signed out locally, even if the service call fails
    pub async fn sign_out(&self) -> Feedback {
        let session = self.session.borrow_mut().take();
        if let Some(session) = session {
            if let Err(e) = self.client.sign_out(&session.access_token).await {
                warn!(error = %e, "remote sign-out failed; local session cleared");
            }
        }
        self.feedback(SIGN_OUT_OK)
    }

    pub async fn add_expense(&self, form: &ExpenseForm) -> Feedback {
        match self.try_add_expense(form).await {
            Ok(()) => self.feedback(EXPENSE_ADDED),
            Err(e) => self.feedback(&e.to_string()),
        }
    }

    async fn try_add_expense(&self, form: &ExpenseForm) -> Result<(), ExpenseError> {
        let (token, user_id) = {
            let session = self.session.borrow();
            let session = session.as_ref().ok_or(ExpenseError::NotSignedIn)?;
            if session.is_expired((self.clock)()) {
                return Err(ExpenseError::SessionExpired);
            }
            (session.access_token.clone(), session.user_id().to_string())
        };

        let expense = form.parse(&user_id)?;
        self.client.insert_expense(&token, &expense).await?;
        info!(category = %expense.category, amount = expense.amount, "expense added");
        Ok(())
    }

    fn feedback(&self, message: &str) -> Feedback {
        Feedback {
            message: message.to_string(),
            tracker_visible: self.is_signed_in(),
        }
    }
}
