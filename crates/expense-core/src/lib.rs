//! Expense tracker backed by a hosted auth/database service
//!
//! Users sign up, sign in and record expenses; accounts and rows live in the
//! hosted service, reached over its auth (`/auth/v1`) and REST (`/rest/v1`)
//! endpoints. Network I/O goes through the `HttpTransport` trait so the same
//! tracker runs in the browser (fetch) and in the CLI (reqwest).

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod model;
pub mod session;
pub mod tracker;
pub mod transport;

pub use client::HostedClient;
pub use config::ServiceConfig;
pub use credentials::{validate_email, Credentials};
pub use error::ExpenseError;
pub use model::{Expense, ExpenseForm};
pub use session::{token_expiry, AuthSession, AuthUser};
pub use tracker::{ExpenseTracker, Feedback};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

#[cfg(feature = "native")]
pub use transport::ReqwestTransport;
