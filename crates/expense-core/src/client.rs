//! Client for the hosted auth and REST endpoints

use crate::config::ServiceConfig;
use crate::credentials::Credentials;
use crate::error::ExpenseError;
use crate::model::Expense;
use crate::session::{AuthSession, AuthUser};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use serde::Deserialize;
use serde::Serialize;
use tracing::{debug, warn};

pub const SIGNUP_PATH: &str = "/auth/v1/signup";
pub const TOKEN_PATH: &str = "/auth/v1/token?grant_type=password";
pub const USER_PATH: &str = "/auth/v1/user";
pub const LOGOUT_PATH: &str = "/auth/v1/logout";
pub const EXPENSES_PATH: &str = "/rest/v1/expenses";

/// Error bodies differ between the auth and REST endpoints
#[derive(Deserialize, Default)]
struct ErrorBody {
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

pub struct HostedClient<T> {
    config: ServiceConfig,
    transport: T,
}

impl<T: HttpTransport> HostedClient<T> {
    pub fn new(config: ServiceConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn sign_up(&self, credentials: &Credentials) -> Result<(), ExpenseError> {
        let request = self.request(HttpMethod::Post, SIGNUP_PATH, None, Some(credentials))?;
        self.execute(request).await?;
        Ok(())
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, ExpenseError> {
        let request = self.request(HttpMethod::Post, TOKEN_PATH, None, Some(credentials))?;
        let response = self.execute(request).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    pub async fn current_user(&self, access_token: &str) -> Result<AuthUser, ExpenseError> {
        let request = self.request::<()>(HttpMethod::Get, USER_PATH, Some(access_token), None)?;
        let response = self.execute(request).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), ExpenseError> {
        let request = self.request::<()>(HttpMethod::Post, LOGOUT_PATH, Some(access_token), None)?;
        self.execute(request).await?;
        Ok(())
    }

    /// Insert one row; the service is asked not to echo it back
    pub async fn insert_expense(
        &self,
        access_token: &str,
        expense: &Expense,
    ) -> Result<(), ExpenseError> {
        let mut request = self.request(
            HttpMethod::Post,
            EXPENSES_PATH,
            Some(access_token),
            Some(&[expense]),
        )?;
        request
            .headers
            .push(("Prefer".to_string(), "return=minimal".to_string()));
        self.execute(request).await?;
        Ok(())
    }

    fn request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        access_token: Option<&str>,
        body: Option<&B>,
    ) -> Result<HttpRequest, ExpenseError> {
        let bearer = access_token.unwrap_or(&self.config.anon_key);
        let mut headers = vec![
            ("apikey".to_string(), self.config.anon_key.clone()),
            ("Authorization".to_string(), format!("Bearer {}", bearer)),
        ];

        let body = match body {
            Some(body) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(body)?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: self.config.endpoint(path),
            headers,
            body,
        })
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ExpenseError> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.transport.send(request).await?;
        debug!(method = method.as_str(), %url, status = response.status, "service response");

        if response.is_success() {
            Ok(response)
        } else {
            let message = error_message(&response);
            warn!(status = response.status, %message, "service request failed");
            Err(ExpenseError::Service(message))
        }
    }
}

/// First present of `msg`, `error_description`, `message`, `error`
fn error_message(response: &HttpResponse) -> String {
    let body: ErrorBody = serde_json::from_str(&response.body).unwrap_or_default();
    [body.msg, body.error_description, body.message, body.error]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", response.status))
}
