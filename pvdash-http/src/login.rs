use std::sync::Arc;

use async_trait::async_trait;
use pvdash_core::{CredentialProvider, Credentials, DashError};
use serde::{Deserialize, Serialize};

use crate::fetcher::RetryingFetcher;

/// Default login endpoint of the inverter cloud.
pub const DEFAULT_LOGIN_URL: &str = "https://neapi.hoymiles.com/iam/pub/0/auth/login";

#[derive(Serialize)]
struct LoginBody<'a> {
    user_name: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    data: Option<LoginData>,
}

#[derive(Deserialize)]
struct LoginData {
    token: Option<String>,
}

/// Logs in to the inverter cloud for a bearer token and pairs it with the
/// statistics server's Basic credentials.
///
/// Wrap in [`pvdash_core::SessionCredentials`] so the login happens once per
/// session.
pub struct TokenLogin {
    fetcher: Arc<RetryingFetcher>,
    login_url: String,
    user_name: String,
    password: String,
    basic_user: String,
    basic_pass: String,
}

impl TokenLogin {
    /// Login against [`DEFAULT_LOGIN_URL`].
    pub fn new(
        fetcher: Arc<RetryingFetcher>,
        user_name: impl Into<String>,
        password: impl Into<String>,
        basic_user: impl Into<String>,
        basic_pass: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            login_url: DEFAULT_LOGIN_URL.to_string(),
            user_name: user_name.into(),
            password: password.into(),
            basic_user: basic_user.into(),
            basic_pass: basic_pass.into(),
        }
    }

    /// Use another login endpoint.
    #[must_use]
    pub fn login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }
}

#[async_trait]
impl CredentialProvider for TokenLogin {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pvdash_http::login", skip(self))
    )]
    async fn credentials(&self) -> Result<Credentials, DashError> {
        let request = self
            .fetcher
            .client()
            .post(&self.login_url)
            .json(&LoginBody {
                user_name: &self.user_name,
                password: &self.password,
            });
        let resp = self
            .fetcher
            .send(request)
            .await
            .map_err(|e| DashError::auth(format!("login failed: {e}")))?;
        let parsed: LoginResponse = resp
            .json()
            .await
            .map_err(|e| DashError::auth(format!("unreadable login response: {e}")))?;
        let token = parsed
            .data
            .and_then(|d| d.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DashError::auth("login response carries no token"))?;
        Ok(Credentials::new(
            token,
            self.basic_user.clone(),
            self.basic_pass.clone(),
        ))
    }
}
