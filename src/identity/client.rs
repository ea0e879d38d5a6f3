use crate::error::{Error, Result};
use crate::http;
use crate::identity::{IdentityProvider, Session};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts";

/// Error codes the provider answers with `400` that mean "bad credentials"
const CREDENTIAL_ERRORS: &[&str] = &[
    "EMAIL_EXISTS",
    "EMAIL_NOT_FOUND",
    "INVALID_PASSWORD",
    "INVALID_LOGIN_CREDENTIALS",
    "INVALID_EMAIL",
    "USER_DISABLED",
    "WEAK_PASSWORD",
];

/// Password sign-in/sign-up against an identity-toolkit style REST endpoint
#[derive(Clone)]
pub struct IdentityToolkitClient {
    client: Client,
    auth_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    id_token: String,
    email: String,
}

impl IdentityToolkitClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_url(DEFAULT_AUTH_URL, api_key, None)
    }

    pub fn with_url(
        auth_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self {
            client: http::client(timeout)?,
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn exchange(&self, action: &str, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}:{}", self.auth_url, action);
        debug!("POST {}", url);

        let request = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            });

        let response = http::send(request).await?;
        if !response.status().is_success() {
            let (status, message) = http::failure(response).await;
            return Err(classify(status, message));
        }

        let body: PasswordResponse = response
            .json()
            .await
            .map_err(|e| Error::decode(action, e))?;

        info!(email = %body.email, "{} succeeded", action);
        Ok(Session::new(body.id_token, body.email))
    }
}

fn classify(status: StatusCode, message: String) -> Error {
    let credential_error = status == StatusCode::BAD_REQUEST
        && CREDENTIAL_ERRORS.iter().any(|code| message.starts_with(code));

    if http::is_auth_status(status) || credential_error {
        Error::Authorization(message)
    } else {
        Error::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    #[tracing::instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        self.exchange("signUp", email, password).await
    }

    #[tracing::instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.exchange("signInWithPassword", email, password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_credential_errors() {
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, "EMAIL_NOT_FOUND".into()),
            Error::Authorization(_)
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, "WEAK_PASSWORD : Password should be at least 6 characters".into()),
            Error::Authorization(_)
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, "MISSING_PASSWORD".into()),
            Error::Rejected { status: 400, .. }
        ));
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, "API key not valid".into()),
            Error::Authorization(_)
        ));
    }
}
