//! Configuration loaded from the environment (and `.env`, when present)

use crate::identity::client::{IdentityToolkitClient, DEFAULT_AUTH_URL};
use crate::store::RestDocumentStore;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the document store
    pub database_url: String,
    /// Identity provider API key; only needed to sign in or sign up
    pub api_key: Option<String>,
    pub auth_url: String,
    /// Applied to every HTTP call when set; otherwise calls wait indefinitely
    pub request_timeout: Option<Duration>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("LUXESTAYS_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .context("LUXESTAYS_DB_URL must be set to the document store URL")?;

        let request_timeout = match lookup("LUXESTAYS_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("LUXESTAYS_REQUEST_TIMEOUT_SECS is not a number: {:?}", raw))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            database_url,
            api_key: lookup("LUXESTAYS_API_KEY").filter(|v| !v.trim().is_empty()),
            auth_url: lookup("LUXESTAYS_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            request_timeout,
            log_level: lookup("LUXESTAYS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn store(&self) -> Result<RestDocumentStore> {
        RestDocumentStore::with_timeout(&self.database_url, self.request_timeout)
            .context("Failed to create document store client")
    }

    pub fn identity(&self) -> Result<IdentityToolkitClient> {
        let api_key = self
            .api_key
            .as_deref()
            .context("LUXESTAYS_API_KEY must be set to sign in")?;

        IdentityToolkitClient::with_url(&self.auth_url, api_key, self.request_timeout)
            .context("Failed to create identity provider client")
    }
}
