pub mod client;

pub use client::IdentityToolkitClient;

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// An authenticated caller: the opaque bearer token plus the identity it is bound to.
///
/// Passed explicitly into every inventory, reservation and moderation call.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    email: String,
}

impl Session {
    pub fn new(token: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            email: email.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Identity recorded as the requester on bookings
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

/// External email/password identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;
}
