//! Shared-password gate.
//!
//! The session token is a digest of the password and a server secret, so the
//! server can check it without keeping any session state.

use sha2::{Digest, Sha256};
use thiserror::Error;

pub const DEFAULT_SECRET: &str = "default-secret";
pub const TOKEN_COOKIE: &str = "auth-token";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("APP_PASSWORD not configured")]
    NotConfigured,
    #[error("Invalid password")]
    InvalidPassword,
}

pub fn derive_token(password: &str, secret: &str) -> String {
    let digest = Sha256::digest(format!("{password}:{secret}").as_bytes());
    hex::encode(digest)
}

#[derive(Debug, Clone)]
pub struct AuthGate {
    password: Option<String>,
    secret: String,
}

impl AuthGate {
    pub fn new(password: Option<String>, secret: impl Into<String>) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
            secret: secret.into(),
        }
    }

    /// A gate that admits everyone.
    pub fn open() -> Self {
        Self::new(None, DEFAULT_SECRET)
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    /// Exchange the password for a session token.
    pub fn login(&self, candidate: &str) -> Result<String, AuthError> {
        let password = self.password.as_deref().ok_or(AuthError::NotConfigured)?;
        if candidate != password {
            return Err(AuthError::InvalidPassword);
        }
        Ok(derive_token(password, &self.secret))
    }

    /// Whether a request carrying `token` may pass. With no password
    /// configured every request passes.
    pub fn admits(&self, token: Option<&str>) -> bool {
        match &self.password {
            None => true,
            Some(password) => token == Some(derive_token(password, &self.secret).as_str()),
        }
    }
}

/// Paths reachable without a token: the login page, the login and health
/// endpoints, and static assets.
pub fn is_public_path(path: &str) -> bool {
    path.starts_with("/login")
        || path == "/api/auth"
        || path == "/api/health"
        || path.rsplit('/').next().is_some_and(|last| last.contains('.'))
}
