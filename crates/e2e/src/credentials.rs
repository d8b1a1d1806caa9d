//! Throwaway account used to get past the login screen

use chrono::{DateTime, Utc};

const USERNAME_PREFIX: &str = "claude_test_";
const PASSWORD: &str = "Test123456";
const EMAIL_DOMAIN: &str = "example.com";

/// Credentials for one run. Never written anywhere.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SessionCredentials {
    /// Credentials derived from the current wall-clock second
    pub fn generate() -> Self {
        Self::at(Utc::now())
    }

    /// Credentials derived from `now`
    ///
    /// Two runs inside the same second get the same username.
    pub fn at(now: DateTime<Utc>) -> Self {
        let username = format!("{}{}", USERNAME_PREFIX, now.timestamp());
        let email = format!("{}@{}", username, EMAIL_DOMAIN);
        Self {
            username,
            email,
            password: PASSWORD.to_string(),
        }
    }
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
