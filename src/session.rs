//! Logged-in user identity.
//!
//! Every handler that needs to know who is acting (journal ownership, event
//! and to-do mutations) takes a `&Session`. A session only exists after a
//! successful `Session::login`.

use chrono::{DateTime, Utc};

use crate::config::{AuthSection, Secrets};
use crate::error::AuthError;
use crate::logging::{self, DataSource};

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    user: String,
    logged_in_at: DateTime<Utc>,
}

impl Session {
    /// Checks a username against the configured user list and the password
    /// against the shared password.
    ///
    /// The username is trimmed and matched case-insensitively; the session
    /// carries the name as it is spelled in the configuration.
    pub fn login(
        username: &str,
        password: &str,
        auth: &AuthSection,
        secrets: &Secrets,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthError> {
        let expected = secrets
            .password
            .as_deref()
            .ok_or(AuthError::PasswordNotConfigured)?;

        let wanted = username.trim().to_lowercase();
        let user = auth
            .users
            .iter()
            .find(|u| u.trim().to_lowercase() == wanted);

        match user {
            Some(user) if password.trim() == expected.trim() => {
                logging::info(DataSource::Auth, Some(user), "logged in");
                Ok(Session {
                    user: user.trim().to_string(),
                    logged_in_at: now,
                })
            }
            _ => {
                logging::warn(
                    DataSource::Auth,
                    Some(username.trim()),
                    "rejected login attempt",
                );
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Session for a known user without a password check. Used by tests and
    /// by callers that authenticated elsewhere.
    pub fn for_user(user: &str, now: DateTime<Utc>) -> Session {
        Session {
            user: user.to_string(),
            logged_in_at: now,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn logged_in_at(&self) -> DateTime<Utc> {
        self.logged_in_at
    }
}
