//! Admin login and session lifecycle

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::remote::ReservationAuthority;
use crate::storage::SessionStore;
use crate::utils::error::{RemoteError, ValidationError};
use crate::utils::non_empty_trimmed;

/// Logs admins in and out against the remote authority
pub struct Authenticator<A: ?Sized> {
    authority: Arc<A>,
    sessions: Arc<SessionStore>,
}

impl<A: ReservationAuthority + ?Sized> Authenticator<A> {
    /// Create an authenticator
    pub fn new(authority: Arc<A>, sessions: Arc<SessionStore>) -> Self {
        Self {
            authority,
            sessions,
        }
    }

    /// Exchange credentials for a token and persist it
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let (Some(username), Some(password)) =
            (non_empty_trimmed(username), non_empty_trimmed(password))
        else {
            return Err(ValidationError::CredentialsMissing.into());
        };

        let token = match self.authority.login(&username, &password).await {
            Ok(token) => token,
            // a rejected login is not an expired session
            Err(RemoteError::Unauthorized) => {
                return Err(RemoteError::Http {
                    status: 401,
                    message: "Login failed".to_string(),
                }
                .into())
            }
            Err(e) => return Err(e.into()),
        };
        self.sessions.save(&token)?;

        tracing::info!(%username, "Admin logged in");
        Ok(())
    }

    /// Forget the stored token
    pub fn logout(&self) -> Result<()> {
        self.sessions.clear()?;
        Ok(())
    }

    /// Check the stored token with the remote authority
    ///
    /// Returns `false` when there is no token or the authority rejects it; a
    /// rejected token is cleared.
    pub async fn verify(&self) -> Result<bool> {
        let Some(token) = self.sessions.token() else {
            return Ok(false);
        };

        match self.authority.verify_session(&token).await {
            Ok(()) => Ok(true),
            Err(RemoteError::Unauthorized) => {
                self.sessions.clear()?;
                Ok(false)
            }
            Err(RemoteError::Http { status, .. }) if (400..500).contains(&status) => Ok(false),
            Err(e) => Err(Error::from(e)),
        }
    }
}
