//! Bearer token persistence via OS keyring
//!
//! The session API expects a bearer token issued by an external login flow.
//! [`TokenStore`] keeps that token in the operating system's native
//! credential store (Keychain on macOS, Secret Service on Linux, Windows
//! Credential Manager on Windows) so the CLI does not need it on every call.
//!
//! [`resolve_token`] decides which token a command uses: an explicit value
//! (from `--token` or `MEETLIST_TOKEN`) wins over the stored one.

use crate::error::{MeetlistError, Result};

/// Keyring service name
pub const KEYRING_SERVICE: &str = "meetlist";

/// Keyring user under which the API token is stored
pub const KEYRING_USER: &str = "api_token";

/// Stateless accessor for the OS native keyring.
///
/// # Examples
///
/// ```no_run
/// use meetlist::auth::TokenStore;
///
/// # fn example() -> meetlist::error::Result<()> {
/// let store = TokenStore::default();
/// store.save("my_token")?;
/// assert_eq!(store.load()?.as_deref(), Some("my_token"));
/// store.delete()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenStore {
    service: String,
    user: String,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE, KEYRING_USER)
    }
}

impl TokenStore {
    /// Create a store for a specific keyring service/user pair
    pub fn new(service: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, &self.user).map_err(|e| MeetlistError::Keyring(e).into())
    }

    /// Persist `token`, replacing any stored value
    ///
    /// # Errors
    ///
    /// Returns [`MeetlistError::MissingCredentials`] for a blank token and
    /// [`MeetlistError::Keyring`] if the keyring is unavailable.
    pub fn save(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(
                MeetlistError::MissingCredentials("refusing to store an empty token".to_string())
                    .into(),
            );
        }
        self.entry()?
            .set_password(token)
            .map_err(MeetlistError::Keyring)?;
        tracing::info!("Stored API token in keyring service {}", self.service);
        Ok(())
    }

    /// Load the stored token
    ///
    /// Returns `Ok(None)` if no token has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`MeetlistError::Keyring`] for keyring failures other than a
    /// missing entry.
    pub fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(MeetlistError::Keyring(e).into()),
        }
    }

    /// Remove the stored token
    ///
    /// Returns `Ok(false)` if there was nothing to remove.
    pub fn delete(&self) -> Result<bool> {
        match self.entry()?.delete_password() {
            Ok(()) => {
                tracing::info!("Removed API token from keyring service {}", self.service);
                Ok(true)
            }
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(MeetlistError::Keyring(e).into()),
        }
    }
}

/// Pick the token a command should use
///
/// An explicit, non-blank token wins. Otherwise the stored token is used.
/// A keyring failure is logged and treated as "no token", which makes
/// `fetch_all` a no-op rather than an error.
pub fn resolve_token(explicit: Option<&str>, store: &TokenStore) -> Option<String> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        tracing::debug!("Using API token from command line or environment");
        return Some(token.to_string());
    }

    match store.load() {
        Ok(Some(token)) => {
            tracing::debug!("Using API token from keyring");
            Some(token)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Could not read API token from keyring: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_token_wins() {
        let store = TokenStore::new("meetlist-test-unused", "none");
        assert_eq!(
            resolve_token(Some(" abc "), &store).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_save_rejects_blank_token() {
        let store = TokenStore::new("meetlist-test-unused", "none");
        let err = store.save("   ").unwrap_err();
        let err = err.downcast_ref::<MeetlistError>().unwrap();
        assert!(matches!(err, MeetlistError::MissingCredentials(_)));
    }

    #[test]
    fn test_default_store_names() {
        let store = TokenStore::default();
        assert_eq!(store.service, KEYRING_SERVICE);
        assert_eq!(store.user, KEYRING_USER);
    }
}
