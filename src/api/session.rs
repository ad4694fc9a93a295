use super::error::ApiError;

/// Explicit session context for API calls.
///
/// The browser prototype this replaces kept the token and profile name in
/// ambient key-value storage; here the caller owns a `Session` and hands it
/// to the client, so tests can inject a fake one and nothing reads globals.
/// The token is opaque to this crate: we only store and attach it.
#[derive(Debug, Clone)]
pub struct Session {
    api_key: String,
    token: Option<String>,
    name: Option<String>,
}

impl Session {
    /// Anonymous session: API key only.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            token: None,
            name: None,
        }
    }

    /// Session for a logged-in profile.
    pub fn authenticated(
        api_key: impl Into<String>,
        token: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            token: Some(token.into()),
            name: Some(name.into()),
        }
    }

    /// Store credentials obtained elsewhere (e.g. a login flow outside this
    /// crate).
    pub fn store_credentials(&mut self, token: impl Into<String>, name: impl Into<String>) {
        self.token = Some(token.into());
        self.name = Some(name.into());
    }

    pub fn clear_credentials(&mut self) {
        self.token = None;
        self.name = None;
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn require_token(&self) -> Result<&str, ApiError> {
        self.token.as_deref().ok_or(ApiError::NotLoggedIn)
    }

    pub fn require_name(&self) -> Result<&str, ApiError> {
        self.name.as_deref().ok_or(ApiError::NotLoggedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_rejects_authenticated_calls() {
        let session = Session::new("key");
        assert!(!session.is_logged_in());
        assert!(matches!(session.require_token(), Err(ApiError::NotLoggedIn)));
        assert!(matches!(session.require_name(), Err(ApiError::NotLoggedIn)));
    }

    #[test]
    fn stored_credentials_round_trip() {
        let mut session = Session::new("key");
        session.store_credentials("opaque-token", "maria");
        assert_eq!(session.token(), Some("opaque-token"));
        assert_eq!(session.name(), Some("maria"));

        session.clear_credentials();
        assert!(!session.is_logged_in());
    }
}
