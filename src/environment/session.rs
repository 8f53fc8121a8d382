use std::sync::{Arc, RwLock};

/// The token the transport attaches to requests. Shared between the
/// environment and the HTTP client; only the auth reducer changes it.
#[derive(Clone, Default)]
pub struct SessionContext {
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}

impl SessionContext {
    pub fn token(&self) -> Option<String> {
        self.token.read().ok()?.clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut current) => *current = token,
            Err(e) => log::error!("Session lock poisoned: {e:?}"),
        }
    }
}
