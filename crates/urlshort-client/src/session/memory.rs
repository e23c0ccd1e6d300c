//! Process-local session store.

use parking_lot::RwLock;
use urlshort_core::models::token::TokenPair;
use urlshort_core::models::user::Identity;

use super::{ClientSession, ClientSessionStore};
use crate::error::ClientResult;

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    current: RwLock<Option<ClientSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: ClientSession) -> Self {
        Self {
            current: RwLock::new(Some(session)),
        }
    }
}

impl ClientSessionStore for MemorySessionStore {
    fn load(&self) -> Option<ClientSession> {
        self.current.read().clone()
    }

    fn save(&self, identity: Identity, tokens: TokenPair) -> ClientResult<()> {
        *self.current.write() = Some(ClientSession { identity, tokens });
        Ok(())
    }

    fn clear(&self) {
        self.current.write().take();
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn empty_store_returns_none() {
        let store = MemorySessionStore::new();
        assert!(store.load().is_none());
        assert!(store.identity().is_none());
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn save_then_clear() {
        let store = MemorySessionStore::new();
        let identity = identity();
        let tokens = tokens_for(&identity);

        store.save(identity.clone(), tokens.clone()).unwrap();
        assert_eq!(store.identity(), Some(identity));
        assert_eq!(store.access_token(), Some(tokens.access_token));
        assert_eq!(store.refresh_token(), Some(tokens.refresh_token));

        store.clear();
        store.clear();
        assert!(store.load().is_none());
    }
}
