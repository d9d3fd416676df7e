//! Per-session context
//!
//! Carries the identity of this client session and the handle to the remote
//! store. One context is created per UI session and handed to the view-model.

use crate::store::NoteStore;
use std::sync::Arc;
use uuid::Uuid;

/// Client session identity plus the remote store it talks to
#[derive(Clone)]
pub struct SessionContext {
    client_id: String,
    store: Arc<dyn NoteStore>,
}

impl SessionContext {
    /// Create a context with a freshly generated client id
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self::with_client_id(store, Uuid::new_v4().to_string())
    }

    /// Create a context with a known client id
    pub fn with_client_id(store: Arc<dyn NoteStore>, client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            store,
        }
    }

    /// Identifier stamped on every note this session creates
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn store(&self) -> &Arc<dyn NoteStore> {
        &self.store
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockNoteStore;

    #[test]
    fn test_new_generates_distinct_client_ids() {
        let store: Arc<dyn NoteStore> = Arc::new(MockNoteStore::new());
        let a = SessionContext::new(store.clone());
        let b = SessionContext::new(store);
        assert_ne!(a.client_id(), b.client_id());
        assert!(Uuid::parse_str(a.client_id()).is_ok());
    }

    #[test]
    fn test_with_client_id() {
        let session = SessionContext::with_client_id(Arc::new(MockNoteStore::new()), "session-1");
        assert_eq!(session.client_id(), "session-1");
        assert!(format!("{:?}", session).contains("session-1"));
    }
}
