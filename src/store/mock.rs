//! In-memory mock implementation of NoteStore for testing without a real backend.
//!
//! Stores notes newest-first in a `Vec` behind an async `RwLock` and fans
//! created notes out through a [`NoteEventBus`], so several view-models
//! sharing one mock behave like sessions sharing a backend.

use super::traits::{NoteStore, NoteSubscription};
use crate::events::NoteEventBus;
use crate::notes::{CompletionFilter, Note, UpdateNoteInput};
use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::{RwLock, Semaphore};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

/// Remote operation kinds, used for fault injection and call accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Create,
    Delete,
    Update,
    Subscribe,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
            Self::Update => write!(f, "update"),
            Self::Subscribe => write!(f, "subscribe"),
        }
    }
}

/// Errors produced by the mock store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreFault {
    #[error("injected {0} failure")]
    Injected(StoreOp),
    #[error("note not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaultMode {
    Once,
    Always,
}

/// In-memory mock implementation of NoteStore for testing.
pub struct MockNoteStore {
    notes: RwLock<Vec<Note>>,
    bus: Mutex<NoteEventBus>,
    faults: Mutex<HashMap<StoreOp, FaultMode>>,
    calls: Mutex<HashMap<StoreOp, usize>>,
    gates: Mutex<HashMap<StoreOp, Arc<Semaphore>>>,
}

impl MockNoteStore {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(Vec::new()),
            bus: Mutex::new(NoteEventBus::default()),
            faults: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Create a mock store pre-seeded with notes (kept in the given order).
    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: RwLock::new(notes),
            ..Self::new()
        }
    }

    /// Make the next call of `op` fail.
    pub fn fail_next(&self, op: StoreOp) {
        lock(&self.faults).insert(op, FaultMode::Once);
    }

    /// Make every call of `op` fail until [`MockNoteStore::heal`] is called.
    pub fn fail_always(&self, op: StoreOp) {
        lock(&self.faults).insert(op, FaultMode::Always);
    }

    /// Clear all injected faults.
    pub fn heal(&self) {
        lock(&self.faults).clear();
    }

    /// Hold every call of `op` until [`MockNoteStore::release`] is called.
    pub fn hold(&self, op: StoreOp) {
        lock(&self.gates).insert(op, Arc::new(Semaphore::new(0)));
    }

    /// Let held calls of `op` through.
    pub fn release(&self, op: StoreOp) {
        if let Some(gate) = lock(&self.gates).remove(&op) {
            gate.close();
        }
    }

    /// Number of calls received for `op`, including failed ones.
    pub fn call_count(&self, op: StoreOp) -> usize {
        lock(&self.calls).get(&op).copied().unwrap_or(0)
    }

    /// Current stored notes, newest-first.
    pub async fn notes(&self) -> Vec<Note> {
        self.notes.read().await.clone()
    }

    /// Simulate a note created by another session: store it and push it to
    /// every subscriber.
    pub async fn push_created(&self, note: Note) {
        self.notes.write().await.insert(0, note.clone());
        self.bus().emit_created(note);
    }

    /// Number of open "note created" subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.bus().subscriber_count()
    }

    /// End every open subscription stream, as a dropped connection would.
    pub fn disconnect_subscribers(&self) {
        *lock(&self.bus) = NoteEventBus::default();
    }

    fn bus(&self) -> NoteEventBus {
        lock(&self.bus).clone()
    }

    /// Record the call, wait on its gate if held, then apply injected faults.
    async fn enter(&self, op: StoreOp) -> Result<()> {
        *lock(&self.calls).entry(op).or_insert(0) += 1;

        let gate = lock(&self.gates).get(&op).cloned();
        if let Some(gate) = gate {
            // Closed on release; the error just means "go ahead"
            let _ = gate.acquire().await;
        }

        let mut faults = lock(&self.faults);
        match faults.get(&op).copied() {
            Some(FaultMode::Once) => {
                faults.remove(&op);
                Err(StoreFault::Injected(op).into())
            }
            Some(FaultMode::Always) => Err(StoreFault::Injected(op).into()),
            None => Ok(()),
        }
    }
}

impl Default for MockNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// NoteStore implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl NoteStore for MockNoteStore {
    async fn list_notes(&self, filter: CompletionFilter) -> Result<Vec<Note>> {
        self.enter(StoreOp::List).await?;
        let notes = self.notes.read().await;
        Ok(notes.iter().filter(|n| filter.matches(n)).cloned().collect())
    }

    async fn create_note(&self, note: &Note) -> Result<Note> {
        self.enter(StoreOp::Create).await?;
        self.notes.write().await.insert(0, note.clone());
        self.bus().emit_created(note.clone());
        Ok(note.clone())
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        self.enter(StoreOp::Delete).await?;
        let mut notes = self.notes.write().await;
        match notes.iter().position(|n| n.id == id) {
            Some(index) => {
                notes.remove(index);
                Ok(())
            }
            None => Err(StoreFault::NotFound(id.to_string()).into()),
        }
    }

    async fn update_note(&self, input: &UpdateNoteInput) -> Result<()> {
        self.enter(StoreOp::Update).await?;
        let mut notes = self.notes.write().await;
        match notes.iter_mut().find(|n| n.id == input.id) {
            Some(note) => {
                note.completed = input.completed;
                Ok(())
            }
            None => Err(StoreFault::NotFound(input.id.clone()).into()),
        }
    }

    async fn subscribe_created(&self) -> Result<NoteSubscription> {
        self.enter(StoreOp::Subscribe).await?;
        let stream = BroadcastStream::new(self.bus().subscribe()).map(|item| match item {
            Ok(event) => Ok(event.note),
            Err(BroadcastStreamRecvError::Lagged(n)) => {
                Err(anyhow::anyhow!("subscription lagged, {} events skipped", n))
            }
        });
        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, completed: bool) -> Note {
        Note {
            id: id.into(),
            client_id: Some("session-a".into()),
            name: format!("name {}", id),
            description: format!("desc {}", id),
            completed,
        }
    }

    #[tokio::test]
    async fn test_list_applies_completion_filter() {
        let store = MockNoteStore::with_notes(vec![
            note("a", false),
            note("b", true),
            note("c", false),
        ]);

        let all = store.list_notes(CompletionFilter::All).await.unwrap();
        assert_eq!(all.len(), 3);

        let open = store.list_notes(CompletionFilter::Incomplete).await.unwrap();
        let ids: Vec<_> = open.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let done = store.list_notes(CompletionFilter::Complete).await.unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, "b");
    }

    #[tokio::test]
    async fn test_create_prepends_and_broadcasts() {
        let store = MockNoteStore::with_notes(vec![note("a", false)]);
        let mut sub = store.subscribe_created().await.unwrap();

        store.create_note(&note("b", false)).await.unwrap();

        let stored = store.notes().await;
        assert_eq!(stored[0].id, "b");
        assert_eq!(stored[1].id, "a");

        let pushed = sub.next().await.unwrap().unwrap();
        assert_eq!(pushed.id, "b");
    }

    #[tokio::test]
    async fn test_delete_and_update_missing_note_fail() {
        let store = MockNoteStore::new();

        let err = store.delete_note("ghost").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreFault>(),
            Some(&StoreFault::NotFound("ghost".into()))
        );

        let input = UpdateNoteInput {
            id: "ghost".into(),
            completed: true,
        };
        assert!(store.update_note(&input).await.is_err());
    }

    #[tokio::test]
    async fn test_update_sets_completed() {
        let store = MockNoteStore::with_notes(vec![note("a", false)]);
        store
            .update_note(&UpdateNoteInput {
                id: "a".into(),
                completed: true,
            })
            .await
            .unwrap();
        assert!(store.notes().await[0].completed);
    }

    #[tokio::test]
    async fn test_fail_next_fails_once() {
        let store = MockNoteStore::new();
        store.fail_next(StoreOp::List);

        let err = store.list_notes(CompletionFilter::All).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreFault>(),
            Some(&StoreFault::Injected(StoreOp::List))
        );
        assert!(store.list_notes(CompletionFilter::All).await.is_ok());
        assert_eq!(store.call_count(StoreOp::List), 2);
    }

    #[tokio::test]
    async fn test_fail_always_until_healed() {
        let store = MockNoteStore::new();
        store.fail_always(StoreOp::Create);

        assert!(store.create_note(&note("a", false)).await.is_err());
        assert!(store.create_note(&note("a", false)).await.is_err());
        assert!(store.notes().await.is_empty());

        store.heal();
        assert!(store.create_note(&note("a", false)).await.is_ok());
    }

    #[tokio::test]
    async fn test_disconnect_ends_subscription_stream() {
        let store = MockNoteStore::new();
        let mut sub = store.subscribe_created().await.unwrap();
        assert_eq!(store.subscriber_count(), 1);

        store.disconnect_subscribers();

        assert!(sub.next().await.is_none());
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_hold_and_release_gate() {
        let store = Arc::new(MockNoteStore::new());
        store.hold(StoreOp::Create);

        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.create_note(&note("a", false)).await })
        };

        while store.call_count(StoreOp::Create) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(store.notes().await.is_empty());

        store.release(StoreOp::Create);
        task.await.unwrap().unwrap();
        assert_eq!(store.notes().await.len(), 1);
    }
}
