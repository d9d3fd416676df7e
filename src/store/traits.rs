//! NoteStore trait definition
//!
//! Defines the abstract interface of the remote note store, enabling testing
//! with the in-memory mock and swapping backends without touching the
//! view-model.

use crate::notes::{CompletionFilter, Note, UpdateNoteInput};
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Stream of notes pushed by the remote store as they are created by any
/// session, including this one. Dropping the stream releases the subscription.
pub type NoteSubscription = BoxStream<'static, Result<Note>>;

/// Abstract interface for the remote note store.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// List notes, optionally constrained by a `completed` equality filter
    async fn list_notes(&self, filter: CompletionFilter) -> Result<Vec<Note>>;

    /// Create a note from a full record; returns the stored record
    async fn create_note(&self, note: &Note) -> Result<Note>;

    /// Delete a note by id
    async fn delete_note(&self, id: &str) -> Result<()>;

    /// Update the completion flag of a note
    async fn update_note(&self, input: &UpdateNoteInput) -> Result<()>;

    /// Subscribe to "note created" events
    async fn subscribe_created(&self) -> Result<NoteSubscription>;
}
