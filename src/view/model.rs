//! Note list view-model
//!
//! Holds the [`ViewState`] and runs the four remote operations. Every local
//! mutation is applied optimistically through the reducer before the remote
//! call is issued; remote failures are logged and never propagated.

use super::live::{self, LiveFeed};
use super::policy::SyncPolicy;
use super::state::{reduce, Action, ViewState};
use crate::notes::{CompletionFilter, FormField, Note, UpdateNoteInput};
use crate::session::SessionContext;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// User-facing validation failure on create
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("please enter a name and description")]
pub struct ValidationError {
    /// Fields that were left empty
    pub missing: Vec<FormField>,
}

/// How a remote mutation ended, relative to the optimistic local state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteSync {
    /// The remote store acknowledged the change
    Confirmed,
    /// The remote call failed and the local change was kept
    Diverged,
    /// The remote call failed and the local change was undone
    RolledBack,
    /// Nothing to do locally, so no remote call was made
    Skipped,
}

/// View-model for the note list
pub struct NoteListViewModel {
    session: SessionContext,
    policy: SyncPolicy,
    state: watch::Sender<ViewState>,
}

impl NoteListViewModel {
    /// Create a view-model in the initial (loading) state
    pub fn new(session: SessionContext) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self {
            session,
            policy: SyncPolicy::default(),
            state,
        }
    }

    /// Set the synchronization policy (builder pattern).
    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Watch state changes (for the rendering layer).
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Apply one action through the reducer.
    ///
    /// Dispatches are serialized by the watch channel, so two reducer
    /// applications never interleave.
    pub fn dispatch(&self, action: Action) {
        let kind = action.kind();
        self.state.send_modify(|state| *state = reduce(state, action));
        debug!(action = kind, "Dispatched action");
    }

    /// Field-change event from the form
    pub fn set_input(&self, field: FormField, value: impl Into<String>) {
        self.dispatch(Action::SetInput {
            field,
            value: value.into(),
        });
    }

    // ========================================================================
    // Remote operations
    // ========================================================================

    /// Fetch notes and replace the list.
    ///
    /// On failure the raw error is logged and the `error` flag is set.
    pub async fn fetch_notes(&self, filter: CompletionFilter) {
        let retry = self.policy.fetch_retry;
        let mut attempt = 1;
        let mut backoff = retry.initial_backoff;

        loop {
            match self.session.store().list_notes(filter).await {
                Ok(notes) => {
                    debug!(filter = %filter, count = notes.len(), "Fetched notes");
                    self.dispatch(Action::SetNotes { notes });
                    return;
                }
                Err(e) if attempt < retry.max_attempts => {
                    warn!(
                        filter = %filter,
                        attempt,
                        error = %e,
                        "Fetch failed, retrying in {:?}",
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) => {
                    error!(filter = %filter, attempt, "Failed to fetch notes: {:?}", e);
                    self.dispatch(Action::Error);
                    return;
                }
            }
        }
    }

    /// Create a note from the current form.
    ///
    /// The note is added and the form reset before the remote call is made.
    /// An incomplete form is rejected without touching state or the store.
    pub async fn create_note(&self) -> Result<RemoteSync, ValidationError> {
        let form = self.state.borrow().form.clone();
        if !form.is_complete() {
            let missing = [
                (FormField::Name, form.name.is_empty()),
                (FormField::Description, form.description.is_empty()),
            ]
            .into_iter()
            .filter_map(|(field, empty)| empty.then_some(field))
            .collect();
            return Err(ValidationError { missing });
        }

        let note = Note::from_form(&form, self.session.client_id());
        self.dispatch(Action::AddNote { note: note.clone() });
        self.dispatch(Action::ResetForm);

        match self.session.store().create_note(&note).await {
            Ok(_) => {
                info!(note_id = %note.id, "successfully created note");
                Ok(RemoteSync::Confirmed)
            }
            Err(e) => {
                error!(note_id = %note.id, error = %e, "Failed to create note");
                if !self.policy.rollback {
                    return Ok(RemoteSync::Diverged);
                }
                self.edit_notes(|notes| {
                    let index = notes.iter().position(|n| n.id == note.id)?;
                    Some(notes.remove(index))
                });
                Ok(RemoteSync::RolledBack)
            }
        }
    }

    /// Delete a note by id.
    ///
    /// The first local entry with that id is removed before the remote call.
    /// The remote delete is issued even when no local entry matches.
    pub async fn delete_note(&self, id: &str) -> RemoteSync {
        let removed = self.edit_notes(|notes| {
            let index = notes.iter().position(|n| n.id == id)?;
            Some((index, notes.remove(index)))
        });
        if removed.is_none() {
            debug!(note_id = %id, "Note not in local list, deleting remotely only");
        }

        match self.session.store().delete_note(id).await {
            Ok(()) => {
                info!(note_id = %id, "successfully deleted note");
                RemoteSync::Confirmed
            }
            Err(e) => {
                error!(note_id = %id, error = %e, "Failed to delete note");
                match removed {
                    Some((index, note)) if self.policy.rollback => {
                        self.edit_notes(|notes| {
                            if notes.iter().any(|n| n.id == note.id) {
                                return None;
                            }
                            let at = index.min(notes.len());
                            notes.insert(at, note);
                            Some(())
                        });
                        RemoteSync::RolledBack
                    }
                    _ => RemoteSync::Diverged,
                }
            }
        }
    }

    /// Toggle the completion flag of a note.
    ///
    /// The remote update carries only the id and the new value.
    pub async fn update_note(&self, id: &str) -> RemoteSync {
        let toggled = self.edit_notes(|notes| {
            let note = notes.iter_mut().find(|n| n.id == id)?;
            note.completed = !note.completed;
            Some(note.completed)
        });
        let Some(completed) = toggled else {
            warn!(note_id = %id, "Cannot toggle note missing from the local list");
            return RemoteSync::Skipped;
        };

        let input = UpdateNoteInput {
            id: id.to_string(),
            completed,
        };
        match self.session.store().update_note(&input).await {
            Ok(()) => {
                info!(note_id = %id, completed, "note successfully updated");
                RemoteSync::Confirmed
            }
            Err(e) => {
                error!(note_id = %id, error = %e, "Failed to update note");
                if !self.policy.rollback {
                    return RemoteSync::Diverged;
                }
                self.edit_notes(|notes| {
                    let note = notes.iter_mut().find(|n| n.id == id)?;
                    note.completed = !completed;
                    Some(())
                });
                RemoteSync::RolledBack
            }
        }
    }

    /// Initial fetch, then a live "note created" feed.
    ///
    /// The first subscription attempt completes before this returns; the feed
    /// stays open until the returned [`LiveFeed`] is closed or dropped.
    pub async fn start(self: &Arc<Self>, filter: CompletionFilter) -> LiveFeed {
        self.fetch_notes(filter).await;

        let first = match self.session.store().subscribe_created().await {
            Ok(stream) => {
                debug!(client_id = %self.session.client_id(), "Subscribed to note events");
                Some(stream)
            }
            Err(e) => {
                warn!(error = %e, "Failed to subscribe to note events, will retry");
                None
            }
        };

        LiveFeed::spawn(self.clone(), first)
    }

    /// Dispatch the reconciled action for a pushed note, if any.
    pub fn apply_created(&self, note: Note) {
        let note_id = note.id.clone();
        match live::reconcile_created(&self.session, note) {
            Some(action) => self.dispatch(action),
            None => debug!(note_id = %note_id, "Ignored echo of own note"),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Edit the list and dispatch `SetNotes` in one step of the watch channel.
    ///
    /// `edit` returns `None` to leave the state untouched; no change is
    /// published in that case.
    fn edit_notes<R>(&self, edit: impl FnOnce(&mut Vec<Note>) -> Option<R>) -> Option<R> {
        let mut outcome = None;
        self.state.send_if_modified(|state| {
            let mut notes = state.notes.clone();
            outcome = edit(&mut notes);
            if outcome.is_some() {
                *state = reduce(state, Action::SetNotes { notes });
            }
            outcome.is_some()
        });
        if outcome.is_some() {
            debug!(action = "SET_NOTES", "Dispatched action");
        }
        outcome
    }
}
