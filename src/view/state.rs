//! View state and its reducer
//!
//! `reduce` is the only way a [`ViewState`] changes. It is pure: it borrows the
//! current state, never mutates it, and returns the next one.

use crate::notes::{FormField, Note, NoteForm};
use serde::{Deserialize, Serialize};

/// The single root of client-held state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Newest-first
    pub notes: Vec<Note>,
    /// True until the first fetch completes (successfully or not)
    pub loading: bool,
    /// Set on any fetch failure, never cleared
    pub error: bool,
    pub form: NoteForm,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            loading: true,
            error: false,
            form: NoteForm::default(),
        }
    }
}

impl ViewState {
    /// Index of the first note with the given id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    /// First note with the given id
    pub fn find(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }
}

/// State transitions recognized by the reducer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Replace the whole list and clear `loading`
    SetNotes { notes: Vec<Note> },
    /// Prepend one note
    AddNote { note: Note },
    /// Clear both form fields
    ResetForm,
    /// Overwrite one form field
    SetInput { field: FormField, value: String },
    /// A fetch failed
    Error,
}

impl Action {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetNotes { .. } => "SET_NOTES",
            Self::AddNote { .. } => "ADD_NOTE",
            Self::ResetForm => "RESET_FORM",
            Self::SetInput { .. } => "SET_INPUT",
            Self::Error => "ERROR",
        }
    }
}

/// Compute the next state from the current one and an action.
pub fn reduce(state: &ViewState, action: Action) -> ViewState {
    match action {
        Action::SetNotes { notes } => ViewState {
            notes,
            loading: false,
            ..state.clone()
        },
        Action::AddNote { note } => {
            let mut notes = Vec::with_capacity(state.notes.len() + 1);
            notes.push(note);
            notes.extend(state.notes.iter().cloned());
            ViewState {
                notes,
                ..state.clone()
            }
        }
        Action::ResetForm => ViewState {
            form: NoteForm::default(),
            ..state.clone()
        },
        Action::SetInput { field, value } => {
            let mut form = state.form.clone();
            form.set(field, value);
            ViewState {
                form,
                ..state.clone()
            }
        }
        Action::Error => ViewState {
            loading: false,
            error: true,
            ..state.clone()
        },
    }
}
