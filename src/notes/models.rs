//! Note models and wire DTOs
//!
//! A note is a titled, described, completable to-do item. Field names on the
//! wire follow the remote store's schema (`clientID`), everything else is
//! plain snake_case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Note
// ============================================================================

/// A single note record, as held locally and as exchanged with the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Globally unique id, assigned client-side at creation time
    pub id: String,
    /// Session that created the note. Server-provided records may omit it.
    #[serde(
        rename = "clientID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub client_id: Option<String>,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Note {
    /// Build a fresh, incomplete note from a submitted form.
    ///
    /// The id is a random UUID v4 so collisions across sessions are negligible.
    pub fn from_form(form: &NoteForm, client_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_id: Some(client_id.into()),
            name: form.name.clone(),
            description: form.description.clone(),
            completed: false,
        }
    }

    /// Whether this note was created by the given client session
    pub fn is_from(&self, client_id: &str) -> bool {
        self.client_id.as_deref() == Some(client_id)
    }
}

/// Envelope returned by the list call (`{ "items": [...] }`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteList {
    #[serde(default)]
    pub items: Vec<Note>,
}

/// Payload of the remote update call: only the id and the new completion flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNoteInput {
    pub id: String,
    pub completed: bool,
}

// ============================================================================
// Form
// ============================================================================

/// Pending input values for the note currently being composed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteForm {
    pub name: String,
    pub description: String,
}

impl NoteForm {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Both fields are required and must be non-empty
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.description.is_empty()
    }

    /// Overwrite one field, leaving the other untouched
    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.name = value,
            FormField::Description => self.description = value,
        }
    }
}

/// One input field of the note form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Description,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Description => write!(f, "description"),
        }
    }
}

/// Error returned when parsing an unknown form field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown form field: {0} (expected name or description)")]
pub struct ParseFieldError(pub String);

impl FromStr for FormField {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "description" => Ok(Self::Description),
            _ => Err(ParseFieldError(s.to_string())),
        }
    }
}

// ============================================================================
// Filtering
// ============================================================================

/// Completion filter applied by the remote list call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionFilter {
    /// Unfiltered
    #[default]
    All,
    /// `completed == false`
    Incomplete,
    /// `completed == true`
    Complete,
}

impl CompletionFilter {
    /// The equality value for `completed`, or `None` when unfiltered
    pub fn as_completed(&self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Incomplete => Some(false),
            Self::Complete => Some(true),
        }
    }

    /// Whether a note passes this filter
    pub fn matches(&self, note: &Note) -> bool {
        self.as_completed()
            .map_or(true, |completed| note.completed == completed)
    }
}

impl fmt::Display for CompletionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Incomplete => write!(f, "incomplete"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Error returned when a filter name is not one of `all|incomplete|complete`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown completion filter: {0} (expected all, incomplete or complete)")]
pub struct ParseFilterError(pub String);

impl FromStr for CompletionFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "incomplete" => Ok(Self::Incomplete),
            "complete" | "completed" => Ok(Self::Complete),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}
