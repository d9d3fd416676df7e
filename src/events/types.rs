//! Push event types for "note created" notifications

use crate::notes::Note;
use serde::{Deserialize, Serialize};

/// A "note created" event pushed to every subscribed session
///
/// Must be Clone for `tokio::sync::broadcast`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// The created note, including the originating `clientID`
    pub note: Note,
    /// ISO 8601 timestamp
    pub timestamp: String,
}

impl NoteEvent {
    /// Create a new NoteEvent with the current timestamp
    pub fn created(note: Note) -> Self {
        Self {
            note,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> Note {
        Note {
            id: "n-1".into(),
            client_id: Some("session-a".into()),
            name: "Milk".into(),
            description: "2%".into(),
            completed: false,
        }
    }

    #[test]
    fn test_created_stamps_rfc3339_timestamp() {
        let event = NoteEvent::created(note());
        assert!(chrono::DateTime::parse_from_rfc3339(&event.timestamp).is_ok());
        assert_eq!(event.note.id, "n-1");
    }

    #[test]
    fn test_event_keeps_client_id_on_the_wire() {
        let event = NoteEvent::created(note());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["note"]["clientID"], "session-a");
    }
}
