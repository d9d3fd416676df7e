//! Event bus for broadcasting "note created" events to live sessions

use super::NoteEvent;
use crate::notes::Note;
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity
const DEFAULT_CAPACITY: usize = 1024;

/// Event bus that distributes NoteEvents via `tokio::sync::broadcast`
///
/// Fire-and-forget: emitting never blocks, never panics.
/// If no subscribers are connected, events are silently dropped.
#[derive(Debug, Clone)]
pub struct NoteEventBus {
    sender: broadcast::Sender<NoteEvent>,
}

impl NoteEventBus {
    /// Create a new NoteEventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<NoteEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Broadcast a created note to every subscriber
    pub fn emit_created(&self, note: Note) {
        let note_id = note.id.clone();
        if let Ok(n) = self.sender.send(NoteEvent::created(note)) {
            debug!(note_id = %note_id, subscribers = n, "NoteEvent emitted");
        }
        // Err means no subscribers, this is expected and fine
    }
}

impl Default for NoteEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
