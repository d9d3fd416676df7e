//! NATS helpers for the remote store's "note created" event subject
//!
//! The remote store publishes every created note as a JSON payload on
//! `{prefix}.created` (e.g. "notes.created"). Sessions subscribe to that
//! subject and reconcile the pushed records against their optimistic state.

use crate::notes::Note;
use futures::StreamExt;
use tracing::debug;

/// Default subject prefix used by the remote note store
pub const DEFAULT_SUBJECT_PREFIX: &str = "notes";

/// Build the "note created" subject (e.g. "notes.created").
pub fn created_subject(prefix: &str) -> String {
    format!("{}.created", prefix.trim_end_matches('.'))
}

/// Decode a "note created" payload.
///
/// The store publishes the bare note record; an envelope of the form
/// `{"note": {...}, "timestamp": ...}` is accepted as well.
pub fn decode_created(payload: &[u8]) -> anyhow::Result<Note> {
    if let Ok(note) = serde_json::from_slice::<Note>(payload) {
        return Ok(note);
    }
    let event: super::NoteEvent = serde_json::from_slice(payload)
        .map_err(|e| anyhow::anyhow!("Failed to decode note created payload: {}", e))?;
    Ok(event.note)
}

/// Subscribe to "note created" events and decode each payload into a `Note`.
pub async fn subscribe_created(
    client: &async_nats::Client,
    prefix: &str,
) -> anyhow::Result<futures::stream::BoxStream<'static, anyhow::Result<Note>>> {
    let subject = created_subject(prefix);
    let subscriber = client.subscribe(subject.clone()).await.map_err(|e| {
        anyhow::anyhow!("Failed to subscribe to NATS note events {}: {}", subject, e)
    })?;
    debug!(subject = %subject, "Subscribed to NATS note events");
    Ok(subscriber
        .map(|msg| decode_created(&msg.payload))
        .boxed())
}

/// Connect to a NATS server.
pub async fn connect_nats(url: &str) -> anyhow::Result<async_nats::Client> {
    let client = async_nats::connect(url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to NATS at {}: {}", url, e))?;
    tracing::info!("Connected to NATS at {}", url);
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_subject() {
        assert_eq!(created_subject(DEFAULT_SUBJECT_PREFIX), "notes.created");
    }

    #[test]
    fn test_created_subject_custom_prefix() {
        assert_eq!(created_subject("myapp.notes"), "myapp.notes.created");
        assert_eq!(created_subject("myapp.notes."), "myapp.notes.created");
    }

    #[test]
    fn test_decode_bare_note() {
        let payload = br#"{"id":"a","clientID":"s-1","name":"Milk","description":"2%","completed":false}"#;
        let note = decode_created(payload).unwrap();
        assert_eq!(note.id, "a");
        assert!(note.is_from("s-1"));
    }

    #[test]
    fn test_decode_event_envelope() {
        let payload = br#"{"note":{"id":"b","name":"Eggs","description":"dozen"},"timestamp":"2026-01-01T00:00:00Z"}"#;
        let note = decode_created(payload).unwrap();
        assert_eq!(note.id, "b");
        assert!(note.client_id.is_none());
    }

    #[test]
    fn test_decode_garbage_is_error() {
        let err = decode_created(b"not json").unwrap_err();
        assert!(err.to_string().contains("Failed to decode"));
    }
}
