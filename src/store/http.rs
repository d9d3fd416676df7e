//! HTTP client for the remote note store
//!
//! Queries and mutations go over a small REST surface; "note created" push
//! events arrive over NATS. The push side is optional: without a NATS client
//! the store still serves every request except `subscribe_created`.

use super::traits::{NoteStore, NoteSubscription};
use crate::events::nats;
use crate::notes::{CompletionFilter, Note, NoteList, UpdateNoteInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use std::time::Duration;
use tracing::debug;

/// Client for the remote note store
#[derive(Clone)]
pub struct HttpNoteStore {
    client: Client,
    base_url: String,
    nats: Option<async_nats::Client>,
    subject_prefix: String,
}

impl HttpNoteStore {
    /// Create a new store client targeting the given base URL
    /// (e.g. "http://localhost:4000").
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            nats: None,
            subject_prefix: nats::DEFAULT_SUBJECT_PREFIX.to_string(),
        })
    }

    /// Attach a NATS client for "note created" push events (builder pattern).
    pub fn with_nats(
        mut self,
        client: async_nats::Client,
        subject_prefix: impl Into<String>,
    ) -> Self {
        self.nats = Some(client);
        self.subject_prefix = subject_prefix.into();
        self
    }

    /// Whether push events are available
    pub fn has_nats(&self) -> bool {
        self.nats.is_some()
    }

    fn notes_url(&self) -> String {
        format!("{}/notes", self.base_url)
    }

    /// `{base}/notes/{id}` with the id percent-encoded as a single path segment
    fn note_url(&self, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.notes_url())
            .with_context(|| format!("Invalid note store URL {:?}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Note store URL {:?} cannot be a base", self.base_url))?
            .push(id);
        Ok(url)
    }
}

/// Turn a non-2xx response into an error carrying status and body
async fn check(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("{} failed with status {}: {}", what, status, body)
}

#[async_trait]
impl NoteStore for HttpNoteStore {
    async fn list_notes(&self, filter: CompletionFilter) -> Result<Vec<Note>> {
        let mut request = self.client.get(self.notes_url());
        if let Some(completed) = filter.as_completed() {
            request = request.query(&[("completed", completed)]);
        }

        let response = request.send().await.context("list notes request failed")?;
        let list: NoteList = check(response, "list notes")
            .await?
            .json()
            .await
            .context("Failed to decode note list")?;

        debug!(filter = %filter, count = list.items.len(), "Listed notes");
        Ok(list.items)
    }

    async fn create_note(&self, note: &Note) -> Result<Note> {
        let response = self
            .client
            .post(self.notes_url())
            .json(note)
            .send()
            .await
            .context("create note request failed")?;

        check(response, "create note")
            .await?
            .json()
            .await
            .context("Failed to decode created note")
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.note_url(id)?)
            .send()
            .await
            .context("delete note request failed")?;
        check(response, "delete note").await?;
        Ok(())
    }

    async fn update_note(&self, input: &UpdateNoteInput) -> Result<()> {
        let response = self
            .client
            .patch(self.note_url(&input.id)?)
            .json(input)
            .send()
            .await
            .context("update note request failed")?;
        check(response, "update note").await?;
        Ok(())
    }

    async fn subscribe_created(&self) -> Result<NoteSubscription> {
        let client = self
            .nats
            .as_ref()
            .context("No NATS connection configured, real-time updates unavailable")?;
        nats::subscribe_created(client, &self.subject_prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> HttpNoteStore {
        HttpNoteStore::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn milk() -> serde_json::Value {
        serde_json::json!({"id": "a", "name": "Milk", "description": "2%", "completed": false})
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let store = HttpNoteStore::new("http://localhost:4000/", Duration::from_secs(1)).unwrap();
        assert_eq!(store.notes_url(), "http://localhost:4000/notes");
        assert_eq!(
            store.note_url("a").unwrap().as_str(),
            "http://localhost:4000/notes/a"
        );
        assert!(!store.has_nats());
    }

    #[tokio::test]
    async fn test_list_unfiltered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notes"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": [milk()]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let notes = store(&server).list_notes(CompletionFilter::All).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].name, "Milk");
        assert!(notes[0].client_id.is_none());
    }

    #[tokio::test]
    async fn test_list_sends_completed_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notes"))
            .and(query_param("completed", "true"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let notes = store(&server)
            .list_notes(CompletionFilter::Complete)
            .await
            .unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_list_error_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notes"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = store(&server)
            .list_notes(CompletionFilter::All)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("boom"));
    }

    #[tokio::test]
    async fn test_create_posts_full_record() {
        let server = MockServer::start().await;
        let note = Note {
            id: "a".into(),
            client_id: Some("session-1".into()),
            name: "Milk".into(),
            description: "2%".into(),
            completed: false,
        };
        let expected = serde_json::to_value(&note).unwrap();
        Mock::given(method("POST"))
            .and(path("/notes"))
            .and(body_json(&expected))
            .respond_with(ResponseTemplate::new(201).set_body_json(&expected))
            .expect(1)
            .mount(&server)
            .await;

        let created = store(&server).create_note(&note).await.unwrap();
        assert_eq!(created, note);
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/notes/a"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        store(&server).delete_note("a").await.unwrap();
    }

    #[test]
    fn test_note_url_escapes_reserved_characters() {
        let store = HttpNoteStore::new("http://localhost:4000", Duration::from_secs(1)).unwrap();
        assert_eq!(
            store.note_url("a#b").unwrap().as_str(),
            "http://localhost:4000/notes/a%23b"
        );
        assert_eq!(
            store.note_url("a/b?c").unwrap().as_str(),
            "http://localhost:4000/notes/a%2Fb%3Fc"
        );
    }

    #[tokio::test]
    async fn test_delete_id_with_reserved_characters_stays_one_segment() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/notes/a%23b"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/notes/a"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        store(&server).delete_note("a#b").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_id_with_slash_stays_one_segment() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/notes/team%2Fa"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .update_note(&UpdateNoteInput {
                id: "team/a".into(),
                completed: true,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_sends_only_id_and_completed() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/notes/a"))
            .and(body_json(serde_json::json!({"id": "a", "completed": true})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .update_note(&UpdateNoteInput {
                id: "a".into(),
                completed: true,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_subscribe_without_nats_is_error() {
        let store = HttpNoteStore::new("http://localhost:4000", Duration::from_secs(1)).unwrap();
        let err = match store.subscribe_created().await {
            Ok(_) => panic!("subscription should not open without NATS"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("No NATS connection"));
    }
}
