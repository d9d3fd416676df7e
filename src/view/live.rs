//! Live "note created" feed
//!
//! Owns the real-time subscription for one view-model. The subscription is
//! held by a background task and released when the [`LiveFeed`] guard is
//! closed or dropped. A stream that ends is re-opened with exponential
//! backoff until the feed is released.

use super::model::NoteListViewModel;
use super::state::Action;
use crate::notes::Note;
use crate::session::SessionContext;
use crate::store::NoteSubscription;
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Map a pushed note to the action it should produce for this session.
///
/// Echoes of this session's own creates are already in the list and are
/// dropped; everything else is prepended.
pub fn reconcile_created(session: &SessionContext, note: Note) -> Option<Action> {
    if note.is_from(session.client_id()) {
        None
    } else {
        Some(Action::AddNote { note })
    }
}

/// Guard for a running live feed. Dropping it releases the subscription.
pub struct LiveFeed {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LiveFeed {
    pub(crate) fn spawn(view: Arc<NoteListViewModel>, first: Option<NoteSubscription>) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(view, first, cancel.clone()));
        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Whether the background task is still running
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the feed and wait until the subscription has been released.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Live note feed task failed: {}", e);
            }
        }
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    view: Arc<NoteListViewModel>,
    mut pending: Option<NoteSubscription>,
    cancel: CancellationToken,
) {
    let reconnect = view.policy().reconnect;
    let mut delay = reconnect.initial_backoff;

    loop {
        if let Some(mut stream) = pending.take() {
            delay = reconnect.initial_backoff;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Live note feed released");
                        return;
                    }
                    item = stream.next() => match item {
                        Some(Ok(note)) => view.apply_created(note),
                        Some(Err(e)) => warn!(error = %e, "Skipping bad note event"),
                        None => {
                            warn!("Note subscription closed, reconnecting");
                            break;
                        }
                    }
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Live note feed released");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        let attempt = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Live note feed released");
                return;
            }
            result = view.session().store().subscribe_created() => result,
        };
        match attempt {
            Ok(stream) => {
                debug!("Re-subscribed to note events");
                pending = Some(stream);
            }
            Err(e) => {
                delay = reconnect.next_delay(delay);
                warn!(
                    error = %e,
                    "Failed to re-subscribe to note events, next attempt in {:?}",
                    delay
                );
            }
        }
    }
}
