//! Note list view-model
//!
//! - `state` - `ViewState`, the closed `Action` set and the pure reducer
//! - `model` - `NoteListViewModel`, optimistic create/delete/update and fetch
//! - `live` - `LiveFeed`, the scoped real-time subscription
//! - `policy` - opt-in retry, rollback and reconnect settings

pub mod live;
pub mod model;
pub mod policy;
pub mod state;

pub use live::{reconcile_created, LiveFeed};
pub use model::{NoteListViewModel, RemoteSync, ValidationError};
pub use policy::{ReconnectPolicy, RetryPolicy, SyncPolicy};
pub use state::{reduce, Action, ViewState};
