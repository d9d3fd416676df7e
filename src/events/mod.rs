//! Real-time "note created" event plumbing
//!
//! This module provides:
//! - `NoteEvent` - the pushed record, emitted after every create
//! - `NoteEventBus` - broadcast channel fanning events out to in-process sessions
//! - NATS helpers for subscribing to the remote store's event subject

mod bus;
pub mod nats;
mod types;

pub use bus::NoteEventBus;
pub use nats::{connect_nats, created_subject};
pub use types::NoteEvent;
