//! Remote note store abstraction and adapters
//!
//! The remote store is the durable owner of record. The view-model only talks
//! to it through the [`NoteStore`] trait, so tests run against
//! [`MockNoteStore`] and production against [`HttpNoteStore`].

pub mod http;
pub mod mock;
pub mod traits;

pub use http::HttpNoteStore;
pub use mock::{MockNoteStore, StoreFault, StoreOp};
pub use traits::{NoteStore, NoteSubscription};
