//! Notes module
//!
//! The note entity, the composition form, and the DTOs exchanged with the
//! remote note store.

pub mod models;

pub use models::*;
