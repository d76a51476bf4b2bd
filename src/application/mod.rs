// src/application/mod.rs
pub mod note_synchronizer;
pub mod store;

pub use note_synchronizer::NoteSynchronizer;
pub use store::{BlobStore, NoteRepository};
