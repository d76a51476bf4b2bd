// src/application/store.rs
use crate::domain::{DomainError, NewNote, Note, StatusUpdate};
use async_trait::async_trait;

/// Remote record store for notes.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn list_notes(&self) -> Result<Vec<Note>, DomainError>;

    /// Create a note; the server assigns the id
    async fn create_note(&self, input: &NewNote) -> Result<Note, DomainError>;

    async fn update_note(&self, input: &StatusUpdate) -> Result<Note, DomainError>;

    async fn delete_note(&self, id: &str) -> Result<(), DomainError>;
}

/// Key-addressed object storage for note images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Resolve a temporary access URL. Fails if nothing is stored under `key`.
    async fn get_url(&self, key: &str) -> Result<String, DomainError>;

    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), DomainError>;

    async fn remove(&self, key: &str) -> Result<(), DomainError>;
}
