// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Invalid note: {0}")]
    InvalidNote(String),
    #[error("An image is already stored under the name '{0}'")]
    BlobKeyConflict(String),
    #[error("Blob not found: {0}")]
    BlobNotFound(String),
    #[error("Blob store error: {0}")]
    Blob(String),
    #[error("Remote store error: {0}")]
    Remote(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
