// src/domain/note.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteStatus {
    InProgress,
    Completed,
}

impl NoteStatus {
    /// The status a toggle moves to. Both directions are allowed.
    pub fn toggled(self) -> Self {
        match self {
            NoteStatus::InProgress => NoteStatus::Completed,
            NoteStatus::Completed => NoteStatus::InProgress,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteStatus::InProgress => "InProgress",
            NoteStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A note as held in local state.
///
/// `image_key` is what the remote record stores; `resolved_image_url` is filled
/// in locally by enrichment and never sent back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub id: String,
    pub name: String,
    pub description: String,
    pub completion_date: Option<String>,
    pub status: NoteStatus,
    pub image_key: Option<String>,
    pub resolved_image_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Note {
    pub fn has_image(&self) -> bool {
        self.image_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Blob-store key of the attached image. Images are stored under the note's name.
    pub fn blob_key(&self) -> Option<&str> {
        if self.has_image() {
            Some(&self.name)
        } else {
            None
        }
    }
}

/// Binary image picked for upload alongside a new note.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// An empty file input yields a nameless, zero-length attachment.
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty() || self.bytes.is_empty()
    }

    pub fn content_type(&self) -> &'static str {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            "bmp" => "image/bmp",
            _ => "application/octet-stream",
        }
    }
}

/// Form fields submitted to create a note. Has no id until the server assigns one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDraft {
    pub name: String,
    pub description: String,
    pub completion_date: Option<String>,
    pub image: Option<ImageAttachment>,
}

impl NoteDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_completion_date(mut self, date: impl Into<String>) -> Self {
        self.completion_date = Some(date.into());
        self
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidNote("name is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::InvalidNote(
                "description is required".to_string(),
            ));
        }
        Ok(())
    }

    /// The attachment, unless it is an empty file input.
    pub fn attachment(&self) -> Option<&ImageAttachment> {
        self.image.as_ref().filter(|image| !image.is_empty())
    }
}

/// Fields sent with the create mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub name: String,
    pub description: String,
    pub completion_date: Option<String>,
    pub image_key: Option<String>,
    pub status: NoteStatus,
}

impl From<&NoteDraft> for NewNote {
    fn from(draft: &NoteDraft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
            completion_date: draft
                .completion_date
                .clone()
                .filter(|date| !date.is_empty()),
            image_key: draft.attachment().map(|image| image.file_name.clone()),
            status: NoteStatus::InProgress,
        }
    }
}

/// Fields sent with the update mutation: only the id and the new status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub id: String,
    pub status: NoteStatus,
}
