// src/application/note_synchronizer.rs
use crate::application::{BlobStore, NoteRepository};
use crate::domain::{DomainError, NewNote, Note, NoteDraft, NoteStatus, StatusUpdate};
use futures_util::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Keeps the local note list in step with the remote store.
///
/// Every write is followed by a full refetch; the list is never patched in place
/// except for the optimistic removal in [`NoteSynchronizer::delete_note`].
/// Presenters read the list through [`NoteSynchronizer::notes`] or subscribe to changes.
pub struct NoteSynchronizer<R: NoteRepository, B: BlobStore> {
    repository: R,
    blobs: B,
    state: watch::Sender<Vec<Note>>,
}

impl<R: NoteRepository, B: BlobStore> NoteSynchronizer<R, B> {
    pub fn new(repository: R, blobs: B) -> Self {
        let (state, _) = watch::channel(Vec::new());
        Self {
            repository,
            blobs,
            state,
        }
    }

    /// Receiver that observes every replacement or pruning of the local list
    pub fn subscribe(&self) -> watch::Receiver<Vec<Note>> {
        self.state.subscribe()
    }

    /// Snapshot of the local list
    pub fn notes(&self) -> Vec<Note> {
        self.state.borrow().clone()
    }

    pub fn find(&self, id: &str) -> Option<Note> {
        self.state.borrow().iter().find(|n| n.id == id).cloned()
    }

    /// Fetch all notes, resolve image URLs concurrently and replace the local list.
    ///
    /// A failed URL lookup leaves that note without a resolved URL; it never fails
    /// the refresh. A failed list query leaves the local list untouched.
    #[instrument(level = "debug", skip(self))]
    pub async fn refresh(&self) -> Result<Vec<Note>, DomainError> {
        let fetched = self.repository.list_notes().await?;
        debug!(count = fetched.len(), "Fetched notes");

        let enriched = join_all(fetched.into_iter().map(|note| self.enrich(note))).await;

        self.state.send_replace(enriched.clone());
        info!(count = enriched.len(), "Refreshed note list");
        Ok(enriched)
    }

    async fn enrich(&self, mut note: Note) -> Note {
        let Some(key) = note.blob_key().map(str::to_owned) else {
            return note;
        };
        match self.blobs.get_url(&key).await {
            Ok(url) => note.resolved_image_url = Some(url),
            Err(e) => {
                warn!(note_id = %note.id, key = %key, error = %e, "Could not resolve image URL")
            }
        }
        note
    }

    /// Upload the image (if any), create the note and refetch.
    ///
    /// The blob is stored before the record is created, so a record never points at
    /// a missing image. Returns the note as created by the server.
    #[instrument(level = "debug", skip(self, draft), fields(name = %draft.name))]
    pub async fn create_note(&self, draft: &NoteDraft) -> Result<Note, DomainError> {
        draft.validate()?;

        if let Some(image) = draft.attachment() {
            let taken = self
                .state
                .borrow()
                .iter()
                .any(|n| n.blob_key() == Some(draft.name.as_str()));
            if taken {
                return Err(DomainError::BlobKeyConflict(draft.name.clone()));
            }

            self.blobs
                .put(&draft.name, &image.bytes, image.content_type())
                .await?;
            debug!(key = %draft.name, size = image.bytes.len(), "Stored image");
        }

        let created = self.repository.create_note(&NewNote::from(draft)).await?;
        info!(note_id = %created.id, "Created note");

        self.reconcile().await;
        Ok(created)
    }

    /// Remove the note locally at once, then delete its image and record remotely.
    ///
    /// The local removal is not rolled back when a remote call fails: the note stays
    /// hidden until the next refresh brings it back.
    #[instrument(level = "debug", skip(self, note), fields(note_id = %note.id))]
    pub async fn delete_note(&self, note: &Note) -> Result<(), DomainError> {
        let mut removed = None;
        self.state.send_modify(|notes| {
            if let Some(pos) = notes.iter().position(|n| n.id == note.id) {
                removed = Some(notes.remove(pos));
            }
        });
        let target = removed.as_ref().unwrap_or(note);

        if let Some(key) = target.blob_key() {
            if let Err(e) = self.blobs.remove(key).await {
                warn!(key, error = %e, "Failed to remove image; blob is orphaned");
            }
        }

        if let Err(e) = self.repository.delete_note(&target.id).await {
            warn!(error = %e, "Remote delete failed; note is hidden locally until next refresh");
            return Err(e);
        }

        info!(name = %target.name, "Deleted note");
        Ok(())
    }

    /// Flip the note's status as recorded in local state and refetch.
    #[instrument(level = "debug", skip(self, note), fields(note_id = %note.id))]
    pub async fn toggle_status(&self, note: &Note) -> Result<NoteStatus, DomainError> {
        let current = self
            .state
            .borrow()
            .iter()
            .find(|n| n.id == note.id)
            .map(|n| n.status)
            .ok_or_else(|| DomainError::NoteNotFound(note.id.clone()))?;

        let update = StatusUpdate {
            id: note.id.clone(),
            status: current.toggled(),
        };
        self.repository.update_note(&update).await?;
        info!(from = %current, to = %update.status, "Toggled note status");

        self.reconcile().await;
        Ok(update.status)
    }

    async fn reconcile(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Refetch after write failed; keeping previous note list");
        }
    }
}
