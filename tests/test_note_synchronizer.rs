mod helpers;

use anyhow::Result;
use helpers::{test_notes, TestBackend};
use personal_notes::domain::{
    DomainError, ImageAttachment, NewNote, NoteDraft, NoteStatus, StatusUpdate,
};
use personal_notes::util::testing::{sample_note, MockBlobStore, MockNoteRepository, StoreCall};
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::test]
async fn given_note_with_image_key_when_refreshing_then_resolves_url_and_keeps_status() -> Result<()> {
    // Arrange
    let backend = TestBackend::new(
        MockNoteRepository::builder().with_note(sample_note("1", "a", Some("a.png"))),
        MockBlobStore::builder().with_url("a", "https://x/a.png"),
    );

    // Act
    backend.sync.refresh().await?;

    // Assert
    let notes = backend.sync.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].resolved_image_url.as_deref(), Some("https://x/a.png"));
    assert_eq!(notes[0].image_key.as_deref(), Some("a.png"));
    assert_eq!(notes[0].status, NoteStatus::InProgress);
    assert!(backend.log.calls().contains(&StoreCall::GetUrl("a".to_string())));
    Ok(())
}

#[tokio::test]
async fn given_one_failing_lookup_when_refreshing_then_other_notes_resolve() -> Result<()> {
    // Arrange
    let backend = TestBackend::new(
        MockNoteRepository::builder()
            .with_note(sample_note("x", "broken", Some("x.png")))
            .with_note(sample_note("y", "fine", Some("y.png")))
            .with_note(sample_note("z", "plain", None)),
        MockBlobStore::builder()
            .with_get_failure("broken")
            .with_url("fine", "https://x/y.png"),
    );

    // Act
    let notes = backend.sync.refresh().await?;

    // Assert
    assert_eq!(notes.len(), 3);
    assert_eq!(notes[0].resolved_image_url, None);
    assert_eq!(notes[1].resolved_image_url.as_deref(), Some("https://x/y.png"));
    assert_eq!(notes[2].resolved_image_url, None);
    // No lookup for the note without an image
    assert_eq!(backend.log.count(|c| matches!(c, StoreCall::GetUrl(_))), 2);
    Ok(())
}

#[tokio::test]
async fn given_missing_blob_when_refreshing_then_note_is_kept_unresolved() -> Result<()> {
    // Arrange
    let backend = TestBackend::new(
        MockNoteRepository::builder().with_note(sample_note("1", "gone", Some("gone.png"))),
        MockBlobStore::builder(),
    );

    // Act
    let notes = backend.sync.refresh().await?;

    // Assert
    assert_eq!(notes.len(), 1);
    assert!(notes[0].has_image());
    assert_eq!(notes[0].resolved_image_url, None);
    Ok(())
}

#[tokio::test]
async fn given_blocked_first_lookup_when_refreshing_then_all_lookups_already_started() -> Result<()> {
    // Arrange
    let gate = Arc::new(Notify::new());
    let backend = TestBackend::new(
        MockNoteRepository::builder()
            .with_note(sample_note("1", "a", Some("a.png")))
            .with_note(sample_note("2", "b", Some("b.png")))
            .with_note(sample_note("3", "c", Some("c.png"))),
        MockBlobStore::builder()
            .with_url("a", "https://x/a.png")
            .with_url("b", "https://x/b.png")
            .with_url("c", "https://x/c.png")
            .with_get_gate(gate.clone()),
    );

    // Act
    let refresh = backend.sync.refresh();
    tokio::pin!(refresh);
    assert!(futures_util::poll!(&mut refresh).is_pending());

    // Assert: no lookup waits for an earlier one to finish
    assert_eq!(backend.log.count(|c| matches!(c, StoreCall::GetUrl(_))), 3);
    assert!(backend.sync.notes().is_empty());

    gate.notify_waiters();
    let notes = refresh.await?;

    let urls: Vec<_> = notes.iter().map(|n| n.resolved_image_url.as_deref()).collect();
    assert_eq!(
        urls,
        vec![
            Some("https://x/a.png"),
            Some("https://x/b.png"),
            Some("https://x/c.png")
        ]
    );
    Ok(())
}

#[tokio::test]
async fn given_list_failure_when_refreshing_then_returns_error() {
    // Arrange
    let backend = TestBackend::new(
        MockNoteRepository::builder().with_list_failure(),
        MockBlobStore::builder(),
    );

    // Act
    let result = backend.sync.refresh().await;

    // Assert
    assert!(matches!(result, Err(DomainError::Remote(_))));
    assert!(backend.sync.notes().is_empty());
}

#[tokio::test]
async fn given_draft_without_image_when_creating_then_creates_in_progress_and_refetches() -> Result<()> {
    // Arrange
    let backend = TestBackend::new(MockNoteRepository::builder(), MockBlobStore::builder());

    // Act
    let created = backend.sync.create_note(&NoteDraft::new("b", "d")).await?;

    // Assert
    assert_eq!(
        backend.log.calls(),
        vec![
            StoreCall::Create(NewNote {
                name: "b".to_string(),
                description: "d".to_string(),
                completion_date: None,
                image_key: None,
                status: NoteStatus::InProgress,
            }),
            StoreCall::List,
        ]
    );
    // Local state holds the server's record, including its id
    let notes = backend.sync.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, created.id);
    Ok(())
}

#[tokio::test]
async fn given_draft_with_image_when_creating_then_uploads_before_create() -> Result<()> {
    // Arrange
    let backend = TestBackend::new(MockNoteRepository::builder(), MockBlobStore::builder());
    let draft = NoteDraft::new("b", "d")
        .with_completion_date("2026-11-01")
        .with_image(ImageAttachment::new("b.png", vec![0x89, 0x50]));

    // Act
    backend.sync.create_note(&draft).await?;

    // Assert
    let put = backend
        .log
        .position(|c| *c == StoreCall::Put("b".to_string()))
        .expect("Image should be uploaded");
    let create = backend
        .log
        .position(|c| matches!(c, StoreCall::Create(_)))
        .expect("Note should be created");
    assert!(put < create);

    let notes = backend.sync.notes();
    assert_eq!(notes[0].image_key.as_deref(), Some("b.png"));
    assert_eq!(notes[0].resolved_image_url.as_deref(), Some("https://blobs.test/b"));
    Ok(())
}

#[tokio::test]
async fn given_failing_upload_when_creating_with_image_then_no_create_mutation() {
    // Arrange
    let backend = TestBackend::new(
        MockNoteRepository::builder(),
        MockBlobStore::builder().with_put_failure(),
    );
    let draft = NoteDraft::new("b", "d").with_image(ImageAttachment::new("b.png", vec![1]));

    // Act
    let result = backend.sync.create_note(&draft).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Blob(_))));
    assert_eq!(backend.log.count(|c| matches!(c, StoreCall::Create(_))), 0);
    assert_eq!(backend.log.count(|c| *c == StoreCall::List), 0);
}

#[tokio::test]
async fn given_failing_create_when_creating_then_returns_error_without_refetch() {
    // Arrange
    let backend = TestBackend::new(
        MockNoteRepository::builder().with_create_failure(),
        MockBlobStore::builder(),
    );

    // Act
    let result = backend.sync.create_note(&NoteDraft::new("b", "d")).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Remote(_))));
    assert_eq!(backend.log.count(|c| *c == StoreCall::List), 0);
}

#[tokio::test]
async fn given_completed_note_when_toggling_then_updates_to_in_progress() -> Result<()> {
    // Arrange
    let mut done = sample_note(test_notes::PLAIN, "laundry", None);
    done.status = NoteStatus::Completed;
    let backend = TestBackend::new(
        MockNoteRepository::builder().with_note(done),
        MockBlobStore::builder(),
    );
    let note = backend.sync.refresh().await?[0].clone();

    // Act
    let status = backend.sync.toggle_status(&note).await?;

    // Assert
    assert_eq!(status, NoteStatus::InProgress);
    assert!(backend.log.calls().contains(&StoreCall::Update(StatusUpdate {
        id: test_notes::PLAIN.to_string(),
        status: NoteStatus::InProgress,
    })));
    assert_eq!(backend.log.calls().last(), Some(&StoreCall::List));
    assert_eq!(backend.sync.notes()[0].status, NoteStatus::InProgress);
    Ok(())
}

#[tokio::test]
async fn given_note_when_toggling_twice_then_returns_to_original_status() -> Result<()> {
    // Arrange
    let backend = TestBackend::new(
        MockNoteRepository::builder().with_note(sample_note(test_notes::PLAIN, "laundry", None)),
        MockBlobStore::builder(),
    );
    let note = backend.sync.refresh().await?[0].clone();

    // Act
    let first = backend.sync.toggle_status(&note).await?;
    let second = backend.sync.toggle_status(&note).await?;

    // Assert
    assert_eq!(first, NoteStatus::Completed);
    assert_eq!(second, NoteStatus::InProgress);
    assert_eq!(backend.sync.notes()[0].status, NoteStatus::InProgress);
    Ok(())
}

#[tokio::test]
async fn given_pending_remote_delete_when_deleting_then_note_is_already_gone_locally() -> Result<()> {
    // Arrange
    let gate = Arc::new(Notify::new());
    let backend = TestBackend::new(
        MockNoteRepository::builder()
            .with_note(sample_note(test_notes::WITH_IMAGE, "a", Some("a.png")))
            .with_note(sample_note(test_notes::PLAIN, "b", None))
            .with_delete_gate(gate.clone()),
        MockBlobStore::builder().with_url("a", "https://x/a.png"),
    );
    let notes = backend.sync.refresh().await?;
    let mut rx = backend.sync.subscribe();

    // Act
    let delete = backend.sync.delete_note(&notes[0]);
    tokio::pin!(delete);
    assert!(futures_util::poll!(&mut delete).is_pending());

    // Assert: pruned before the remote delete settles, the other note untouched
    assert!(rx.has_changed()?);
    let local = rx.borrow_and_update().clone();
    assert_eq!(local, vec![notes[1].clone()]);

    gate.notify_one();
    delete.await?;

    assert!(backend.log.calls().contains(&StoreCall::Remove("a".to_string())));
    assert!(backend
        .log
        .calls()
        .contains(&StoreCall::Delete(test_notes::WITH_IMAGE.to_string())));
    Ok(())
}

#[tokio::test]
async fn given_note_without_image_when_deleting_then_no_blob_removal() -> Result<()> {
    // Arrange
    let backend = TestBackend::new(
        MockNoteRepository::builder().with_note(sample_note(test_notes::PLAIN, "b", None)),
        MockBlobStore::builder(),
    );
    let note = backend.sync.refresh().await?[0].clone();

    // Act
    backend.sync.delete_note(&note).await?;

    // Assert
    assert_eq!(backend.log.count(|c| matches!(c, StoreCall::Remove(_))), 0);
    assert!(backend.sync.notes().is_empty());
    Ok(())
}

#[tokio::test]
async fn given_unknown_note_when_deleting_then_other_notes_unaffected() -> Result<()> {
    // Arrange
    let backend = TestBackend::new(
        MockNoteRepository::builder().with_note(sample_note(test_notes::PLAIN, "b", None)),
        MockBlobStore::builder(),
    );
    backend.sync.refresh().await?;
    let ghost = sample_note(test_notes::NONEXISTENT, "ghost", None);

    // Act
    backend.sync.delete_note(&ghost).await?;

    // Assert
    assert_eq!(backend.sync.notes().len(), 1);
    Ok(())
}
