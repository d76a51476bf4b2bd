use personal_notes::application::NoteSynchronizer;
use personal_notes::util::testing::{
    CallLog, MockBlobStore, MockBlobStoreBuilder, MockNoteRepository, MockNoteRepositoryBuilder,
};

/// Synchronizer wired to mock stores that share one call log
#[allow(dead_code)]
pub struct TestBackend {
    pub log: CallLog,
    pub sync: NoteSynchronizer<MockNoteRepository, MockBlobStore>,
}

impl TestBackend {
    /// Build from partially configured mock builders; the shared log is attached here
    pub fn new(repo: MockNoteRepositoryBuilder, blobs: MockBlobStoreBuilder) -> Self {
        let log = CallLog::default();
        let repository = repo.with_call_log(log.clone()).build();
        let blobs = blobs.with_call_log(log.clone()).build();
        Self {
            log,
            sync: NoteSynchronizer::new(repository, blobs),
        }
    }
}

/// Known test note IDs
#[allow(dead_code)]
pub mod test_notes {
    pub const WITH_IMAGE: &str = "note-with-image";
    pub const PLAIN: &str = "note-plain";
    pub const NONEXISTENT: &str = "note-missing";
}
