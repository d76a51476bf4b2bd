// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{BlobStore, NoteRepository};
use crate::domain::{DomainError, NewNote, Note, NoteStatus, StatusUpdate};

/// One call made against a mock store, in the order it was issued
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    List,
    Create(NewNote),
    Update(StatusUpdate),
    Delete(String),
    GetUrl(String),
    Put(String),
    Remove(String),
}

/// Call log that can be shared between a mock repository and a mock blob store,
/// so tests can assert on the ordering across both.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<StoreCall>>>);

impl CallLog {
    pub fn record(&self, call: StoreCall) {
        self.0.lock().expect("call log poisoned").push(call);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.0.lock().expect("call log poisoned").clone()
    }

    pub fn count(&self, pred: impl Fn(&StoreCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    /// Position of the first call matching `pred`
    pub fn position(&self, pred: impl Fn(&StoreCall) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }
}

/// Note with the given id, name and image key, status `InProgress`
pub fn sample_note(id: &str, name: &str, image_key: Option<&str>) -> Note {
    Note {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("About {name}"),
        completion_date: None,
        status: NoteStatus::InProgress,
        image_key: image_key.map(str::to_string),
        resolved_image_url: None,
        created_at: None,
        updated_at: None,
    }
}

/// In-memory stand-in for the remote note store
///
/// Created notes are appended and visible to the next `list_notes`; updates and
/// deletes act on the stored records.
///
/// # Examples
///
/// ```
/// use personal_notes::util::testing::{sample_note, MockNoteRepository};
///
/// let mock = MockNoteRepository::builder()
///     .with_note(sample_note("1", "groceries", None))
///     .with_delete_failure("1")
///     .build();
/// ```
pub struct MockNoteRepository {
    notes: Mutex<Vec<Note>>,
    next_id: AtomicU64,
    fail_list: AtomicBool,
    fail_create: bool,
    delete_failures: HashSet<String>,
    delete_gate: Option<Arc<Notify>>,
    log: CallLog,
}

impl MockNoteRepository {
    pub fn builder() -> MockNoteRepositoryBuilder {
        MockNoteRepositoryBuilder::new()
    }

    /// Make subsequent `list_notes` calls fail (or succeed again)
    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<Note> {
        self.notes.lock().expect("notes poisoned").clone()
    }
}

#[async_trait]
impl NoteRepository for MockNoteRepository {
    async fn list_notes(&self) -> Result<Vec<Note>, DomainError> {
        self.log.record(StoreCall::List);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(DomainError::Remote("list failed".to_string()));
        }
        Ok(self.stored())
    }

    async fn create_note(&self, input: &NewNote) -> Result<Note, DomainError> {
        self.log.record(StoreCall::Create(input.clone()));
        if self.fail_create {
            return Err(DomainError::Remote("create failed".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let note = Note {
            id: format!("generated-{id}"),
            name: input.name.clone(),
            description: input.description.clone(),
            completion_date: input.completion_date.clone(),
            status: input.status,
            image_key: input.image_key.clone(),
            resolved_image_url: None,
            created_at: None,
            updated_at: None,
        };
        self.notes.lock().expect("notes poisoned").push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, input: &StatusUpdate) -> Result<Note, DomainError> {
        self.log.record(StoreCall::Update(input.clone()));
        let mut notes = self.notes.lock().expect("notes poisoned");
        let note = notes
            .iter_mut()
            .find(|n| n.id == input.id)
            .ok_or_else(|| DomainError::NoteNotFound(input.id.clone()))?;
        note.status = input.status;
        Ok(note.clone())
    }

    async fn delete_note(&self, id: &str) -> Result<(), DomainError> {
        self.log.record(StoreCall::Delete(id.to_string()));
        if let Some(gate) = &self.delete_gate {
            gate.notified().await;
        }
        if self.delete_failures.contains(id) {
            return Err(DomainError::Remote(format!("delete failed for {id}")));
        }
        self.notes.lock().expect("notes poisoned").retain(|n| n.id != id);
        Ok(())
    }
}

/// Builder for MockNoteRepository
pub struct MockNoteRepositoryBuilder {
    notes: Vec<Note>,
    fail_list: bool,
    fail_create: bool,
    delete_failures: HashSet<String>,
    delete_gate: Option<Arc<Notify>>,
    log: CallLog,
}

impl MockNoteRepositoryBuilder {
    pub fn new() -> Self {
        Self {
            notes: vec![],
            fail_list: false,
            fail_create: false,
            delete_failures: HashSet::new(),
            delete_gate: None,
            log: CallLog::default(),
        }
    }

    /// Add a note returned by list_notes
    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_list_failure(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn with_create_failure(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Configure delete_note to fail for a specific ID
    pub fn with_delete_failure(mut self, id: &str) -> Self {
        self.delete_failures.insert(id.to_string());
        self
    }

    /// Hold every delete_note call until the gate is notified
    pub fn with_delete_gate(mut self, gate: Arc<Notify>) -> Self {
        self.delete_gate = Some(gate);
        self
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn build(self) -> MockNoteRepository {
        MockNoteRepository {
            notes: Mutex::new(self.notes),
            next_id: AtomicU64::new(1),
            fail_list: AtomicBool::new(self.fail_list),
            fail_create: self.fail_create,
            delete_failures: self.delete_failures,
            delete_gate: self.delete_gate,
            log: self.log,
        }
    }
}

impl Default for MockNoteRepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory stand-in for the blob store
///
/// `get_url` answers from configured URLs first, then from blobs written with `put`.
pub struct MockBlobStore {
    urls: HashMap<String, String>,
    stored: Mutex<HashMap<String, Vec<u8>>>,
    get_failures: HashSet<String>,
    remove_failures: HashSet<String>,
    fail_put: bool,
    get_gate: Option<Arc<Notify>>,
    log: CallLog,
}

impl MockBlobStore {
    pub fn builder() -> MockBlobStoreBuilder {
        MockBlobStoreBuilder::new()
    }

    pub fn stored_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self
            .stored
            .lock()
            .expect("blobs poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn get_url(&self, key: &str) -> Result<String, DomainError> {
        self.log.record(StoreCall::GetUrl(key.to_string()));
        if let Some(gate) = &self.get_gate {
            gate.notified().await;
        }
        if self.get_failures.contains(key) {
            return Err(DomainError::Blob(format!("lookup failed for {key}")));
        }
        if let Some(url) = self.urls.get(key) {
            return Ok(url.clone());
        }
        if self.stored.lock().expect("blobs poisoned").contains_key(key) {
            return Ok(format!("https://blobs.test/{key}"));
        }
        Err(DomainError::BlobNotFound(key.to_string()))
    }

    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<(), DomainError> {
        self.log.record(StoreCall::Put(key.to_string()));
        if self.fail_put {
            return Err(DomainError::Blob(format!("upload failed for {key}")));
        }
        self.stored
            .lock()
            .expect("blobs poisoned")
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.log.record(StoreCall::Remove(key.to_string()));
        if self.remove_failures.contains(key) {
            return Err(DomainError::Blob(format!("remove failed for {key}")));
        }
        self.stored.lock().expect("blobs poisoned").remove(key);
        Ok(())
    }
}

/// Builder for MockBlobStore
pub struct MockBlobStoreBuilder {
    urls: HashMap<String, String>,
    get_failures: HashSet<String>,
    remove_failures: HashSet<String>,
    fail_put: bool,
    get_gate: Option<Arc<Notify>>,
    log: CallLog,
}

impl MockBlobStoreBuilder {
    pub fn new() -> Self {
        Self {
            urls: HashMap::new(),
            get_failures: HashSet::new(),
            remove_failures: HashSet::new(),
            fail_put: false,
            get_gate: None,
            log: CallLog::default(),
        }
    }

    /// Resolve `key` to `url`
    pub fn with_url(mut self, key: &str, url: &str) -> Self {
        self.urls.insert(key.to_string(), url.to_string());
        self
    }

    pub fn with_get_failure(mut self, key: &str) -> Self {
        self.get_failures.insert(key.to_string());
        self
    }

    pub fn with_remove_failure(mut self, key: &str) -> Self {
        self.remove_failures.insert(key.to_string());
        self
    }

    pub fn with_put_failure(mut self) -> Self {
        self.fail_put = true;
        self
    }

    /// Hold every `get_url` after it is recorded until `gate` is notified
    pub fn with_get_gate(mut self, gate: Arc<Notify>) -> Self {
        self.get_gate = Some(gate);
        self
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn build(self) -> MockBlobStore {
        MockBlobStore {
            urls: self.urls,
            stored: Mutex::new(HashMap::new()),
            get_failures: self.get_failures,
            remove_failures: self.remove_failures,
            fail_put: self.fail_put,
            get_gate: self.get_gate,
            log: self.log,
        }
    }
}

impl Default for MockBlobStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    let noisy_modules = ["hyper", "reqwest", "mio", "h2"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
