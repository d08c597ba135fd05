// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{BlobStore, Operation, RecordStore, CREATE_NOTE, DELETE_NOTE, LIST_NOTES};
use crate::domain::{DomainError, ImageRef, NoteId, NoteRecord};

/// Base of the references handed out by [`MockBlobStore::get`]
pub const MOCK_BLOB_BASE_URL: &str = "https://blobs.test/";

/// Build a wire record in one line
pub fn note_record(
    id: Option<&str>,
    name: &str,
    description: &str,
    image: Option<&str>,
) -> NoteRecord {
    NoteRecord {
        id: id.map(NoteId::new),
        name: name.to_string(),
        description: description.to_string(),
        image: image.map(str::to_string),
    }
}

/// One call observed by [`MockRecordStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordCall {
    pub operation: String,
    pub variables: Option<Value>,
}

struct RecordState {
    records: Vec<NoteRecord>,
    calls: Vec<RecordCall>,
    next_id: usize,
}

/// Shared mock record store for testing the note workflow
///
/// Understands the three note operations, records every call and can be
/// configured to reject queries or specific mutations.
///
/// # Examples
///
/// ```
/// use notekeeper::util::testing::{note_record, MockRecordStore};
///
/// let mock = MockRecordStore::builder()
///     .with_record(note_record(Some("1"), "Groceries", "Milk", None))
///     .with_failing_mutation("deleteNote")
///     .build();
/// assert_eq!(mock.records().len(), 1);
/// ```
pub struct MockRecordStore {
    state: Mutex<RecordState>,
    fail_queries: bool,
    failing_mutations: HashSet<String>,
    query_delay: Option<Duration>,
}

impl MockRecordStore {
    pub fn builder() -> MockRecordStoreBuilder {
        MockRecordStoreBuilder::new()
    }

    pub fn calls(&self) -> Vec<RecordCall> {
        self.state().calls.clone()
    }

    /// Calls made through `mutate`, in order
    pub fn mutations(&self) -> Vec<RecordCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.variables.is_some())
            .collect()
    }

    pub fn query_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.variables.is_none())
            .count()
    }

    pub fn records(&self) -> Vec<NoteRecord> {
        self.state().records.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, RecordState> {
        self.state.lock().expect("mock record state poisoned")
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn query(&self, operation: &Operation) -> Result<Value, DomainError> {
        self.state().calls.push(RecordCall {
            operation: operation.name.to_string(),
            variables: None,
        });

        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_queries {
            return Err(DomainError::RecordStore("query rejected".to_string()));
        }
        if *operation != LIST_NOTES {
            return Err(DomainError::RecordStore(format!(
                "Unknown query: {}",
                operation.name
            )));
        }

        let items = self.state().records.clone();
        Ok(json!({ "listNotes": { "items": items } }))
    }

    async fn mutate(&self, operation: &Operation, variables: Value) -> Result<Value, DomainError> {
        let mut state = self.state();
        state.calls.push(RecordCall {
            operation: operation.name.to_string(),
            variables: Some(variables.clone()),
        });

        if self.failing_mutations.contains(operation.name) {
            return Err(DomainError::RecordStore(format!(
                "{} rejected",
                operation.name
            )));
        }

        let input = variables.get("input").cloned().unwrap_or(Value::Null);
        if *operation == CREATE_NOTE {
            let mut record: NoteRecord = serde_json::from_value(input)
                .map_err(|e| DomainError::RecordStore(e.to_string()))?;
            state.next_id += 1;
            record.id = Some(NoteId::new(format!("mock-{}", state.next_id)));
            state.records.push(record.clone());
            Ok(json!({ "createNote": record }))
        } else if *operation == DELETE_NOTE {
            let id = input.get("id").and_then(Value::as_str).map(NoteId::new);
            let position = state
                .records
                .iter()
                .position(|r| r.id.is_some() && r.id == id)
                .ok_or_else(|| DomainError::NoteNotFound(format!("{:?}", id)))?;
            let removed = state.records.remove(position);
            Ok(json!({ "deleteNote": removed }))
        } else {
            Err(DomainError::RecordStore(format!(
                "Unknown mutation: {}",
                operation.name
            )))
        }
    }
}

/// Builder for MockRecordStore
pub struct MockRecordStoreBuilder {
    records: Vec<NoteRecord>,
    fail_queries: bool,
    failing_mutations: HashSet<String>,
    query_delay: Option<Duration>,
}

impl MockRecordStoreBuilder {
    pub fn new() -> Self {
        Self {
            records: vec![],
            fail_queries: false,
            failing_mutations: HashSet::new(),
            query_delay: None,
        }
    }

    /// Add a record returned by the list query
    pub fn with_record(mut self, record: NoteRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Make every query fail
    pub fn with_failing_query(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Make the named mutation (e.g. `"deleteNote"`) fail
    pub fn with_failing_mutation(mut self, name: &str) -> Self {
        self.failing_mutations.insert(name.to_string());
        self
    }

    /// Hold every query for `delay` before answering
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    pub fn build(self) -> MockRecordStore {
        MockRecordStore {
            state: Mutex::new(RecordState {
                records: self.records,
                calls: vec![],
                next_id: 0,
            }),
            fail_queries: self.fail_queries,
            failing_mutations: self.failing_mutations,
            query_delay: self.query_delay,
        }
    }
}

impl Default for MockRecordStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct BlobState {
    blobs: HashMap<String, Vec<u8>>,
    get_calls: Vec<String>,
    put_calls: Vec<String>,
}

/// Shared mock blob store; resolves keys to `https://blobs.test/<key>`
pub struct MockBlobStore {
    state: Mutex<BlobState>,
    failing_gets: HashSet<String>,
    fail_puts: bool,
}

impl MockBlobStore {
    pub fn builder() -> MockBlobStoreBuilder {
        MockBlobStoreBuilder::new()
    }

    /// Keys passed to `get`, in order
    pub fn get_calls(&self) -> Vec<String> {
        self.state().get_calls.clone()
    }

    pub fn put_calls(&self) -> Vec<String> {
        self.state().put_calls.clone()
    }

    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.state().blobs.get(key).cloned()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, BlobState> {
        self.state.lock().expect("mock blob state poisoned")
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn get(&self, key: &str) -> Result<ImageRef, DomainError> {
        let mut state = self.state();
        state.get_calls.push(key.to_string());

        if self.failing_gets.contains(key) {
            return Err(DomainError::BlobStore(format!("get {} rejected", key)));
        }
        if !state.blobs.contains_key(key) {
            return Err(DomainError::BlobNotFound(key.to_string()));
        }
        Ok(ImageRef::new(format!("{}{}", MOCK_BLOB_BASE_URL, key)))
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), DomainError> {
        let mut state = self.state();
        state.put_calls.push(key.to_string());

        if self.fail_puts {
            return Err(DomainError::BlobStore(format!("put {} rejected", key)));
        }
        state.blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Builder for MockBlobStore
pub struct MockBlobStoreBuilder {
    blobs: HashMap<String, Vec<u8>>,
    failing_gets: HashSet<String>,
    fail_puts: bool,
}

impl MockBlobStoreBuilder {
    pub fn new() -> Self {
        Self {
            blobs: HashMap::new(),
            failing_gets: HashSet::new(),
            fail_puts: false,
        }
    }

    pub fn with_blob(mut self, key: &str, bytes: &[u8]) -> Self {
        self.blobs.insert(key.to_string(), bytes.to_vec());
        self
    }

    /// Make `get` fail for this key
    pub fn with_failing_get(mut self, key: &str) -> Self {
        self.failing_gets.insert(key.to_string());
        self
    }

    pub fn with_failing_put(mut self) -> Self {
        self.fail_puts = true;
        self
    }

    pub fn build(self) -> MockBlobStore {
        MockBlobStore {
            state: Mutex::new(BlobState {
                blobs: self.blobs,
                ..BlobState::default()
            }),
            failing_gets: self.failing_gets,
            fail_puts: self.fail_puts,
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

    // Create a filter for noisy modules
    let noisy_modules = ["tokio", "mio"];
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
