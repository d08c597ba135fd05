// src/infrastructure/json_store.rs
use crate::application::{Operation, RecordStore, CREATE_NOTE, DELETE_NOTE, LIST_NOTES};
use crate::domain::{DomainError, NoteId, NoteRecord};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Record store keeping every note in a single JSON file.
///
/// Stands in for the managed backend: it answers the three note operations
/// by name and assigns ids on create. A missing file is an empty store.
pub struct JsonRecordStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl JsonRecordStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = PathBuf::from(path.as_ref());
        debug!(?path, "Creating new JsonRecordStore");
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<NoteRecord>, DomainError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DomainError::RecordStore(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            DomainError::RecordStore(format!("Corrupt records file {}: {}", self.path.display(), e))
        })
    }

    /// Replace the file atomically: write a sibling temp file, then rename it over
    async fn save(&self, records: &[NoteRecord]) -> Result<(), DomainError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            DomainError::RecordStore(format!("Failed to create directory {}: {}", dir.display(), e))
        })?;

        let content = serde_json::to_string_pretty(records)
            .map_err(|e| DomainError::RecordStore(format!("Failed to encode records: {}", e)))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<(), DomainError> {
            let write_error = |e: std::io::Error| {
                DomainError::RecordStore(format!("Failed to write {}: {}", path.display(), e))
            };
            let mut temp = NamedTempFile::new_in(&dir).map_err(write_error)?;
            temp.write_all(content.as_bytes()).map_err(write_error)?;
            temp.as_file().sync_all().map_err(write_error)?;
            temp.persist(&path).map_err(|e| write_error(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| DomainError::RecordStore(format!("Record write task failed: {}", e)))?
    }

    async fn create(&self, input: Value) -> Result<Value, DomainError> {
        let mut record: NoteRecord = serde_json::from_value(input)
            .map_err(|e| DomainError::RecordStore(format!("Invalid create input: {}", e)))?;
        record.id = Some(NoteId::new(Uuid::new_v4().to_string()));

        let mut records = self.load().await?;
        records.push(record.clone());
        self.save(&records).await?;

        info!(id = ?record.id, "Stored new note record");
        Ok(json!({ "createNote": record }))
    }

    async fn delete(&self, input: Value) -> Result<Value, DomainError> {
        let id = input
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::RecordStore("Delete input requires an id".to_string()))?;

        let mut records = self.load().await?;
        let position = records
            .iter()
            .position(|record| record.id.as_ref().map(NoteId::as_str) == Some(id))
            .ok_or_else(|| DomainError::NoteNotFound(id.to_string()))?;
        let removed = records.remove(position);
        self.save(&records).await?;

        info!(id, "Removed note record");
        Ok(json!({ "deleteNote": removed }))
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    #[instrument(level = "debug", skip(self, operation), fields(operation = operation.name))]
    async fn query(&self, operation: &Operation) -> Result<Value, DomainError> {
        let _guard = self.lock.lock().await;

        if *operation != LIST_NOTES {
            return Err(DomainError::RecordStore(format!(
                "Unsupported query: {}",
                operation.name
            )));
        }

        let items = self.load().await?;
        debug!(count = items.len(), "Loaded note records");
        Ok(json!({ "listNotes": { "items": items } }))
    }

    #[instrument(level = "debug", skip(self, operation, variables), fields(operation = operation.name))]
    async fn mutate(&self, operation: &Operation, variables: Value) -> Result<Value, DomainError> {
        let _guard = self.lock.lock().await;

        let input = variables.get("input").cloned().unwrap_or(Value::Null);
        if *operation == CREATE_NOTE {
            self.create(input).await
        } else if *operation == DELETE_NOTE {
            self.delete(input).await
        } else {
            Err(DomainError::RecordStore(format!(
                "Unsupported mutation: {}",
                operation.name
            )))
        }
    }
}
