// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Blob not found: {0}")]
    BlobNotFound(String),
    #[error("Record store error: {0}")]
    RecordStore(String),
    #[error("Blob store error: {0}")]
    BlobStore(String),
    #[error("Malformed record store response: {0}")]
    MalformedResponse(String),
    #[error("Note workflow is no longer running")]
    WorkflowClosed,
}
