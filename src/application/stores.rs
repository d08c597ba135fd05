// src/application/stores.rs
use crate::domain::{DomainError, ImageRef};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// A named query or mutation document understood by a record store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub document: &'static str,
}

pub const LIST_NOTES: Operation = Operation {
    name: "listNotes",
    document: r#"query ListNotes {
  listNotes {
    items { id name description image }
  }
}"#,
};

pub const CREATE_NOTE: Operation = Operation {
    name: "createNote",
    document: r#"mutation CreateNote($input: CreateNoteInput!) {
  createNote(input: $input) { id name description image }
}"#,
};

pub const DELETE_NOTE: Operation = Operation {
    name: "deleteNote",
    document: r#"mutation DeleteNote($input: DeleteNoteInput!) {
  deleteNote(input: $input) { id name description image }
}"#,
};

/// Structured record service reached through queries and mutations
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn query(&self, operation: &Operation) -> Result<Value, DomainError>;

    async fn mutate(&self, operation: &Operation, variables: Value) -> Result<Value, DomainError>;
}

/// Binary object service addressed by key
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Resolve a stored blob to a directly renderable reference
    async fn get(&self, key: &str) -> Result<ImageRef, DomainError>;

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), DomainError>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn query(&self, operation: &Operation) -> Result<Value, DomainError> {
        (**self).query(operation).await
    }

    async fn mutate(&self, operation: &Operation, variables: Value) -> Result<Value, DomainError> {
        (**self).mutate(operation, variables).await
    }
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<ImageRef, DomainError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), DomainError> {
        (**self).put(key, bytes).await
    }
}
