// src/application/mod.rs
pub mod note_workflow;
pub mod stores;
pub mod workflow_actor;

pub use note_workflow::{AttachOutcome, CreateOutcome, NoteWorkflow};
pub use stores::{BlobStore, Operation, RecordStore, CREATE_NOTE, DELETE_NOTE, LIST_NOTES};
pub use workflow_actor::{Snapshot, WorkflowHandle};
