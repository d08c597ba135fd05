// src/application/workflow_actor.rs
use crate::application::note_workflow::{AttachOutcome, CreateOutcome, NoteWorkflow};
use crate::application::stores::{BlobStore, RecordStore};
use crate::constants::WORKFLOW_QUEUE_CAPACITY;
use crate::domain::{ChosenFile, DomainError, Draft, Note};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

type Reply<T> = oneshot::Sender<Result<T, DomainError>>;

/// View state as seen between two commands
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub notes: Vec<Note>,
    pub draft: Draft,
}

enum Command {
    ListNotes(Reply<Vec<Note>>),
    CreateNote(Reply<CreateOutcome>),
    DeleteNote(Note, Reply<()>),
    FileChosen(Option<ChosenFile>, Reply<AttachOutcome>),
    SetName(String, Reply<()>),
    SetDescription(String, Reply<()>),
    Snapshot(Reply<Snapshot>),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::ListNotes(_) => "list_notes",
            Command::CreateNote(_) => "create_note",
            Command::DeleteNote(..) => "delete_note",
            Command::FileChosen(..) => "file_chosen",
            Command::SetName(..) => "set_name",
            Command::SetDescription(..) => "set_description",
            Command::Snapshot(_) => "snapshot",
        }
    }
}

/// Cloneable handle to a workflow running on its own task.
///
/// Commands are queued and applied one at a time, each to completion, so a
/// create or delete issued while a fetch is in flight lands after the fetch
/// installs its list.
#[derive(Clone)]
pub struct WorkflowHandle {
    sender: mpsc::Sender<Command>,
}

impl WorkflowHandle {
    /// Move the workflow onto a tokio task and return a handle to it
    pub fn spawn<R, B>(workflow: NoteWorkflow<R, B>) -> (Self, JoinHandle<()>)
    where
        R: RecordStore + 'static,
        B: BlobStore + 'static,
    {
        let (sender, receiver) = mpsc::channel(WORKFLOW_QUEUE_CAPACITY);
        let task = tokio::spawn(run(workflow, receiver));
        (Self { sender }, task)
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>, DomainError> {
        self.request(Command::ListNotes).await
    }

    pub async fn create_note(&self) -> Result<CreateOutcome, DomainError> {
        self.request(Command::CreateNote).await
    }

    pub async fn delete_note(&self, note: Note) -> Result<(), DomainError> {
        self.request(|reply| Command::DeleteNote(note, reply)).await
    }

    pub async fn on_file_chosen(
        &self,
        file: Option<ChosenFile>,
    ) -> Result<AttachOutcome, DomainError> {
        self.request(|reply| Command::FileChosen(file, reply)).await
    }

    pub async fn set_name(&self, name: impl Into<String>) -> Result<(), DomainError> {
        let name = name.into();
        self.request(|reply| Command::SetName(name, reply)).await
    }

    pub async fn set_description(&self, description: impl Into<String>) -> Result<(), DomainError> {
        let description = description.into();
        self.request(|reply| Command::SetDescription(description, reply))
            .await
    }

    pub async fn snapshot(&self) -> Result<Snapshot, DomainError> {
        self.request(Command::Snapshot).await
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, DomainError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(make(reply))
            .await
            .map_err(|_| DomainError::WorkflowClosed)?;
        response.await.map_err(|_| DomainError::WorkflowClosed)?
    }
}

async fn run<R: RecordStore, B: BlobStore>(
    mut workflow: NoteWorkflow<R, B>,
    mut receiver: mpsc::Receiver<Command>,
) {
    debug!("Note workflow task started");
    while let Some(command) = receiver.recv().await {
        trace!(command = command.name(), "Applying command");
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            Command::ListNotes(reply) => {
                let result = workflow.list_notes().await.map(<[Note]>::to_vec);
                let _ = reply.send(result);
            }
            Command::CreateNote(reply) => {
                let _ = reply.send(workflow.create_note().await);
            }
            Command::DeleteNote(note, reply) => {
                let _ = reply.send(workflow.delete_note(&note).await);
            }
            Command::FileChosen(file, reply) => {
                let _ = reply.send(workflow.on_file_chosen(file).await);
            }
            Command::SetName(name, reply) => {
                workflow.set_name(name);
                let _ = reply.send(Ok(()));
            }
            Command::SetDescription(description, reply) => {
                workflow.set_description(description);
                let _ = reply.send(Ok(()));
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(Ok(Snapshot {
                    notes: workflow.notes().to_vec(),
                    draft: workflow.draft().clone(),
                }));
            }
        }
    }
    debug!("Note workflow task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::{note_record, MockBlobStore, MockRecordStore};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn given_create_queued_behind_slow_fetch_when_both_settle_then_created_note_survives() {
        // Arrange
        let records = Arc::new(
            MockRecordStore::builder()
                .with_record(note_record(Some("1"), "Server", "Existing", None))
                .with_query_delay(Duration::from_millis(50))
                .build(),
        );
        let blobs = Arc::new(MockBlobStore::builder().build());
        let (handle, _task) = WorkflowHandle::spawn(NoteWorkflow::new(records.clone(), blobs));

        // Act
        let (listed, created) = tokio::join!(handle.list_notes(), async {
            handle.set_name("Local").await?;
            handle.set_description("Created during fetch").await?;
            handle.create_note().await
        });

        // Assert
        assert_eq!(listed.expect("List should succeed").len(), 1);
        assert!(matches!(created, Ok(CreateOutcome::Created(_))));
        let snapshot = handle.snapshot().await.expect("Snapshot should succeed");
        let names: Vec<_> = snapshot.notes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Server", "Local"]);
        assert_eq!(snapshot.draft, Draft::default());
    }

    #[tokio::test]
    async fn given_listed_notes_when_deleting_through_handle_then_snapshot_reflects_removal() {
        // Arrange
        let records = MockRecordStore::builder()
            .with_record(note_record(Some("1"), "One", "1", None))
            .with_record(note_record(Some("2"), "Two", "2", None))
            .build();
        let (handle, _task) =
            WorkflowHandle::spawn(NoteWorkflow::new(records, MockBlobStore::builder().build()));
        let notes = handle.list_notes().await.expect("List should succeed");

        // Act
        handle
            .delete_note(notes[0].clone())
            .await
            .expect("Delete should succeed");

        // Assert
        let snapshot = handle.snapshot().await.expect("Snapshot should succeed");
        assert_eq!(snapshot.notes.len(), 1);
        assert_eq!(snapshot.notes[0].name, "Two");
    }

    #[tokio::test]
    async fn given_stopped_task_when_sending_command_then_returns_workflow_closed() {
        // Arrange
        let (handle, task) = WorkflowHandle::spawn(NoteWorkflow::new(
            MockRecordStore::builder().build(),
            MockBlobStore::builder().build(),
        ));
        task.abort();
        let _ = task.await;

        // Act
        let result = handle.snapshot().await;

        // Assert
        assert!(matches!(result, Err(DomainError::WorkflowClosed)));
    }
}
