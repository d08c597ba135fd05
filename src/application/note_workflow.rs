// src/application/note_workflow.rs
use crate::application::stores::{BlobStore, RecordStore, CREATE_NOTE, DELETE_NOTE, LIST_NOTES};
use crate::domain::{ChosenFile, DomainError, Draft, Note, NoteRecord};
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

/// Result of [`NoteWorkflow::create_note`]
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// Draft was incomplete; nothing happened
    Skipped,
    Created(Note),
}

/// Result of [`NoteWorkflow::on_file_chosen`]
#[derive(Debug, Clone, PartialEq)]
pub enum AttachOutcome {
    /// Empty selection; nothing happened
    NoFile,
    Attached { key: String },
}

#[derive(Deserialize)]
struct ListNotesData {
    #[serde(rename = "listNotes")]
    list_notes: ListNotesPage,
}

#[derive(Deserialize)]
struct ListNotesPage {
    items: Vec<NoteRecord>,
}

/// Keeps the note list and the draft in sync with the record and blob stores.
///
/// The workflow exclusively owns both pieces of view state. Every operation
/// runs its remote calls in order and reports failures through `DomainError`.
/// Nothing is retried and the optimistic delete is never rolled back.
pub struct NoteWorkflow<R: RecordStore, B: BlobStore> {
    records: R,
    blobs: B,
    notes: Vec<Note>,
    draft: Draft,
}

impl<R: RecordStore, B: BlobStore> NoteWorkflow<R, B> {
    pub fn new(records: R, blobs: B) -> Self {
        Self {
            records,
            blobs,
            notes: Vec::new(),
            draft: Draft::default(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    /// Fetch all notes and resolve their images.
    ///
    /// Images are resolved concurrently and the new list is installed only
    /// once every resolution succeeded. On any failure the previous list
    /// stays in place.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_notes(&mut self) -> Result<&[Note], DomainError> {
        let response = self.records.query(&LIST_NOTES).await?;
        let data: ListNotesData = serde_json::from_value(response)
            .map_err(|e| DomainError::MalformedResponse(e.to_string()))?;
        debug!(count = data.list_notes.items.len(), "Fetched note records");

        let blobs = &self.blobs;
        let resolved = try_join_all(
            data.list_notes
                .items
                .into_iter()
                .map(|record| resolve_image(blobs, Note::from(record))),
        )
        .await?;

        self.notes = resolved;
        info!(count = self.notes.len(), "Installed note list");
        Ok(&self.notes)
    }

    /// Persist the current draft and append it to the list.
    ///
    /// The appended note is the local draft copy and carries no id.
    #[instrument(level = "debug", skip(self))]
    pub async fn create_note(&mut self) -> Result<CreateOutcome, DomainError> {
        if !self.draft.is_complete() {
            debug!(draft = ?self.draft, "Draft incomplete, skipping create");
            return Ok(CreateOutcome::Skipped);
        }

        let variables = json!({ "input": self.draft.to_record() });
        let response = self.records.mutate(&CREATE_NOTE, variables).await?;
        if let Some(id) = response
            .get(CREATE_NOTE.name)
            .and_then(|created| created.get("id"))
            .and_then(Value::as_str)
        {
            debug!(id, "Backend assigned id to created note");
        }

        let note = resolve_image(&self.blobs, self.draft.clone().into_note()).await?;
        self.notes.push(note.clone());
        self.draft = Draft::default();

        info!(name = %note.name, "Created note");
        Ok(CreateOutcome::Created(note))
    }

    /// Remove every note with `note.id` locally, then delete it remotely.
    ///
    /// Notes without an id all match each other.
    #[instrument(level = "debug", skip(self, note), fields(id = ?note.id))]
    pub async fn delete_note(&mut self, note: &Note) -> Result<(), DomainError> {
        let before = self.notes.len();
        self.notes.retain(|existing| existing.id != note.id);
        debug!(removed = before - self.notes.len(), "Removed notes from list");

        let variables = json!({ "input": { "id": note.id } });
        if let Err(e) = self.records.mutate(&DELETE_NOTE, variables).await {
            warn!(error = %e, "Remote delete failed, local list keeps the removal");
            return Err(e);
        }

        info!("Deleted note");
        Ok(())
    }

    /// Store the chosen file under its name and refresh the list
    #[instrument(level = "debug", skip(self))]
    pub async fn on_file_chosen(
        &mut self,
        file: Option<ChosenFile>,
    ) -> Result<AttachOutcome, DomainError> {
        let Some(file) = file else {
            debug!("No file chosen");
            return Ok(AttachOutcome::NoFile);
        };

        self.draft.image_key = Some(file.name.clone());
        self.blobs.put(&file.name, &file.bytes).await?;
        debug!(key = %file.name, bytes = file.bytes.len(), "Stored image");

        self.list_notes().await?;
        Ok(AttachOutcome::Attached { key: file.name })
    }
}

/// Resolve the note's image key once; notes already resolved are left alone
async fn resolve_image<B: BlobStore>(blobs: &B, mut note: Note) -> Result<Note, DomainError> {
    if !note.needs_resolution() {
        return Ok(note);
    }
    if let Some(key) = note.image_key.as_deref() {
        note.image_ref = Some(blobs.get(key).await?);
    }
    Ok(note)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImageRef, NoteId};
    use crate::util::testing::{note_record, MockBlobStore, MockRecordStore};
    use rstest::rstest;
    use std::sync::Arc;

    type TestWorkflow = NoteWorkflow<Arc<MockRecordStore>, Arc<MockBlobStore>>;

    fn workflow(
        records: MockRecordStore,
        blobs: MockBlobStore,
    ) -> (TestWorkflow, Arc<MockRecordStore>, Arc<MockBlobStore>) {
        let records = Arc::new(records);
        let blobs = Arc::new(blobs);
        (
            NoteWorkflow::new(records.clone(), blobs.clone()),
            records,
            blobs,
        )
    }

    fn note(id: Option<&str>, name: &str) -> Note {
        Note {
            id: id.map(NoteId::new),
            name: name.to_string(),
            description: format!("{} description", name),
            image_key: None,
            image_ref: None,
        }
    }

    #[tokio::test]
    async fn given_records_with_images_when_listing_then_resolves_every_image() {
        // Arrange
        let records = MockRecordStore::builder()
            .with_record(note_record(Some("1"), "Plain", "No image", None))
            .with_record(note_record(Some("2"), "Photo", "Has image", Some("cat.png")))
            .build();
        let blobs = MockBlobStore::builder().with_blob("cat.png", b"png").build();
        let (mut workflow, _, blobs) = workflow(records, blobs);

        // Act
        let notes = workflow.list_notes().await.expect("List should succeed");

        // Assert
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].image_key, None);
        assert_eq!(notes[0].image_ref, None);
        assert_eq!(notes[1].image_key.as_deref(), Some("cat.png"));
        assert_eq!(
            notes[1].image_ref,
            Some(ImageRef::new("https://blobs.test/cat.png"))
        );
        assert_eq!(blobs.get_calls(), vec!["cat.png".to_string()]);
    }

    #[tokio::test]
    async fn given_failing_resolution_when_listing_then_keeps_previous_list() {
        // Arrange
        let records = MockRecordStore::builder()
            .with_record(note_record(Some("1"), "Plain", "No image", None))
            .with_record(note_record(Some("2"), "Broken", "Bad image", Some("bad.png")))
            .build();
        let blobs = MockBlobStore::builder().with_failing_get("bad.png").build();
        let (mut workflow, _, _) = workflow(records, blobs);
        workflow.notes = vec![note(Some("old"), "Old")];

        // Act
        let result = workflow.list_notes().await;

        // Assert
        assert!(matches!(result, Err(DomainError::BlobStore(_))));
        assert_eq!(workflow.notes(), &[note(Some("old"), "Old")]);
    }

    #[tokio::test]
    async fn given_failing_query_when_listing_then_returns_record_store_error() {
        let records = MockRecordStore::builder().with_failing_query().build();
        let (mut workflow, _, _) = workflow(records, MockBlobStore::builder().build());

        let result = workflow.list_notes().await;

        assert!(matches!(result, Err(DomainError::RecordStore(_))));
        assert!(workflow.notes().is_empty());
    }

    #[tokio::test]
    async fn given_resolved_note_when_resolving_again_then_does_not_call_blob_store() {
        let blobs = MockBlobStore::builder().with_blob("cat.png", b"png").build();
        let mut resolved = note(Some("1"), "Photo");
        resolved.image_key = Some("cat.png".to_string());
        resolved.image_ref = Some(ImageRef::new("https://blobs.test/cat.png"));

        let result = resolve_image(&blobs, resolved.clone())
            .await
            .expect("Resolution should succeed");

        assert_eq!(result, resolved);
        assert!(blobs.get_calls().is_empty());
    }

    #[rstest]
    #[case("", "")]
    #[case("A", "")]
    #[case("", "B")]
    #[tokio::test]
    async fn given_incomplete_draft_when_creating_then_changes_nothing(
        #[case] name: &str,
        #[case] description: &str,
    ) {
        // Arrange
        let (mut workflow, records, _) = workflow(
            MockRecordStore::builder().build(),
            MockBlobStore::builder().build(),
        );
        workflow.notes = vec![note(Some("1"), "Existing")];
        workflow.set_name(name);
        workflow.set_description(description);
        let draft_before = workflow.draft().clone();

        // Act
        let outcome = workflow.create_note().await.expect("Create should not fail");

        // Assert
        assert_eq!(outcome, CreateOutcome::Skipped);
        assert_eq!(workflow.notes(), &[note(Some("1"), "Existing")]);
        assert_eq!(workflow.draft(), &draft_before);
        assert!(records.calls().is_empty());
    }

    #[tokio::test]
    async fn given_valid_draft_when_creating_then_appends_note_without_id_and_resets_draft() {
        // Arrange
        let (mut workflow, records, _) = workflow(
            MockRecordStore::builder().build(),
            MockBlobStore::builder().build(),
        );
        workflow.set_name("A");
        workflow.set_description("B");

        // Act
        let outcome = workflow.create_note().await.expect("Create should succeed");

        // Assert
        let expected = Note {
            id: None,
            name: "A".to_string(),
            description: "B".to_string(),
            image_key: None,
            image_ref: None,
        };
        assert_eq!(outcome, CreateOutcome::Created(expected.clone()));
        assert_eq!(workflow.notes(), &[expected]);
        assert_eq!(workflow.draft(), &Draft::default());
        assert_eq!(records.records().len(), 1);
    }

    #[tokio::test]
    async fn given_groceries_draft_when_creating_then_sends_one_create_mutation() {
        // Arrange
        let (mut workflow, records, _) = workflow(
            MockRecordStore::builder().build(),
            MockBlobStore::builder().build(),
        );
        workflow.set_name("Groceries");
        workflow.set_description("Milk, eggs");

        // Act
        workflow.create_note().await.expect("Create should succeed");

        // Assert
        let mutations = records.mutations();
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].operation, "createNote");
        assert_eq!(
            mutations[0].variables,
            Some(json!({"input": {"name": "Groceries", "description": "Milk, eggs"}}))
        );
        assert_eq!(workflow.notes().len(), 1);
        assert_eq!(workflow.notes()[0].name, "Groceries");
        assert_eq!(workflow.notes()[0].description, "Milk, eggs");
    }

    #[tokio::test]
    async fn given_draft_with_image_when_creating_then_resolves_local_copy_only() {
        // Arrange
        let (mut workflow, records, blobs) = workflow(
            MockRecordStore::builder().build(),
            MockBlobStore::builder().with_blob("cat.png", b"png").build(),
        );
        workflow.set_name("Cat");
        workflow.set_description("Photo");
        workflow.draft.image_key = Some("cat.png".to_string());

        // Act
        workflow.create_note().await.expect("Create should succeed");

        // Assert
        let created = &workflow.notes()[0];
        assert_eq!(created.image_key.as_deref(), Some("cat.png"));
        assert_eq!(
            created.image_ref,
            Some(ImageRef::new("https://blobs.test/cat.png"))
        );
        assert_eq!(records.records()[0].image.as_deref(), Some("cat.png"));
        assert_eq!(blobs.get_calls().len(), 1);
    }

    #[tokio::test]
    async fn given_failing_create_mutation_when_creating_then_keeps_draft_and_list() {
        // Arrange
        let (mut workflow, _, _) = workflow(
            MockRecordStore::builder()
                .with_failing_mutation("createNote")
                .build(),
            MockBlobStore::builder().build(),
        );
        workflow.set_name("A");
        workflow.set_description("B");

        // Act
        let result = workflow.create_note().await;

        // Assert
        assert!(matches!(result, Err(DomainError::RecordStore(_))));
        assert!(workflow.notes().is_empty());
        assert_eq!(workflow.draft().name, "A");
    }

    #[tokio::test]
    async fn given_two_notes_when_deleting_first_then_only_second_remains() {
        // Arrange
        let (mut workflow, records, _) = workflow(
            MockRecordStore::builder()
                .with_record(note_record(Some("1"), "One", "1", None))
                .with_record(note_record(Some("2"), "Two", "2", None))
                .build(),
            MockBlobStore::builder().build(),
        );
        workflow.notes = vec![note(Some("1"), "One"), note(Some("2"), "Two")];

        // Act
        workflow
            .delete_note(&note(Some("1"), "One"))
            .await
            .expect("Delete should succeed");

        // Assert
        assert_eq!(workflow.notes(), &[note(Some("2"), "Two")]);
        assert_eq!(
            records.mutations()[0].variables,
            Some(json!({"input": {"id": "1"}}))
        );
    }

    #[tokio::test]
    async fn given_failing_remote_delete_when_deleting_then_local_removal_stays() {
        // Arrange
        let (mut workflow, _, _) = workflow(
            MockRecordStore::builder()
                .with_failing_mutation("deleteNote")
                .build(),
            MockBlobStore::builder().build(),
        );
        workflow.notes = vec![note(Some("1"), "One"), note(Some("2"), "Two")];

        // Act
        let result = workflow.delete_note(&note(Some("1"), "One")).await;

        // Assert
        assert!(result.is_err());
        assert_eq!(workflow.notes(), &[note(Some("2"), "Two")]);
    }

    #[tokio::test]
    async fn given_two_notes_without_id_when_deleting_one_then_removes_both() {
        // Arrange
        let (mut workflow, records, _) = workflow(
            MockRecordStore::builder().build(),
            MockBlobStore::builder().build(),
        );
        workflow.notes = vec![
            note(None, "Local A"),
            note(Some("1"), "Persisted"),
            note(None, "Local B"),
        ];

        // Act
        let _ = workflow.delete_note(&note(None, "Local A")).await;

        // Assert
        assert_eq!(workflow.notes(), &[note(Some("1"), "Persisted")]);
        assert_eq!(
            records.mutations()[0].variables,
            Some(json!({"input": {"id": null}}))
        );
    }

    #[tokio::test]
    async fn given_chosen_file_when_attaching_then_stores_blob_and_refetches_once() {
        // Arrange
        let (mut workflow, records, blobs) = workflow(
            MockRecordStore::builder()
                .with_record(note_record(Some("1"), "Photo", "Old", Some("x.png")))
                .build(),
            MockBlobStore::builder().build(),
        );

        // Act
        let outcome = workflow
            .on_file_chosen(Some(ChosenFile::new("x.png", b"bytes".to_vec())))
            .await
            .expect("Attach should succeed");

        // Assert
        assert_eq!(
            outcome,
            AttachOutcome::Attached {
                key: "x.png".to_string()
            }
        );
        assert_eq!(blobs.blob("x.png"), Some(b"bytes".to_vec()));
        assert_eq!(records.query_count(), 1);
        assert_eq!(workflow.draft().image_key.as_deref(), Some("x.png"));
        assert_eq!(
            workflow.notes()[0].image_ref,
            Some(ImageRef::new("https://blobs.test/x.png"))
        );
    }

    #[tokio::test]
    async fn given_no_file_when_attaching_then_does_nothing() {
        let (mut workflow, records, blobs) = workflow(
            MockRecordStore::builder().build(),
            MockBlobStore::builder().build(),
        );

        let outcome = workflow
            .on_file_chosen(None)
            .await
            .expect("Empty selection should not fail");

        assert_eq!(outcome, AttachOutcome::NoFile);
        assert!(blobs.put_calls().is_empty());
        assert!(records.calls().is_empty());
        assert_eq!(workflow.draft(), &Draft::default());
    }

    #[tokio::test]
    async fn given_failing_put_when_attaching_then_skips_refetch() {
        let (mut workflow, records, _) = workflow(
            MockRecordStore::builder().build(),
            MockBlobStore::builder().with_failing_put().build(),
        );

        let result = workflow
            .on_file_chosen(Some(ChosenFile::new("x.png", vec![0u8])))
            .await;

        assert!(matches!(result, Err(DomainError::BlobStore(_))));
        assert_eq!(records.query_count(), 0);
    }
}
