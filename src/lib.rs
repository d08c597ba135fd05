// src/lib.rs
pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::path::Path;
use anyhow::{Context, Result};
use application::{BlobStore, CreateOutcome, NoteWorkflow, RecordStore};
use config::Config;
use domain::{ChosenFile, DomainError, Note, NoteId};
use infrastructure::{DirectoryBlobStore, JsonRecordStore, PageRenderer};
use ports::HtmlPresenter;
use tracing::{debug, info};
use crate::cli::args::{Args, Command};

pub async fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting notekeeper with arguments");

    // Initialize infrastructure
    let config = Config::discover(args.config.as_deref())?;
    let data_dir = config.resolve_data_dir(args.data_dir.as_deref())?;
    debug!(?data_dir, "Using data directory");

    let records = JsonRecordStore::new(config.records_path(&data_dir));
    let blobs = DirectoryBlobStore::new(config.blob_path(&data_dir));

    // Initialize application
    let mut workflow = NoteWorkflow::new(records, blobs);

    // Execute use case
    match args.command {
        Command::List { json } => list_notes(&mut workflow, json).await,
        Command::Create {
            name,
            description,
            image,
        } => create_note(&mut workflow, name, description, image.as_deref()).await,
        Command::Delete { note_id } => delete_note(&mut workflow, note_id).await,
        Command::Render { output, no_open } => {
            let open = !no_open && config.render.open_browser;
            render_notes(&mut workflow, output.as_deref(), open).await
        }
    }
}

async fn list_notes<R: RecordStore, B: BlobStore>(
    workflow: &mut NoteWorkflow<R, B>,
    json: bool,
) -> Result<()> {
    let notes = workflow.list_notes().await?;
    let output = format_note_list(notes, json)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

/// Format notes for `list`: pretty JSON, or one `id<TAB>name<TAB>image` line per note
pub fn format_note_list(notes: &[Note], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(notes)?);
    }

    let lines: Vec<String> = notes
        .iter()
        .map(|note| {
            let id = note.id.as_ref().map_or("-", NoteId::as_str);
            let image = note.image_ref.as_ref().map_or("", |r| r.as_str());
            format!("{}\t{}\t{}", id, note.name, image)
        })
        .collect();
    Ok(lines.join("\n"))
}

async fn create_note<R: RecordStore, B: BlobStore>(
    workflow: &mut NoteWorkflow<R, B>,
    name: String,
    description: String,
    image: Option<&Path>,
) -> Result<()> {
    if let Some(path) = image {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid image file name: {}", path.display()))?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        workflow
            .on_file_chosen(Some(ChosenFile::new(file_name, bytes)))
            .await?;
    }

    workflow.set_name(name);
    workflow.set_description(description);

    match workflow.create_note().await? {
        CreateOutcome::Created(note) => {
            info!(name = %note.name, "Note created");
            println!("Created note: {}", note.name);
        }
        CreateOutcome::Skipped => {
            println!("Note not created: name and description are required");
        }
    }
    Ok(())
}

async fn delete_note<R: RecordStore, B: BlobStore>(
    workflow: &mut NoteWorkflow<R, B>,
    note_id: String,
) -> Result<()> {
    let id = NoteId::new(note_id);
    let note = workflow
        .list_notes()
        .await?
        .iter()
        .find(|note| note.id.as_ref() == Some(&id))
        .cloned()
        .ok_or_else(|| DomainError::NoteNotFound(id.to_string()))?;

    workflow.delete_note(&note).await?;
    println!("Deleted note {}", id);
    Ok(())
}

async fn render_notes<R: RecordStore, B: BlobStore>(
    workflow: &mut NoteWorkflow<R, B>,
    output: Option<&Path>,
    open: bool,
) -> Result<()> {
    let notes = workflow.list_notes().await?;

    // Initialize presentation
    let presenter = HtmlPresenter::new();
    let mut renderer = PageRenderer::new();

    let html = presenter.render(notes);
    let path = renderer.write_page(&html, output)?;
    println!("{}", path.display());

    if open {
        renderer.open_in_browser(&path).await?;
    }
    Ok(())
}
