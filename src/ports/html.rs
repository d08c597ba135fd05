// src/ports/html.rs
use crate::constants::IMAGE_WIDTH_PX;
use crate::domain::Note;
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::instrument;

/// Renders the note list as a standalone HTML page
#[derive(Debug, Default)]
pub struct HtmlPresenter;

impl HtmlPresenter {
    pub fn new() -> Self {
        Self
    }

    fn render_note(&self, note: &Note) -> String {
        let image = match &note.image_ref {
            Some(reference) => format!(
                r#"
            <img src="{src}" style="width: {width}px" alt="the note addition">"#,
                src = encode_double_quoted_attribute(reference.as_str()),
                width = IMAGE_WIDTH_PX,
            ),
            None => String::new(),
        };
        let id = note
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unsaved".to_string());

        format!(
            r#"
        <div class="note">
            <h2>{name}</h2>
            <p>{description}</p>
            <div class="note-info">Note ID: {id}</div>{image}
        </div>"#,
            name = encode_text(&note.name),
            description = encode_text(&note.description),
            id = encode_text(&id),
            image = image,
        )
    }

    #[instrument(level = "debug", skip(self, notes), fields(count = notes.len()))]
    pub fn render(&self, notes: &[Note]) -> String {
        let body = if notes.is_empty() {
            r#"
        <p class="empty">No notes yet</p>"#
                .to_string()
        } else {
            notes.iter().map(|note| self.render_note(note)).collect()
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Notes</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 2rem auto;
            padding: 0 1rem;
            background-color: #f5f5f5;
        }}
        .note {{
            background: white;
            border-radius: 8px;
            padding: 2rem;
            margin-bottom: 30px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
        .note-info {{
            font-size: 0.9em;
            color: #666;
        }}
        .empty {{
            color: #666;
        }}
    </style>
</head>
<body>
    <h1>Notes App</h1>
    <div class="notes">{body}
    </div>
</body>
</html>"#,
            body = body
        )
    }
}
