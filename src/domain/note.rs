// src/domain/note.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned note identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A blob reference that can be rendered directly (e.g. a URL)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A note as held in the view state.
///
/// `image_key` is the storage key carried by the record, `image_ref` is the
/// resolved reference. `image_ref` is only ever filled by a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub id: Option<NoteId>,
    pub name: String,
    pub description: String,
    pub image_key: Option<String>,
    pub image_ref: Option<ImageRef>,
}

impl Note {
    /// True if the note carries a key that has not been resolved yet
    pub fn needs_resolution(&self) -> bool {
        self.image_key.is_some() && self.image_ref.is_none()
    }
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            image_key: record.image.filter(|key| !key.is_empty()),
            image_ref: None,
        }
    }
}

/// The form in progress
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Draft {
    pub name: String,
    pub description: String,
    pub image_key: Option<String>,
}

impl Draft {
    /// Both required fields are filled in
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.description.is_empty()
    }

    pub fn to_record(&self) -> NoteRecord {
        NoteRecord {
            id: None,
            name: self.name.clone(),
            description: self.description.clone(),
            image: self.image_key.clone(),
        }
    }

    /// Local echo of a created note; carries no id
    pub fn into_note(self) -> Note {
        Note {
            id: None,
            name: self.name,
            description: self.description,
            image_key: self.image_key,
            image_ref: None,
        }
    }
}

/// Record shape exchanged with the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NoteId>,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A file picked for attachment
#[derive(Clone, PartialEq)]
pub struct ChosenFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ChosenFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for ChosenFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChosenFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}
