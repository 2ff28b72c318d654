//! Core types of notelist.
use crate::docstore::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display};

/// ID of notes.
///
/// The ID is the key the document store assigned to the note's document.
/// A note that has not been persisted yet has an empty ID.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Hash, Default)]
#[serde(into = "String", from = "String")]
pub struct NoteID {
    id: String,
}

impl From<NoteID> for String {
    fn from(id: NoteID) -> String {
        id.id
    }
}

impl From<String> for NoteID {
    fn from(id: String) -> NoteID {
        NoteID::new(id)
    }
}

impl From<&str> for NoteID {
    fn from(id: &str) -> NoteID {
        NoteID::new(id.to_owned())
    }
}

impl NoteID {
    pub fn new(id: String) -> Self {
        NoteID { id }
    }

    /// Whether the note has not been assigned a key yet.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

impl Display for NoteID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl AsRef<str> for NoteID {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

/// The `type` tag of a note.
///
/// Tags other than `"note"` and `"trash"` are kept verbatim so that a rewrite
/// doesn't silently change them.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Hash, Default)]
#[serde(into = "String", from = "String")]
pub enum NoteKind {
    #[default]
    Note,
    Trash,
    Other(String),
}

impl NoteKind {
    pub fn as_str(&self) -> &str {
        match self {
            NoteKind::Note => "note",
            NoteKind::Trash => "trash",
            NoteKind::Other(s) => s,
        }
    }
}

impl From<String> for NoteKind {
    fn from(kind: String) -> NoteKind {
        match kind.as_str() {
            "note" => NoteKind::Note,
            "trash" => NoteKind::Trash,
            _ => NoteKind::Other(kind),
        }
    }
}

impl From<&str> for NoteKind {
    fn from(kind: &str) -> NoteKind {
        NoteKind::from(kind.to_owned())
    }
}

impl From<NoteKind> for String {
    fn from(kind: NoteKind) -> String {
        match kind {
            NoteKind::Other(s) => s,
            k => k.as_str().to_owned(),
        }
    }
}

impl Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A note as presented to the views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Note {
    pub id: NoteID,
    #[serde(rename = "type")]
    pub note_type: NoteKind,
    pub title: String,
    pub content: String,
    pub marked: bool,
}

impl Note {
    /// A note that is not persisted yet, as produced by the add-note dialog.
    pub fn new(title: String, content: String) -> Self {
        Note {
            title,
            content,
            ..Default::default()
        }
    }

    /// Build a note from a raw document and its key.
    ///
    /// Missing or empty fields fall back to defaults: the `type` becomes
    /// `"note"`, `title` and `content` become empty, and `marked` is only set
    /// when the document holds a literal `true`.
    pub fn from_document(data: &Document, key: &str) -> Self {
        let string_field = |name: &str| {
            data.get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        let note_type = match data.get("type").and_then(Value::as_str) {
            Some(t) if !t.is_empty() => NoteKind::from(t),
            _ => NoteKind::Note,
        };
        Note {
            id: NoteID::from(key),
            note_type,
            title: string_field("title"),
            content: string_field("content"),
            marked: data
                .get("marked")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    /// The document body written to the store.
    ///
    /// The ID is never part of the body; it lives in the document key.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("title".to_owned(), Value::from(self.title.clone()));
        doc.insert("content".to_owned(), Value::from(self.content.clone()));
        doc.insert("marked".to_owned(), Value::from(self.marked));
        doc.insert("type".to_owned(), Value::from(self.note_type.as_str()));
        doc
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}
